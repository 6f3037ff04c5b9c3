use oxrdf::NamedNode;
use uuid::Uuid;

use crate::error::ParseError;
use crate::n3;
use crate::store::Store;
use crate::term::{Statement, Term};
use crate::vocab::{http, rdf};

/// Media types whose bodies are parsed into statements.
const GRAPH_MEDIA_TYPES: &[&str] = &[
    "text/turtle",
    "application/turtle",
    "application/x-turtle",
    "text/n3",
    "text/rdf+n3",
    "application/n-triples",
];

/// An inbound exchange, already detached from the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    /// Full URL, including query.
    pub href: String,
    pub path: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Request {
    pub fn new(method: &str, href: &str) -> Self {
        Self {
            method: method.to_string(),
            href: href.to_string(),
            path: path_of(href).to_string(),
            content_type: None,
            body: Vec::new(),
        }
    }

    pub fn with_body(mut self, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        self.content_type = Some(content_type.to_string());
        self.body = body.into();
        self
    }
}

/// The fact graph for one request and the node it is about.
#[derive(Debug, Clone)]
pub struct Encoded {
    pub node: Term,
    pub store: Store,
}

/// Fresh request node. Never reused, never derived from the request.
pub fn mint_request_node() -> Term {
    Term::iri(format!("urn:uuid:{}", Uuid::new_v4()))
}

/// Whether a declared content type names a graph notation.
pub fn is_graph_media_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    GRAPH_MEDIA_TYPES.contains(&essence.as_str())
}

/// Encode a request around a freshly minted node.
pub fn encode(request: &Request) -> Result<Encoded, ParseError> {
    encode_as(request, mint_request_node())
}

/// Encode a request around `node`.
///
/// The href must be an absolute IRI; anything else is rejected before a
/// single statement is built. Graph bodies are parsed with `node` as base IRI, so `<>` in the body
/// denotes the request, and land under a fresh blank graph label linked
/// from `node http:body`.
pub fn encode_as(request: &Request, node: Term) -> Result<Encoded, ParseError> {
    let href = NamedNode::new(request.href.as_str()).map_err(|e| ParseError::InvalidIri {
        iri: request.href.clone(),
        reason: e.to_string(),
    })?;
    let mut store = Store::new();
    let content_type = request.content_type.clone().unwrap_or_default();

    store.add(node.clone(), Term::iri(rdf::TYPE), Term::iri(http::REQUEST));
    store.add(node.clone(), Term::iri(http::PATH), Term::string(&request.path));
    store.add(node.clone(), Term::iri(http::HREF), Term::iri(href.into_string()));
    store.add(node.clone(), Term::iri(http::METHOD), Term::string(&request.method));
    store.add(
        node.clone(),
        Term::iri(http::CONTENT_TYPE),
        Term::string(&content_type),
    );

    if is_graph_media_type(&content_type) {
        let text = std::str::from_utf8(&request.body)
            .map_err(|e| ParseError::Syntax(format!("body is not UTF-8: {e}")))?;
        let parsed = n3::parse_with_base(text, node.as_iri())?;
        let label = Term::blank(format!("body{}", Uuid::new_v4().simple()));

        store.add(node.clone(), Term::iri(http::BODY), label.clone());
        for st in parsed {
            let graph = st.graph.clone().or_else(|| Some(label.clone()));
            store.insert(Statement { graph, ..st });
        }
    }

    tracing::debug!(request = %node, statements = store.len(), "encoded request");
    Ok(Encoded { node, store })
}

/// Path component of a URL: after the authority, before query or fragment.
fn path_of(href: &str) -> &str {
    let rest = match href.find("://") {
        Some(i) => {
            let after = &href[i + 3..];
            match after.find(['/', '?', '#']) {
                Some(j) => &after[j..],
                None => "",
            }
        }
        None => href,
    };
    let end = rest.find(['?', '#']).unwrap_or(rest.len());
    match &rest[..end] {
        "" => "/",
        path => path,
    }
}
