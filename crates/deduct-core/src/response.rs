use crate::error::{RenderError, ResolveError};
use crate::n3;
use crate::render::{is_hypertext, render};
use crate::store::{GraphMatch, Store};
use crate::term::{Literal, Term};
use crate::vocab::http;

pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_HTML: &str = "text/html";
pub const TEXT_TURTLE: &str = "text/turtle";
pub const TEXT_N3: &str = "text/n3";

/// A resolved response, ready for the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

impl Response {
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: TEXT_PLAIN.to_string(),
            body: body.into(),
        }
    }
}

/// Body parts collected from `http:body` statements, in statement order.
#[derive(Default)]
struct Body {
    text: String,
    graph: Store,
    saw_text: bool,
    saw_html: bool,
    saw_graph: bool,
}

/// Find the response bound to `request` in `closure` and turn it into wire form.
///
/// Only relations reachable from `request` are consulted, so engine-minted
/// node names never matter. When several responses answer the same request,
/// the one whose N-Triples form sorts first wins.
pub fn resolve(closure: &Store, request: &Term) -> Result<Response, ResolveError> {
    let mut candidates = closure.subjects(http::RESPONDS_TO, request);
    candidates.sort_by_cached_key(|t| t.to_string());
    candidates.dedup();
    let Some(&response) = candidates.first() else {
        return Err(ResolveError::NotFound {
            request: request.to_string(),
        });
    };
    if candidates.len() > 1 {
        tracing::warn!(
            request = %request,
            candidates = candidates.len(),
            chosen = %response,
            "several responses bound to one request"
        );
    }

    let status = status_of(closure, response)?;
    let declared = closure
        .objects(response, http::CONTENT_TYPE)
        .first()
        .map(|t| match t {
            Term::Literal(lit) => lit.value.clone(),
            other => other.as_iri().map(str::to_string).unwrap_or_else(|| other.to_string()),
        });
    let body = collect_body(closure, response)?;

    let inferred = if body.saw_html {
        TEXT_HTML
    } else if body.saw_graph && body.graph.has_formulas() {
        TEXT_N3
    } else if body.saw_graph {
        TEXT_TURTLE
    } else {
        TEXT_PLAIN
    };
    let content_type = declared.unwrap_or_else(|| inferred.to_string());
    let body = if body.saw_graph {
        n3::serialize(&body.graph)
    } else {
        body.text
    };

    Ok(Response {
        status,
        content_type,
        body,
    })
}

fn status_of(closure: &Store, response: &Term) -> Result<u16, ResolveError> {
    let codes = closure.objects(response, http::RESPONSE_CODE);
    let Some(code) = codes.first() else {
        return Err(ResolveError::MissingStatus {
            response: response.to_string(),
        });
    };
    code.as_literal()
        .and_then(Literal::as_integer)
        .filter(|c| (100..=999).contains(c))
        .map(|c| c as u16)
        .ok_or_else(|| ResolveError::InvalidStatus {
            response: response.to_string(),
            value: code.to_string(),
        })
}

fn collect_body(closure: &Store, response: &Term) -> Result<Body, ResolveError> {
    let mut body = Body::default();
    for part in closure.objects(response, http::BODY) {
        match part {
            Term::Literal(lit) => {
                body.text.push_str(&lit.value);
                body.saw_text = true;
            }
            Term::Graph(statements) => {
                body.graph.extend(statements.iter().cloned());
                body.saw_graph = true;
            }
            node if is_hypertext(closure, node) => {
                body.text.push_str(&render(closure, node)?);
                body.saw_text = true;
                body.saw_html = true;
            }
            node if closure.is_graph_label(node) => {
                body.graph.extend(closure.subgraph(node));
                body.saw_graph = true;
            }
            node if is_empty_formula(closure, node) => {
                body.saw_graph = true;
            }
            node => {
                return Err(RenderError::Unrenderable {
                    node: node.to_string(),
                    reason: "body is not a literal, graph or hypertext node".to_string(),
                }
                .into());
            }
        }
        if body.saw_text && body.saw_graph {
            return Err(ResolveError::AmbiguousBody {
                response: response.to_string(),
            });
        }
    }
    Ok(body)
}

/// `{}` parses to a blank label that no statement carries.
fn is_empty_formula(closure: &Store, node: &Term) -> bool {
    node.is_blank() && closure.query(Some(node), None, None, GraphMatch::Any).is_empty()
}
