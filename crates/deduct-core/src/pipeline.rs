//! One request, end to end: encode, reason, parse, resolve.

use std::sync::Arc;

use crate::error::{GatewayError, HandleError, ParseError};
use crate::gateway::{Document, Reasoner};
use crate::n3;
use crate::request::{Encoded, Request, encode};
use crate::response::{Response, resolve};
use crate::store::Store;

/// Name of the merged fact document handed to the reasoner.
pub const FACTS_DOCUMENT: &str = "facts.n3";

/// Composes the request encoder, a [`Reasoner`] and the response resolver.
///
/// The ground facts are serialized once here and shared by every request;
/// they are never mutated. Each call to [`Pipeline::handle`] works on its
/// own request store, so a pipeline can serve concurrent requests.
pub struct Pipeline<R> {
    reasoner: R,
    ground: Arc<str>,
    ground_len: usize,
    rules: Arc<[Document]>,
}

impl<R: Reasoner> Pipeline<R> {
    pub fn new(reasoner: R, ground: &Store, rules: Vec<Document>) -> Self {
        Self {
            reasoner,
            ground: n3::serialize(ground).into(),
            ground_len: ground.len(),
            rules: rules.into(),
        }
    }

    pub fn reasoner(&self) -> &R {
        &self.reasoner
    }

    pub fn ground_len(&self) -> usize {
        self.ground_len
    }

    pub fn rules(&self) -> &[Document] {
        &self.rules
    }

    /// The documents a reasoner sees for an encoded request, in order.
    pub fn inputs(&self, encoded: &Encoded) -> Vec<Document> {
        let mut facts = String::with_capacity(self.ground.len());
        facts.push_str(&self.ground);
        facts.push_str(&n3::serialize(&encoded.store));

        let mut inputs = Vec::with_capacity(1 + self.rules.len());
        inputs.push(Document::new(FACTS_DOCUMENT, facts));
        inputs.extend(self.rules.iter().cloned());
        inputs
    }

    pub async fn handle(&self, request: &Request) -> Result<Response, HandleError> {
        let encoded = encode(request).map_err(|e| match e {
            ParseError::InvalidIri { .. } => HandleError::InvalidUrl(e),
            _ => HandleError::MalformedBody(e),
        })?;
        let inputs = self.inputs(&encoded);

        let text = self.reasoner.reason(&inputs).await?;
        let closure = n3::parse(&text).map_err(GatewayError::MalformedClosure)?;
        tracing::debug!(
            request = %encoded.node,
            closure = closure.len(),
            "closure parsed"
        );

        let response = resolve(&closure, &encoded.node)?;
        tracing::info!(
            request = %encoded.node,
            method = %request.method,
            path = %request.path,
            status = response.status,
            "handled request"
        );
        Ok(response)
    }

    /// Like [`Pipeline::handle`], with every failure turned into a
    /// `text/plain` response carrying its status.
    pub async fn respond(&self, request: &Request) -> Response {
        match self.handle(request).await {
            Ok(response) => response,
            Err(e) => {
                let status = e.status();
                if status >= 500 {
                    tracing::error!(method = %request.method, path = %request.path, status, "{e}");
                } else {
                    tracing::warn!(method = %request.method, path = %request.path, status, "{e}");
                }
                Response::text(status, e.to_string())
            }
        }
    }
}
