//! The seam to the external rule engine.

use std::future::Future;

use crate::error::GatewayError;

/// One named input handed to the reasoner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub text: String,
}

impl Document {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Computes the closure of a set of N3 documents.
///
/// Inputs are ordered: the merged fact graph first, then every rule text.
/// The returned string is N3 text containing at least every derived
/// statement. Implementations must not retry.
pub trait Reasoner: Send + Sync {
    fn reason(
        &self,
        inputs: &[Document],
    ) -> impl Future<Output = Result<String, GatewayError>> + Send;
}
