//! Error types for each stage of request handling.
//!
//! Every variant maps to an observable status through
//! [`HandleError::status`]; nothing is defaulted or dropped silently.

use std::time::Duration;

use thiserror::Error;

/// Graph text that could not be read.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid base IRI '{base}': {reason}")]
    InvalidBase { base: String, reason: String },

    #[error("invalid IRI '{iri}': {reason}")]
    InvalidIri { iri: String, reason: String },

    #[error("syntax error: {0}")]
    Syntax(String),
}

/// A node in a hypertext tree that cannot be turned into markup.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unrenderable node {node}: {reason}")]
    Unrenderable { node: String, reason: String },

    #[error("cycle through node {node}")]
    Cycle { node: String },

    #[error("hypertext nested deeper than {limit} levels at {node}")]
    TooDeep { node: String, limit: usize },
}

/// The closure does not describe a usable response for the request.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no response bound to request {request}")]
    NotFound { request: String },

    #[error("response {response} has no response code")]
    MissingStatus { response: String },

    #[error("response {response} has an invalid response code {value}")]
    InvalidStatus { response: String, value: String },

    #[error("response {response} mixes text and graph bodies")]
    AmbiguousBody { response: String },

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// The reasoner could not produce a closure.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("reasoner exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("reasoner timed out after {0:?}")]
    Timeout(Duration),

    #[error("reasoner unavailable: {0}")]
    Unavailable(String),

    #[error("reasoner produced an unreadable closure: {0}")]
    MalformedClosure(ParseError),
}

/// Anything that stops one request from producing its own response.
#[derive(Debug, Error)]
pub enum HandleError {
    #[error("invalid request URL: {0}")]
    InvalidUrl(ParseError),

    #[error("malformed request body: {0}")]
    MalformedBody(ParseError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl HandleError {
    /// Wire status for this failure.
    pub fn status(&self) -> u16 {
        match self {
            HandleError::InvalidUrl(_) | HandleError::MalformedBody(_) => 400,
            HandleError::Resolve(ResolveError::NotFound { .. }) => 404,
            HandleError::Gateway(_) | HandleError::Resolve(_) => 500,
        }
    }
}
