//! Translation layer between HTTP exchanges and N3 fact graphs.
//!
//! A request is encoded as a handful of statements around a freshly minted
//! request node, handed (together with the ground facts and the rule texts)
//! to an external reasoner, and the reasoner's closure is searched for a
//! response descriptor bound to that node. Hypertext bodies arrive as a
//! graph-encoded element tree and are rendered to markup here.
//!
//! Zero I/O. The reasoner is an injected [`Reasoner`]; transports and
//! persistence live in the other crates.

pub mod error;
pub mod gateway;
pub mod n3;
pub mod pipeline;
pub mod render;
pub mod request;
pub mod response;
pub mod store;
pub mod term;
pub mod vocab;

pub use error::{GatewayError, HandleError, ParseError, RenderError, ResolveError};
pub use gateway::{Document, Reasoner};
pub use n3::{parse, parse_with_base, serialize};
pub use pipeline::Pipeline;
pub use render::render;
pub use request::{Encoded, Request, encode, is_graph_media_type, mint_request_node};
pub use response::{Response, resolve};
pub use store::{GraphMatch, Store};
pub use term::{Literal, LiteralKind, Statement, Term};
