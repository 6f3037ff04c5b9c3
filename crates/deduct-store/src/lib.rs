pub mod bundle;
pub mod config;
pub mod error;

pub use bundle::Bundle;
pub use config::{AppConfig, Config, ReasonerConfig, ReasonerKind, ServerConfig};
pub use error::{Result, StoreError};
