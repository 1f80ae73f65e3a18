//! HTTP server for simplestore.
//!
//! Serves an idempotent key/value store over HTTP: `PUT /{key}` creates or
//! replaces a value, `GET`/`HEAD /{key}` retrieves it (honouring
//! `If-Modified-Since`), `DELETE /{key}` removes it. Non-body responses and
//! all errors carry a small JSON status envelope.

pub mod config;
pub mod error;
pub mod handler;
pub mod mime;
pub mod response;
pub mod router;
pub mod server;
pub mod sources;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::AppState;
pub use mime::{GuessRegistry, MimeRegistry};
pub use response::{Envelope, EnvelopeStatus};
pub use server::{start, RunningServer, StoreServer};
pub use sources::{ConfigChain, ConfigSource, EnvSource, MapSource, TomlFileSource};
