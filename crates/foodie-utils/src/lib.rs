//! Foundation utilities shared by every foodie-tours crate
//!
//! - [`error`]: the per-city failure taxonomy and configuration errors
//! - [`exit_codes`]: process exit codes for the CLI
//! - [`http_client`]: shared reqwest client with retry policy and error redaction
//! - [`logging`]: tracing subscriber initialisation and per-city spans

pub mod error;
pub mod exit_codes;
pub mod http_client;
pub mod logging;

pub use error::{ConfigError, ErrorCategory, TourError, UserFriendlyError};
pub use exit_codes::ExitCode;
pub use http_client::HttpClient;
