//! Configuration for the relay runtime.
//!
//! Configuration is layered with figment (defaults, files, `RELAY_*`
//! environment variables) and validated before anything connects.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile};
pub use schema::{LogFormat, LogLevel, LogOutput, LoggingConfig, RelayConfig};
pub use validation::validate_config;
