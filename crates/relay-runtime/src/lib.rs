//! Relay Runtime - orchestration layer for the retweet relay.
//!
//! This crate provides:
//! - Layered configuration loading and validation ([`config`])
//! - Logging initialization ([`logging`])
//! - The [`RelayRuntime`], which wires the OneBot connection, the routing
//!   table and the event stream together and runs until shutdown
//!
//! ```ignore
//! use relay_runtime::RelayRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     RelayRuntime::builder().build()?.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{ConfigError, ConfigLoader, ConfigResult, RelayConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::LoggingBuilder;
pub use runtime::{RelayRuntime, RuntimeBuilder};
