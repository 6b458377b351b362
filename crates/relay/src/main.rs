//! Retweet relay
//!
//! Subscribes to a module-scoped update stream and forwards every routed
//! update to its QQ groups through a OneBot v11 implementation.
//!
//! Configuration is read from `relay.toml` (or `config.toml`) in the working
//! directory or `<user config dir>/retweet-relay/`, and can be overridden
//! with `RELAY_*` environment variables, e.g. `RELAY_RETWEET__SECRET`.
//!
//! ```bash
//! cargo run --package retweet-relay
//! ```

use anyhow::Result;
use relay_runtime::RelayRuntime;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let runtime = RelayRuntime::builder().build()?;
    info!(version = env!("CARGO_PKG_VERSION"), "Starting retweet relay");

    runtime.run().await?;
    Ok(())
}
