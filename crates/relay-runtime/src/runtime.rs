//! Runtime orchestration.
//!
//! [`RelayRuntime::run`] performs startup in a fixed order:
//!
//! 1. Build the routing table from the broadcast rules.
//! 2. Connect to the OneBot API; the bot becomes ready once attached.
//! 3. Connect to the event stream, whose frames are dispatched to the bot.
//!
//! It then waits for Ctrl+C or SIGTERM and closes both connections. Either
//! initial connection failing aborts startup; later disconnects are handled
//! by the transport's reconnect loop.
//!
//! ```rust,ignore
//! let runtime = RelayRuntime::builder()
//!     .config_file("deploy/relay.toml")
//!     .profile("production")
//!     .build()?;
//! runtime.run().await?;
//! ```

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use tokio::signal;
use tracing::{debug, info, warn};

use relay_core::ConnectionHandle;
use relay_onebot::{OneBotAdapter, OneBotBot};
use relay_retweet::{Dispatcher, RetweetRelay, RoutingTable};
use relay_transport::ws_connect;

use crate::config::{ConfigLoader, RelayConfig, validate_config};
use crate::error::RuntimeResult;
use crate::logging;

/// The relay process: configuration plus the connections it drives.
pub struct RelayRuntime {
    config: RelayConfig,
}

/// Live connections of a started runtime.
struct Connections {
    onebot: ConnectionHandle,
    stream: ConnectionHandle,
}

impl Connections {
    fn close(&self) {
        self.stream.close();
        self.onebot.close();
    }
}

impl RelayRuntime {
    /// Creates a runtime builder that searches the default locations.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from loaded configuration.
    ///
    /// Initializes logging, then validates the configuration.
    pub fn from_config(config: RelayConfig) -> RuntimeResult<Self> {
        logging::init_from_config(&config.logging);
        validate_config(&config)?;

        info!(
            plugin = %config.retweet.plugin_name(),
            module = %config.retweet.module,
            log_level = %config.logging.level,
            "Runtime initialized from configuration"
        );

        Ok(Self { config })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Runs until Ctrl+C or SIGTERM.
    pub async fn run(self) -> RuntimeResult<()> {
        let connections = self.start().await?;
        info!("Retweet relay is now running. Press Ctrl+C to stop.");

        let result = wait_for_shutdown().await;
        connections.close();
        info!("Retweet relay stopped");

        Ok(result?)
    }

    /// Runs until `shutdown` completes.
    pub async fn run_until<F>(self, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        let connections = self.start().await?;
        shutdown.await;
        connections.close();
        info!("Retweet relay stopped");
        Ok(())
    }

    async fn start(&self) -> RuntimeResult<Connections> {
        let retweet = &self.config.retweet;
        let plugin = retweet.plugin_name();

        let routes = Arc::new(RoutingTable::build(&retweet.broadcast));
        if routes.is_empty() {
            warn!(plugin = %plugin, "No broadcast routes configured, updates will be dropped");
        }
        for (account, channels) in routes.iter() {
            debug!(plugin = %plugin, account = %account, channels = ?channels, "Route");
        }
        info!(plugin = %plugin, accounts = routes.len(), "Routing table built");

        let bot = Arc::new(OneBotBot::new(self.config.onebot.api_timeout()));
        let adapter = Arc::new(OneBotAdapter::new(bot.clone()));
        let onebot = ws_connect(self.config.onebot.ws_config(), adapter).await?;

        let dispatcher = Dispatcher::new(&plugin, &retweet.image_root, routes, bot);
        let relay = Arc::new(RetweetRelay::new(&plugin, &retweet.module, dispatcher));
        let stream = match ws_connect(retweet.ws_config(), relay).await {
            Ok(handle) => handle,
            Err(e) => {
                onebot.close();
                return Err(e.into());
            }
        };

        Ok(Connections { onebot, stream })
    }
}

/// Waits for Ctrl+C or SIGTERM.
async fn wait_for_shutdown() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;

        tokio::select! {
            result = signal::ctrl_c() => {
                result?;
                info!("Received Ctrl+C, shutting down");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await?;
        info!("Received Ctrl+C, shutting down");
    }

    Ok(())
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for creating a [`RelayRuntime`] with custom configuration sources.
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: RelayConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Loads the configuration and builds the runtime.
    pub fn build(self) -> RuntimeResult<RelayRuntime> {
        let config = self.config_loader.load()?;
        RelayRuntime::from_config(config)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
