//! # OneBot v11 client for the retweet relay
//!
//! This crate is the relay's outbound side. It handles:
//!
//! - Message composition ([`OneBotMessage`], [`Segment`]) and CQ-code
//!   serialization
//! - Echo-matched API calls over a WebSocket connection ([`WsApiCaller`])
//! - The [`OneBotBot`] messenger (`send_group_msg`, readiness)
//! - Transport callbacks for the API connection ([`OneBotAdapter`])
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use relay_onebot::{OneBotAdapter, OneBotBot, OneBotConfig};
//! use relay_transport::ws_connect;
//!
//! let config = OneBotConfig::default();
//! let bot = Arc::new(OneBotBot::new(config.api_timeout()));
//! let adapter = Arc::new(OneBotAdapter::new(bot.clone()));
//! let handle = ws_connect(config.ws_config(), adapter).await?;
//! ```

mod adapter;
pub mod api_caller;
pub mod bot;
pub mod config;
pub mod model;

pub use adapter::OneBotAdapter;
pub use api_caller::WsApiCaller;
pub use bot::OneBotBot;
pub use config::OneBotConfig;
pub use model::{ImageData, OneBotMessage, Segment, TextData, escape_cq_text, escape_cq_value};
