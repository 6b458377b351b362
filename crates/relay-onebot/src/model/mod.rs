//! OneBot v11 data model.

pub mod message;
pub mod segment;

pub use message::OneBotMessage;
pub use segment::{ImageData, Segment, TextData, escape_cq_text, escape_cq_value};
