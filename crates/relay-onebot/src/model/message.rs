//! OneBot v11 Message type.
//!
//! [`OneBotMessage`] is an ordered list of segments with a builder API. It is
//! sent in string format: [`OneBotMessage::to_cq_string`] renders it once per
//! update and the same string is posted to every destination group.
//!
//! # Example
//!
//! ```rust,ignore
//! use relay_onebot::OneBotMessage;
//!
//! let msg = OneBotMessage::new()
//!     .text("New post!\n")
//!     .image("https://example.com/image.jpg");
//!
//! assert_eq!(
//!     msg.to_cq_string(),
//!     "New post!\n[CQ:image,file=https://example.com/image.jpg]"
//! );
//! ```

use super::segment::Segment;

/// A OneBot v11 message composed of multiple segments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OneBotMessage {
    segments: Vec<Segment>,
}

// ============================================================================
// Constructors and Builders
// ============================================================================

impl OneBotMessage {
    /// Creates a new empty message.
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Adds a text segment to the message.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.segments.push(Segment::text(text));
        self
    }

    /// Adds an image segment.
    pub fn image(mut self, file: impl Into<String>) -> Self {
        self.segments.push(Segment::image(file));
        self
    }

    /// Renders the message as a CQ-coded string.
    pub fn to_cq_string(&self) -> String {
        self.segments.iter().map(Segment::to_cq_code).collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_builder_keeps_segment_order() {
        let msg = OneBotMessage::new()
            .text("Hello")
            .image("a.jpg")
            .image("b.jpg");

        assert_eq!(
            msg.to_cq_string(),
            "Hello[CQ:image,file=a.jpg][CQ:image,file=b.jpg]"
        );
    }

    #[test]
    fn test_to_cq_string() {
        let msg = OneBotMessage::new()
            .text("[breaking] A & B\n")
            .image("https://img.example.com/1.jpg");
        assert_eq!(
            msg.to_cq_string(),
            "&#91;breaking&#93; A &amp; B\n[CQ:image,file=https://img.example.com/1.jpg]"
        );
    }

    #[test]
    fn test_empty_message_renders_empty_string() {
        assert_eq!(OneBotMessage::new().to_cq_string(), "");
    }

    #[test]
    fn test_empty_text_renders_nothing() {
        let msg = OneBotMessage::new().text("").image("x.png");
        assert_eq!(msg.to_cq_string(), "[CQ:image,file=x.png]");
    }
}
