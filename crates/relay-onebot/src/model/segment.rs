//! OneBot v11 Message Segment types.
//!
//! A message segment is a single unit of content in a message. The relay
//! only composes plain text and images, so only those two segment types are
//! modelled.
//!
//! # CQ Code Mapping
//!
//! - `text` → plain text (escaped, no CQ code)
//! - `image` → `[CQ:image,file=xxx]`
//!
//! # Example
//!
//! ```rust,ignore
//! use relay_onebot::Segment;
//!
//! let text = Segment::text("Hello, ");
//! let image = Segment::image("https://example.com/a.jpg");
//! ```

// ============================================================================
// Segment Enum
// ============================================================================

/// A OneBot v11 message segment.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Plain text content.
    Text(TextData),
    /// Image.
    Image(ImageData),
}

impl Segment {
    /// Creates a plain text segment.
    pub fn text(text: impl Into<String>) -> Self {
        Segment::Text(TextData { text: text.into() })
    }

    /// Creates an image segment from a file path or URL.
    pub fn image(file: impl Into<String>) -> Self {
        Segment::Image(ImageData { file: file.into() })
    }
}

// ============================================================================
// Segment Data Types
// ============================================================================

/// Plain text segment data.
#[derive(Debug, Clone, PartialEq)]
pub struct TextData {
    /// The text content.
    pub text: String,
}

/// Image segment data.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    /// Image file name, path or URL.
    pub file: String,
}

// ============================================================================
// CQ Code Conversion
// ============================================================================

impl Segment {
    /// Converts this segment to a CQ code string.
    ///
    /// Text segments are returned as plain text (with escaping).
    /// Images are formatted as `[CQ:image,file=...]`.
    pub fn to_cq_code(&self) -> String {
        match self {
            Segment::Text(data) => escape_cq_text(&data.text),
            Segment::Image(data) => format!("[CQ:image,file={}]", escape_cq_value(&data.file)),
        }
    }
}

// ============================================================================
// CQ Code Escaping Utilities
// ============================================================================

/// Escapes special characters in plain text for CQ code format.
///
/// Escapes: `&` → `&amp;`, `[` → `&#91;`, `]` → `&#93;`
pub fn escape_cq_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('[', "&#91;")
        .replace(']', "&#93;")
}

/// Escapes special characters in CQ code parameter values.
///
/// Escapes: `&` → `&amp;`, `[` → `&#91;`, `]` → `&#93;`, `,` → `&#44;`
pub fn escape_cq_value(value: &str) -> String {
    escape_cq_text(value).replace(',', "&#44;")
}

// ============================================================================
// Tests
// ============================================================================
