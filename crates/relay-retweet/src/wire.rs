//! Wire format of the event stream.
//!
//! Every frame is a protobuf [`Envelope`]. `SYSTEM` envelopes carry a plain
//! status text; `NON_SYSTEM` envelopes carry a JSON [`UpdateMessage`] for the
//! module named in `proto_module`.

use prost::Message as ProstMessage;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Envelope discriminator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum ProtoType {
    System = 0,
    NonSystem = 1,
}

/// Framed event as received from the stream.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Envelope {
    #[prost(enumeration = "ProtoType", tag = "1")]
    pub proto_type: i32,
    #[prost(string, tag = "2")]
    pub proto_module: String,
    #[prost(bytes = "vec", tag = "3")]
    pub proto_payload: Vec<u8>,
}

/// Kind of update, mapped from the payload's `cmd` field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CommandKind {
    /// `cmd = "1"`: new post with text and images.
    Content,
    /// `cmd = "2"`: avatar change.
    Avatar,
    /// Anything else.
    #[default]
    Unknown,
}

impl From<String> for CommandKind {
    fn from(cmd: String) -> Self {
        match cmd.as_str() {
            "1" => Self::Content,
            "2" => Self::Avatar,
            _ => Self::Unknown,
        }
    }
}

impl From<CommandKind> for String {
    fn from(kind: CommandKind) -> Self {
        match kind {
            CommandKind::Content => "1",
            CommandKind::Avatar => "2",
            CommandKind::Unknown => "",
        }
        .to_string()
    }
}

/// JSON payload of a `NON_SYSTEM` envelope.
///
/// Missing and `null` fields both decode to their empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateMessage {
    #[serde(rename = "cmd", deserialize_with = "null_as_default")]
    pub kind: CommandKind,
    #[serde(deserialize_with = "null_as_default")]
    pub from_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub from_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub imgs: Vec<String>,
    /// Avatar reference; empty when absent.
    #[serde(deserialize_with = "null_as_default")]
    pub avatar: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl UpdateMessage {
    /// Returns the avatar reference, if any.
    pub fn avatar(&self) -> Option<&str> {
        Some(self.avatar.as_str()).filter(|a| !a.is_empty())
    }
}

/// Errors raised while decoding a frame.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed envelope: {0}")]
    Envelope(#[from] prost::DecodeError),

    #[error("malformed update payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Decoded frame, ready for the relay to act on.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Status text from the stream itself.
    System(String),
    /// Update addressed to another module.
    Foreign,
    /// Discriminator outside the known set.
    Ignored(i32),
    /// Update for this relay's module.
    Update(UpdateMessage),
}

/// Decodes a raw frame for the given module.
pub fn decode_frame(raw: &[u8], module: &str) -> Result<Frame, DecodeError> {
    let envelope = Envelope::decode(raw)?;

    match ProtoType::try_from(envelope.proto_type) {
        Ok(ProtoType::System) => Ok(Frame::System(
            String::from_utf8_lossy(&envelope.proto_payload).into_owned(),
        )),
        Ok(ProtoType::NonSystem) if envelope.proto_module != module => Ok(Frame::Foreign),
        Ok(ProtoType::NonSystem) => Ok(Frame::Update(serde_json::from_slice(
            &envelope.proto_payload,
        )?)),
        Err(_) => Ok(Frame::Ignored(envelope.proto_type)),
    }
}
