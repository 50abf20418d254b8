//! Error types for the protocol layer.
//!
//! Each crate in Clubhouse defines its own error enum. A `ProtocolError`
//! always means bytes could not be turned into a value (or back): a bad
//! JSON request, or channel content with an unknown tag.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization of a request, reply or event failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, missing fields, or an
    /// unknown operation name.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The leading scheme byte of an encoded message is not one we know.
    #[error("unknown message scheme tag 0x{0:02x}")]
    UnknownScheme(u8),

    /// The message kind byte (after the scheme transform) is not one we know.
    #[error("unknown message kind tag 0x{0:02x}")]
    UnknownKind(u8),

    /// The encoded message is too short to carry its header.
    #[error("encoded message is truncated")]
    Truncated,

    /// The decoded payload is not valid UTF-8 text.
    #[error("message payload is not valid utf-8: {0}")]
    InvalidUtf8(#[source] std::string::FromUtf8Error),

    /// The input is well-formed but violates a protocol rule, e.g. a
    /// threshold kind that requires a token contract without one.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

impl ProtocolError {
    /// Returns `true` for failures that come from decoding channel content.
    pub fn is_message_decoding(&self) -> bool {
        matches!(
            self,
            Self::UnknownScheme(_)
                | Self::UnknownKind(_)
                | Self::Truncated
                | Self::InvalidUtf8(_)
        )
    }
}
