//! Channel message encoding.
//!
//! The registry stores message content as opaque bytes. Clients agree on
//! this layout so that any reader can recover what was posted:
//!
//! ```text
//! ┌────────────┬──────────────────────────────────────────┐
//! │ scheme tag │ transform( kind tag ‖ utf-8 text bytes ) │
//! └────────────┴──────────────────────────────────────────┘
//!      1 byte              1 + n bytes
//! ```
//!
//! The scheme tag is never transformed, so a reader can always tell which
//! inverse to apply. The kind tag rides inside the transformed payload.

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// XOR key used by [`MessageCodec::default`].
pub const DEFAULT_XOR_KEY: u8 = 0x5a;

/// How the payload bytes are transformed before storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scheme {
    /// Payload stored as-is.
    #[default]
    Raw,
    /// Every payload byte XORed with the codec's key byte.
    Xor,
}

impl Scheme {
    /// The on-wire tag byte for this scheme.
    pub fn tag(self) -> u8 {
        match self {
            Self::Raw => 0x00,
            Self::Xor => 0x01,
        }
    }

    /// Parses a tag byte.
    pub fn from_tag(tag: u8) -> Result<Self, ProtocolError> {
        match tag {
            0x00 => Ok(Self::Raw),
            0x01 => Ok(Self::Xor),
            other => Err(ProtocolError::UnknownScheme(other)),
        }
    }
}

/// What a message's text represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Plain chat text.
    #[default]
    Text,
    /// A reference to an image (URL or content hash).
    Image,
    /// A link to share.
    Link,
}

impl MessageKind {
    fn tag(self) -> u8 {
        match self {
            Self::Text => 0x00,
            Self::Image => 0x01,
            Self::Link => 0x02,
        }
    }

    fn from_tag(tag: u8) -> Result<Self, ProtocolError> {
        match tag {
            0x00 => Ok(Self::Text),
            0x01 => Ok(Self::Image),
            0x02 => Ok(Self::Link),
            other => Err(ProtocolError::UnknownKind(other)),
        }
    }
}

/// A decoded channel message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl ChannelMessage {
    /// Shorthand for a [`MessageKind::Text`] message.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Text,
            text: text.into(),
        }
    }
}

/// Encodes and decodes channel content.
///
/// ## Example
///
/// ```rust
/// use clubhouse_protocol::{ChannelMessage, MessageCodec, Scheme};
///
/// let codec = MessageCodec::default();
/// let msg = ChannelMessage::text("gm");
///
/// let bytes = codec.encode(&msg, Scheme::Xor);
/// assert_eq!(bytes[0], Scheme::Xor.tag());
/// assert_eq!(codec.decode(&bytes).unwrap(), msg);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageCodec {
    key: u8,
}

impl Default for MessageCodec {
    fn default() -> Self {
        Self::with_key(DEFAULT_XOR_KEY)
    }
}

impl MessageCodec {
    /// Creates a codec whose [`Scheme::Xor`] uses `key`.
    pub fn with_key(key: u8) -> Self {
        Self { key }
    }

    /// Encodes `msg` under `scheme`.
    pub fn encode(&self, msg: &ChannelMessage, scheme: Scheme) -> Vec<u8> {
        let mut out = Vec::with_capacity(msg.text.len() + 2);
        out.push(scheme.tag());
        out.push(msg.kind.tag());
        out.extend_from_slice(msg.text.as_bytes());
        self.transform(scheme, &mut out[1..]);
        out
    }

    /// Decodes bytes produced by [`encode`](Self::encode).
    ///
    /// # Errors
    /// - [`ProtocolError::Truncated`]: fewer than two bytes
    /// - [`ProtocolError::UnknownScheme`] / [`ProtocolError::UnknownKind`]
    /// - [`ProtocolError::InvalidUtf8`]: the text is not valid UTF-8
    pub fn decode(&self, data: &[u8]) -> Result<ChannelMessage, ProtocolError> {
        let (&tag, rest) = data.split_first().ok_or(ProtocolError::Truncated)?;
        let scheme = Scheme::from_tag(tag)?;
        if rest.is_empty() {
            return Err(ProtocolError::Truncated);
        }

        let mut payload = rest.to_vec();
        self.transform(scheme, &mut payload);

        let kind = MessageKind::from_tag(payload[0])?;
        payload.remove(0);
        let text = String::from_utf8(payload).map_err(ProtocolError::InvalidUtf8)?;
        Ok(ChannelMessage { kind, text })
    }

    // XOR is its own inverse, so encode and decode share this.
    fn transform(&self, scheme: Scheme, bytes: &mut [u8]) {
        match scheme {
            Scheme::Raw => {}
            Scheme::Xor => bytes.iter_mut().for_each(|b| *b ^= self.key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<ChannelMessage> {
        vec![
            ChannelMessage::text(""),
            ChannelMessage::text("hello club"),
            ChannelMessage::text("ünïcødé ✓ 漢字"),
            ChannelMessage {
                kind: MessageKind::Image,
                text: "ipfs://bafy...".into(),
            },
            ChannelMessage {
                kind: MessageKind::Link,
                text: "https://example.org".into(),
            },
        ]
    }

    #[test]
    fn test_round_trip_every_scheme() {
        let codec = MessageCodec::default();
        for scheme in [Scheme::Raw, Scheme::Xor] {
            for msg in samples() {
                let bytes = codec.encode(&msg, scheme);
                assert_eq!(codec.decode(&bytes).unwrap(), msg, "{scheme:?}");
            }
        }
    }

    #[test]
    fn test_encode_raw_keeps_text_bytes() {
        let bytes = MessageCodec::default().encode(&ChannelMessage::text("hi"), Scheme::Raw);
        assert_eq!(bytes, vec![0x00, 0x00, b'h', b'i']);
    }

    #[test]
    fn test_encode_xor_obfuscates_payload_not_tag() {
        let codec = MessageCodec::with_key(0xff);
        let bytes = codec.encode(&ChannelMessage::text("hi"), Scheme::Xor);
        assert_eq!(bytes, vec![0x01, 0xff, !b'h', !b'i']);
    }

    #[test]
    fn test_decode_with_different_key_does_not_recover_message() {
        let msg = ChannelMessage::text("secret");
        let bytes = MessageCodec::with_key(0x11).encode(&msg, Scheme::Xor);
        let decoded = MessageCodec::with_key(0x22).decode(&bytes);
        assert!(decoded.map(|m| m != msg).unwrap_or(true));
    }

    #[test]
    fn test_decode_unknown_scheme_returns_error() {
        let result = MessageCodec::default().decode(&[0x7f, 0x00, b'x']);
        assert!(matches!(result, Err(ProtocolError::UnknownScheme(0x7f))));
    }

    #[test]
    fn test_decode_unknown_kind_returns_error() {
        let result = MessageCodec::default().decode(&[0x00, 0x09, b'x']);
        assert!(matches!(result, Err(ProtocolError::UnknownKind(0x09))));
    }

    #[test]
    fn test_decode_empty_and_header_only_are_truncated() {
        let codec = MessageCodec::default();
        assert!(matches!(codec.decode(&[]), Err(ProtocolError::Truncated)));
        assert!(matches!(codec.decode(&[0x00]), Err(ProtocolError::Truncated)));
    }

    #[test]
    fn test_decode_invalid_utf8_returns_error() {
        let result = MessageCodec::default().decode(&[0x00, 0x00, 0xc3, 0x28]);
        let err = result.unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidUtf8(_)));
        assert!(err.is_message_decoding());
    }
}
