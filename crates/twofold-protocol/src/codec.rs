//! Codec trait and implementations for serializing wire events.
//!
//! The protocol layer doesn't care how events become bytes — anything
//! implementing [`Codec`] will do. [`JsonCodec`] is the default (and what
//! browser clients speak); a binary codec could be slotted in without
//! touching the layers above.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Converts values to and from bytes.
///
/// `Send + Sync + 'static` because the codec is shared across Tokio
/// tasks for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`. Human-readable, so messages can
/// be inspected in browser devtools and test logs.
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::ClientEvent;

    #[test]
    fn test_json_codec_round_trip() {
        let codec = JsonCodec;
        let event = ClientEvent::Join {
            username: "ada".into(),
            room: "r1".into(),
        };
        let bytes = codec.encode(&event).unwrap();
        let decoded: ClientEvent = codec.decode(&bytes).unwrap();
        assert_eq!(event, decoded);
    }

    #[test]
    fn test_json_codec_decode_garbage_errors() {
        let codec = JsonCodec;
        let result: Result<ClientEvent, _> = codec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_json_codec_decode_wrong_shape_errors() {
        let codec = JsonCodec;
        let result: Result<ClientEvent, _> = codec.decode(br#"{"name": "hello"}"#);
        assert!(result.is_err());
    }
}
