use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Pluggable codec for packet bodies.
///
/// Requests carry the encoding of the ordered argument tuple, replies the
/// encoding of the single return value. Any implementation is acceptable as
/// long as both peers of a connection agree on it; the default is
/// [`JsonSerializer`](crate::JsonSerializer).
pub trait Serializer: Send + Sync + 'static {
    fn encode<T>(&self, value: &T) -> Result<Vec<u8>, SerializerError>
    where
        T: Serialize + ?Sized;

    fn decode<T>(&self, bytes: &[u8]) -> Result<T, SerializerError>
    where
        T: DeserializeOwned;
}

/// A body failed to encode or decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerializerError {
    Encode(String),
    Decode(String),
}

impl fmt::Display for SerializerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializerError::Encode(detail) => write!(f, "failed to encode body: {}", detail),
            SerializerError::Decode(detail) => write!(f, "failed to decode body: {}", detail),
        }
    }
}

impl std::error::Error for SerializerError {}
