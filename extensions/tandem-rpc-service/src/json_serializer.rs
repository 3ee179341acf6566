use serde::Serialize;
use serde::de::{Deserialize, DeserializeOwned};
use serde_json::Value;

use crate::field_match::FieldMatchDeserializer;
use crate::serializer::{Serializer, SerializerError};

/// The default body codec: UTF-8 JSON.
///
/// Argument tuples encode as JSON arrays, return values as plain JSON
/// values. Decoding tolerates a case-insensitive match of struct member
/// names: when a strict pass fails, decoding is retried through an adapter
/// that re-matches unrecognized member names against the target struct's
/// declared fields, ignoring ASCII case. The tolerance applies only where
/// a struct shape is expected; exact names always win, and the keys of
/// dictionary-shaped data (map targets, pass-through `Value`s) are never
/// rewritten.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn encode<T>(&self, value: &T) -> Result<Vec<u8>, SerializerError>
    where
        T: Serialize + ?Sized,
    {
        serde_json::to_vec(value).map_err(|e| SerializerError::Encode(e.to_string()))
    }

    fn decode<T>(&self, bytes: &[u8]) -> Result<T, SerializerError>
    where
        T: DeserializeOwned,
    {
        let strict_error = match serde_json::from_slice(bytes) {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        // Retry with tolerant member matching; report the strict error if
        // the retry fails too, since that is the one describing the real
        // shape mismatch.
        let value = serde_json::from_slice::<Value>(bytes)
            .map_err(|_| SerializerError::Decode(strict_error.to_string()))?;
        T::deserialize(FieldMatchDeserializer::new(value))
            .map_err(|_| SerializerError::Decode(strict_error.to_string()))
    }
}
