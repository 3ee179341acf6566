use std::fmt;

use crate::serializer::SerializerError;

/// Failure of an API handler, reported back to the calling peer.
///
/// A handler may fail with a single message or, when it fans work out into
/// parallel sub-tasks, with several. The primary (first) message is what
/// goes on the wire as the exception reply; the full list is handed to the
/// endpoint's exception hook one entry at a time.
#[derive(Debug, Clone)]
pub struct ApiError {
    errors: Vec<String>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        ApiError {
            errors: vec![message.into()],
        }
    }

    /// Collects the errors of several failed sub-tasks into one failure.
    pub fn aggregate<I>(errors: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut errors: Vec<String> = errors.into_iter().collect();
        if errors.is_empty() {
            errors.push("API handler failed".to_string());
        }
        ApiError { errors }
    }

    /// The message used for the exception reply.
    pub fn primary(&self) -> &str {
        &self.errors[0]
    }

    /// Every inner error, primary first.
    pub fn all(&self) -> &[String] {
        &self.errors
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.len() {
            1 => write!(f, "{}", self.errors[0]),
            n => write!(f, "{} (+{} more)", self.errors[0], n - 1),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<SerializerError> for ApiError {
    fn from(err: SerializerError) -> Self {
        ApiError::new(err.to_string())
    }
}
