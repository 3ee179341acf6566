use std::fmt;

use tandem::packet::ProtocolError;
use tandem_rpc_service::SerializerError;

/// How an invocation can fail from the caller's perspective.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    /// The endpoint is not connected; nothing was sent.
    Disconnected,

    /// The packet id of this call was already parked. The id source makes
    /// this unreachable in normal operation; seeing it means a programming
    /// error in id handling.
    DuplicateId { packet_id: u32 },

    /// The request packet could not be framed (e.g. an empty API name).
    Protocol(ProtocolError),

    /// Arguments failed to encode, or the reply body failed to decode.
    Serializer(SerializerError),

    /// The peer answered with an exception reply carrying this message.
    Remote(String),

    /// No reply arrived before the per-call deadline.
    TimedOut,

    /// The connection went down while the call was pending.
    Shutdown,
}

impl fmt::Display for InvokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvokeError::Disconnected => write!(f, "endpoint is not connected"),
            InvokeError::DuplicateId { packet_id } => {
                write!(f, "packet id {} already has a pending call", packet_id)
            }
            InvokeError::Protocol(err) => write!(f, "could not frame the request: {}", err),
            InvokeError::Serializer(err) => write!(f, "{}", err),
            InvokeError::Remote(message) => write!(f, "remote exception: {}", message),
            InvokeError::TimedOut => write!(f, "call deadline elapsed"),
            InvokeError::Shutdown => {
                write!(f, "connection was shut down while the call was pending")
            }
        }
    }
}

impl std::error::Error for InvokeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InvokeError::Protocol(err) => Some(err),
            InvokeError::Serializer(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProtocolError> for InvokeError {
    fn from(err: ProtocolError) -> Self {
        InvokeError::Protocol(err)
    }
}

impl From<SerializerError> for InvokeError {
    fn from(err: SerializerError) -> Self {
        InvokeError::Serializer(err)
    }
}

/// Errors raised while serving the peer, reported to the exception hook
/// and, when unhandled, to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointError {
    /// The inbound byte stream violated the framing rules. Fatal: the
    /// transport closes the connection.
    Protocol(ProtocolError),

    /// The peer requested an API name that is not registered here. The
    /// connection survives; the peer gets an exception reply.
    ApiNotFound { api_name: String },

    /// A registered handler failed. The connection survives; the peer gets
    /// an exception reply carrying the primary message.
    ApiExecution { api_name: String, message: String },
}

impl fmt::Display for EndpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointError::Protocol(err) => write!(f, "protocol violation: {}", err),
            EndpointError::ApiNotFound { api_name } => {
                write!(f, "API '{}' not found", api_name)
            }
            EndpointError::ApiExecution { api_name, message } => {
                write!(f, "API '{}' failed: {}", api_name, message)
            }
        }
    }
}

impl std::error::Error for EndpointError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EndpointError::Protocol(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProtocolError> for EndpointError {
    fn from(err: ProtocolError) -> Self {
        EndpointError::Protocol(err)
    }
}
