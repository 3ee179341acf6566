use std::time::Duration;

use tandem::constants::DEFAULT_MAX_FRAME_BYTES;
use tandem_rpc_service::constants::{DEFAULT_CALL_TIMEOUT, TIMEOUT_SWEEP_DIVISOR};

/// Tunables of one endpoint. The serializer is chosen separately, on the
/// endpoint builder, because it changes the endpoint's type.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Deadline applied to every invocation that expects a reply.
    pub call_timeout: Duration,

    /// Upper bound on an inbound frame's `total_length` before the
    /// connection is torn down with a protocol error.
    pub max_frame_bytes: u32,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            call_timeout: DEFAULT_CALL_TIMEOUT,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

impl EndpointConfig {
    /// How often the pending-call table is swept for expired deadlines.
    pub fn sweep_interval(&self) -> Duration {
        (self.call_timeout / TIMEOUT_SWEEP_DIVISOR).max(Duration::from_millis(1))
    }
}
