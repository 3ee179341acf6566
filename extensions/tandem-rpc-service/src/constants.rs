use std::time::Duration;

/// Default per-call deadline for invocations that expect a reply.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_millis(30_000);

/// The pending-call table is swept for expired deadlines at
/// `call_timeout / TIMEOUT_SWEEP_DIVISOR`, so a timed-out call is resolved
/// within a tenth of its deadline past expiry.
pub const TIMEOUT_SWEEP_DIVISOR: u32 = 10;
