use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Mutex;
use std::time::Instant;

use tokio::sync::oneshot;

use crate::error::InvokeError;

/// Terminal state of a pending call. Exactly one of these is ever written
/// to a call's completion slot; whichever writer gets there first wins and
/// every later delivery for the same packet id is dropped silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    /// The peer replied with an encoded result value. Decoding into the
    /// declared return type is the invoking side's job, which knows the
    /// type statically.
    Value(Vec<u8>),

    /// The peer replied with an exception message.
    RemoteError(String),

    /// The deadline elapsed before any reply arrived.
    TimedOut,

    /// The connection went down with the call still outstanding.
    Shutdown,
}

/// One outstanding outgoing invocation, removed from the table at the
/// moment it is handed to whoever resolves it.
#[derive(Debug)]
pub struct PendingCall {
    packet_id: u32,
    issued_at: Instant,
    deadline: Instant,
    completion: oneshot::Sender<CallOutcome>,
}

impl PendingCall {
    pub fn packet_id(&self) -> u32 {
        self.packet_id
    }

    pub fn issued_at(&self) -> Instant {
        self.issued_at
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Writes the terminal outcome. Consumes the slot, so a second write
    /// for the same call is unrepresentable; if the caller already gave up
    /// on the receiver, the outcome is dropped silently.
    pub fn resolve(self, outcome: CallOutcome) {
        let _ = self.completion.send(outcome);
    }
}

/// The table of calls this endpoint has sent and not yet seen resolved.
///
/// Safe under concurrent parking, completion, expiry sweeps, and shutdown:
/// every path removes the slot under the lock before resolving it outside
/// the lock, so each call observes exactly one outcome.
#[derive(Debug, Default)]
pub struct PendingCallTable {
    slots: Mutex<HashMap<u32, PendingCall>>,
}

impl PendingCallTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a slot for `packet_id` and returns the receiver its outcome
    /// will arrive on. Fails with [`InvokeError::DuplicateId`] if the id is
    /// already parked.
    pub fn park(
        &self,
        packet_id: u32,
        deadline: Instant,
    ) -> Result<oneshot::Receiver<CallOutcome>, InvokeError> {
        let mut slots = self.lock();
        match slots.entry(packet_id) {
            Entry::Occupied(_) => Err(InvokeError::DuplicateId { packet_id }),
            Entry::Vacant(vacant) => {
                let (tx, rx) = oneshot::channel();
                vacant.insert(PendingCall {
                    packet_id,
                    issued_at: Instant::now(),
                    deadline,
                    completion: tx,
                });
                Ok(rx)
            }
        }
    }

    /// Resolves `packet_id` with a value reply. Returns false when no such
    /// call is pending (late or duplicate reply), in which case nothing
    /// happens.
    pub fn complete_value(&self, packet_id: u32, body: Vec<u8>) -> bool {
        match self.take(packet_id) {
            Some(call) => {
                call.resolve(CallOutcome::Value(body));
                true
            }
            None => false,
        }
    }

    /// Resolves `packet_id` with a remote exception message. Returns false
    /// when no such call is pending.
    pub fn complete_remote_error(&self, packet_id: u32, message: String) -> bool {
        match self.take(packet_id) {
            Some(call) => {
                call.resolve(CallOutcome::RemoteError(message));
                true
            }
            None => false,
        }
    }

    /// Removes a slot without resolving it. Used when sending the request
    /// fails right after parking, before the peer could have seen it.
    pub fn discard(&self, packet_id: u32) {
        let _ = self.take(packet_id);
    }

    /// Atomically removes and returns every pending call, leaving the table
    /// empty. The caller resolves each one, normally with
    /// [`CallOutcome::Shutdown`].
    pub fn take_all(&self) -> Vec<PendingCall> {
        self.lock().drain().map(|(_, call)| call).collect()
    }

    /// Removes and returns every call whose deadline is at or before `now`.
    pub fn take_expired(&self, now: Instant) -> Vec<PendingCall> {
        let mut slots = self.lock();
        let expired: Vec<u32> = slots
            .iter()
            .filter(|(_, call)| call.deadline <= now)
            .map(|(id, _)| *id)
            .collect();
        expired
            .into_iter()
            .filter_map(|id| slots.remove(&id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn take(&self, packet_id: u32) -> Option<PendingCall> {
        self.lock().remove(&packet_id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<u32, PendingCall>> {
        self.slots.lock().expect("pending-call table mutex poisoned")
    }
}
