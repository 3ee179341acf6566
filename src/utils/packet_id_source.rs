use std::sync::atomic::{AtomicU32, Ordering};

/// Connection-scoped allocator of packet ids.
///
/// Ids are handed out sequentially starting at 1 and wrap modulo 2^32.
/// Id 0 is reserved to mean "no id" and is skipped on wrap-around. Safe to
/// share between threads; concurrent callers always observe distinct ids.
#[derive(Debug)]
pub struct PacketIdSource(AtomicU32);

impl Default for PacketIdSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketIdSource {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Starts the sequence at an arbitrary value. The first `next` call
    /// returns `first` (or 1 if `first` is 0).
    pub fn starting_at(first: u32) -> Self {
        PacketIdSource(AtomicU32::new(first))
    }

    /// Returns the next packet id, skipping 0 on wrap.
    pub fn next(&self) -> u32 {
        loop {
            let id = self.0.fetch_add(1, Ordering::Relaxed);
            if id != 0 {
                return id;
            }
        }
    }
}
