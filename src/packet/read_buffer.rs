/// Accumulation buffer for inbound transport bytes.
///
/// The transport appends chunks as they arrive; the codec reads header
/// fields at fixed offsets without consuming, and consumes a whole frame
/// only once every byte of it is buffered. All multi-byte reads are
/// big-endian, matching the wire format.
#[derive(Debug, Default)]
pub struct ReadBuffer {
    bytes: Vec<u8>,
}

impl ReadBuffer {
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Appends freshly received bytes to the tail of the buffer.
    pub fn append(&mut self, data: &[u8]) {
        self.bytes.extend_from_slice(data);
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Reads one byte at `offset`, or `None` if the buffer is too short.
    pub fn read_u8(&self, offset: usize) -> Option<u8> {
        self.bytes.get(offset).copied()
    }

    /// Reads a big-endian u16 at `offset`.
    pub fn read_u16(&self, offset: usize) -> Option<u16> {
        self.bytes
            .get(offset..offset + 2)
            .and_then(|b| b.try_into().ok())
            .map(u16::from_be_bytes)
    }

    /// Reads a big-endian u32 at `offset`.
    pub fn read_u32(&self, offset: usize) -> Option<u32> {
        self.bytes
            .get(offset..offset + 4)
            .and_then(|b| b.try_into().ok())
            .map(u32::from_be_bytes)
    }

    /// Borrows `n` bytes starting at `offset`, or `None` if the range runs
    /// past the buffered data.
    pub fn read_range(&self, offset: usize, n: usize) -> Option<&[u8]> {
        self.bytes.get(offset..offset + n)
    }

    /// Discards the first `n` buffered bytes. Called after a full frame has
    /// been decoded.
    pub fn consume(&mut self, n: usize) {
        self.bytes.drain(..n);
    }
}
