use crate::constants::DEFAULT_MAX_FRAME_BYTES;
use crate::packet::{DecodedPacket, Packet, PacketCodec, ProtocolError, ReadBuffer};

/// Incremental packet decoder for one connection's inbound byte stream.
///
/// The transport feeds whatever chunk sizes it happens to receive via
/// [`append`](Self::append); frame boundaries and chunk boundaries are
/// unrelated. [`next_packet`](Self::next_packet) then yields buffered
/// packets one at a time, in arrival order, until the remaining bytes no
/// longer form a complete frame.
///
/// A [`ProtocolError`] from `next_packet` is terminal: the buffer contents
/// past the malformed frame cannot be realigned, and the caller is expected
/// to drop the connection.
#[derive(Debug)]
pub struct PacketStreamDecoder {
    buffer: ReadBuffer,
    max_frame_bytes: u32,
}

impl Default for PacketStreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketStreamDecoder {
    pub fn new() -> Self {
        Self::with_max_frame_bytes(DEFAULT_MAX_FRAME_BYTES)
    }

    pub fn with_max_frame_bytes(max_frame_bytes: u32) -> Self {
        Self {
            buffer: ReadBuffer::new(),
            max_frame_bytes,
        }
    }

    /// Appends freshly received transport bytes.
    pub fn append(&mut self, bytes: &[u8]) {
        self.buffer.append(bytes);
    }

    /// Number of bytes buffered but not yet consumed as packets.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Decodes and consumes the next complete packet, if one is buffered.
    pub fn next_packet(&mut self) -> Result<Option<Packet>, ProtocolError> {
        match PacketCodec::decode(&self.buffer, self.max_frame_bytes)? {
            Some(DecodedPacket { packet, frame_len }) => {
                self.buffer.consume(frame_len);
                tracing::trace!(
                    api_name = %packet.api_name,
                    packet_id = packet.packet_id,
                    body_len = packet.body.len(),
                    "decoded packet"
                );
                Ok(Some(packet))
            }
            None => Ok(None),
        }
    }
}
