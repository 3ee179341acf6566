use crate::constants::{
    PACKET_FIXED_FIELDS_SIZE, PACKET_LENGTH_FIELD_SIZE, PACKET_NAME_LEN_OFFSET, PACKET_NAME_OFFSET,
};
use crate::packet::{Packet, ProtocolError, ReadBuffer};

/// A packet decoded out of a [`ReadBuffer`], along with the total number of
/// buffered bytes the frame occupied (length field included). The caller
/// consumes `frame_len` bytes to advance past it.
#[derive(Debug)]
pub struct DecodedPacket {
    pub packet: Packet,
    pub frame_len: usize,
}

/// Encoding and decoding of the packet framing.
///
/// The wire layout, offsets relative to the start of a frame:
///
/// ```text
/// offset  size  field
/// 0       4     total_length   (u32, counts the bytes that follow)
/// 4       2     api_name_len   (u16)
/// 6       N     api_name       (UTF-8)
/// 6+N     4     packet_id      (u32)
/// 10+N    1     is_from_client (0|1)
/// 11+N    1     is_exception   (0|1)
/// 12+N    rest  body           (total_length - 8 - N bytes)
/// ```
///
/// Integers are big-endian throughout.
pub struct PacketCodec;

impl PacketCodec {
    /// Encodes a packet into its framed byte form.
    ///
    /// Fails if the API name is empty, the name does not fit the u16 length
    /// field, or the frame as a whole does not fit the u32 length field;
    /// all are caught before any bytes reach the wire.
    pub fn encode(packet: &Packet) -> Result<Vec<u8>, ProtocolError> {
        let name = packet.api_name.as_bytes();
        if name.is_empty() {
            return Err(ProtocolError::EmptyApiName);
        }
        if name.len() > u16::MAX as usize {
            return Err(ProtocolError::ApiNameTooLong { length: name.len() });
        }

        let total_length = PACKET_FIXED_FIELDS_SIZE + name.len() + packet.body.len();
        if total_length > u32::MAX as usize {
            return Err(ProtocolError::FrameOverflow {
                length: total_length,
            });
        }

        let mut buf = Vec::with_capacity(PACKET_LENGTH_FIELD_SIZE + total_length);
        buf.extend(&(total_length as u32).to_be_bytes());
        buf.extend(&(name.len() as u16).to_be_bytes());
        buf.extend_from_slice(name);
        buf.extend(&packet.packet_id.to_be_bytes());
        buf.push(packet.is_from_client as u8);
        buf.push(packet.is_exception as u8);
        buf.extend_from_slice(&packet.body);

        Ok(buf)
    }

    /// Attempts to decode one packet from the front of `buf`.
    ///
    /// Returns `Ok(None)` when the buffer does not yet hold a complete
    /// frame ("need more"), and a [`ProtocolError`] when the buffered bytes
    /// violate the framing rules. A protocol error means the stream is no
    /// longer frame-aligned and the connection must be torn down.
    ///
    /// The buffer is not consumed here; the caller drops `frame_len` bytes
    /// once it has taken ownership of the packet.
    pub fn decode(
        buf: &ReadBuffer,
        max_frame_bytes: u32,
    ) -> Result<Option<DecodedPacket>, ProtocolError> {
        let Some(total_length) = buf.read_u32(0) else {
            return Ok(None);
        };
        if total_length > max_frame_bytes {
            return Err(ProtocolError::FrameTooLarge {
                length: total_length,
                max: max_frame_bytes,
            });
        }
        if (total_length as usize) < PACKET_FIXED_FIELDS_SIZE {
            return Err(ProtocolError::FrameTooShort {
                length: total_length,
            });
        }

        let frame_len = PACKET_LENGTH_FIELD_SIZE + total_length as usize;
        if buf.len() < frame_len {
            return Ok(None);
        }

        // The whole frame is buffered from here on, so the remaining reads
        // cannot run short; a `None` still maps to "need more" rather than
        // a panic path.
        let Some(name_len) = buf.read_u16(PACKET_NAME_LEN_OFFSET) else {
            return Ok(None);
        };
        let name_len = name_len as usize;
        if name_len == 0 {
            return Err(ProtocolError::EmptyApiName);
        }
        if name_len > total_length as usize - PACKET_FIXED_FIELDS_SIZE {
            return Err(ProtocolError::ApiNameOverrun {
                name_len,
                frame_len: total_length as usize,
            });
        }

        let Some(name_bytes) = buf.read_range(PACKET_NAME_OFFSET, name_len) else {
            return Ok(None);
        };
        let api_name = std::str::from_utf8(name_bytes)
            .map_err(|_| ProtocolError::ApiNameNotUtf8)?
            .to_owned();

        let id_offset = PACKET_NAME_OFFSET + name_len;
        let Some(packet_id) = buf.read_u32(id_offset) else {
            return Ok(None);
        };
        let Some(from_client_byte) = buf.read_u8(id_offset + 4) else {
            return Ok(None);
        };
        let Some(exception_byte) = buf.read_u8(id_offset + 5) else {
            return Ok(None);
        };
        let is_from_client = flag_from_byte(from_client_byte)?;
        let is_exception = flag_from_byte(exception_byte)?;

        let body_len = total_length as usize - PACKET_FIXED_FIELDS_SIZE - name_len;
        let body = match buf.read_range(id_offset + 6, body_len) {
            Some(bytes) => bytes.to_vec(),
            None => return Ok(None),
        };

        Ok(Some(DecodedPacket {
            packet: Packet {
                api_name,
                packet_id,
                is_from_client,
                is_exception,
                body,
            },
            frame_len,
        }))
    }
}

fn flag_from_byte(value: u8) -> Result<bool, ProtocolError> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(ProtocolError::InvalidFlag { value: other }),
    }
}
