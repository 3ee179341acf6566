// Packet framing constants. All multi-byte integers on the wire are
// big-endian.

/// Size of the leading `total_length` field.
pub const PACKET_LENGTH_FIELD_SIZE: usize = 4;

/// Offset of the `api_name_len` field (u16).
pub const PACKET_NAME_LEN_OFFSET: usize = 4;

/// Size of the `api_name_len` field.
pub const PACKET_NAME_LEN_FIELD_SIZE: usize = 2;

/// Offset where the API name bytes begin.
pub const PACKET_NAME_OFFSET: usize = 6;

/// Bytes of the frame payload that are neither the API name nor the body:
/// the name length field (2), the packet id (4), and the two flag bytes.
/// `total_length` is always at least this large.
pub const PACKET_FIXED_FIELDS_SIZE: usize = 8;

/// Default upper bound for `total_length` before a frame is rejected as a
/// protocol violation.
pub const DEFAULT_MAX_FRAME_BYTES: u32 = 10 * 1024 * 1024;
