use std::fmt;

/// A violation of the packet framing rules.
///
/// Protocol errors are fatal to the connection that produced them: the
/// buffered byte stream can no longer be trusted to be frame-aligned, so
/// the transport must close the connection. Local recovery (surviving the
/// connection) is reserved for registry misses and handler failures, which
/// are reported as exception replies instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// `total_length` exceeds the configured maximum frame size.
    FrameTooLarge { length: u32, max: u32 },

    /// `total_length` cannot even hold the fixed header fields.
    FrameTooShort { length: u32 },

    /// The API name length field is zero.
    EmptyApiName,

    /// The API name is longer than a u16 length field can describe. Raised
    /// on encode only.
    ApiNameTooLong { length: usize },

    /// The frame payload is longer than the u32 length field can describe.
    /// Raised on encode only.
    FrameOverflow { length: usize },

    /// The API name length field points past the end of the frame.
    ApiNameOverrun { name_len: usize, frame_len: usize },

    /// The API name bytes are not valid UTF-8.
    ApiNameNotUtf8,

    /// A boolean flag byte held something other than 0 or 1.
    InvalidFlag { value: u8 },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::FrameTooLarge { length, max } => {
                write!(f, "frame length {} exceeds maximum of {} bytes", length, max)
            }
            ProtocolError::FrameTooShort { length } => {
                write!(f, "frame length {} is too short for the fixed fields", length)
            }
            ProtocolError::EmptyApiName => write!(f, "API name must not be empty"),
            ProtocolError::ApiNameTooLong { length } => {
                write!(f, "API name of {} bytes does not fit the length field", length)
            }
            ProtocolError::FrameOverflow { length } => {
                write!(f, "frame of {} bytes does not fit the length field", length)
            }
            ProtocolError::ApiNameOverrun { name_len, frame_len } => {
                write!(
                    f,
                    "API name length {} overruns the {}-byte frame",
                    name_len, frame_len
                )
            }
            ProtocolError::ApiNameNotUtf8 => write!(f, "API name is not valid UTF-8"),
            ProtocolError::InvalidFlag { value } => {
                write!(f, "flag byte must be 0 or 1, got {}", value)
            }
        }
    }
}

impl std::error::Error for ProtocolError {}
