/// The atomic wire unit of a tandem connection.
///
/// A packet is either a request for a named API on the remote peer, or the
/// reply (value or exception) to a request the local peer issued earlier.
/// Requests and replies are correlated through `packet_id` together with
/// `is_from_client`: a reply always echoes both fields of its request
/// verbatim, so each side recognizes its own replies on a fully symmetric
/// connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Name of the API being invoked. Non-empty, at most 65535 bytes of
    /// UTF-8. Replies echo the request's name.
    pub api_name: String,

    /// Connection-scoped identifier correlating a reply to its request.
    pub packet_id: u32,

    /// Direction flag set by the originator of a request and echoed by the
    /// reply. `(packet_id, is_from_client)` is unique among the calls
    /// outstanding on one side of the connection.
    pub is_from_client: bool,

    /// When set, `body` holds the UTF-8 text of an error message instead of
    /// an encoded result value.
    pub is_exception: bool,

    /// Raw body bytes. Interpretation belongs to the serializer layer: an
    /// encoded argument vector for requests, an encoded return value for
    /// replies, or an error message for exception replies.
    pub body: Vec<u8>,
}

impl Packet {
    /// Builds a request packet. The originator stamps its own role into
    /// `is_from_client`.
    pub fn request(
        api_name: impl Into<String>,
        packet_id: u32,
        is_from_client: bool,
        body: Vec<u8>,
    ) -> Packet {
        Packet {
            api_name: api_name.into(),
            packet_id,
            is_from_client,
            is_exception: false,
            body,
        }
    }

    /// Builds a value reply to `request`, echoing its id and direction flag.
    pub fn reply_to(request: &Packet, body: Vec<u8>) -> Packet {
        Packet {
            api_name: request.api_name.clone(),
            packet_id: request.packet_id,
            is_from_client: request.is_from_client,
            is_exception: false,
            body,
        }
    }

    /// Builds an exception reply to `request`. The body carries the raw
    /// UTF-8 bytes of `message`.
    pub fn exception_reply_to(request: &Packet, message: &str) -> Packet {
        Packet {
            api_name: request.api_name.clone(),
            packet_id: request.packet_id,
            is_from_client: request.is_from_client,
            is_exception: true,
            body: message.as_bytes().to_vec(),
        }
    }
}
