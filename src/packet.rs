mod packet_codec;
mod packet_error;
mod packet_stream_decoder;
mod read_buffer;
#[allow(clippy::module_inception)]
mod packet;

pub use packet::Packet;
pub use packet_codec::{DecodedPacket, PacketCodec};
pub use packet_error::ProtocolError;
pub use packet_stream_decoder::PacketStreamDecoder;
pub use read_buffer::ReadBuffer;
