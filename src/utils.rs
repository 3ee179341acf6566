mod packet_id_source;

pub use packet_id_source::PacketIdSource;
