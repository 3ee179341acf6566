//! Core wire layer for the tandem RPC runtime.
//!
//! Both peers of a tandem connection are symmetric: either side may register
//! named APIs and invoke the APIs of the other. This crate contains only the
//! transport-agnostic pieces that make that possible on a single byte stream:
//!
//! - [`packet::Packet`]: the atomic wire unit, correlating requests to
//!   replies through a numeric packet id and a direction flag.
//! - [`packet::PacketCodec`]: encodes a packet to its framed byte form and
//!   decodes one packet out of an accumulation buffer, or reports that more
//!   bytes are needed.
//! - [`packet::PacketStreamDecoder`]: drives the codec over a continuous
//!   inbound byte stream, one packet at a time, in arrival order.
//! - [`utils::PacketIdSource`]: a wrap-safe per-connection id allocator.
//!
//! Session behavior (registries, pending calls, dispatch) lives in the
//! `tandem-rpc-endpoint` extension crate; serialization of packet bodies
//! lives in `tandem-rpc-service`.

pub mod constants;
pub mod packet;
pub mod utils;
