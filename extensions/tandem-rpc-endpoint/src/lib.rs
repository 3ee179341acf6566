//! Session layer of the tandem RPC runtime.
//!
//! An [`RpcEndpoint`] is one peer of a framed, bidirectional RPC
//! connection. It owns the connection's API registry, packet-id source, and
//! pending-call table; the dispatcher borrows all three while routing each
//! inbound packet either to a registered handler (requests from the peer)
//! or to the pending-call table (replies to calls this side originated).
//!
//! The endpoint is transport-agnostic: it emits encoded frames through an
//! outbound channel and is fed inbound bytes through
//! [`RpcEndpoint::on_receive`]. The `tandem-tokio-tcp` extension wires it
//! to a TCP socket.

mod config;
pub use config::*;

mod dispatcher;

mod endpoint;
pub use endpoint::*;

pub mod error;

mod pending_call;
pub use pending_call::*;
