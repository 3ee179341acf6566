//! TCP transport for tandem RPC.
//!
//! [`RpcTcpClient`] dials out, [`RpcTcpServer`] accepts; both wire each
//! connected socket to an [`RpcEndpoint`](tandem_rpc_endpoint::RpcEndpoint)
//! through a pair of IO tasks: a single writer draining the endpoint's
//! outbound frame queue (so concurrent calls never interleave on the wire)
//! and a reader feeding inbound bytes to the endpoint. Endpoints stay fully
//! symmetric: a server-side connection can invoke the client's APIs just as
//! well as the other way around.

mod connection;

mod tcp_client;
pub use tcp_client::*;

mod tcp_server;
pub use tcp_server::*;

pub mod utils;
