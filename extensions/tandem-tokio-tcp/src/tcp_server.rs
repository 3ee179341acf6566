use std::io;
use std::net::SocketAddr;

use tokio::net::{TcpListener, ToSocketAddrs};

use tandem_rpc_endpoint::{EndpointRole, RpcEndpoint, RpcEndpointBuilder};
use tandem_rpc_service::{JsonSerializer, Serializer};

use crate::connection::spawn_connection;

/// The accepting side of tandem connections.
///
/// Each accepted socket gets its own endpoint, built from a clone of the
/// prototype builder, so every connection serves the same APIs but keeps
/// its own packet-id space and pending calls.
pub struct RpcTcpServer<S: Serializer = JsonSerializer> {
    listener: TcpListener,
    builder: RpcEndpointBuilder<S>,
}

impl<S: Serializer> RpcTcpServer<S> {
    pub async fn bind(
        addr: impl ToSocketAddrs,
        builder: RpcEndpointBuilder<S>,
    ) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self::from_listener(listener, builder))
    }

    /// Wraps a pre-bound listener, e.g. one bound to an ephemeral port.
    pub fn from_listener(listener: TcpListener, builder: RpcEndpointBuilder<S>) -> Self {
        Self { listener, builder }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until the listener fails.
    pub async fn serve(self) -> io::Result<()> {
        self.serve_with(|_| {}).await
    }

    /// Accepts connections, handing each fresh endpoint to `on_connection`.
    /// Endpoints are symmetric, so this is where a server grabs the handle
    /// it needs to invoke APIs registered on the client.
    pub async fn serve_with<F>(self, on_connection: F) -> io::Result<()>
    where
        F: Fn(RpcEndpoint<S>) + Send + 'static,
    {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            tracing::info!(%peer, "peer connected");
            if let Err(err) = stream.set_nodelay(true) {
                tracing::debug!(error = %err, "set_nodelay failed");
            }
            let endpoint = spawn_connection(stream, self.builder.clone(), EndpointRole::Server);
            on_connection(endpoint);
        }
    }
}

impl RpcTcpServer<JsonSerializer> {
    /// Binds on an OS-assigned loopback port and returns the address
    /// alongside the server.
    pub async fn bind_local(
        builder: RpcEndpointBuilder<JsonSerializer>,
    ) -> io::Result<(Self, SocketAddr)> {
        let (listener, addr) = crate::utils::bind_loopback_listener().await?;
        Ok((Self::from_listener(listener, builder), addr))
    }
}
