use std::io;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::net::{TcpStream, ToSocketAddrs};

use tandem_rpc_endpoint::error::InvokeError;
use tandem_rpc_endpoint::{EndpointRole, RpcEndpoint, RpcEndpointBuilder};
use tandem_rpc_service::{JsonSerializer, Serializer};

use crate::connection::spawn_connection;

/// The dialing side of a tandem connection.
///
/// Owns the connection: dropping the client (or calling
/// [`shutdown`](Self::shutdown)) disconnects the endpoint, which closes the
/// socket. The client is itself a full endpoint, so the builder may register
/// APIs for the server to call back into.
pub struct RpcTcpClient<S: Serializer = JsonSerializer> {
    endpoint: RpcEndpoint<S>,
}

impl<S: Serializer> RpcTcpClient<S> {
    /// Connects to a listening peer and brings the session up.
    pub async fn connect(
        addr: impl ToSocketAddrs,
        builder: RpcEndpointBuilder<S>,
    ) -> io::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        let endpoint = spawn_connection(stream, builder, EndpointRole::Client);
        Ok(Self { endpoint })
    }

    /// Calls `api_name` on the server and awaits the decoded reply.
    pub async fn invoke<Args, Ret>(&self, api_name: &str, args: Args) -> Result<Ret, InvokeError>
    where
        Args: Serialize,
        Ret: DeserializeOwned,
    {
        self.endpoint.invoke(api_name, args).await
    }

    /// Fire-and-forget call; no reply is delivered.
    pub async fn invoke_one_way<Args>(&self, api_name: &str, args: Args) -> Result<(), InvokeError>
    where
        Args: Serialize,
    {
        self.endpoint.invoke_one_way(api_name, args).await
    }

    pub fn is_connected(&self) -> bool {
        self.endpoint.is_connected()
    }

    /// A shareable handle onto the underlying endpoint, e.g. for code that
    /// outlives this client value.
    pub fn endpoint(&self) -> RpcEndpoint<S> {
        self.endpoint.clone()
    }

    /// Hangs up: fails any pending calls with a shutdown outcome and lets
    /// the transport close the socket.
    pub fn shutdown(&self) {
        self.endpoint.on_disconnect();
    }
}

impl<S: Serializer> Drop for RpcTcpClient<S> {
    fn drop(&mut self) {
        self.endpoint.on_disconnect();
    }
}
