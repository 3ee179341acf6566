use std::time::Duration;

use tokio::join;
use tokio::sync::mpsc;
use tokio::time::timeout;

use tandem_rpc_endpoint::RpcEndpointBuilder;
use tandem_rpc_service::ApiError;
use tandem_tokio_tcp::{RpcTcpClient, RpcTcpServer};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    // Server side: two plain APIs, plus a hook on new connections so it can
    // call back into each client.
    let server_builder = RpcEndpointBuilder::new()
        .register("add", |(a, b): (i64, i64)| async move {
            Ok::<_, ApiError>(a + b)
        })
        .register("echo", |(text,): (String,)| async move {
            Ok::<_, ApiError>(text)
        });

    let (server, addr) = RpcTcpServer::bind_local(server_builder)
        .await
        .expect("failed to bind the demo server");
    tracing::info!(%addr, "server listening");

    let (connection_tx, mut connection_rx) = mpsc::unbounded_channel();
    tokio::spawn(server.serve_with(move |endpoint| {
        let _ = connection_tx.send(endpoint);
    }));

    // Client side: registers an API of its own, since both peers of a tandem
    // connection are endpoints in their own right.
    let client_builder = RpcEndpointBuilder::new().register("greet", |(name,): (String,)| {
        async move { Ok::<_, ApiError>(format!("hello {}", name)) }
    });
    let client = RpcTcpClient::connect(addr, client_builder)
        .await
        .expect("failed to connect the demo client");

    // Several calls in flight on the one connection.
    let (sum, double_sum, echoed) = join!(
        client.invoke::<_, i64>("add", (1, 2)),
        client.invoke::<_, i64>("add", (40, 2)),
        client.invoke::<_, String>("echo", ("round trip",)),
    );
    tracing::info!(sum = sum.expect("add failed"), "add(1, 2)");
    tracing::info!(sum = double_sum.expect("add failed"), "add(40, 2)");
    tracing::info!(text = %echoed.expect("echo failed"), "echo");

    // And the reverse direction: the server invokes the client's API.
    let server_endpoint = timeout(Duration::from_secs(2), connection_rx.recv())
        .await
        .expect("no connection arrived")
        .expect("server stopped");
    let greeting: String = server_endpoint
        .invoke("greet", ("server",))
        .await
        .expect("greet failed");
    tracing::info!(%greeting, "server-to-client call");

    client.shutdown();
}
