use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};

use tandem_rpc_endpoint::RpcEndpointBuilder;
use tandem_rpc_endpoint::error::InvokeError;
use tandem_rpc_service::ApiError;
use tandem_tokio_tcp::{RpcTcpClient, RpcTcpServer};

#[tokio::test]
async fn echo_round_trips_over_loopback_tcp() {
    let server_builder = RpcEndpointBuilder::new()
        .register("echo", |(s,): (String,)| async move { Ok::<_, ApiError>(s) });
    let (server, addr) = RpcTcpServer::bind_local(server_builder)
        .await
        .expect("bind failed");
    let server_task = tokio::spawn(server.serve());

    let client = RpcTcpClient::connect(addr, RpcEndpointBuilder::new())
        .await
        .expect("connect failed");

    let reply: String = client.invoke("echo", ("hi",)).await.expect("echo failed");
    assert_eq!(reply, "hi");

    server_task.abort();
}

#[tokio::test]
async fn the_server_side_endpoint_can_call_back_into_the_client() {
    let (endpoint_tx, mut endpoint_rx) = mpsc::unbounded_channel();

    let (server, addr) = RpcTcpServer::bind_local(RpcEndpointBuilder::new())
        .await
        .expect("bind failed");
    let server_task = tokio::spawn(server.serve_with(move |endpoint| {
        let _ = endpoint_tx.send(endpoint);
    }));

    let client_builder = RpcEndpointBuilder::new().register("greet", |(name,): (String,)| {
        async move { Ok::<_, ApiError>(format!("hello {}", name)) }
    });
    let _client = RpcTcpClient::connect(addr, client_builder)
        .await
        .expect("connect failed");

    let server_endpoint = timeout(Duration::from_secs(2), endpoint_rx.recv())
        .await
        .expect("no connection within 2s")
        .expect("server task ended early");

    let greeting: String = server_endpoint
        .invoke("greet", ("server",))
        .await
        .expect("callback invoke failed");
    assert_eq!(greeting, "hello server");

    server_task.abort();
}

#[tokio::test]
async fn a_garbage_length_field_from_the_peer_kills_the_session() {
    // A hand-rolled "server" that reads the client's request and answers
    // with an impossible frame length.
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().expect("local_addr failed");

    let rogue = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept failed");
        let mut scratch = [0u8; 1024];
        let _ = socket.read(&mut scratch).await;
        socket
            .write_all(&u32::MAX.to_be_bytes())
            .await
            .expect("write failed");
        // Hold the socket open; the client must drop the connection on its
        // own, from the framing violation alone.
        sleep(Duration::from_secs(2)).await;
    });

    let client = RpcTcpClient::connect(addr, RpcEndpointBuilder::new())
        .await
        .expect("connect failed");

    let err = client
        .invoke::<_, String>("anything", ())
        .await
        .expect_err("the call must not survive a malformed reply");
    assert_eq!(err, InvokeError::Shutdown);
    assert!(!client.is_connected());

    rogue.abort();
}

#[tokio::test]
async fn a_client_hangup_leaves_the_server_serving() {
    let server_builder = RpcEndpointBuilder::new()
        .register("echo", |(s,): (String,)| async move { Ok::<_, ApiError>(s) });
    let (server, addr) = RpcTcpServer::bind_local(server_builder)
        .await
        .expect("bind failed");
    let server_task = tokio::spawn(server.serve());

    let first = RpcTcpClient::connect(addr, RpcEndpointBuilder::new())
        .await
        .expect("first connect failed");
    let reply: String = first.invoke("echo", ("one",)).await.expect("echo failed");
    assert_eq!(reply, "one");

    first.shutdown();
    assert!(!first.is_connected());
    drop(first);

    let second = RpcTcpClient::connect(addr, RpcEndpointBuilder::new())
        .await
        .expect("second connect failed");
    let reply: String = second.invoke("echo", ("two",)).await.expect("echo failed");
    assert_eq!(reply, "two");

    server_task.abort();
}

#[tokio::test]
async fn concurrent_clients_get_independent_sessions() {
    let server_builder = RpcEndpointBuilder::new().register("inc", |(n,): (i64,)| async move {
        Ok::<_, ApiError>(n + 1)
    });
    let (server, addr) = RpcTcpServer::bind_local(server_builder)
        .await
        .expect("bind failed");
    let server_task = tokio::spawn(server.serve());

    let mut clients = Vec::new();
    for _ in 0..4 {
        clients.push(
            RpcTcpClient::connect(addr, RpcEndpointBuilder::new())
                .await
                .expect("connect failed"),
        );
    }

    for (i, client) in clients.iter().enumerate() {
        let value: i64 = client
            .invoke("inc", (i as i64,))
            .await
            .expect("inc failed");
        assert_eq!(value, i as i64 + 1);
    }

    server_task.abort();
}
