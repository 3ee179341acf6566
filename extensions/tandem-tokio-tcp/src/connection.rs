use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

use tandem_rpc_endpoint::{EndpointRole, RpcEndpoint, RpcEndpointBuilder};
use tandem_rpc_service::Serializer;

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Wires a freshly connected socket to a new endpoint.
///
/// The writer task ends when the endpoint disconnects (its outbound queue
/// closes) or the socket rejects a write; the reader task ends on EOF, a
/// read error, or a protocol violation, and always tears the endpoint down
/// on the way out.
pub(crate) fn spawn_connection<S: Serializer>(
    stream: TcpStream,
    builder: RpcEndpointBuilder<S>,
    role: EndpointRole,
) -> RpcEndpoint<S> {
    let peer = stream.peer_addr().ok();
    let (mut read_half, mut write_half) = stream.into_split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Vec<u8>>();

    let endpoint = builder.build(role, outbound_tx);

    tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if let Err(err) = write_half.write_all(&frame).await {
                tracing::debug!(error = %err, "write side closed");
                break;
            }
        }
        let _ = write_half.shutdown().await;
    });

    {
        let endpoint = endpoint.clone();
        tokio::spawn(async move {
            let mut chunk = vec![0u8; READ_CHUNK_SIZE];
            loop {
                match read_half.read(&mut chunk).await {
                    Ok(0) => break,
                    Ok(n) => {
                        // A protocol violation already tore the session
                        // down inside on_receive; just stop reading.
                        if endpoint.on_receive(&chunk[..n]).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        tracing::debug!(error = %err, "read side closed");
                        break;
                    }
                }
            }
            if let Some(peer) = peer {
                tracing::debug!(%peer, "connection closed");
            }
            endpoint.on_disconnect();
        });
    }

    endpoint
}
