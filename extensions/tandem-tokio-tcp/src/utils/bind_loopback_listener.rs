use std::io::Result;
use std::net::SocketAddr;

use tokio::net::TcpListener;

/// Binds a `TcpListener` to an OS-assigned port on `127.0.0.1`.
///
/// Useful for tests and demos where a guaranteed-free port matters more
/// than a well-known one; the returned address carries the port the OS
/// actually picked.
pub async fn bind_loopback_listener() -> Result<(TcpListener, SocketAddr)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    Ok((listener, addr))
}
