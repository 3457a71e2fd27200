//! Loopback port allocation.

use tokio::net::TcpListener;

use crate::error::{PreviewError, Result};

/// Find a free loopback port, starting at `preferred` and walking upward.
///
/// Each probe binds a listener and releases it immediately, so the port can
/// in principle be taken by another process before the caller binds it for
/// real. That window is fine for a local development tool; the caller
/// surfaces the bind error if it ever loses the race.
pub async fn allocate(preferred: u16) -> Result<u16> {
    let mut candidate = preferred;
    loop {
        match TcpListener::bind(("127.0.0.1", candidate)).await {
            Ok(listener) => {
                // Asking for port 0 gets an ephemeral port; report the real one.
                let port = listener.local_addr()?.port();
                drop(listener);
                return Ok(port);
            }
            Err(_) if candidate < u16::MAX => candidate += 1,
            Err(_) => return Err(PreviewError::PortsExhausted { preferred }),
        }
    }
}
