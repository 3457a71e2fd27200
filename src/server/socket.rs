//! WebSocket upgrade and per-connection forwarding.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tracing::debug;

use super::hub::BroadcastHub;
use super::router::ServerContext;

/// Upgrade handler for the update socket.
pub async fn socket_handler(
    ws: WebSocketUpgrade,
    State(ctx): State<ServerContext>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, ctx.hub))
}

/// Forward hub frames to one client until either side goes away.
///
/// The protocol is one-way: the server pushes updates and the client only
/// ever speaks to keep the connection alive. Anything else it sends is
/// ignored.
async fn handle_socket(socket: WebSocket, hub: Arc<BroadcastHub>) {
    let Ok((id, mut updates)) = hub.register() else {
        return;
    };
    debug!(client = id, "preview client connected");

    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            frame = updates.recv() => match frame {
                Some(frame) => {
                    if sink.send(frame).await.is_err() {
                        break;
                    }
                }
                // Hub closed (session stopping): say goodbye and end.
                None => {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Ping(data))) => {
                    let _ = sink.send(Message::Pong(data)).await;
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    hub.deregister(id);
    debug!(client = id, "preview client disconnected");
}
