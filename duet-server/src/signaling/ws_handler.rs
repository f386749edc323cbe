use crate::SignalingService;
use crate::transport::{ChannelTransport, OutboundFrame};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use duet_core::{ClientMessage, RoomId};
use futures::{SinkExt, StreamExt};
use tracing::{debug, error, info};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(service): State<SignalingService>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, None, service))
}

pub async fn ws_room_handler(
    ws: WebSocketUpgrade,
    Path(room): Path<String>,
    State(service): State<SignalingService>,
) -> Response {
    let Some(room) = RoomId::parse(&room) else {
        return (StatusCode::BAD_REQUEST, "invalid room identifier").into_response();
    };

    ws.on_upgrade(move |socket| handle_socket(socket, Some(room), service))
        .into_response()
}

async fn handle_socket(socket: WebSocket, room: Option<RoomId>, service: SignalingService) {
    let (mut sender, mut receiver) = socket.split();
    let (transport, mut rx) = ChannelTransport::pair();

    let conn_id = match service.hub().connect(Box::new(transport), room).await {
        Ok(id) => id,
        Err(e) => {
            error!("Could not register WebSocket connection: {}", e);
            return;
        }
    };
    info!("New WebSocket connection: {}", conn_id);

    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            match frame {
                OutboundFrame::Text(text) => {
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                OutboundFrame::Close => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let hub = service.hub().clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match ClientMessage::parse(text.as_str()) {
                        Ok(message) => {
                            if let Err(e) = hub.dispatch(conn_id, message).await {
                                error!("Hub died: {}", e);
                                break;
                            }
                        }
                        Err(e) => debug!("Dropping message from {}: {}", conn_id, e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    // The reader must be fully stopped before the hub sees the disconnect,
    // so nothing from this socket is processed after it.
    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
            let _ = recv_task.await;
        }
        _ = (&mut recv_task) => send_task.abort(),
    };

    let _ = service.hub().disconnect(conn_id).await;
    info!("WebSocket disconnected: {}", conn_id);
}
