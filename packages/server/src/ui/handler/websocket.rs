//! WebSocket connection handlers.
//!
//! Each connection runs three tasks:
//! - pusher: drains the connection's outbound queue into the socket
//! - receiver: decodes frames and hands commands to the dispatcher
//! - dispatcher: executes commands one at a time in arrival order
//!
//! ICE candidates are held until `candidate_relay_delay` after their arrival,
//! so a burst of candidates costs at most one delay in total.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::{sync::mpsc, task::JoinHandle, time::Instant};

use crate::{
    domain::{ClientId, ConnectionChannel, Outbound, RelayKind, ServerEvent},
    infrastructure::dto::websocket::{ClientMessage, encode, parse_client_message},
    ui::state::AppState,
    usecase::LeaveReason,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that forwards queued frames to the WebSocket sender.
///
/// `Outbound::Terminate` ends the task without a close frame.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<Outbound>,
    mut sender: SplitSink<WebSocket, Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let message = match frame {
                Outbound::Text(text) => Message::Text(text.into()),
                Outbound::Ping => Message::Ping(Bytes::new()),
                Outbound::Terminate => break,
            };
            if sender.send(message).await.is_err() {
                break;
            }
        }
    })
}

/// A decoded command and the instant the receiver read it off the socket.
type ReceivedCommand = (Instant, ClientMessage);

/// Spawns a task that executes the client's commands in order.
fn dispatcher_loop(
    state: Arc<AppState>,
    client_id: ClientId,
    tx: ConnectionChannel,
    mut commands: mpsc::UnboundedReceiver<ReceivedCommand>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some((received_at, command)) = commands.recv().await {
            dispatch(&state, &client_id, &tx, received_at, command).await;
        }
    })
}

async fn dispatch(
    state: &AppState,
    client_id: &ClientId,
    tx: &ConnectionChannel,
    received_at: Instant,
    command: ClientMessage,
) {
    match command {
        ClientMessage::FindPartner => find_partner(state, client_id, tx).await,
        ClientMessage::LeaveRoom => {
            state
                .leave_room_usecase
                .execute(client_id, LeaveReason::LeaveRoom)
                .await;
        }
        ClientMessage::NextPartner => {
            state
                .leave_room_usecase
                .execute(client_id, LeaveReason::NextPartner)
                .await;
            find_partner(state, client_id, tx).await;
        }
        ClientMessage::Relay(request) => {
            if request.kind == RelayKind::IceCandidate && !state.candidate_relay_delay.is_zero() {
                tokio::time::sleep_until(received_at + state.candidate_relay_delay).await;
            }
            state
                .relay_message_usecase
                .execute(client_id, request)
                .await;
        }
    }
}

async fn find_partner(state: &AppState, client_id: &ClientId, tx: &ConnectionChannel) {
    if let Err(e) = state.find_partner_usecase.execute(client_id).await {
        tracing::warn!("find_partner from '{}' rejected: {}", client_id, e);
        reply_error(tx, e.to_string());
    }
}

/// Queue an `error` event on the connection's own channel.
fn reply_error(tx: &ConnectionChannel, message: String) {
    match encode(ServerEvent::Error { message }) {
        Ok(text) => {
            let _ = tx.send(Outbound::Text(text));
        }
        Err(e) => tracing::error!("Failed to encode error event: {}", e),
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();

    let (tx, rx) = mpsc::unbounded_channel();
    let client_id = state.connect_client_usecase.execute(tx.clone()).await;

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let dispatcher = dispatcher_loop(state.clone(), client_id.clone(), tx.clone(), command_rx);

    let client_id_clone = client_id.clone();
    let state_clone = state.clone();

    // Spawn a task to receive messages from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!("WebSocket error from '{}': {}", client_id_clone, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => match parse_client_message(text.as_str()) {
                    Ok(command) => {
                        if command_tx.send((Instant::now(), command)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Invalid message from '{}': {}", client_id_clone, e);
                        reply_error(&tx, e.to_string());
                    }
                },
                Message::Pong(_) => {
                    state_clone
                        .check_liveness_usecase
                        .record_pong(&client_id_clone)
                        .await;
                }
                Message::Close(_) => {
                    tracing::debug!("Client '{}' requested close", client_id_clone);
                    break;
                }
                // Ping is answered by the WebSocket layer
                _ => {}
            }
        }
    });

    // Spawn a task to push queued frames to this client
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // The dispatcher ends once the receiver task has dropped the command sender
    let _ = dispatcher.await;

    state.disconnect_client_usecase.execute(&client_id).await;
}
