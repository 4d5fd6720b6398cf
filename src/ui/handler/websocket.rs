//! WebSocket connection handlers.
//!
//! 接続ごとに ConnectionId を採番し、送信チャネルをゲートウェイに登録
//! します。受信した JSON イベントをパースしてユースケースに振り分け、
//! 切断時はライフサイクルの切断処理と登録解除を行います。

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::domain::ConnectionId;
use crate::domain::room::Position;
use crate::protocol::{ClientEvent, ServerEvent};
use crate::ui::state::AppState;
use crate::usecase::push_event;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives payloads from the rx channel and pushes them
/// to the WebSocket sender.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection = ConnectionId::generate();
    tracing::info!("Connection '{}' opened", connection);

    // Create a channel for this connection to receive events
    let (tx, rx) = mpsc::unbounded_channel();
    state.gateway.register(connection.clone(), tx).await;

    let (sender, mut receiver) = socket.split();

    let state_for_recv = state.clone();
    let connection_for_recv = connection.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    dispatch(&state_for_recv, &connection_for_recv, &text).await;
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_for_recv);
                    break;
                }
                // ping/pong is handled by the protocol layer
                _ => {}
            }
        }
    });

    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state.lifecycle.handle_disconnect(&connection).await;
    state.gateway.unregister(&connection).await;
    tracing::info!("Connection '{}' closed", connection);
}

async fn dispatch(state: &Arc<AppState>, connection: &ConnectionId, text: &str) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Failed to parse event from '{}': {}", connection, e);
            push_event(
                state.gateway.as_ref(),
                connection,
                &ServerEvent::ActionFailed {
                    message: "Unrecognized event payload".to_string(),
                },
            )
            .await;
            return;
        }
    };

    match event {
        ClientEvent::HostGame {
            player_name,
            duration,
        } => {
            if let Err(e) = state
                .lifecycle
                .host_game(connection, &player_name, duration)
                .await
            {
                push_event(
                    state.gateway.as_ref(),
                    connection,
                    &ServerEvent::SetupError {
                        message: e.to_string(),
                    },
                )
                .await;
            }
        }
        ClientEvent::JoinGame {
            player_name,
            room_id,
        } => {
            if let Err(e) = state
                .lifecycle
                .join_game(connection, &player_name, &room_id)
                .await
            {
                push_event(
                    state.gateway.as_ref(),
                    connection,
                    &ServerEvent::SetupError {
                        message: e.to_string(),
                    },
                )
                .await;
            }
        }
        ClientEvent::ReconnectPlayer { room_id, player_id } => {
            if let Err(e) = state
                .lifecycle
                .reconnect_player(connection, &room_id, &player_id)
                .await
            {
                push_event(
                    state.gateway.as_ref(),
                    connection,
                    &ServerEvent::ReconnectFailed {
                        message: e.to_string(),
                    },
                )
                .await;
            }
        }
        ClientEvent::PlayerMove { x, y, z } => {
            state
                .actions
                .move_player(connection, Position { x, y, z })
                .await;
        }
        ClientEvent::CollectResource(resource_id) => {
            state.actions.collect_resource(connection, &resource_id).await;
        }
        ClientEvent::PlantFlower { slot_id } => {
            state.actions.plant_flower(connection, &slot_id).await;
        }
        ClientEvent::NurtureFlower { slot_id } => {
            state.actions.nurture_flower(connection, &slot_id).await;
        }
        ClientEvent::LeaveGame => {
            state.lifecycle.leave_game(connection).await;
        }
    }
}
