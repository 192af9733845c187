//! WebSocket Connection Handler
//!
//! Authenticates the handshake before upgrading, then runs one task per
//! connection that owns its `ConnectionSession` and dispatches client events
//! to the collaboration services.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::time::interval;

use super::messages::ClientEvent;
use crate::application::dto::{JoinedPayload, LeftPayload, ReadyPayload, ServerEvent};
use crate::application::services::JoinOutcome;
use crate::domain::{ConnectionSession, Identity, RoomKey};
use crate::shared::error::{AppError, CollabError};
use crate::startup::AppState;

/// Query parameters accepted on the upgrade request
#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    /// Browser clients cannot set headers on a WebSocket handshake.
    pub token: Option<String>,
}

/// WebSocket upgrade handler
///
/// The credential is verified here, before `on_upgrade`, so an
/// unauthenticated client gets a plain 401 and never reaches the socket loop.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    Query(params): Query<ConnectParams>,
) -> Result<Response, AppError> {
    let token = bearer
        .map(|TypedHeader(Authorization(bearer))| bearer.token().to_string())
        .or(params.token);

    let identity = state.authenticator.authenticate(token.as_deref())?;

    let limits = &state.settings.websocket;
    Ok(ws
        .max_message_size(limits.max_message_size)
        .max_frame_size(limits.max_frame_size)
        .on_upgrade(move |socket| handle_socket(socket, state, identity)))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState, identity: Identity) {
    let mut session = ConnectionSession::new(identity);
    let connection_id = session.connection_id();
    let user_id = session.user_id();

    // Split socket for concurrent read/write
    let (mut sender, mut receiver) = socket.split();

    // Everything bound for this client, direct replies and room broadcasts
    // alike, goes through this channel.
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    let sender_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(t) => t,
                Err(e) => {
                    tracing::error!(event = event.event_name(), "Failed to serialize event: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    state
        .gateway
        .register_session(connection_id, user_id, tx.clone());
    state.hub.connect(&session);

    let heartbeat_interval_ms = state.gateway.heartbeat_interval();
    let _ = tx.send(ServerEvent::Ready(ReadyPayload {
        connection_id,
        user_id,
        heartbeat_interval_ms,
    }));

    tracing::info!(
        user_id = user_id,
        connection_id = %connection_id,
        "User connected"
    );

    let timeout_ms = state.settings.websocket.heartbeat_timeout_ms();
    let mut heartbeat_check = interval(state.settings.websocket.heartbeat_check_period());
    heartbeat_check.tick().await; // Skip first immediate tick

    // Main message loop
    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_frame(text.as_str(), &mut session, &state, &tx).await;
                    }
                    Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                        Ok(text) => handle_frame(text, &mut session, &state, &tx).await,
                        Err(_) => {
                            let _ = tx.send(ServerEvent::error(
                                "invalid_payload",
                                "Frames must be UTF-8 JSON",
                            ));
                        }
                    },
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::debug!(connection_id = %connection_id, "Connection closed");
                        break;
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {
                        // Pong is handled automatically by axum
                    }
                    Some(Err(e)) => {
                        tracing::debug!(connection_id = %connection_id, error = %e, "WebSocket error");
                        break;
                    }
                }
            }

            _ = heartbeat_check.tick() => {
                if !session.is_alive(timeout_ms) {
                    tracing::info!(
                        connection_id = %connection_id,
                        "Heartbeat timeout, closing connection"
                    );
                    break;
                }
            }
        }
    }

    // Notify the last room before the transport goes away.
    state.hub.disconnect(&mut session);
    state.gateway.unregister_session(connection_id);
    sender_task.abort();

    tracing::info!(
        user_id = user_id,
        connection_id = %connection_id,
        "User disconnected"
    );
}

/// Parse and dispatch one text frame. Failures are reported to the client
/// and never close the connection.
async fn handle_frame(
    text: &str,
    session: &mut ConnectionSession,
    state: &AppState,
    tx: &mpsc::UnboundedSender<ServerEvent>,
) {
    let result = match ClientEvent::parse(text) {
        Ok(event) => {
            let name = event.event_name();
            dispatch(event, session, state, tx)
                .await
                .map_err(|e| (name, e))
        }
        Err(e) => Err(("unknown", e)),
    };

    if let Err((event, e)) = result {
        tracing::debug!(
            connection_id = %session.connection_id(),
            event = event,
            code = e.code(),
            error = %e,
            "Request rejected"
        );
        let _ = tx.send(ServerEvent::error(e.code(), e.to_string()));
    }
}

async fn dispatch(
    event: ClientEvent,
    session: &mut ConnectionSession,
    state: &AppState,
    tx: &mpsc::UnboundedSender<ServerEvent>,
) -> Result<(), CollabError> {
    let hub = &state.hub;

    match event {
        ClientEvent::Join(request) => {
            let outcome = hub
                .membership()
                .join(session, RoomKey::Chat(request.room_id))
                .await?;
            reply_joined(tx, outcome);
        }

        ClientEvent::Leave => {
            let left = match session.current_room() {
                Some(RoomKey::Meeting(_)) => Some(hub.meetings().leave_meeting(session)?),
                _ => hub.membership().leave(session),
            };
            if let Some(room) = left {
                let _ = tx.send(ServerEvent::Left(LeftPayload { room }));
            }
        }

        ClientEvent::Send(request) => {
            hub.relay().send(session, request).await?;
        }

        ClientEvent::Typing => {
            hub.start_typing(session)?;
        }

        ClientEvent::StopTyping => {
            hub.stop_typing(session)?;
        }

        ClientEvent::JoinMeeting(request) => {
            let outcome = hub
                .meetings()
                .join_meeting(session, request.meeting_id)
                .await?;
            reply_joined(tx, outcome);
        }

        ClientEvent::MeetingControl(request) => {
            hub.meetings().control(session, request.action)?;
        }

        ClientEvent::ShareScreen(payload) => {
            hub.meetings().share_screen(session, payload)?;
        }

        ClientEvent::LeaveMeeting => {
            let room = hub.meetings().leave_meeting(session)?;
            let _ = tx.send(ServerEvent::Left(LeftPayload { room }));
        }

        ClientEvent::Heartbeat => {
            session.heartbeat();
            let _ = tx.send(ServerEvent::HeartbeatAck);
            tracing::trace!(connection_id = %session.connection_id(), "Heartbeat received");
        }
    }

    Ok(())
}

fn reply_joined(tx: &mpsc::UnboundedSender<ServerEvent>, outcome: JoinOutcome) {
    if let Some(previous) = outcome.previous_room {
        let _ = tx.send(ServerEvent::Left(LeftPayload { room: previous }));
    }
    let _ = tx.send(ServerEvent::Joined(JoinedPayload {
        room: outcome.room,
        recent_messages: outcome.recent_messages,
        active_users: outcome.active_users,
        active_typers: outcome.active_typers,
    }));
}
