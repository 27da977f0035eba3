/**
 * WebSocket Endpoint
 *
 * Handler for GET /ws. The client supplies its JWT as a `token` query
 * parameter at the handshake; the token is verified and the user confirmed
 * to exist BEFORE the upgrade completes, so no session state is ever
 * created for an unauthenticated connection.
 *
 * # Connection Shape
 *
 * Each accepted connection gets:
 * - an outbound mpsc queue drained by a dedicated send task, and
 * - a receive loop that parses one command frame at a time and hands it to
 *   the session coordinator, preserving per-client submission order.
 *
 * Malformed frames produce a caller-scoped `error` event and leave the
 * connection open.
 */

use std::collections::HashMap;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::backend::auth::tokens::verify_token;
use crate::backend::auth::users::get_user_by_id;
use crate::backend::middleware::auth::AuthenticatedUser;
use crate::backend::server::state::AppState;
use crate::backend::sync::session::SyncSession;
use crate::shared::protocol::{ClientCommand, ServerEvent};

/// Capacity of each connection's outbound queue
const OUTBOUND_QUEUE_CAPACITY: usize = 64;

/// WebSocket upgrade handler (GET /ws?token=...)
///
/// Refuses the connection with 401 before any upgrade when the token is
/// missing, invalid, expired, or names a user that no longer exists.
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    ws: WebSocketUpgrade,
) -> Response {
    let token = match params.get("token") {
        Some(token) => token,
        None => {
            tracing::warn!("WebSocket connection attempt without token");
            return (StatusCode::UNAUTHORIZED, "Authentication required").into_response();
        }
    };

    let claims = match verify_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!("WebSocket connection with invalid token: {:?}", e);
            return (StatusCode::UNAUTHORIZED, "Invalid token").into_response();
        }
    };

    let user = match get_user_by_id(&state.pool, &claims.sub).await {
        Ok(Some(user)) => AuthenticatedUser {
            user_id: user.id,
            username: user.username,
        },
        Ok(None) => {
            tracing::warn!("WebSocket token for unknown user: {}", claims.sub);
            return (StatusCode::UNAUTHORIZED, "Invalid token").into_response();
        }
        Err(e) => {
            tracing::error!("Database error during WebSocket auth: {:?}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response();
        }
    };

    ws.on_upgrade(move |socket| run_connection(socket, state, user))
}

/// Drive one accepted connection until it closes
async fn run_connection(socket: WebSocket, state: AppState, user: AuthenticatedUser) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (outbound_tx, mut outbound_rx) = mpsc::channel::<ServerEvent>(OUTBOUND_QUEUE_CAPACITY);

    // Drain the outbound queue onto the socket
    let send_task = tokio::spawn(async move {
        while let Some(event) = outbound_rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize event: {:?}", e);
                    continue;
                }
            };
            if ws_tx.send(Message::Text(json.into())).await.is_err() {
                tracing::debug!("WebSocket send failed, client disconnected");
                break;
            }
        }
    });

    let mut session = SyncSession::new(user, outbound_tx);

    // Commands are handled to completion one at a time, preserving this
    // client's submission order
    while let Some(result) = ws_rx.next().await {
        let message = match result {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Session {}: WebSocket error: {}", session.session_id(), e);
                break;
            }
        };

        match message {
            Message::Text(text) => {
                let command: ClientCommand = match serde_json::from_str(&text) {
                    Ok(command) => command,
                    Err(e) => {
                        tracing::warn!(
                            "Session {}: malformed command frame: {}",
                            session.session_id(),
                            e
                        );
                        session
                            .send(ServerEvent::Error("Malformed command.".to_string()))
                            .await;
                        continue;
                    }
                };
                session.handle(&state, command).await;
            }
            Message::Close(_) => break,
            // Ping/pong is handled by the protocol layer
            _ => {}
        }
    }

    // Dropping the session releases its room subscription
    drop(session);
    send_task.abort();
}
