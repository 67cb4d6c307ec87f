//! Webhook server
//!
//! Receives Telegram updates on `POST /webhook`, special-cases `/start`,
//! and otherwise hands the text to the agent and relays whatever comes
//! back. The webhook response body is always `{"ok": true}`; the actual
//! reply goes out as a separate `sendMessage` call, exactly one per
//! inbound message.

use crate::agent::{Agent, SessionStore};
use crate::error::Result;
use crate::telegram::{TelegramClient, Update};
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

/// Fixed welcome reply for `/start`
pub const WELCOME_MESSAGE: &str =
    "🥗 *Nutrition Agent Started!*\n\nTell me what you ate and I'll analyze it!";

/// Fixed apology reply when the agent fails
pub const APOLOGY_MESSAGE: &str = "Sorry, I'm having trouble right now. Please try again!";

/// Shared state behind the webhook handler
#[derive(Clone)]
pub struct AppState {
    /// The tool-calling agent
    pub agent: Arc<Agent>,
    /// Per-user conversation history
    pub sessions: Arc<SessionStore>,
    /// Outbound Telegram client
    pub telegram: Arc<TelegramClient>,
}

/// Build the webhook router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", post(handle_webhook))
        .with_state(state)
}

/// Bind and serve the webhook router until the process exits
///
/// # Errors
///
/// Returns error if the listener cannot bind
pub async fn serve(state: AppState, host: &str, port: u16) -> Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Handle one inbound Telegram update
///
/// The acknowledgment is always `{"ok": true}`, whatever happened while
/// processing; payloads that do not decode as an update are ignored.
async fn handle_webhook(State(state): State<AppState>, Json(payload): Json<Value>) -> Json<Value> {
    tracing::debug!("Incoming update: {}", payload);

    let update: Update = match serde_json::from_value(payload) {
        Ok(update) => update,
        Err(e) => {
            tracing::warn!("Undecodable update payload: {}", e);
            return Json(json!({"ok": true}));
        }
    };

    let Some(message) = update.message else {
        return Json(json!({"ok": true}));
    };
    let chat_id = message.chat.id;
    let user_id = message
        .from
        .map(|u| u.id.to_string())
        .unwrap_or_else(|| chat_id.to_string());
    let text = message.text.unwrap_or_default().trim().to_string();

    let reply = if text.starts_with("/start") {
        WELCOME_MESSAGE.to_string()
    } else {
        let history = state.sessions.history(&user_id).await;
        match state.agent.respond(&history, &text).await {
            Ok(reply) => {
                state.sessions.record_exchange(&user_id, &text, &reply).await;
                reply
            }
            Err(e) => {
                tracing::error!("Agent failed for user {}: {}", user_id, e);
                APOLOGY_MESSAGE.to_string()
            }
        }
    };

    if let Err(e) = state.telegram.send_message(chat_id, &reply).await {
        tracing::error!("Failed to send reply to chat {}: {}", chat_id, e);
    }

    Json(json!({"ok": true}))
}
