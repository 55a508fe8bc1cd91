//! Webhook endpoint for Telegram updates.
//!
//! Every text message gets the same fixed reply. Updates without text are
//! acknowledged and otherwise ignored.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use tracing::{debug, error, info, warn};

use crate::platform::Notifier;
use crate::update::{Sender, Update};

pub const REPLY_TEXT: &str = "Hello, I'm Vercel Bot!";

#[derive(Clone)]
pub struct WebhookState {
    bot_token: Option<Arc<str>>,
    notifier: Arc<dyn Notifier>,
    max_body_bytes: usize,
}

impl WebhookState {
    pub fn new(
        bot_token: Option<&str>,
        notifier: Arc<dyn Notifier>,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            bot_token: bot_token.filter(|t| !t.is_empty()).map(Arc::from),
            notifier,
            max_body_bytes,
        }
    }
}

pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route("/", any(handle_webhook))
        .route("/api/webhook", any(handle_webhook))
        .with_state(state)
}

async fn handle_webhook(
    State(state): State<WebhookState>,
    req: Request,
) -> Result<Response, WebhookError> {
    if req.method() != Method::POST {
        return Err(WebhookError::MethodNotAllowed);
    }

    let bot_token = state.bot_token.as_deref().ok_or(WebhookError::MissingToken)?;

    let body = axum::body::to_bytes(req.into_body(), state.max_body_bytes)
        .await
        .map_err(|e| WebhookError::ReadBody(e.to_string()))?;

    let update = Update::decode(&body).map_err(|e| WebhookError::ParseJson(e.to_string()))?;

    let Some(message) = update.text_message() else {
        debug!("Update {} has no text message, ignoring", update.update_id);
        return Ok(StatusCode::OK.into_response());
    };

    info!(
        "Update {} message {} from {} in chat {} ({})",
        update.update_id,
        message.message_id,
        sender_label(message.from.as_ref()),
        message.chat.id,
        message.chat.chat_type
    );

    state
        .notifier
        .send_message(bot_token, message.chat.id, REPLY_TEXT)
        .await
        .map_err(|e| WebhookError::SendMessage(format!("{:#}", e)))?;

    Ok((StatusCode::OK, "OK").into_response())
}

/// `@username`, else the first name, else `unknown`.
fn sender_label(sender: Option<&Sender>) -> String {
    match sender {
        Some(s) if !s.username.is_empty() => format!("@{}", s.username),
        Some(s) if !s.first_name.is_empty() => s.first_name.clone(),
        _ => "unknown".to_string(),
    }
}

#[derive(Debug)]
pub enum WebhookError {
    MethodNotAllowed,
    MissingToken,
    ReadBody(String),
    ParseJson(String),
    SendMessage(String),
}

impl std::fmt::Display for WebhookError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MethodNotAllowed => write!(f, "Method not allowed"),
            Self::MissingToken => write!(f, "TELEGRAM_BOT_TOKEN not set"),
            Self::ReadBody(_) => write!(f, "Error reading request body"),
            Self::ParseJson(_) => write!(f, "Error parsing JSON"),
            Self::SendMessage(e) => write!(f, "Error sending message: {}", e),
        }
    }
}

impl std::error::Error for WebhookError {}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MethodNotAllowed => return StatusCode::METHOD_NOT_ALLOWED.into_response(),
            Self::ReadBody(e) | Self::ParseJson(e) => {
                warn!(error = %e, "{}", self);
                StatusCode::BAD_REQUEST
            }
            Self::MissingToken | Self::SendMessage(_) => {
                error!("{}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, self.to_string()).into_response()
    }
}
