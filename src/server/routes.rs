//! The `/functions/v1/chat` route and its error responses

use crate::message::Message;
use crate::providers::CompletionProvider;
use crate::sse::DONE_SENTINEL;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use futures::StreamExt;
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Request body for the chat endpoint.
#[derive(Debug, Deserialize)]
struct ChatRequest {
    messages: Vec<Message>,
}

/// JSON error response carrying the status the contract prescribes
///
/// The body shape is a flat `{ "error": <message> }`.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

/// Build the proxy router
pub fn build_router(provider: Arc<dyn CompletionProvider>) -> Router {
    Router::new()
        .route("/functions/v1/chat", post(chat))
        .with_state(provider)
}

/// Forward the conversation upstream and re-frame the reply as SSE
///
/// Malformed bodies are rejected with 400 before anything is forwarded. A
/// provider failure before streaming begins is a 500. A failure after the
/// stream has started ends the response without the `[DONE]` sentinel, since
/// the status line is already committed at that point.
async fn chat(
    State(provider): State<Arc<dyn CompletionProvider>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Sse<UnboundedReceiverStream<Result<Event, Infallible>>>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!("Rejected chat request body: {}", e);
        ApiError::bad_request("invalid messages format")
    })?;

    let mut fragments = provider
        .stream_completion(&request.messages)
        .await
        .map_err(|e| {
            tracing::error!("Upstream completion failed: {}", e);
            ApiError::internal(e.to_string())
        })?;

    let (tx, rx) = mpsc::unbounded_channel();

    // Forwarding task: one SSE frame per fragment, sentinel at the end.
    tokio::spawn(async move {
        while let Some(item) = fragments.next().await {
            match item {
                Ok(content) => {
                    let event = Event::default().data(json!({ "content": content }).to_string());
                    if tx.send(Ok(event)).is_err() {
                        // Client went away; abandon the upstream stream.
                        return;
                    }
                }
                Err(e) => {
                    tracing::warn!("Upstream stream failed mid-response: {}", e);
                    return;
                }
            }
        }
        let _ = tx.send(Ok(Event::default().data(DONE_SENTINEL)));
    });

    Ok(Sse::new(UnboundedReceiverStream::new(rx)))
}
