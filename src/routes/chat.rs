//! `POST /api/chat` — visitor question in, assistant reply out.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use tracing::{error, warn};

use crate::protocol::{ChatReply, ChatRequest};
use crate::services::bot;
use crate::state::AppState;

const EMPTY_QUESTION_REPLY: &str = "Please enter a question.";
const FAILURE_REPLY: &str = "Sorry, something went wrong. Please try again later.";
const UNCONFIGURED_REPLY: &str = "Our assistant is offline right now. Please use the contact form and we'll get back to you.";

fn reply(status: StatusCode, text: &str) -> (StatusCode, Json<ChatReply>) {
    (status, Json(ChatReply { reply: text.to_string(), sources: Vec::new() }))
}

pub async fn chat(State(state): State<AppState>, Json(body): Json<ChatRequest>) -> (StatusCode, Json<ChatReply>) {
    let question = body.message.trim();
    if question.is_empty() {
        return reply(StatusCode::BAD_REQUEST, EMPTY_QUESTION_REPLY);
    }
    let Some(llm) = state.llm.as_deref() else {
        warn!("chat: LLM not configured");
        return reply(StatusCode::SERVICE_UNAVAILABLE, UNCONFIGURED_REPLY);
    };

    match bot::answer(llm, &state.knowledge, question, &body.history, state.max_tokens).await {
        Ok(answer) => (StatusCode::OK, Json(ChatReply { reply: answer.reply, sources: answer.sources })),
        Err(e) => {
            let bot::BotError::Llm(cause) = &e;
            error!(error = %e, retryable = cause.retryable(), "chat: answer failed");
            reply(StatusCode::INTERNAL_SERVER_ERROR, FAILURE_REPLY)
        }
    }
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
