//! Answerer — turns a visitor question into a grounded reply.
//!
//! DESIGN
//! ======
//! Three model calls at most, cheapest first:
//!
//! 0. Overview: answer from the short overview document alone. The model
//!    replies `NEED_MORE_INFO` when the overview is not enough.
//! 1. Routing: show the model the section list and ask for a JSON array of
//!    paths. `["NONE"]` (or anything unparseable) means small talk.
//! 2. Answer: small-talk prompt, or a prompt grounded on the chosen files.
//!
//! Visitor history rides along on the overview and answer calls; the routing
//! call sees only the question.

use std::fmt::Write;

use tracing::info;

use super::knowledge::{KnowledgeBase, SectionText};
use crate::llm::{ChatResponse, LlmChat, LlmError, Message};
use crate::protocol::{HistoryEntry, Role};

/// Sentinel the overview call returns when it cannot answer.
pub const NEED_MORE_INFO: &str = "NEED_MORE_INFO";
/// Route meaning "no document needed".
pub const NONE_ROUTE: &str = "NONE";
/// History entries forwarded to the model.
pub const HISTORY_LIMIT: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

/// Which step produced the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerRoute {
    Overview,
    SmallTalk,
    Documents,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotAnswer {
    pub reply: String,
    /// Section paths the reply was grounded on.
    pub sources: Vec<String>,
    pub route: AnswerRoute,
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Answer `question` for the firm described by `kb`.
///
/// # Errors
///
/// Returns [`BotError::Llm`] if any model call fails.
pub async fn answer(
    llm: &dyn LlmChat,
    kb: &KnowledgeBase,
    question: &str,
    history: &[HistoryEntry],
    max_tokens: u32,
) -> Result<BotAnswer, BotError> {
    let history = history_messages(history);
    info!(question_len = question.len(), history = history.len(), "bot: question received");

    if let Some(overview) = kb.overview() {
        let system = build_overview_prompt(kb.firm_name(), overview);
        let reply = ask(llm, max_tokens, &system, &history, question).await?;
        if !reply.is_empty() && !reply.starts_with(NEED_MORE_INFO) {
            info!("bot: answered from overview");
            return Ok(BotAnswer { reply, sources: Vec::new(), route: AnswerRoute::Overview });
        }
    }

    let routes = pick_files(llm, kb, question, max_tokens).await?;
    if routes.is_empty() || routes.iter().all(|r| r == NONE_ROUTE) {
        let system = build_small_talk_prompt(kb.firm_name());
        let reply = ask(llm, max_tokens, &system, &history, question).await?;
        info!("bot: answered as small talk");
        return Ok(BotAnswer { reply, sources: Vec::new(), route: AnswerRoute::SmallTalk });
    }

    let mut texts = Vec::with_capacity(routes.len());
    for path in &routes {
        texts.push(kb.read_section(path).await);
    }
    let system = build_documents_prompt(kb.firm_name(), &render_context(&texts));
    let reply = ask(llm, max_tokens, &system, &history, question).await?;
    info!(sources = ?routes, "bot: answered from documents");
    Ok(BotAnswer { reply, sources: routes, route: AnswerRoute::Documents })
}

/// Ask the routing model which sections hold the answer.
///
/// # Errors
///
/// Returns [`BotError::Llm`] if the model call fails. Unparseable output is
/// not an error; it routes to `NONE`.
pub async fn pick_files(
    llm: &dyn LlmChat,
    kb: &KnowledgeBase,
    question: &str,
    max_tokens: u32,
) -> Result<Vec<String>, BotError> {
    let user = format!(
        "AVAILABLE SECTIONS:\n{}\n\nVISITOR QUESTION: {question}\n\n\
         Reply with ONLY a JSON array of \"path\" values, for example [\"contact.md\", \"about.md\"]",
        kb.sections_summary()
    );
    let response = llm.chat(max_tokens, ROUTER_PROMPT, &[Message::user(user)]).await?;
    log_usage("route", &response);
    let routes = parse_routes(&response.text);
    info!(routes = ?routes, "bot: routed");
    Ok(routes)
}

async fn ask(
    llm: &dyn LlmChat,
    max_tokens: u32,
    system: &str,
    history: &[Message],
    question: &str,
) -> Result<String, BotError> {
    let mut messages = history.to_vec();
    messages.push(Message::user(question));
    let response = llm.chat(max_tokens, system, &messages).await?;
    log_usage("answer", &response);
    Ok(response.text.trim().to_string())
}

fn log_usage(step: &str, response: &ChatResponse) {
    info!(
        step,
        model = %response.model,
        finish_reason = %response.finish_reason,
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        "bot: llm response"
    );
}

// =============================================================================
// HELPERS
// =============================================================================

/// Last [`HISTORY_LIMIT`] widget entries as model messages.
#[must_use]
pub fn history_messages(history: &[HistoryEntry]) -> Vec<Message> {
    let skip = history.len().saturating_sub(HISTORY_LIMIT);
    history
        .iter()
        .skip(skip)
        .map(|entry| match entry.role {
            Role::Bot => Message::assistant(entry.content.clone()),
            Role::User => Message::user(entry.content.clone()),
        })
        .collect()
}

/// Parse the router's JSON array, tolerating code fences around it.
#[must_use]
pub fn parse_routes(text: &str) -> Vec<String> {
    let cleaned = text.replace("```json", "").replace("```", "");
    serde_json::from_str::<Vec<String>>(cleaned.trim()).unwrap_or_else(|_| vec![NONE_ROUTE.to_string()])
}

fn render_context(texts: &[SectionText]) -> String {
    let mut out = String::new();
    for text in texts {
        if !out.is_empty() {
            out.push('\n');
        }
        match &text.content {
            Some(content) => {
                let _ = writeln!(out, "--- FILE: {} ---\n{content}", text.path);
            }
            None => {
                let _ = writeln!(out, "--- FILE: {} --- (not found)", text.path);
            }
        }
    }
    out
}

// =============================================================================
// PROMPTS
// =============================================================================

const TONE: &str = "TONE & STYLE:
- Talk like a kind, knowledgeable friend who works at a family law firm.
- Be empathetic; the visitor may be going through one of the hardest times of their life.
- Stay conversational and reassuring, never robotic or stiff.
- Prefer plain language over legal jargon.";

const ROUTER_PROMPT: &str = "You route questions for a law firm's website assistant.
Given a visitor's question and the list of available document sections,
choose the file(s) most likely to contain the answer.

RULES:
- Return ONLY a JSON array of file paths and nothing else.
- Choose 1-3 files; fewer is better.
- For greetings or general chat, return [\"NONE\"].
- Do not explain your choice.";

fn build_overview_prompt(firm: &str, overview: &str) -> String {
    format!(
        "You are a warm, caring assistant for {firm}.
You have a quick-overview document about the firm.

{TONE}

RULES:
- If the question can be answered fully and confidently from the overview alone, answer it.
- If it is a greeting or general chat, respond warmly and offer help with anything about the firm.
- If the overview is not enough to answer properly, reply with exactly: {NEED_MORE_INFO}
- Never guess or invent details that are not in the overview.

FIRM OVERVIEW:
{overview}"
    )
}

fn build_small_talk_prompt(firm: &str) -> String {
    format!(
        "You are a warm, caring assistant for {firm}, helping people who may be facing difficult family situations.

{TONE}

- If they greet you, greet them back and let them know you can answer questions about the firm.
- If the question has nothing to do with family law or the firm, gently say you can only help with questions about {firm}."
    )
}

fn build_documents_prompt(firm: &str, context: &str) -> String {
    format!(
        "You are a warm, caring assistant for {firm}.
Answer the visitor's question using ONLY the information below.
If the answer is not there, say so kindly and suggest contacting the firm directly.

{TONE}
- Use bullet points for lists, but keep the tone warm.

FIRM INFORMATION:
{context}"
    )
}

#[cfg(test)]
#[path = "bot_test.rs"]
mod tests;
