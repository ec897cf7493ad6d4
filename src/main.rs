use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use leadchat::config::{ConfigError, ServerConfig};
use leadchat::llm::{self, LlmChat};
use leadchat::protocol::LeadRequest;
use leadchat::services::knowledge::{KnowledgeBase, KnowledgeError};
use leadchat::state::AppState;
use leadchat::widget::backend::{BackendError, LeadSubmitError};
use leadchat::widget::session::{ChatMessage, LeadPromptCard};
use leadchat::widget::{
    ChatBackend, ChatSession, HttpChatBackend, HttpLeadSubmitter, LeadSubmitter, MockLeadSubmitter, WidgetConfig,
};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("knowledge base: {0}")]
    Knowledge(#[from] KnowledgeError),
    #[error("chat backend: {0}")]
    Backend(#[from] BackendError),
    #[error("lead submitter: {0}")]
    Lead(#[from] LeadSubmitError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "leadchat", about = "Law firm chat assistant and lead-capture widget")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the website and the chat API.
    Serve,
    /// Run the chat widget in the terminal against a running server.
    Chat {
        #[arg(long, env = "LEADCHAT_BASE_URL", default_value = "http://127.0.0.1:5000")]
        base_url: String,
        #[arg(long, value_enum, default_value_t = PolicyArg::Progressive)]
        policy: PolicyArg,
        #[arg(long, value_enum, default_value_t = LeadArg::Mock)]
        lead: LeadArg,
        /// Print replies as rendered HTML instead of raw text.
        #[arg(long)]
        html: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyArg {
    GateFirst,
    Progressive,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LeadArg {
    Mock,
    Http,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve => run_serve().await,
        Command::Chat { base_url, policy, lead, html } => run_chat(&base_url, policy, lead, html).await,
    }
}

// =============================================================================
// SERVE
// =============================================================================

async fn run_serve() -> Result<(), CliError> {
    let config = ServerConfig::from_env()?;
    let knowledge = KnowledgeBase::load(&config.content_dir, &config.index_file, &config.overview_file).await?;
    tracing::info!(
        firm = knowledge.firm_name(),
        sections = knowledge.sections().len(),
        overview = knowledge.overview().is_some(),
        "knowledge base loaded"
    );

    // Non-fatal: chat answers 503 until a key is configured.
    let llm: Option<Arc<dyn LlmChat>> = match llm::client_from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), "LLM client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM client not configured; chat disabled");
            None
        }
    };

    let state = AppState::new(llm, knowledge, config.max_tokens);
    let app = leadchat::routes::app(state, &config.site_dir);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    tracing::info!(port = config.port, site = %config.site_dir.display(), "leadchat listening");
    axum::serve(listener, app).await?;
    Ok(())
}

// =============================================================================
// TERMINAL WIDGET
// =============================================================================

const HELP: &str = "commands: /skip, /lead <email> <phone>, /close, /open, /quit";

async fn run_chat(base_url: &str, policy: PolicyArg, lead: LeadArg, html: bool) -> Result<(), CliError> {
    let config = match policy {
        PolicyArg::GateFirst => WidgetConfig::gate_first(),
        PolicyArg::Progressive => WidgetConfig::progressive(),
    };
    let backend: Arc<dyn ChatBackend> = Arc::new(HttpChatBackend::new(base_url)?);
    let leads: Arc<dyn LeadSubmitter> = match lead {
        LeadArg::Mock => Arc::new(MockLeadSubmitter::default()),
        LeadArg::Http => Arc::new(HttpLeadSubmitter::new(base_url)?),
    };
    let mut session = ChatSession::new(config, backend, leads);

    println!("{HELP}");
    if let Some(card) = session.open_panel().await {
        print_card(card);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let mut words = line.split_whitespace();
        match words.next() {
            Some("/quit") => break,
            Some("/close") => session.close_panel(),
            Some("/open") => {
                if let Some(card) = session.open_panel().await {
                    print_card(card);
                }
            }
            Some("/skip") => match session.skip_prompt() {
                Ok(()) => println!("(prompt dismissed)"),
                Err(e) => println!("! {e}"),
            },
            Some("/lead") => {
                let email = words.next().unwrap_or_default().to_string();
                let phone = words.next().unwrap_or_default().to_string();
                if let Some(card) = session.prompt_card() {
                    println!("[{}]", card.sending().submit_label());
                }
                match session.submit_lead(LeadRequest { email, phone }).await {
                    Ok(message) => print_message(&message, html),
                    Err(e) => println!("! {}", e.notice()),
                }
            }
            Some(_) => match session.send(line).await {
                Ok(outcome) => {
                    print_message(&outcome.reply, html);
                    if let Some(card) = outcome.prompt {
                        print_card(card);
                    }
                }
                Err(e) => println!("! {e} ({})", session.input_placeholder()),
            },
            None => {}
        }
    }
    Ok(())
}

fn print_message(message: &ChatMessage, html: bool) {
    let body = if html { &message.html } else { &message.text };
    println!("[{}] {}: {body}", message.time_label(), message.role.as_str());
}

fn print_card(card: LeadPromptCard) {
    println!("* {}", card.text());
    if card.skippable() {
        println!("  /lead <email> <phone> or /skip");
    } else {
        println!("  /lead <email> <phone>");
    }
}
