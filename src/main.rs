use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use nexus_copilot_lib::chat::{ChatMessage, Role};
use nexus_copilot_lib::error::UiError;
use nexus_copilot_lib::state::{load_config, load_config_from};
use nexus_copilot_lib::{CopilotError, ProposalOrchestrator, SessionStore};

/// Research a prospect, draft a proposal, and render it as a slide deck.
#[derive(Parser, Debug)]
#[command(name = "nexus-copilot", version, about)]
struct Cli {
    /// Chat message, e.g. "@SPG create proposal for Tesla"
    #[arg(value_name = "MESSAGE")]
    message: String,

    /// Replace the generated draft with this file's contents before rendering
    #[arg(long, value_name = "FILE")]
    draft: Option<PathBuf>,

    /// Theme suggestion, e.g. "Dark mode with gold accents"
    #[arg(long, value_name = "TEXT")]
    theme: Option<String>,

    /// Directory for the rendered .pptx (a temp file otherwise)
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Recipient email; repeat for several
    #[arg(long = "send", value_name = "EMAIL", conflicts_with = "send_all")]
    send: Vec<String>,

    /// Send to every discovered contact
    #[arg(long)]
    send_all: bool,

    /// JSON config file (default ~/.nexus-copilot/config.json)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn print_message(message: &ChatMessage) {
    let who = match message.role {
        Role::User => "you",
        Role::Assistant => "copilot",
    };
    println!("[{}] {}", who, message.content);
}

async fn run(cli: Cli) -> Result<(), CopilotError> {
    let mut config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    if let Some(dir) = &cli.out {
        config.output_dir = Some(dir.to_string_lossy().to_string());
    }

    let orchestrator = ProposalOrchestrator::from_config(&config)?;
    let store = SessionStore::new();
    let session_id = store.create(&config);
    let Some(session) = store.get(&session_id) else {
        return Err(CopilotError::Config("session vanished".to_string()));
    };
    let mut session = session.lock().await;

    orchestrator.handle_message(&mut session, &cli.message).await;
    if session.company.name.is_empty() {
        session.messages.iter().for_each(print_message);
        return Ok(());
    }

    if let Some(path) = &cli.draft {
        let text = std::fs::read_to_string(path)?;
        orchestrator.edit_draft(&mut session, &text);
    }
    if let Some(suggestion) = &cli.theme {
        orchestrator.regenerate_theme(&mut session, suggestion).await;
    }

    let (download_id, document) = orchestrator.confirm_draft(&mut session);
    let path = orchestrator.save_artifact(&session)?;

    let contacts = orchestrator.contacts(&session);
    let recipients: Vec<String> = if cli.send_all {
        contacts.iter().map(|c| c.email.clone()).collect()
    } else {
        cli.send.clone()
    };
    orchestrator.select_recipients(&mut session, download_id, &recipients)?;
    let record = orchestrator.send(&mut session, download_id);

    session.messages.iter().for_each(print_message);

    println!("\nSlides:");
    for (idx, preview) in document.previews().iter().enumerate() {
        println!(
            "  {}. {} (bg {}, title {})",
            idx + 1,
            preview.title,
            preview.background_css,
            preview.title_css
        );
        println!("     {}", preview.excerpt.replace('\n', " "));
    }
    println!("\nPresentation: {}", path.display());

    println!("\nContacts:");
    for contact in &contacts {
        println!("  {} <{}>", contact.display_name, contact.email);
    }

    if let Some(record) = record {
        println!("\nSend record:\n{}", serde_json::to_string_pretty(&record)?);
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let ui = UiError::from(&e);
            eprintln!("Error: {}\n{}", ui.message, ui.recovery_suggestion);
            ExitCode::FAILURE
        }
    }
}
