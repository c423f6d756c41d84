//! Chat transcript model and the `@SPG` command grammar.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

pub const HELP_MESSAGE: &str = "👋 I'm the **NexusCRM Sales Proposal Agent**. Tag me with `@SPG create proposal for [Company Name]` to get started!";

pub const GENERATING_MESSAGE: &str = "Generating your PowerPoint presentation...";

fn command_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)@SPG.*for\s+(.+)").unwrap())
}

/// Company name from a proposal command, if the message is one.
///
/// Example: "@SPG create proposal for Tesla" → Some("Tesla")
pub fn parse_command(text: &str) -> Option<String> {
    let caps = command_regex().captures(text)?;
    let company = caps.get(1)?.as_str().trim();
    if company.is_empty() {
        None
    } else {
        Some(company.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// How the UI should render a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Plain,
    /// The draft is ready to edit.
    DraftEditor,
    /// A deck is ready to download and send.
    Download,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    /// Index in the transcript.
    pub id: usize,
    pub role: Role,
    pub content: String,
    pub kind: MessageKind,
}
