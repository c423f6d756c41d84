use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Main configuration loaded from ~/.nexus-copilot/config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tavily_api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,
    #[serde(default = "default_tavily_base_url")]
    pub tavily_base_url: String,
    #[serde(default = "default_search_depth")]
    pub search_depth: String,
    #[serde(default = "default_max_search_results")]
    pub max_search_results: u32,
    /// Where rendered decks are written. Temp files when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    /// Per-request HTTP timeout. The client default (none) applies when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    /// Reference documents listed in the knowledge panel at session start.
    #[serde(default = "default_knowledge_files")]
    pub knowledge_files: Vec<String>,
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models".to_string()
}

fn default_tavily_base_url() -> String {
    "https://api.tavily.com".to_string()
}

fn default_search_depth() -> String {
    "advanced".to_string()
}

fn default_max_search_results() -> u32 {
    5
}

fn default_knowledge_files() -> Vec<String> {
    vec![
        "Company_Overview.pdf".to_string(),
        "Pricing_Tier_2025.pptx".to_string(),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            tavily_api_key: None,
            model: default_model(),
            gemini_base_url: default_gemini_base_url(),
            tavily_base_url: default_tavily_base_url(),
            search_depth: default_search_depth(),
            max_search_results: default_max_search_results(),
            output_dir: None,
            request_timeout_secs: None,
            knowledge_files: default_knowledge_files(),
        }
    }
}

/// A prospect email surfaced to the copilot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRecord {
    pub sender: String,
    pub subject: String,
    pub date: DateTime<Local>,
    pub body: String,
}

impl EmailRecord {
    /// Display form of the date, e.g. "March 04, 2025 at 09:15 AM".
    pub fn display_date(&self) -> String {
        self.date.format("%B %d, %Y at %I:%M %p").to_string()
    }
}

/// A single line in a team chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatLine {
    /// "Name (Role)"
    pub sender: String,
    pub timestamp: DateTime<Local>,
    pub content: String,
}

/// A team group chat about the prospect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamChat {
    pub title: String,
    /// Each entry is "Name (Role)".
    pub participants: Vec<String>,
    pub messages: Vec<ChatLine>,
}

/// Where a contact was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactSource {
    Email,
    ChatParticipant,
}

/// A potential proposal recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub email: String,
    pub display_name: String,
    pub source: ContactSource,
}

/// Bookkeeping for the latest "send" of a proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRecord {
    /// Chat message the send was triggered from.
    pub message_id: usize,
    pub recipient_emails: Vec<String>,
    pub sent_at: DateTime<Utc>,
}
