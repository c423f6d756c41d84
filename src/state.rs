use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::chat::{ChatMessage, MessageKind, Role};
use crate::error::CopilotError;
use crate::proposal::Theme;
use crate::types::{Config, EmailRecord, SendRecord, TeamChat};

/// The prospect being worked on and its draft.
#[derive(Debug, Clone, Default)]
pub struct CompanyData {
    pub name: String,
    /// As generated by the research step.
    pub full_draft: String,
    /// As last edited by the user. Documents are built from this one.
    pub edited_full_draft: String,
    pub theme: Theme,
}

/// Everything one user session owns. Lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub company: CompanyData,
    pub messages: Vec<ChatMessage>,
    pub knowledge_files: Vec<String>,
    pub emails: Vec<EmailRecord>,
    pub chats: Vec<TeamChat>,
    /// Recipient selection per Download message id.
    pub pending_recipients: HashMap<usize, Vec<String>>,
    pub last_send: Option<SendRecord>,
}

impl SessionState {
    pub fn new(config: &Config) -> Self {
        let mut state = Self::default();
        for name in &config.knowledge_files {
            state.register_knowledge_file(name);
        }
        state
    }

    /// Append to the transcript; returns the new message id.
    pub fn push_message(&mut self, role: Role, content: impl Into<String>, kind: MessageKind) -> usize {
        let id = self.messages.len();
        self.messages.push(ChatMessage {
            id,
            role,
            content: content.into(),
            kind,
        });
        id
    }

    pub fn message(&self, id: usize) -> Option<&ChatMessage> {
        self.messages.get(id)
    }

    /// Add a reference document name. Returns false if already listed.
    pub fn register_knowledge_file(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.knowledge_files.iter().any(|f| f == name) {
            return false;
        }
        self.knowledge_files.push(name.to_string());
        true
    }
}

/// Session id → state. Each session has its own async lock so a handler
/// can hold it across provider calls without blocking other sessions.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<SessionState>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, config: &Config) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions
            .lock()
            .insert(id, Arc::new(tokio::sync::Mutex::new(SessionState::new(config))));
        log::info!("Session {} created", id);
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<tokio::sync::Mutex<SessionState>>> {
        self.sessions.lock().get(id).cloned()
    }

    pub fn remove(&self, id: &Uuid) -> bool {
        self.sessions.lock().remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// ~/.nexus-copilot/config.json
pub fn config_path() -> Result<PathBuf, CopilotError> {
    let home = dirs::home_dir()
        .ok_or_else(|| CopilotError::Config("Could not find home directory".to_string()))?;
    Ok(home.join(".nexus-copilot").join("config.json"))
}

/// Load configuration from the default path, then apply env overrides.
pub fn load_config() -> Result<Config, CopilotError> {
    load_config_from(&config_path()?)
}

/// Load configuration from `path`, then apply env overrides.
pub fn load_config_from(path: &Path) -> Result<Config, CopilotError> {
    let mut config = read_config(path)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Parse the config file alone. A missing file means all defaults.
fn read_config(path: &Path) -> Result<Config, CopilotError> {
    if path.exists() {
        let content =
            fs::read_to_string(path).map_err(|_| CopilotError::ConfigUnreadable(path.to_path_buf()))?;
        serde_json::from_str(&content)
            .map_err(|e| CopilotError::Config(format!("Failed to parse {}: {}", path.display(), e)))
    } else {
        log::info!("No config at {}, using defaults", path.display());
        Ok(Config::default())
    }
}

/// Environment wins over the file. Empty values are ignored.
fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    if let Some(key) = get("GEMINI_API_KEY") {
        config.gemini_api_key = Some(key);
    }
    if let Some(key) = get("TAVILY_API_KEY") {
        config.tavily_api_key = Some(key);
    }
    if let Some(model) = get("NEXUS_COPILOT_MODEL") {
        config.model = model;
    }
}
