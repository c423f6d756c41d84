//! Error types for the proposal pipeline
//!
//! Errors are classified by who has to act:
//! - External: provider HTTP failures, bad model output
//! - RequiresUserAction: missing API keys, broken config
//! - Local: packaging failures, invalid send selections

use std::path::PathBuf;
use thiserror::Error;

/// Error types for the copilot
#[derive(Debug, Error)]
pub enum CopilotError {
    // External service failures
    #[error("HTTP: {0}")]
    Http(#[source] reqwest::Error),

    #[error("{service} API error {status}: {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    // Requires user action
    #[error("No API key configured for {0}")]
    MissingApiKey(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file not readable at {0}")]
    ConfigUnreadable(PathBuf),

    // Local failures
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Slide deck packaging failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Slide XML error: {0}")]
    Xml(String),

    #[error("No chat message with id {0}")]
    UnknownMessage(usize),

    #[error("{0} is not one of the available contacts")]
    UnknownRecipient(String),
}

// Request URLs can carry credentials; keep them out of messages.
impl From<reqwest::Error> for CopilotError {
    fn from(err: reqwest::Error) -> Self {
        CopilotError::Http(err.without_url())
    }
}

impl CopilotError {
    /// Returns true if this error requires user action to resolve
    pub fn requires_user_action(&self) -> bool {
        matches!(
            self,
            CopilotError::MissingApiKey(_)
                | CopilotError::Config(_)
                | CopilotError::ConfigUnreadable(_)
        )
    }

    /// Returns true if the failure came from a provider rather than local code
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            CopilotError::Http(_)
                | CopilotError::Api { .. }
                | CopilotError::EmptyResponse
                | CopilotError::MalformedResponse(_)
                | CopilotError::Json(_)
        )
    }

    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CopilotError::Http(_) => "Check your internet connection and try again.",
            CopilotError::Api { status: 401, .. } | CopilotError::Api { status: 403, .. } => {
                "Check the API key in ~/.nexus-copilot/config.json or your environment."
            }
            CopilotError::Api { .. } => "The provider rejected the request. Try again later.",
            CopilotError::EmptyResponse | CopilotError::MalformedResponse(_) => {
                "The model answered in an unexpected format. Try again."
            }
            CopilotError::Json(_) => "The provider returned invalid JSON. Try again.",
            CopilotError::MissingApiKey(_) => {
                "Set GEMINI_API_KEY / TAVILY_API_KEY or add them to ~/.nexus-copilot/config.json"
            }
            CopilotError::Config(_) | CopilotError::ConfigUnreadable(_) => {
                "Check your configuration in ~/.nexus-copilot/config.json"
            }
            CopilotError::Io(_) => "Check file permissions and disk space.",
            CopilotError::Zip(_) | CopilotError::Xml(_) => "Regenerate the presentation.",
            CopilotError::UnknownMessage(_) => "Refresh the conversation and try again.",
            CopilotError::UnknownRecipient(_) => "Pick recipients from the contact list.",
        }
    }
}

/// Serializable error representation for inline display
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiError {
    pub message: String,
    pub error_type: ErrorType,
    pub recovery_suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorType {
    External,
    RequiresUserAction,
    Local,
}

impl From<&CopilotError> for UiError {
    fn from(err: &CopilotError) -> Self {
        let error_type = if err.requires_user_action() {
            ErrorType::RequiresUserAction
        } else if err.is_external() {
            ErrorType::External
        } else {
            ErrorType::Local
        };

        UiError {
            message: err.to_string(),
            error_type,
            recovery_suggestion: err.recovery_suggestion().to_string(),
        }
    }
}
