//! Slide deck color theme and its model-driven regeneration.
//!
//! A theme always has all four slots. Regeneration asks the completion
//! service to translate a free-text suggestion into a complete new theme;
//! anything short of a complete, valid theme keeps the current one.

use serde::{Deserialize, Serialize};

use crate::error::CopilotError;
use crate::providers::CompletionService;

use super::prompts::{build_theme_prompt, extract_json_from_response};

/// An RGB triple, serialized as `[R, G, B]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Upper-case hex without a leading `#`, as OOXML `srgbClr` expects.
    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }

    /// CSS form, e.g. `#0078d4`.
    pub fn to_css(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

fn fallback_bg() -> Rgb {
    Rgb(255, 255, 255)
}
fn fallback_title() -> Rgb {
    Rgb(0, 120, 212)
}
fn fallback_body() -> Rgb {
    Rgb(0, 0, 0)
}
fn fallback_accent() -> Rgb {
    Rgb(0, 120, 212)
}

/// Four-slot deck theme.
///
/// Missing slots in a stored theme fall back to fixed defaults so a
/// theme is never partial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "fallback_bg")]
    pub bg_color: Rgb,
    #[serde(default = "fallback_title")]
    pub title_color: Rgb,
    #[serde(default = "fallback_body")]
    pub body_color: Rgb,
    #[serde(default = "fallback_accent")]
    pub accent_color: Rgb,
}

impl Default for Theme {
    /// Light grey canvas with blue titles.
    fn default() -> Self {
        Self {
            bg_color: Rgb(243, 242, 241),
            title_color: Rgb(0, 120, 212),
            body_color: Rgb(50, 49, 48),
            accent_color: Rgb(0, 120, 212),
        }
    }
}

/// What the model must return. No defaults: every key is required.
#[derive(Debug, Deserialize)]
struct ThemeReply {
    bg_color: Rgb,
    title_color: Rgb,
    body_color: Rgb,
    accent_color: Rgb,
}

impl From<ThemeReply> for Theme {
    fn from(reply: ThemeReply) -> Self {
        Theme {
            bg_color: reply.bg_color,
            title_color: reply.title_color,
            body_color: reply.body_color,
            accent_color: reply.accent_color,
        }
    }
}

/// Parse a theme-translation reply, tolerating code fences and prose.
pub fn parse_theme_response(response: &str) -> Result<Theme, CopilotError> {
    let json = extract_json_from_response(response)
        .ok_or_else(|| CopilotError::MalformedResponse("no JSON object in theme reply".into()))?;
    let reply: ThemeReply = serde_json::from_str(json)?;
    Ok(reply.into())
}

/// One attempt at translating `suggestion` into a new theme.
pub async fn try_resolve_theme(
    completion: &dyn CompletionService,
    suggestion: &str,
    current: &Theme,
) -> Result<Theme, CopilotError> {
    let prompt = build_theme_prompt(current, suggestion)?;
    let response = completion.complete(&prompt).await?;
    log::debug!("Raw theme response: {}", response);
    parse_theme_response(&response)
}

/// Translate `suggestion` into a new theme, keeping `current` on any failure.
pub async fn resolve_theme(
    completion: &dyn CompletionService,
    suggestion: &str,
    current: &Theme,
) -> Theme {
    match try_resolve_theme(completion, suggestion, current).await {
        Ok(theme) => {
            log::info!("Applied theme suggestion {:?}", suggestion);
            theme
        }
        Err(e) => {
            log::warn!("Theme suggestion {:?} not applied: {}", suggestion, e);
            *current
        }
    }
}
