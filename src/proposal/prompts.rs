//! Prompt builders and response parsers for the proposal model calls.
//!
//! Two prompts: the research/draft prompt (search results + prospect
//! emails + team chat → three proposal sections) and the theme prompt
//! (current theme + suggestion → four RGB slots). Both replies are JSON
//! objects with a fixed key set.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CopilotError;
use crate::providers::SearchHit;
use crate::types::{EmailRecord, TeamChat};

use super::sections::Section;
use super::theme::Theme;

/// The three drafted proposal sections, as the model returns them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSections {
    pub executive_summary: String,
    pub solution: String,
    pub pricing: String,
}

const DRAFT_KEYS: [&str; 3] = ["executive_summary", "solution", "pricing"];

impl DraftSections {
    /// Placeholder sections shown when research or drafting failed.
    pub fn from_error(err: &CopilotError) -> Self {
        Self {
            executive_summary: format!("Research/AI Error: {}", err),
            solution: "Check your configuration for Tavily/Gemini API keys.".to_string(),
            pricing: "Internal Error.".to_string(),
        }
    }

    /// Assemble the editable draft with one heading per section.
    pub fn to_draft(&self) -> String {
        format!(
            "{}\n{}\n\n{}\n{}\n\n{}\n{}",
            Section::ExecutiveSummary.heading(),
            self.executive_summary,
            Section::Solution.heading(),
            self.solution,
            Section::Investment.heading(),
            self.pricing
        )
    }
}

/// Search query used to research a prospect.
pub fn research_query(company: &str) -> String {
    format!(
        "{} strategic goals 2025 financial challenges recent news",
        company
    )
}

fn format_emails(emails: &[EmailRecord]) -> String {
    if emails.is_empty() {
        return "(no emails)".to_string();
    }
    emails
        .iter()
        .map(|e| {
            format!(
                "From: {}\nSubject: {}\nDate: {}\n{}",
                e.sender,
                e.subject,
                e.display_date(),
                e.body
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n")
}

fn format_chats(chats: &[TeamChat]) -> String {
    if chats.is_empty() {
        return "(no team chats)".to_string();
    }
    let mut out = String::new();
    for chat in chats {
        out.push_str(&format!("{}\n", chat.title));
        for line in &chat.messages {
            out.push_str(&format!(
                "[{}] {}: {}\n",
                line.timestamp.format("%b %d, %I:%M %p"),
                line.sender,
                line.content
            ));
        }
    }
    out
}

/// Build the research/draft prompt for a prospect.
pub fn build_research_prompt(
    company: &str,
    search_results: &[SearchHit],
    emails: &[EmailRecord],
    chats: &[TeamChat],
) -> Result<String, CopilotError> {
    let research = serde_json::to_string(search_results)?;

    Ok(format!(
        r#"You are writing a sales proposal from 'NexusCRM' (a CRM software company) to {company}.

Context gathered:
- Web Research: {research}
- Emails from the prospect:
{emails}
- Teams chat:
{chats}

Based on this information, draft a sales proposal with 3 distinct sections.
The values for each key MUST be a plain string (markdown formatted), NOT a nested JSON object.

1. **Executive Summary**: Brief overview addressing their pain points (data silos, speed issues).
2. **The NexusCRM Solution**: How our AI-powered CRM can help with their specific needs.
3. **Investment**: Pricing proposal aligned with their ~$50k/year budget, including implementation timeline for Q1.

Return the output strictly as a JSON object with keys: "executive_summary", "solution", "pricing"."#,
        company = company,
        research = research,
        emails = format_emails(emails),
        chats = format_chats(chats),
    ))
}

/// Build the theme-translation prompt.
pub fn build_theme_prompt(current: &Theme, suggestion: &str) -> Result<String, CopilotError> {
    let theme_json = serde_json::to_string(current)?;
    Ok(format!(
        r#"Current PPT Theme (RGB):
{theme_json}

User Suggestion: "{suggestion}"

Translate this suggestion into a new RGB theme.
Return strictly a JSON object with these keys:
- bg_color: [R, G, B]
- title_color: [R, G, B]
- body_color: [R, G, B]
- accent_color: [R, G, B]"#
    ))
}

/// Extract a JSON object from the response text.
/// Handles responses with markdown fences or surrounding text.
pub(crate) fn extract_json_from_response(response: &str) -> Option<&str> {
    if let Some(start) = response.find("```json") {
        let json_start = start + 7;
        if let Some(end) = response[json_start..].find("```") {
            return Some(response[json_start..json_start + end].trim());
        }
    }
    if let Some(start) = response.find("```") {
        let after_fence = start + 3;
        if let Some(nl) = response[after_fence..].find('\n') {
            let json_start = after_fence + nl + 1;
            if let Some(end) = response[json_start..].find("```") {
                let candidate = response[json_start..json_start + end].trim();
                if candidate.starts_with('{') {
                    return Some(candidate);
                }
            }
        }
    }

    let trimmed = response.trim();
    if trimmed.starts_with('{') {
        return Some(trimmed);
    }
    // Balanced-brace scan for an object embedded in prose
    let start = response.find('{')?;
    let candidate = &response[start..];
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape = false;
    for (i, ch) in candidate.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&candidate[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Coerce a reply value into section text. Nested structures become
/// pretty-printed JSON text rather than passing through as structure.
fn section_text(key: &str, value: Option<&Value>) -> Result<String, CopilotError> {
    match value {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(v @ (Value::Object(_) | Value::Array(_))) => Ok(serde_json::to_string_pretty(v)?),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => Ok(v.to_string()),
        Some(Value::Null) | None => Err(CopilotError::MalformedResponse(format!(
            "missing \"{}\" in draft reply",
            key
        ))),
    }
}

/// Parse the drafting model's reply into the three sections.
pub fn parse_draft_response(response: &str) -> Result<DraftSections, CopilotError> {
    let json = extract_json_from_response(response)
        .ok_or_else(|| CopilotError::MalformedResponse("no JSON object in draft reply".into()))?;
    let value: Value = serde_json::from_str(json)?;
    let Value::Object(map) = value else {
        return Err(CopilotError::MalformedResponse(
            "draft reply is not a JSON object".into(),
        ));
    };

    let [es, sol, pricing] = DRAFT_KEYS;
    Ok(DraftSections {
        executive_summary: section_text(es, map.get(es))?,
        solution: section_text(sol, map.get(sol))?,
        pricing: section_text(pricing, map.get(pricing))?,
    })
}
