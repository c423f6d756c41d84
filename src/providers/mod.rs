//! External text-completion and web-search services.
//!
//! The orchestrator only sees the two traits; Gemini and Tavily are the
//! production implementations.

pub mod gemini;
pub mod tavily;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CopilotError;

pub use gemini::GeminiClient;
pub use tavily::TavilyClient;

/// One web search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Prompt in, model text out.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CopilotError>;
}

/// Query in, ranked results out.
#[async_trait]
pub trait SearchService: Send + Sync {
    async fn search(
        &self,
        query: &str,
        search_depth: &str,
        max_results: u32,
    ) -> Result<Vec<SearchHit>, CopilotError>;
}

/// Stands in for a provider whose API key is not configured. Every call
/// fails with `MissingApiKey`, which the research step turns into
/// placeholder draft text.
pub struct Unconfigured(pub &'static str);

#[async_trait]
impl CompletionService for Unconfigured {
    async fn complete(&self, _prompt: &str) -> Result<String, CopilotError> {
        Err(CopilotError::MissingApiKey(self.0))
    }
}

#[async_trait]
impl SearchService for Unconfigured {
    async fn search(
        &self,
        _query: &str,
        _search_depth: &str,
        _max_results: u32,
    ) -> Result<Vec<SearchHit>, CopilotError> {
        Err(CopilotError::MissingApiKey(self.0))
    }
}

/// Shared HTTP client, with a timeout only when one is configured.
pub(crate) fn http_client(timeout_secs: Option<u64>) -> Result<reqwest::Client, CopilotError> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(builder.build()?)
}

/// Turn a non-success response into `CopilotError::Api`.
pub(crate) async fn check_status(
    service: &'static str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, CopilotError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let message = resp.text().await.unwrap_or_default();
    log::error!("{} API error {}: {}", service, status, message);
    Err(CopilotError::Api {
        service,
        status,
        message,
    })
}

#[cfg(test)]
pub(crate) mod test_utils {
    use std::collections::VecDeque;

    use parking_lot::Mutex;

    use super::*;

    /// Scripted completion replies; records every prompt it sees.
    #[derive(Default)]
    pub struct FakeCompletion {
        replies: Mutex<VecDeque<Result<String, CopilotError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeCompletion {
        pub fn with_replies(
            replies: impl IntoIterator<Item = Result<String, CopilotError>>,
        ) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().clone()
        }
    }

    #[async_trait]
    impl CompletionService for FakeCompletion {
        async fn complete(&self, prompt: &str) -> Result<String, CopilotError> {
            self.prompts.lock().push(prompt.to_string());
            self.replies
                .lock()
                .pop_front()
                .unwrap_or(Err(CopilotError::EmptyResponse))
        }
    }

    /// Returns the same hits (or a failure) for every query.
    pub struct FakeSearch {
        hits: Option<Vec<SearchHit>>,
        queries: Mutex<Vec<String>>,
    }

    impl FakeSearch {
        pub fn with_hits(hits: Vec<SearchHit>) -> Self {
            Self {
                hits: Some(hits),
                queries: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                hits: None,
                queries: Mutex::new(Vec::new()),
            }
        }

        pub fn queries(&self) -> Vec<String> {
            self.queries.lock().clone()
        }
    }

    #[async_trait]
    impl SearchService for FakeSearch {
        async fn search(
            &self,
            query: &str,
            _search_depth: &str,
            _max_results: u32,
        ) -> Result<Vec<SearchHit>, CopilotError> {
            self.queries.lock().push(query.to_string());
            self.hits.clone().ok_or(CopilotError::Api {
                service: "Tavily",
                status: 503,
                message: "unavailable".to_string(),
            })
        }
    }

    pub fn sample_hit() -> SearchHit {
        SearchHit {
            title: "Acme expands".to_string(),
            url: "https://news.example.com/acme".to_string(),
            content: "Acme plans a 2025 digital push.".to_string(),
            score: Some(0.8),
        }
    }
}
