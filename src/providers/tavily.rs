//! Tavily web search client. Bearer token auth.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::CopilotError;
use crate::types::Config;

use super::{check_status, http_client, SearchHit, SearchService};

const SERVICE: &str = "Tavily";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

pub struct TavilyClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl TavilyClient {
    pub fn new(
        api_key: &str,
        base_url: &str,
        timeout_secs: Option<u64>,
    ) -> Result<Self, CopilotError> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, CopilotError> {
        let key = config
            .tavily_api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(CopilotError::MissingApiKey(SERVICE))?;
        Self::new(key, &config.tavily_base_url, config.request_timeout_secs)
    }
}

#[async_trait]
impl SearchService for TavilyClient {
    async fn search(
        &self,
        query: &str,
        search_depth: &str,
        max_results: u32,
    ) -> Result<Vec<SearchHit>, CopilotError> {
        let body = serde_json::json!({
            "query": query,
            "search_depth": search_depth,
            "max_results": max_results,
        });
        log::info!("Tavily search: {:?} (depth={})", query, search_depth);

        let resp = self
            .client
            .post(format!("{}/search", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let resp = check_status(SERVICE, resp).await?;

        let parsed: SearchResponse = resp.json().await?;
        log::info!("Tavily returned {} results", parsed.results.len());
        Ok(parsed.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_requires_key() {
        assert!(matches!(
            TavilyClient::from_config(&Config::default()),
            Err(CopilotError::MissingApiKey("Tavily"))
        ));
        let config = Config {
            tavily_api_key: Some("tvly-test".to_string()),
            ..Config::default()
        };
        assert!(TavilyClient::from_config(&config).is_ok());
    }

    #[test]
    fn test_parse_search_response() {
        let parsed: SearchResponse = serde_json::from_str(
            r#"{"query":"q","results":[{"title":"A","url":"https://a","content":"x","score":0.91,"raw_content":null}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.results.len(), 1);
        assert_eq!(parsed.results[0].score, Some(0.91));

        let empty: SearchResponse = serde_json::from_str(r#"{"query":"q"}"#).unwrap();
        assert!(empty.results.is_empty());
    }
}
