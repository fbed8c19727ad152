use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use common::{AnalysisRequest, Error, ReasoningClient, Result};

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

/// HTTP client for the generative-language analysis service.
///
/// One request per analysis action, bounded by a client-wide timeout. No
/// retries — the dialogue degrades any failure to a user-visible message.
pub struct HttpReasoningClient {
    url: String,
    api_key: String,
    http: Client,
}

impl HttpReasoningClient {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            http: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    fn build_prompt(request: &AnalysisRequest) -> String {
        format!(
            "You are a trading assistant. Give a short market analysis for this setup.\n\
             Instrument: {}\nTimeframe: {}\nExpiration: {}\nSession: {}\nStrategy: {}\n\
             Keep it under 120 words and end with a clear bias.",
            request.symbol, request.timeframe, request.expiration, request.session, request.strategy
        )
    }
}

#[async_trait]
impl ReasoningClient for HttpReasoningClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<String> {
        let url = format!("{}?key={}", self.url, self.api_key);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Self::build_prompt(request),
                }],
            }],
        };

        debug!(symbol = %request.symbol, "Requesting analysis");
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Reasoning(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Reasoning(format!("HTTP {status}: {body}")));
        }

        let parsed: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| Error::Reasoning(format!("invalid response body: {e}")))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Reasoning("response contained no analysis text".to_string()))
    }
}
