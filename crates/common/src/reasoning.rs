use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Result, Subscriber};

/// Snapshot of a subscriber's selections handed to the reasoning service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub symbol: String,
    pub timeframe: String,
    pub expiration: String,
    pub session: String,
    pub strategy: String,
}

impl AnalysisRequest {
    /// Build from a subscriber record, rendering unset fields as `"-"`.
    pub fn from_subscriber(sub: &Subscriber) -> Self {
        fn or_dash(v: &Option<String>) -> String {
            v.clone().unwrap_or_else(|| "-".to_string())
        }
        Self {
            symbol: or_dash(&sub.symbol),
            timeframe: or_dash(&sub.timeframe),
            expiration: or_dash(&sub.expiration),
            session: or_dash(&sub.session),
            strategy: or_dash(&sub.strategy),
        }
    }
}

/// Client for the external natural-language analysis service.
///
/// `HttpReasoningClient` in `crates/reasoning` implements this. Retry and
/// backoff are the service client's concern, not the dialogue's; the
/// engine degrades any error to a user-visible message.
#[async_trait]
pub trait ReasoningClient: Send + Sync {
    /// Produce a free-text analysis for the given setup.
    async fn analyze(&self, request: &AnalysisRequest) -> Result<String>;
}
