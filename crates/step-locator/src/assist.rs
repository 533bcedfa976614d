//! Assisted selector recovery.
//!
//! The suggestion service lives behind [`SuggestionClient`]; the resolver
//! treats whatever comes back as an untrusted hint and re-verifies it by
//! actually locating the node. Calls go through [`call_with_retry`] so
//! transient transport failures get a bounded exponential backoff.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use page_bridge::SelectorMethod;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    pub failed_selector: String,
    pub descriptive_term: String,
    pub page_url: String,
    pub dom_snippet: String,
    pub original_step: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResponse {
    pub suggested_selector: String,
    pub suggested_strategy: SelectorMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternative_selectors: Vec<String>,
}

#[derive(Debug, Error)]
pub enum AssistError {
    #[error("suggestion transport failed: {0}")]
    Transport(String),

    #[error("suggestion service returned no usable data: {0}")]
    Empty(String),
}

/// External selector-suggestion service.
#[async_trait]
pub trait SuggestionClient: Send + Sync {
    async fn suggest(&self, request: &SuggestionRequest) -> Result<SuggestionResponse, AssistError>;
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(250),
        }
    }
}

/// Run `call` up to `policy.max_retries` times with exponential backoff
/// (base, 2x base, 4x base, ...).
pub async fn call_with_retry<T, F, Fut>(
    policy: RetryPolicy,
    description: &str,
    mut call: F,
) -> Result<T, AssistError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AssistError>>,
{
    let mut delay = policy.base_delay;
    let attempts = policy.max_retries.max(1);
    let mut last_err = None;
    for attempt in 1..=attempts {
        match call().await {
            Ok(value) => {
                debug!(description, attempt, "suggestion call succeeded");
                return Ok(value);
            }
            Err(err) => {
                warn!(description, attempt, %err, "suggestion call failed");
                last_err = Some(err);
                if attempt < attempts {
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }
    Err(last_err.unwrap_or_else(|| AssistError::Empty(description.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_until_success() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(1),
        };
        let result = call_with_retry(policy, "suggest", || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err(AssistError::Transport("flaky".into()))
                } else {
                    Ok(n)
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(result, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(1),
        };
        let result: Result<u32, _> = call_with_retry(policy, "suggest", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AssistError::Transport("down".into())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn response_wire_shape() {
        let json = r##"{
            "suggestedSelector": "#save",
            "suggestedStrategy": "css",
            "confidence": 0.4,
            "alternativeSelectors": ["[data-testid=\"save\"]"]
        }"##;
        let resp: SuggestionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.suggested_selector, "#save");
        assert_eq!(resp.suggested_strategy, SelectorMethod::Css);
        assert_eq!(resp.alternative_selectors.len(), 1);
    }
}
