//! Client for Quizlet's internal web API.
//!
//! Quizlet blocks requests that do not look like a desktop browser and
//! intermittently answers `403 Forbidden` to scrapers. The client therefore
//! sends a browser User-Agent, keeps cookies between requests and retries
//! `403` a bounded number of times.

pub mod models;

use crate::domain::model::QuizletCard;
use crate::domain::ports::QuizletModuleParser;
use crate::utils::error::{CardsError, Result};
use async_trait::async_trait;
use models::StudiableItemsResponse;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_BASE_URL: &str = "https://quizlet.com/webapi/3.4";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";
pub const DEFAULT_FETCH_ATTEMPTS: u32 = 10;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(200);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct QuizletSettings {
    pub base_url: String,
    pub user_agent: String,
    pub fetch_attempts: u32,
    pub retry_delay: Duration,
    pub timeout: Duration,
}

impl Default for QuizletSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fetch_attempts: DEFAULT_FETCH_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

pub struct QuizletParser {
    client: Client,
    settings: QuizletSettings,
}

impl QuizletParser {
    pub fn new() -> Result<Self> {
        Self::with_settings(QuizletSettings::default())
    }

    pub fn with_settings(settings: QuizletSettings) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .user_agent(settings.user_agent.clone())
            .timeout(settings.timeout)
            .build()?;

        Ok(Self { client, settings })
    }

    /// 組出 studiable-item-documents 的完整網址（只取一頁，最多 1000 筆）
    fn studiable_items_url(&self, module_id: &str) -> String {
        let encoded_id: String = url::form_urlencoded::byte_serialize(module_id.as_bytes()).collect();

        format!(
            "{}/studiable-item-documents?filters[studiableContainerId]={}&filters[studiableContainerType]=1&perPage=1000&page=1",
            self.settings.base_url.trim_end_matches('/'),
            encoded_id
        )
    }

    async fn fetch_studiable_items(
        &self,
        module_id: &str,
        cancel: &CancellationToken,
    ) -> Result<StudiableItemsResponse> {
        let url = self.studiable_items_url(module_id);
        let attempts = self.settings.fetch_attempts.max(1);

        for attempt in 1..=attempts {
            if cancel.is_cancelled() {
                return Err(CardsError::Cancelled);
            }

            tracing::debug!(module_id, attempt, "requesting studiable items");
            let response = self.client.get(&url).send().await?;

            if response.status() == StatusCode::FORBIDDEN {
                tracing::debug!(module_id, attempt, "quizlet answered 403");

                if attempt < attempts {
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(CardsError::Cancelled),
                        _ = tokio::time::sleep(self.settings.retry_delay) => {}
                    }
                }
                continue;
            }

            return Ok(response.json::<StudiableItemsResponse>().await?);
        }

        Err(CardsError::ModuleFetchError {
            id: module_id.to_string(),
        })
    }
}

#[async_trait]
impl QuizletModuleParser for QuizletParser {
    async fn parse(&self, module_id: &str, cancel: &CancellationToken) -> Result<Vec<QuizletCard>> {
        let response = self.fetch_studiable_items(module_id, cancel).await?;

        response.into_cards().ok_or_else(|| CardsError::ModuleParseError {
            id: module_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_studiable_items_url() {
        let parser = QuizletParser::with_settings(QuizletSettings {
            base_url: "http://localhost:1234/webapi/3.4/".to_string(),
            ..QuizletSettings::default()
        })
        .unwrap();

        assert_eq!(
            parser.studiable_items_url("768736583"),
            "http://localhost:1234/webapi/3.4/studiable-item-documents?filters[studiableContainerId]=768736583&filters[studiableContainerType]=1&perPage=1000&page=1"
        );
        assert!(parser
            .studiable_items_url("a&b")
            .contains("studiableContainerId]=a%26b&"));
    }

    #[test]
    fn test_default_settings() {
        let settings = QuizletSettings::default();
        assert_eq!(settings.fetch_attempts, 10);
        assert_eq!(settings.retry_delay, Duration::from_millis(200));
        assert!(settings.user_agent.starts_with("Mozilla/5.0"));
    }
}
