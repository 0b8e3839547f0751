//! Cloud Read (OCR) client
//!
//! Two-step protocol: the image is submitted and the service answers with an
//! `Operation-Location` job URL, which is then polled at a fixed interval for
//! a bounded number of attempts.

use std::time::Duration;

use bagtrack_common::config::RecognitionConfig;
use serde::Deserialize;
use thiserror::Error;

const READ_ANALYZE_PATH: &str = "vision/v3.2/read/analyze";
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const OPERATION_LOCATION_HEADER: &str = "Operation-Location";
const USER_AGENT: &str = concat!("bagtrack/", env!("CARGO_PKG_VERSION"));

/// Recognition client errors
#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Response missing Operation-Location header")]
    MissingOperationLocation,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Recognition job failed: {0}")]
    JobFailed(String),

    #[error("No result after {attempts} polls")]
    Timeout { attempts: u32 },

    #[error("Recognition service not configured")]
    NotConfigured,
}

/// Terminal state of a polled job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Job finished; recognized lines in page/line order
    Succeeded(Vec<String>),
    /// Service reported failure
    Failed(String),
    /// Attempt budget exhausted while the job was still pending
    TimedOut { attempts: u32 },
}

/// Job status document returned by the operation URL
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadOperation {
    pub status: String,
    #[serde(default)]
    pub analyze_result: Option<AnalyzeResult>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResult {
    #[serde(default)]
    pub read_results: Vec<ReadPage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadPage {
    #[serde(default)]
    pub lines: Vec<ReadLine>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadLine {
    #[serde(default)]
    pub text: String,
}

impl ReadOperation {
    /// Trimmed line texts across all pages
    pub fn lines(&self) -> Vec<String> {
        self.analyze_result
            .iter()
            .flat_map(|r| &r.read_results)
            .flat_map(|page| &page.lines)
            .map(|line| line.text.trim().to_string())
            .collect()
    }
}

/// Read API client
pub struct RecognitionClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
    poll_interval: Duration,
    max_attempts: u32,
}

impl RecognitionClient {
    pub fn new(
        endpoint: &str,
        api_key: String,
        config: &RecognitionConfig,
    ) -> Result<Self, RecognitionError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| RecognitionError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_attempts: config.max_attempts.max(1),
        })
    }

    /// Build from configuration; `NotConfigured` without endpoint or key
    pub fn from_config(
        config: &RecognitionConfig,
        api_key: Option<String>,
    ) -> Result<Self, RecognitionError> {
        match (config.endpoint.as_deref(), api_key) {
            (Some(endpoint), Some(key)) if !endpoint.trim().is_empty() => {
                Self::new(endpoint, key, config)
            }
            _ => Err(RecognitionError::NotConfigured),
        }
    }

    /// Submit an image; returns the job URL to poll
    pub async fn submit(&self, image: Vec<u8>) -> Result<String, RecognitionError> {
        let url = format!("{}/{}", self.endpoint, READ_ANALYZE_PATH);

        tracing::debug!(bytes = image.len(), "Submitting image to Read API");

        let response = self
            .http_client
            .post(&url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image)
            .send()
            .await
            .map_err(|e| RecognitionError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK && status != reqwest::StatusCode::ACCEPTED {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RecognitionError::ApiError(status.as_u16(), error_text));
        }

        response
            .headers()
            .get(OPERATION_LOCATION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or(RecognitionError::MissingOperationLocation)
    }

    /// Fetch the job status once
    pub async fn poll(&self, operation_url: &str) -> Result<ReadOperation, RecognitionError> {
        let response = self
            .http_client
            .get(operation_url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| RecognitionError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RecognitionError::ApiError(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| RecognitionError::ParseError(e.to_string()))
    }

    /// Poll until the job finishes or the attempt budget runs out
    pub async fn wait_for_result(&self, operation_url: &str) -> Result<PollOutcome, RecognitionError> {
        for attempt in 1..=self.max_attempts {
            let operation = self.poll(operation_url).await?;

            match operation.status.as_str() {
                "succeeded" => {
                    tracing::debug!(attempt, "Read job succeeded");
                    return Ok(PollOutcome::Succeeded(operation.lines()));
                }
                "failed" => {
                    return Ok(PollOutcome::Failed(format!(
                        "job reported failure after {} polls",
                        attempt
                    )));
                }
                other => {
                    tracing::trace!(attempt, status = other, "Read job pending");
                }
            }

            if attempt < self.max_attempts {
                tokio::time::sleep(self.poll_interval).await;
            }
        }

        Ok(PollOutcome::TimedOut {
            attempts: self.max_attempts,
        })
    }

    /// Submit an image and return its recognized lines
    pub async fn read_lines(&self, image: Vec<u8>) -> Result<Vec<String>, RecognitionError> {
        let operation_url = self.submit(image).await?;

        match self.wait_for_result(&operation_url).await? {
            PollOutcome::Succeeded(lines) => {
                tracing::info!(lines = lines.len(), "Read API recognized text");
                Ok(lines)
            }
            PollOutcome::Failed(reason) => Err(RecognitionError::JobFailed(reason)),
            PollOutcome::TimedOut { attempts } => Err(RecognitionError::Timeout { attempts }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_lines_flatten_pages() {
        let json = r#"{
            "status": "succeeded",
            "analyzeResult": {
                "readResults": [
                    {"lines": [{"text": " JANE "}, {"text": "DOE"}]},
                    {"lines": [{"text": "HANG DRY"}]}
                ]
            }
        }"#;
        let operation: ReadOperation = serde_json::from_str(json).unwrap();

        assert_eq!(operation.lines(), vec!["JANE", "DOE", "HANG DRY"]);
    }

    #[test]
    fn test_running_operation_has_no_lines() {
        let operation: ReadOperation = serde_json::from_str(r#"{"status": "running"}"#).unwrap();
        assert!(operation.lines().is_empty());
    }

    #[test]
    fn test_from_config_requires_endpoint_and_key() {
        let config = RecognitionConfig::default();
        assert!(matches!(
            RecognitionClient::from_config(&config, Some("key".into())),
            Err(RecognitionError::NotConfigured)
        ));

        let config = RecognitionConfig {
            endpoint: Some("https://example.cognitiveservices.azure.com/".into()),
            ..Default::default()
        };
        assert!(matches!(
            RecognitionClient::from_config(&config, None),
            Err(RecognitionError::NotConfigured)
        ));
        assert!(RecognitionClient::from_config(&config, Some("key".into())).is_ok());
    }
}
