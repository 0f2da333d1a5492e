use anyhow::{anyhow, bail, Result};
use backoff::{future::retry, ExponentialBackoff, ExponentialBackoffBuilder};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, error};

use crate::config::EmbeddingsConfig;

pub struct HuggingFace {
    client: Client,
    url: String,
    api_key: String,
    backoff: ExponentialBackoff,
}

/// The feature-extraction pipeline returns a single vector for sentence models,
/// and one row per input when it batches.
#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum FeatureExtraction {
    Sentence(Vec<f32>),
    Batch(Vec<Vec<f32>>),
}

impl HuggingFace {
    #[must_use]
    pub fn new(config: &EmbeddingsConfig) -> Self {
        let backoff = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::from_secs(60)))
            .build();

        Self {
            backoff,
            client: Client::new(),
            api_key: config.api_key.clone(),
            url: format!("{}/{}", config.base_url, config.model),
        }
    }

    /// Embeds a query into a single vector.
    ///
    /// # Errors
    ///
    /// This function will return an error if the text is empty, or if the Inference API
    /// fails or answers with something other than a non-empty vector.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            bail!("Invalid text input: Text must be non-empty string.");
        }

        let data: serde_json::Value = retry(self.backoff.clone(), || async move {
            let response = self
                .client
                .post(&self.url)
                .bearer_auth(&self.api_key)
                .json(&serde_json::json!({ "inputs": text }))
                .send()
                .await
                .map_err(|e| backoff::Error::transient(anyhow::Error::from(e)))?;

            let status = response.status();
            if matches!(status, StatusCode::SERVICE_UNAVAILABLE | StatusCode::TOO_MANY_REQUESTS) {
                debug!("Hugging Face answered {status}, retrying");
                return Err(backoff::Error::transient(anyhow!(
                    "Failed to fetch embeddings from Hugging Face."
                )));
            }

            if !status.is_success() {
                error!("Hugging Face answered {status}");
                return Err(backoff::Error::permanent(anyhow!(
                    "Failed to fetch embeddings from Hugging Face."
                )));
            }

            response
                .json()
                .await
                .map_err(|e| backoff::Error::permanent(anyhow::Error::from(e)))
        })
        .await?;

        debug!(
            "Hugging Face embeddings: {}",
            data.to_string().chars().take(100).collect::<String>()
        );

        let vector = match serde_json::from_value::<FeatureExtraction>(data) {
            Ok(FeatureExtraction::Sentence(vector)) => vector,
            Ok(FeatureExtraction::Batch(rows)) => rows.into_iter().next().unwrap_or_default(),
            Err(_) => Vec::new(),
        };

        if vector.is_empty() {
            bail!("Invalid response from Hugging Face.");
        }

        Ok(vector)
    }
}
