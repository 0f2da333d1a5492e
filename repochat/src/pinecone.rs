use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::config::IndexConfig;

const API_VERSION: &str = "2024-07";

#[derive(Clone)]
pub struct Pinecone {
    client: Client,
    host: String,
    api_key: String,
}

impl Pinecone {
    #[must_use]
    pub fn new(config: &IndexConfig) -> Self {
        Self {
            client: Client::new(),
            host: config.host.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}/{path}", self.host))
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
    }

    /// Fetches the index statistics, including every namespace.
    ///
    /// # Errors
    ///
    /// This function will return an error if the Pinecone API returns an error.
    pub async fn describe_index_stats(&self) -> Result<IndexStats> {
        self.post("describe_index_stats")
            .json(&serde_json::json!({}))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("Failed to parse index stats")
    }

    /// Lists the namespaces of the index, sorted by name.
    ///
    /// # Errors
    ///
    /// This function will return an error if the Pinecone API returns an error.
    pub async fn namespaces(&self) -> Result<Vec<String>> {
        let stats = self.describe_index_stats().await?;

        Ok(stats.namespaces.into_keys().collect())
    }

    #[must_use]
    pub fn namespace(&self, name: &str) -> Namespace<'_> {
        Namespace {
            index: self,
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Default, Clone, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    #[serde(default)]
    pub namespaces: BTreeMap<String, NamespaceSummary>,
    #[serde(default)]
    pub dimension: Option<usize>,
    #[serde(default)]
    pub total_vector_count: u64,
}

#[derive(Debug, Default, Clone, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceSummary {
    #[serde(default)]
    pub vector_count: u64,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Metadata {
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Metadata {
    /// The file the chunk was taken from, when the indexer recorded one.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.extra.get("source").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Match {
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, serde::Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<Match>,
}

pub struct Namespace<'a> {
    index: &'a Pinecone,
    name: String,
}

impl Namespace<'_> {
    /// Returns the `top_k` chunks closest to `vector`, metadata included.
    ///
    /// # Errors
    ///
    /// This function will return an error if the Pinecone API returns an error.
    pub async fn query(&self, vector: Vec<f32>, top_k: usize) -> Result<Vec<Match>> {
        let response: QueryResponse = self
            .index
            .post("query")
            .json(&serde_json::json!({
                "namespace": self.name,
                "vector": vector,
                "topK": top_k,
                "includeMetadata": true,
            }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("Failed to parse query response")?;

        debug!(
            "Found {} matches in namespace {}",
            response.matches.len(),
            self.name
        );

        Ok(response.matches)
    }
}
