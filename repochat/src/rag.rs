use anyhow::{bail, Result};
use tracing::{debug, info};

use crate::{
    config::Config,
    embeddings::HuggingFace,
    llm::Llm,
    pinecone::{Match, Pinecone},
    prompt::{build_prompt, SYSTEM_PROMPT},
};

/// Answers questions about the repositories held in the index.
pub struct Rag {
    embedder: HuggingFace,
    index: Pinecone,
    llm: Llm,
    top_k: usize,
}

impl Rag {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            embedder: HuggingFace::new(&config.embeddings),
            index: Pinecone::new(&config.index),
            llm: Llm::new(&config.llm),
            top_k: config.index.top_k,
        }
    }

    /// Lists the indexed repositories.
    ///
    /// # Errors
    ///
    /// This function will return an error if the Pinecone API returns an error.
    pub async fn namespaces(&self) -> Result<Vec<String>> {
        self.index.namespaces().await
    }

    /// Finds the chunks of a repository closest to the query.
    ///
    /// # Errors
    ///
    /// This function will return an error if the query can't be embedded, the index
    /// can't be queried, or nothing matched.
    pub async fn search(&self, namespace: &str, query: &str) -> Result<Vec<Match>> {
        info!("Getting embeddings for query: {query}");
        let vector = self.embedder.embed(query).await?;

        debug!("Querying namespace {namespace}");
        let matches = self
            .index
            .namespace(namespace)
            .query(vector, self.top_k)
            .await?;

        info!(
            matches = matches.len(),
            first_match = matches.first().map(|m| m.id.as_str()),
            "Query response"
        );

        if matches.is_empty() {
            bail!("No matches found in codebase.");
        }

        Ok(matches)
    }

    /// Composes an answer from previously retrieved chunks.
    ///
    /// # Errors
    ///
    /// This function will return an error if the Chat Completions API returns an error.
    pub async fn complete(&self, query: &str, matches: &[Match]) -> Result<String> {
        let contexts = matches
            .iter()
            .map(|m| m.metadata.content.as_str())
            .collect::<Vec<_>>();

        self.llm
            .complete(SYSTEM_PROMPT, &build_prompt(query, &contexts))
            .await
    }

    /// Retrieves context for the query and answers it.
    ///
    /// # Errors
    ///
    /// This function will return an error if any of the hosted services fail, or if
    /// the repository has nothing matching the query.
    pub async fn answer(&self, namespace: &str, query: &str) -> Result<String> {
        let matches = self.search(namespace, query).await?;

        self.complete(query, &matches).await
    }
}
