use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::SupabaseConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// A chat message as persisted in the `messages` table.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Message {
    #[must_use]
    pub fn user(namespace: &str, text: &str) -> Self {
        Self {
            sender: Sender::User,
            text: text.to_string(),
            formatted: None,
            namespace: namespace.to_string(),
            created_at: None,
        }
    }

    #[must_use]
    pub fn bot(namespace: &str, text: &str) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.to_string(),
            formatted: Some(crate::format::format_message(text)),
            namespace: namespace.to_string(),
            created_at: None,
        }
    }
}

/// Where chat history lives: a Supabase table, or process memory when none is configured.
pub enum ChatStore {
    Supabase(Supabase),
    Memory(MemoryStore),
}

impl ChatStore {
    #[must_use]
    pub fn new(config: Option<&SupabaseConfig>) -> Self {
        config.map_or_else(
            || Self::Memory(MemoryStore::default()),
            |config| Self::Supabase(Supabase::new(config)),
        )
    }

    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        matches!(self, Self::Supabase(_))
    }

    /// Returns the messages of a namespace, oldest first.
    ///
    /// # Errors
    ///
    /// This function will return an error if the Supabase API returns an error.
    pub async fn history(&self, namespace: &str) -> Result<Vec<Message>> {
        match self {
            Self::Supabase(store) => store.history(namespace).await,
            Self::Memory(store) => Ok(store.history(namespace).await),
        }
    }

    /// Stores a message, returning the row as saved.
    ///
    /// # Errors
    ///
    /// This function will return an error if the Supabase API returns an error.
    pub async fn insert(&self, message: &Message) -> Result<Message> {
        match self {
            Self::Supabase(store) => store.insert(message).await,
            Self::Memory(store) => Ok(store.insert(message).await),
        }
    }
}

pub struct Supabase {
    client: Client,
    url: String,
    api_key: String,
}

impl Supabase {
    #[must_use]
    pub fn new(config: &SupabaseConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            url: format!("{}/rest/v1/{}", config.url, config.table),
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn history(&self, namespace: &str) -> Result<Vec<Message>> {
        let messages: Vec<Message> = self
            .authorize(self.client.get(&self.url))
            .query(&[
                ("select", "*".to_string()),
                ("namespace", format!("eq.{namespace}")),
                ("order", "created_at.asc".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("Failed to parse chat history")?;

        debug!("Loaded {} messages for {namespace}", messages.len());

        Ok(messages)
    }

    async fn insert(&self, message: &Message) -> Result<Message> {
        let rows: Vec<Message> = self
            .authorize(self.client.post(&self.url))
            .header("Prefer", "return=representation")
            .json(message)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("Failed to parse inserted message")?;

        Ok(rows.into_iter().next().unwrap_or_else(|| message.clone()))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    messages: RwLock<HashMap<String, Vec<Message>>>,
}

impl MemoryStore {
    async fn history(&self, namespace: &str) -> Vec<Message> {
        self.messages
            .read()
            .await
            .get(namespace)
            .cloned()
            .unwrap_or_default()
    }

    async fn insert(&self, message: &Message) -> Message {
        let mut stored = message.clone();
        stored.created_at = Some(Utc::now());

        self.messages
            .write()
            .await
            .entry(stored.namespace.clone())
            .or_default()
            .push(stored.clone());

        stored
    }
}
