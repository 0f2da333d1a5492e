use anyhow::Result;
use async_openai::{
    types::{ChatCompletionRequestMessageArgs, CreateChatCompletionRequestArgs, Role},
    Client,
};
use backoff::ExponentialBackoffBuilder;
use std::time::Duration;

use crate::config::LlmConfig;

/// Chat completions against any OpenAI-compatible endpoint (Groq by default).
pub struct Llm {
    client: Client,
    model: String,
}

impl Llm {
    #[must_use]
    pub fn new(config: &LlmConfig) -> Self {
        let backoff = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::from_secs(60)))
            .build();

        Self {
            model: config.model.clone(),
            client: Client::new()
                .with_api_key(&config.api_key)
                .with_api_base(&config.base_url)
                .with_backoff(backoff),
        }
    }

    /// Sends a system and a user message, returning the model's reply.
    ///
    /// # Errors
    ///
    /// This function will return an error if the Chat Completions API returns an error.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([
                ChatCompletionRequestMessageArgs::default()
                    .role(Role::System)
                    .content(system)
                    .build()?,
                ChatCompletionRequestMessageArgs::default()
                    .role(Role::User)
                    .content(user)
                    .build()?,
            ])
            .build()?;

        let response = self.client.chat().create(request).await?;

        Ok(response
            .choices
            .first()
            .ok_or_else(|| anyhow::anyhow!("Could not find completion"))?
            .message
            .content
            .clone())
    }
}
