use anyhow::{anyhow, bail, Context, Result};
use std::env;

pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-mpnet-base-v2";
pub const DEFAULT_EMBEDDING_BASE_URL: &str =
    "https://api-inference.huggingface.co/pipeline/feature-extraction";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_LLM_MODEL: &str = "llama-3.1-70b-versatile";
pub const DEFAULT_TOP_K: usize = 10;
pub const DEFAULT_MESSAGES_TABLE: &str = "messages";

#[derive(Debug, Clone)]
pub struct Config {
    pub embeddings: EmbeddingsConfig,
    pub index: IndexConfig,
    pub llm: LlmConfig,
    pub supabase: Option<SupabaseConfig>,
}

#[derive(Debug, Clone)]
pub struct EmbeddingsConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct IndexConfig {
    pub api_key: String,
    pub host: String,
    pub top_k: usize,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub api_key: String,
    pub table: String,
}

impl Config {
    /// Loads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Fails when a required variable is missing or a numeric one can't be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads the configuration through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// Fails when a required variable is missing or a numeric one can't be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow!("${name} not set"))
        };
        let optional = |name: &str, default: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let top_k = match lookup("RAG_TOP_K").filter(|v| !v.trim().is_empty()) {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .with_context(|| format!("$RAG_TOP_K is not a number: {value}"))?,
            None => DEFAULT_TOP_K,
        };

        if top_k == 0 {
            bail!("$RAG_TOP_K must be at least 1");
        }

        let supabase = match lookup("SUPABASE_URL").filter(|v| !v.trim().is_empty()) {
            Some(url) => Some(SupabaseConfig {
                url: url.trim_end_matches('/').to_string(),
                api_key: required("SUPABASE_ANON_KEY")?,
                table: optional("SUPABASE_TABLE", DEFAULT_MESSAGES_TABLE),
            }),
            None => None,
        };

        Ok(Self {
            embeddings: EmbeddingsConfig {
                api_key: required("HUGGINGFACE_API_KEY")?,
                base_url: optional("EMBEDDING_BASE_URL", DEFAULT_EMBEDDING_BASE_URL)
                    .trim_end_matches('/')
                    .to_string(),
                model: optional("EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
            },
            index: IndexConfig {
                api_key: required("PINECONE_API_KEY")?,
                host: normalize_host(&required("PINECONE_INDEX_HOST")?),
                top_k,
            },
            llm: LlmConfig {
                api_key: required("GROQ_API_KEY")?,
                base_url: optional("LLM_BASE_URL", DEFAULT_LLM_BASE_URL)
                    .trim_end_matches('/')
                    .to_string(),
                model: optional("LLM_MODEL", DEFAULT_LLM_MODEL),
            },
            supabase,
        })
    }
}

/// Pinecone hands out index hosts without a scheme.
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');

    if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}
