#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod config;
mod embeddings;
pub mod format;
pub mod history;
mod llm;
pub mod pinecone;
mod prompt;
mod rag;
pub mod stream;

pub use config::Config;
pub use embeddings::HuggingFace;
pub use format::{format_message, repo_name};
pub use history::{ChatStore, Message, Sender};
pub use llm::Llm;
pub use pinecone::{Match, Pinecone};
pub use prompt::{build_prompt, SYSTEM_PROMPT};
pub use rag::Rag;
