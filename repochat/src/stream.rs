use async_fn_stream::try_fn_stream;
use futures::Stream;
use std::sync::Arc;

use crate::{pinecone::Match, Rag};

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Reference {
    pub id: String,
    pub score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub content: String,
}

impl From<&Match> for Reference {
    fn from(m: &Match) -> Self {
        Self {
            id: m.id.clone(),
            score: m.score,
            source: m.metadata.source().map(ToString::to_string),
            content: m.metadata.content.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PartialResult {
    References(Vec<Reference>),
    Answer(String),
}

impl From<&Vec<Match>> for PartialResult {
    fn from(matches: &Vec<Match>) -> Self {
        Self::References(matches.iter().map(Reference::from).collect())
    }
}

/// Answers a question, emitting the retrieved references before the answer.
pub fn ask(
    rag: Arc<Rag>,
    namespace: String,
    query: String,
) -> impl Stream<Item = std::result::Result<PartialResult, anyhow::Error>> {
    try_fn_stream(|emitter| async move {
        let matches = rag.search(&namespace, &query).await?;
        emitter.emit((&matches).into()).await;

        let answer = rag.complete(&query, &matches).await?;
        emitter.emit(PartialResult::Answer(answer)).await;

        Ok(())
    })
}
