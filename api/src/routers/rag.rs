use std::convert::Infallible;

use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive},
        Sse,
    },
    routing::{get, post},
    Json, Router,
};
use axum_jsonschema::Json as ValidJson;
use futures::Stream;
use repochat::{repo_name, stream::PartialResult};
use schemars::JsonSchema;
use serde::Serialize;
use tokio_stream::StreamExt;

use crate::axum::{
    errors::{ApiError, ApiResult},
    state::AppState,
};

pub fn mount() -> Router<AppState> {
    Router::new()
        .route("/getNamespaces", get(namespaces))
        .route("/getDetails", post(details))
        .route("/stream", post(stream))
}

#[derive(Debug, serde::Deserialize, JsonSchema)]
pub struct AskRequest {
    pub query: String,
    pub namespace: String,
}

impl AskRequest {
    pub fn validate(&self) -> ApiResult<()> {
        if self.query.trim().is_empty() {
            return Err(ApiError::ClientError(
                "Invalid text input: Text must be non-empty string.".to_string(),
            ));
        }

        if self.namespace.trim().is_empty() {
            return Err(ApiError::ClientError("Missing namespace.".to_string()));
        }

        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct Repository {
    namespace: String,
    name: String,
}

#[derive(Debug, Serialize)]
struct NamespacesResponse {
    namespaces: Vec<String>,
    repositories: Vec<Repository>,
}

async fn namespaces(State(state): State<AppState>) -> ApiResult<Json<NamespacesResponse>> {
    let namespaces = state
        .rag
        .namespaces()
        .await
        .map_err(ApiError::NamespacesUnavailable)?;

    Ok(Json(NamespacesResponse {
        repositories: namespaces
            .iter()
            .map(|namespace| Repository {
                name: repo_name(namespace).to_string(),
                namespace: namespace.clone(),
            })
            .collect(),
        namespaces,
    }))
}

#[derive(Debug, Serialize)]
struct DetailsResponse {
    response: String,
}

async fn details(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<AskRequest>,
) -> ApiResult<Json<DetailsResponse>> {
    req.validate()?;

    let response = state.rag.answer(&req.namespace, &req.query).await?;

    Ok(Json(DetailsResponse { response }))
}

fn json_event<T: Serialize>(name: &str, data: T) -> Event {
    Event::default()
        .event(name)
        .json_data(data)
        .unwrap_or_else(|_| {
            Event::default()
                .event("error")
                .data("Failed to encode event.")
        })
}

async fn stream(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<AskRequest>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    req.validate()?;

    let stream = repochat::stream::ask(state.rag.clone(), req.namespace, req.query).map(|e| {
        let event = match e {
            Ok(PartialResult::References(references)) => json_event("references", references),
            Ok(PartialResult::Answer(answer)) => json_event("answer", answer),
            Err(err) => json_event(
                "error",
                serde_json::json!({ "error": format!("Internal Server Error: {err}") }),
            ),
        };

        Ok::<_, Infallible>(event)
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
