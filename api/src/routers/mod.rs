use axum::{response::Html, routing::get, Json, Router};

mod chat;
mod rag;

use crate::axum::state::AppState;

pub fn mount() -> Router<AppState> {
    Router::new()
        .nest("/api", rag::mount().merge(chat::mount()))
        .route("/", get(index))
        .route("/health", get(health))
        .route("/version", get(version))
}

#[allow(clippy::unused_async)]
async fn index() -> Html<&'static str> {
    Html(include_str!("../../assets/index.html"))
}

#[allow(clippy::unused_async)]
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(serde::Serialize)]
struct Version {
    semver: String,
    rev: Option<String>,
    compile_time: String,
}

#[allow(clippy::unused_async)]
async fn version() -> Json<Version> {
    Json(Version {
        semver: env!("CARGO_PKG_VERSION").to_string(),
        rev: std::env::var("GIT_REV").ok(),
        compile_time: env!("STATIC_BUILD_DATE").to_string(),
    })
}
