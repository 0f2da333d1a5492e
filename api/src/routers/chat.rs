use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use axum_jsonschema::Json as ValidJson;
use repochat::Message;
use tracing::{error, info};

use super::rag::AskRequest;
use crate::axum::{
    errors::{ApiError, ApiResult},
    state::AppState,
};

pub fn mount() -> Router<AppState> {
    Router::new()
        .route("/messages", get(history))
        .route("/chat", post(chat))
}

#[derive(Debug, serde::Deserialize)]
struct HistoryQuery {
    #[serde(default)]
    namespace: String,
}

async fn history(
    State(state): State<AppState>,
    Query(HistoryQuery { namespace }): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<Message>>> {
    if namespace.trim().is_empty() {
        return Err(ApiError::ClientError("Missing namespace.".to_string()));
    }

    Ok(Json(state.store.history(&namespace).await?))
}

#[derive(Debug, serde::Serialize)]
struct ChatResponse {
    user: Message,
    bot: Message,
}

/// Stores the question, answers it, and stores the formatted answer.
///
/// An answer that can't be stored is still returned, without a `created_at`.
async fn chat(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<AskRequest>,
) -> ApiResult<Json<ChatResponse>> {
    req.validate()?;

    let user = state
        .store
        .insert(&Message::user(&req.namespace, &req.query))
        .await?;

    let answer = state.rag.answer(&req.namespace, &req.query).await?;
    info!("Answered question for {}", req.namespace);

    let bot = Message::bot(&req.namespace, &answer);
    let bot = match state.store.insert(&bot).await {
        Ok(stored) => stored,
        Err(err) => {
            error!(answer = %answer, "Failed to store answer for {}: {err:#}", req.namespace);
            bot
        }
    };

    Ok(Json(ChatResponse { user, bot }))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use repochat::{config::SupabaseConfig, ChatStore, Rag};
    use tower::ServiceExt;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::axum::{
        app,
        state::{
            self,
            tests::{config, mount_rag},
        },
    };

    fn test_app(server: &MockServer) -> Router {
        let config = config(server);

        app::router(state::create(Rag::new(&config), ChatStore::new(None)))
    }

    fn history_for(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn ask(query: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::to_vec(&serde_json::json!({
                    "query": query,
                    "namespace": "https://github.com/tokio-rs/axum",
                }))
                .unwrap(),
            ))
            .unwrap()
    }

    fn history() -> Request<Body> {
        Request::builder()
            .uri("/api/messages?namespace=https%3A%2F%2Fgithub.com%2Ftokio-rs%2Faxum")
            .body(Body::empty())
            .unwrap()
    }

    async fn read_json(response: axum::response::Response) -> serde_json::Value {
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();

        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn persists_both_sides_of_the_conversation() {
        let server = MockServer::start().await;
        mount_rag(&server, "pub struct Router", "A **Router** routes.").await;
        let app = test_app(&server);

        let response = app.clone().oneshot(ask("What is Router?")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["user"]["sender"], "user");
        assert_eq!(body["user"]["text"], "What is Router?");
        assert_eq!(body["bot"]["sender"], "bot");
        assert_eq!(body["bot"]["text"], "A **Router** routes.");
        assert_eq!(
            body["bot"]["formatted"],
            "A <strong>Router</strong> routes."
        );

        let history = read_json(app.oneshot(history()).await.unwrap()).await;
        let history = history.as_array().unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history[0]["sender"], "user");
        assert_eq!(history[1]["sender"], "bot");
    }

    #[tokio::test]
    async fn keeps_question_when_answer_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hf/sentence-transformers/all-mpnet-base-v2"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;
        let app = test_app(&server);

        let response = app.clone().oneshot(ask("What is Router?")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let history = read_json(app.oneshot(history()).await.unwrap()).await;

        assert_eq!(history.as_array().unwrap().len(), 1);
        assert_eq!(history[0]["sender"], "user");
    }

    #[tokio::test]
    async fn ignores_blank_questions() {
        let server = MockServer::start().await;
        let app = test_app(&server);

        let response = app.clone().oneshot(ask("   ")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let history = read_json(app.oneshot(history()).await.unwrap()).await;
        assert!(history.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_missing_namespace() {
        let server = MockServer::start().await;
        let app = test_app(&server);

        for uri in [
            "/api/messages",
            "/api/messages?namespace=",
            "/api/messages?namespace=%20",
        ] {
            let response = app.clone().oneshot(history_for(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);

            let body = read_json(response).await;
            assert_eq!(body, serde_json::json!({ "error": "Missing namespace." }));
        }
    }

    #[tokio::test]
    async fn returns_answer_that_could_not_be_stored() {
        let server = MockServer::start().await;
        mount_rag(&server, "pub struct Router", "It routes.").await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/messages"))
            .and(body_partial_json(serde_json::json!({ "sender": "user" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!([{
                "id": 1,
                "created_at": "2024-09-01T10:00:00+00:00",
                "sender": "user",
                "text": "What is Router?",
                "formatted": null,
                "namespace": "https://github.com/tokio-rs/axum",
            }])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/messages"))
            .and(body_partial_json(serde_json::json!({ "sender": "bot" })))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let store = ChatStore::new(Some(&SupabaseConfig {
            url: server.uri(),
            api_key: "anon".to_string(),
            table: "messages".to_string(),
        }));
        let app = app::router(state::create(Rag::new(&config(&server)), store));

        let response = app.oneshot(ask("What is Router?")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["user"]["text"], "What is Router?");
        assert_eq!(body["bot"]["text"], "It routes.");
        assert!(body["bot"].get("created_at").is_none());
    }
}
