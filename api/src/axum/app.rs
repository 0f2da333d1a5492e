use axum::Router;
use repochat::{ChatStore, Config, Rag};
use tower_http::{
    cors::CorsLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::{
    axum::{
        request_id::RequestIdMaker,
        state::{self, AppState},
    },
    routers,
};

pub fn create(config: &Config) -> Router {
    let store = ChatStore::new(config.supabase.as_ref());

    if !store.is_persistent() {
        warn!("$SUPABASE_URL not set, chat history will only be kept in memory");
    }

    router(state::create(Rag::new(config), store))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routers::mount())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(RequestIdMaker::default()))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;
    use wiremock::MockServer;

    use crate::axum::state::tests::config;

    #[tokio::test]
    async fn tags_responses_with_request_id() {
        let server = MockServer::start().await;
        let app = create(&config(&server));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        assert!(response.headers().contains_key("x-request-id"));
    }
}
