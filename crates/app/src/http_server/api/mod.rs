//! Machine readable views and the details fragment the tree widget loads

use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use http::header::{ACCEPT, CONTENT_TYPE, ORIGIN};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tracing::instrument;

use super::handlers::render_failure;
use crate::view::{render_details, render_json};
use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    let cors_layer = CorsLayer::new()
        .allow_methods(vec![Method::GET])
        .allow_headers(vec![ACCEPT, CONTENT_TYPE, ORIGIN])
        .allow_origin(Any)
        .allow_credentials(false);

    Router::new()
        .route("/ep/", get(empty_json_handler))
        .route("/ep/:text", get(json_handler))
        .route("/html/details/", get(empty_details_handler))
        .route("/html/details/:text", get(details_handler))
        .with_state(state)
        .layer(cors_layer)
}

pub async fn empty_json_handler(State(state): State<ServiceState>) -> Response {
    json(&state, "").await
}

#[instrument(skip(state))]
pub async fn json_handler(State(state): State<ServiceState>, Path(text): Path<String>) -> Response {
    json(&state, &text).await
}

pub async fn empty_details_handler(State(state): State<ServiceState>) -> Response {
    details(&state, "").await
}

#[instrument(skip(state))]
pub async fn details_handler(
    State(state): State<ServiceState>,
    Path(text): Path<String>,
) -> Response {
    details(&state, &text).await
}

async fn json(state: &ServiceState, text: &str) -> Response {
    let view = state.view(text).await;
    match render_json(&view) {
        Ok(json) => ([(CONTENT_TYPE, "application/json")], json).into_response(),
        Err(e) => render_failure(e),
    }
}

async fn details(state: &ServiceState, text: &str) -> Response {
    let view = state.view(text).await;
    match render_details(&view) {
        Ok(html) => Html(html).into_response(),
        Err(e) => render_failure(e),
    }
}
