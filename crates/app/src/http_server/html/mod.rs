use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Extension, Router};
use http::header::{ACCEPT, ORIGIN};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tracing::instrument;

use super::handlers::render_failure;
use super::Config;
use crate::view::render_page;
use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    let cors_layer = CorsLayer::new()
        .allow_methods(vec![Method::GET])
        .allow_headers(vec![ACCEPT, ORIGIN])
        .allow_origin(Any)
        .allow_credentials(false);

    Router::new()
        .route("/", get(root_handler))
        .route("/ep/", get(empty_handler))
        .route("/ep/:text", get(handler))
        .with_state(state)
        .layer(cors_layer)
}

/// Redirect to the page of the configured default entrypoint
#[instrument(skip_all)]
pub async fn root_handler(
    State(state): State<ServiceState>,
    Extension(config): Extension<Config>,
) -> Response {
    let mut target = config.hostname;
    match target.path_segments_mut() {
        Ok(mut segments) => {
            segments.clear().push("ep").push(state.default_entrypoint());
        }
        Err(()) => return render_failure("hostname cannot carry a path"),
    }
    Redirect::temporary(target.path()).into_response()
}

pub async fn empty_handler(State(state): State<ServiceState>) -> Response {
    page(&state, "").await
}

#[instrument(skip(state))]
pub async fn handler(State(state): State<ServiceState>, Path(text): Path<String>) -> Response {
    page(&state, &text).await
}

async fn page(state: &ServiceState, text: &str) -> Response {
    let view = state.view(text).await;
    match render_page(&view) {
        Ok(html) => Html(html).into_response(),
        Err(e) => render_failure(e),
    }
}
