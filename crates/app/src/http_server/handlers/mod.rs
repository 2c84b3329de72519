use std::fmt::Display;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

mod not_found;

pub use not_found::not_found_handler;

/// 500 for a view that could not be rendered
pub fn render_failure(err: impl Display) -> Response {
    tracing::error!(error = %err, "failed to render view");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(axum::http::header::CONTENT_TYPE, "text/plain")],
        "internal server error",
    )
        .into_response()
}
