//! Request middleware
//!
//! - `log_requests`: one `HTTP_REQUEST` event per request
//! - `require_authorization`: rejects requests without a non-empty
//!   `Authorization` header. Presence only; the value is not verified.

use axum::{
    extract::Request,
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::observability::{Logger, Timer};

use super::errors::ApiError;

/// Log method, path, status and latency of every request
pub async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let timer = Timer::new();

    let response = next.run(req).await;

    let status = response.status().as_u16().to_string();
    let elapsed = timer.elapsed_ms();
    Logger::info(
        "HTTP_REQUEST",
        &[
            ("method", method.as_str()),
            ("path", path.as_str()),
            ("status", status.as_str()),
            ("duration_ms", elapsed.as_str()),
        ],
    );
    response
}

/// Reject requests with a missing or empty `Authorization` header
pub async fn require_authorization(req: Request, next: Next) -> Response {
    let present = req
        .headers()
        .get(AUTHORIZATION)
        .is_some_and(|v| !v.as_bytes().is_empty());

    if !present {
        return ApiError::Unauthorized.into_response();
    }
    next.run(req).await
}
