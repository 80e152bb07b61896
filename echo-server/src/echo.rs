//! The `/user` echo route.
//!
//! The request body is copied frame by frame into the response. Whatever is
//! left in the body after the copy is drained separately: a copy failure is
//! only logged, a drain failure turns the response into a plain-text 500.
//!
//! At most `max_body` bytes are echoed. The frame that would cross the cap
//! fails the copy, and it and everything after it are drained and discarded,
//! so a large upload never grows the response buffer past the cap.

use axum::{
    body::Body,
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{any, MethodRouter},
};
use http_body_util::{BodyExt, Limited};
use service_core::{BoxError, Route};

/// Echo cap used when none is configured, in bytes.
pub const DEFAULT_MAX_ECHO_BYTES: usize = 2 * 1024 * 1024;

/// Echoes the request body at `/user`, for any method.
#[derive(Debug, Clone, Copy)]
pub struct UserRoute {
    max_body: usize,
}

impl UserRoute {
    pub fn new(max_body: usize) -> Self {
        Self { max_body }
    }
}

impl Default for UserRoute {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ECHO_BYTES)
    }
}

impl Route for UserRoute {
    fn pattern(&self) -> &'static str {
        "/user"
    }

    fn method_router(&self) -> MethodRouter {
        let max_body = self.max_body;
        any(move |request: Request| handle(request, max_body))
    }
}

pub async fn handle(request: Request, max_body: usize) -> Response {
    let mut body = request.into_body();

    let mut echoed = Vec::new();
    if let Err(err) = copy_body(&mut body, max_body, &mut echoed).await {
        tracing::warn!(error = %err, copied = echoed.len(), "Failed to handle request");
    }

    match drain_body(&mut body).await {
        Ok(0) => {}
        Ok(remaining) => tracing::debug!(remaining, "drained request body"),
        Err(err) => {
            tracing::error!(error = %err, "Failed to read request");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
        }
    }

    (StatusCode::OK, echoed).into_response()
}

/// Append data frames to `out` until the body ends, errors or would
/// exceed `limit` bytes.
async fn copy_body(body: &mut Body, limit: usize, out: &mut Vec<u8>) -> Result<(), BoxError> {
    let mut limited = Limited::new(body, limit);
    while let Some(frame) = limited.frame().await {
        if let Ok(data) = frame?.into_data() {
            out.extend_from_slice(&data);
        }
    }
    Ok(())
}

/// Read and discard the rest of the body, returning the number of bytes.
async fn drain_body(body: &mut Body) -> Result<usize, axum::Error> {
    let mut drained = 0;
    while let Some(frame) = body.frame().await {
        if let Ok(data) = frame?.into_data() {
            drained += data.len();
        }
    }
    Ok(drained)
}
