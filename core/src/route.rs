//! Route capability and the explicit route table built from it.
//!
//! # Design
//! Routes are collected once at startup and handed to `build_mux`; nothing
//! registers itself into a shared, global multiplexer.

use axum::{routing::MethodRouter, Router};
use tower_http::trace::TraceLayer;

/// An HTTP handler that knows the path it is mounted at.
pub trait Route: Send + Sync {
    /// Path at which this route is registered.
    fn pattern(&self) -> &'static str;

    fn method_router(&self) -> MethodRouter;
}

/// Build a router that dispatches each route at its pattern.
///
/// Patterns must be distinct; axum rejects overlapping registrations.
pub fn build_mux<I>(routes: I) -> Router
where
    I: IntoIterator<Item = Box<dyn Route>>,
{
    routes
        .into_iter()
        .fold(Router::new(), |mux, route| {
            tracing::debug!(pattern = route.pattern(), "registering route");
            mux.route(route.pattern(), route.method_router())
        })
        .layer(TraceLayer::new_for_http())
}
