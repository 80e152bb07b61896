//! Single-route echo service.
//!
//! Anything sent to `/user` comes back verbatim with 200. The route table is
//! built once from the `Route` values listed in `mux`. Bodies longer than
//! the configured cap are echoed up to the cap only.

pub mod config;
pub mod echo;
pub mod server;

use axum::Router;
use service_core::{build_mux, Route};

pub use echo::{UserRoute, DEFAULT_MAX_ECHO_BYTES};

pub fn mux(max_body: usize) -> Router {
    build_mux([Box::new(UserRoute::new(max_body)) as Box<dyn Route>])
}
