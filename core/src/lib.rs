//! Shared plumbing for the todo and echo services.
//!
//! # Overview
//! - `lifecycle`: `Created → Starting → Running → Stopping → Stopped`
//!   sequencing with rollback on startup failure and reverse-order stop
//!   hooks.
//! - `route`: the `Route` capability and the explicit route table.
//! - `service`: a started service ready to `serve`.
//! - `signal`: Ctrl+C / SIGTERM shutdown future.
//! - `telemetry`: tracing subscriber setup.
//!
//! Services construct their collaborators explicitly and pass them to their
//! routers; there is no container or global registration.

pub mod lifecycle;
pub mod route;
pub mod service;
pub mod signal;
pub mod telemetry;

pub use lifecycle::{BoxError, Lifecycle, LifecycleError, Phase};
pub use route::{build_mux, Route};
pub use service::Service;
pub use signal::shutdown_signal;
pub use telemetry::init_tracing;
