//! Startup wiring for the todo service.
//!
//! Startup opens the database, registers its release as a stop hook, then
//! binds the listener. A failure in either step aborts startup; if the bind
//! fails the database is closed again before the error is returned.

use std::{convert::Infallible, sync::Arc};

use service_core::{Lifecycle, LifecycleError, Service};

use crate::{app, config::TodoConfig, sqlite::SqliteTodoRepository};

pub async fn start(config: &TodoConfig) -> Result<Service, LifecycleError> {
    let mut lifecycle = Lifecycle::new();

    let repo = lifecycle
        .start(
            "open database",
            SqliteTodoRepository::connect(&config.database_url, config.max_connections),
        )
        .await?;
    tracing::info!(database_url = %config.database_url, "database ready");

    let closing = repo.clone();
    lifecycle.on_stop("close database", move || async move {
        closing.close().await;
        tracing::info!("database closed");
        Ok::<_, Infallible>(())
    });

    let listener = lifecycle.bind(config.bind).await?;
    Ok(Service::new(lifecycle, listener, app(Arc::new(repo))))
}
