//! Lifecycle wiring for the echo service: bind, then hand back a `Service`.

use service_core::{Lifecycle, LifecycleError, Service};

use crate::{config::EchoConfig, mux};

pub async fn start(config: &EchoConfig) -> Result<Service, LifecycleError> {
    let mut lifecycle = Lifecycle::new();
    let listener = lifecycle.bind(config.bind).await?;
    Ok(Service::new(lifecycle, listener, mux(config.max_body_bytes)))
}
