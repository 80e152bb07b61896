//! A started service: its lifecycle, bound listener and route table.

use std::{future::Future, io, net::SocketAddr};

use axum::Router;
use tokio::{net::TcpListener, sync::watch};

use crate::lifecycle::{Lifecycle, LifecycleError, Phase};

/// Everything `serve` needs once startup succeeded.
pub struct Service {
    lifecycle: Lifecycle,
    listener: TcpListener,
    router: Router,
}

impl Service {
    pub fn new(lifecycle: Lifecycle, listener: TcpListener, router: Router) -> Self {
        Self {
            lifecycle,
            listener,
            router,
        }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.lifecycle.subscribe()
    }

    /// Serve until `shutdown` resolves. In-flight requests finish before the
    /// stop hooks run.
    pub async fn serve<S>(self, shutdown: S) -> Result<(), LifecycleError>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        self.lifecycle
            .serve(self.listener, self.router, shutdown)
            .await
    }
}
