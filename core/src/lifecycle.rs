//! Startup and shutdown sequencing around a long-running HTTP listener.
//!
//! # Design
//! A `Lifecycle` walks `Created → Starting → Running → Stopping → Stopped`.
//! Every resource a service opens is opened through `start`, and its release
//! is registered with `on_stop`. If a startup step fails, the stop hooks that
//! were already registered run immediately and the lifecycle ends in
//! `Stopped`. Stop hooks always run in reverse registration order, so the
//! last resource opened is the first one closed.
//!
//! Graceful shutdown of the listener itself is delegated to `axum::serve`:
//! once the shutdown future resolves, no new connections are accepted and
//! in-flight requests are allowed to finish before the stop hooks run.

use std::{fmt, future::Future, io, net::SocketAddr, pin::Pin, sync::Arc};

use axum::Router;
use tokio::{net::TcpListener, sync::watch};

/// Type-erased error returned by startup steps and stop hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

type HookFuture = Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send>>;

struct StopHook {
    name: &'static str,
    run: Box<dyn FnOnce() -> HookFuture + Send>,
}

/// Phase of a service lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Created,
    Starting,
    Running,
    Stopping,
    Stopped,
}

impl Phase {
    /// Whether `self → next` is an edge of the lifecycle state machine.
    pub fn can_transition_to(self, next: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, next),
            (Created, Starting)
                | (Starting, Running)
                | (Starting, Stopping)
                | (Running, Stopping)
                | (Stopping, Stopped)
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Created => "created",
            Phase::Starting => "starting",
            Phase::Running => "running",
            Phase::Stopping => "stopping",
            Phase::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Errors raised while starting, serving or stopping a service.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("invalid lifecycle transition from {from} to {to}")]
    InvalidTransition { from: Phase, to: Phase },

    #[error("startup step '{step}' failed: {source}")]
    Startup {
        step: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("server error: {0}")]
    Serve(#[from] io::Error),

    #[error("stop hook '{hook}' failed: {source}")]
    StopHook {
        hook: &'static str,
        #[source]
        source: BoxError,
    },
}

/// Sequences startup steps, the serve loop and stop hooks for one service.
pub struct Lifecycle {
    phase: Arc<watch::Sender<Phase>>,
    stop_hooks: Vec<StopHook>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        let (phase, _) = watch::channel(Phase::Created);
        Self {
            phase: Arc::new(phase),
            stop_hooks: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Observe phase changes. The receiver keeps working after the
    /// `Lifecycle` itself has been consumed by `serve`.
    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    /// Register a hook to run when the service stops, or when a later
    /// startup step fails.
    pub fn on_stop<F, Fut, E>(&mut self, name: &'static str, hook: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxError>,
    {
        self.stop_hooks.push(StopHook {
            name,
            run: Box::new(move || Box::pin(async move { hook().await.map_err(Into::into) })),
        });
    }

    /// Run one startup step.
    ///
    /// The first step moves the lifecycle from `Created` to `Starting`. A
    /// failing step is fatal: registered stop hooks run, the lifecycle ends
    /// in `Stopped` and the step's error is returned.
    pub async fn start<T, E, Fut>(&mut self, step: &'static str, fut: Fut) -> Result<T, LifecycleError>
    where
        Fut: Future<Output = Result<T, E>>,
        E: Into<BoxError>,
    {
        if self.phase() != Phase::Starting {
            transition(&self.phase, Phase::Starting)?;
        }

        tracing::debug!(step, "running startup step");
        match fut.await {
            Ok(value) => Ok(value),
            Err(err) => {
                let source = err.into();
                tracing::error!(step, error = %source, "startup step failed, rolling back");
                transition(&self.phase, Phase::Stopping)?;
                if let Err(hook_err) = self.run_stop_hooks().await {
                    tracing::warn!(error = %hook_err, "rollback did not complete cleanly");
                }
                transition(&self.phase, Phase::Stopped)?;
                Err(LifecycleError::Startup { step, source })
            }
        }
    }

    /// Startup step that binds the network listener.
    pub async fn bind(&mut self, addr: SocketAddr) -> Result<TcpListener, LifecycleError> {
        let listener = self.start("bind listener", TcpListener::bind(addr)).await?;
        tracing::debug!(%addr, "listener bound");
        Ok(listener)
    }

    /// Serve `router` on `listener` until `shutdown` resolves, then run the
    /// stop hooks.
    pub async fn serve<S>(
        mut self,
        listener: TcpListener,
        router: Router,
        shutdown: S,
    ) -> Result<(), LifecycleError>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        transition(&self.phase, Phase::Running)?;
        match listener.local_addr() {
            Ok(addr) => tracing::info!(%addr, "Starting HTTP server"),
            Err(err) => tracing::warn!(error = %err, "listener has no local address"),
        }

        let phase = Arc::clone(&self.phase);
        let served = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                if let Err(err) = transition(&phase, Phase::Stopping) {
                    tracing::warn!(error = %err, "shutdown requested outside of running phase");
                }
            })
            .await;

        // The server can also exit on its own with an I/O error.
        if self.phase() == Phase::Running {
            transition(&self.phase, Phase::Stopping)?;
        }
        let stopped = self.run_stop_hooks().await;
        transition(&self.phase, Phase::Stopped)?;
        tracing::info!("Server shutdown complete");

        served?;
        stopped
    }

    async fn run_stop_hooks(&mut self) -> Result<(), LifecycleError> {
        let mut first_error = None;
        while let Some(hook) = self.stop_hooks.pop() {
            tracing::debug!(hook = hook.name, "running stop hook");
            if let Err(source) = (hook.run)().await {
                tracing::error!(hook = hook.name, error = %source, "stop hook failed");
                if first_error.is_none() {
                    first_error = Some(LifecycleError::StopHook {
                        hook: hook.name,
                        source,
                    });
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

fn transition(phase: &watch::Sender<Phase>, next: Phase) -> Result<(), LifecycleError> {
    let mut outcome = Ok(());
    phase.send_if_modified(|current| {
        let from = *current;
        if from.can_transition_to(next) {
            tracing::info!(%from, to = %next, "lifecycle phase changed");
            *current = next;
            true
        } else {
            outcome = Err(LifecycleError::InvalidTransition { from, to: next });
            false
        }
    });
    outcome
}
