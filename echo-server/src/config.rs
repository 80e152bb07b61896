use std::net::SocketAddr;

use clap::Parser;

use crate::echo::DEFAULT_MAX_ECHO_BYTES;

#[derive(Debug, Clone, Parser)]
#[command(name = "echo-server", about = "Echoes request bodies sent to /user")]
pub struct EchoConfig {
    /// Address the HTTP listener binds to.
    #[arg(long, env = "ECHO_BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Largest request body echoed back, in bytes.
    #[arg(long, env = "ECHO_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_ECHO_BYTES)]
    pub max_body_bytes: usize,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long)]
    pub debug: bool,
}
