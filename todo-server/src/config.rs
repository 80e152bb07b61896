//! Command-line and environment configuration.

use std::net::SocketAddr;

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "todo-server", about = "Todo list HTTP API backed by SQLite")]
pub struct TodoConfig {
    /// Address the HTTP listener binds to.
    #[arg(long, env = "TODO_BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// SQLite connection URL; the file is created if missing.
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://todo.db")]
    pub database_url: String,

    #[arg(long, env = "TODO_DB_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let config = TodoConfig::parse_from([
            "todo-server",
            "--bind",
            "127.0.0.1:9000",
            "--database-url",
            "sqlite::memory:",
            "--max-connections",
            "2",
            "--debug",
        ]);
        assert_eq!(config.bind, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.max_connections, 2);
        assert!(config.debug);
    }

    #[test]
    fn bad_bind_address_is_rejected() {
        let result = TodoConfig::try_parse_from(["todo-server", "--bind", "not-an-addr"]);
        assert!(result.is_err());
    }
}
