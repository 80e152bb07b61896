use clap::Parser;
use todo_server::{config::TodoConfig, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = TodoConfig::parse();
    service_core::init_tracing(config.debug)?;

    let service = server::start(&config).await?;
    tracing::info!("Application started successfully");
    service.serve(service_core::shutdown_signal()).await?;
    Ok(())
}
