use clap::Parser;
use echo_server::{config::EchoConfig, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = EchoConfig::parse();
    service_core::init_tracing(config.debug)?;

    let service = server::start(&config).await?;
    service.serve(service_core::shutdown_signal()).await?;
    Ok(())
}
