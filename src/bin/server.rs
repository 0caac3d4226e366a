use clap::Parser;
use coopgate::GateConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "coopgate", about = "Session gate for the cooperative-society application")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = GateConfig::load(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.port = port;
    }

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let port = coopgate::start_server(config, shutdown_rx).await?;
    println!("coopgate listening on port {}", port);

    // Run until Ctrl-C, then ask the server to drain
    tokio::signal::ctrl_c().await?;
    println!("shutdown requested, stopping server...");
    let _ = shutdown_tx.send(());
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    println!("server stopped");
    Ok(())
}
