//! HTTP server for the benefits and tax engine.

use clap::Parser;
use tracing::info;

use beneficios_engine::api::{AppState, create_router};
use beneficios_engine::config::ConfigLoader;

/// Peruvian labour benefits and tax calculation server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding engine.yaml, labor.yaml, tax.yaml, templates.yaml and rates/
    #[arg(short, long, default_value = "./config/peru")]
    config: String,

    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ConfigLoader::load(&args.config)?;
    info!(
        code = %config.metadata().code,
        version = %config.metadata().version,
        rate_files = config.config().rates().len(),
        "Loaded configuration from {}",
        args.config
    );

    let app = create_router(AppState::new(config));

    let addr: std::net::SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
