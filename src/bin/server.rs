use clap::Parser;
use sea_orm::Database;
use std::sync::Arc;
use tracing::info;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use recipenest::db;
use recipenest::server::{self, config::ServerConfig};

#[derive(Parser)]
#[command(name = "recipenest-server", about = "Recipe box HTTP API server")]
struct Cli {
    /// Override the listen address from the environment
    #[arg(long)]
    listen: Option<String>,
}

fn init_logging() {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily("logs", "server.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .json();

    // Log to stdout: human-readable format
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    // Default to `info` level if RUST_LOG is not set.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_logging();

    let mut config = ServerConfig::from_env()?;
    if let Some(listen) = cli.listen {
        config.listen_addr = listen;
    }
    let config = Arc::new(config);

    let db_pool = Database::connect(&config.database_url).await?;
    db::init_schema(&db_pool).await?;
    info!("Database connected, schema ensured");

    server::run_http_server(db_pool, config).await?;
    Ok(())
}
