pub mod config;

use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::info;

use crate::web;
use config::ServerConfig;

pub async fn run_http_server(
    db_pool: DatabaseConnection,
    config: Arc<ServerConfig>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listen_addr = config.listen_addr.clone();
    let app_router = web::create_axum_router(db_pool, config);

    info!(addr = %listen_addr, "HTTP server listening");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app_router).await?;
    Ok(())
}
