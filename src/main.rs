mod config;
mod routes;

use config::HostConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = HostConfig::from_env()?;
    if !config.web_dir.is_dir() {
        tracing::warn!(web_dir = %config.web_dir.display(), "web directory missing; only /healthz will respond");
    }

    let app = routes::app(&config);
    let listener = tokio::net::TcpListener::bind(config.bind).await?;

    tracing::info!(addr = %config.bind, web_dir = %config.web_dir.display(), "modeler host listening");
    axum::serve(listener, app).await?;
    Ok(())
}
