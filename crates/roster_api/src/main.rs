use anyhow::{Context, Result};
use log::{error, info};
use roster_api::{bootstrap, create_router, Settings};
use roster_core::{init_logging, LogTarget};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load().context("failed to load configuration")?;
    settings.validate().map_err(anyhow::Error::msg)?;

    let target = match &settings.logging.dir {
        Some(dir) => LogTarget::Directory(dir.clone()),
        None => LogTarget::Stderr,
    };
    init_logging(&settings.logging.level, target).map_err(anyhow::Error::msg)?;

    let addr = settings
        .server
        .socket_addr()
        .context("invalid server host")?;
    let state = bootstrap::build_state(settings)?;
    let app = create_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("event=server_start module=api status=ok addr={addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=api status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("event=shutdown_signal module=api status=error error={err}");
        std::future::pending::<()>().await;
    }
    info!("event=shutdown_signal module=api status=ok signal=ctrl_c");
}
