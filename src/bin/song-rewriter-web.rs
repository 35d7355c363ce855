use anyhow::Context;
use song_rewriter::logging::{init_tracing, log_info};
use song_rewriter::web::{self, AppState};
use song_rewriter::{LockScope, LogWriter, Settings, SongRewriter};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("song_rewriter=info");

    let settings = Settings::from_env();
    settings.validate()?;

    let rewriter = SongRewriter::from_settings(&settings)?;
    let log_writer = LogWriter::new(settings.log.clone(), LockScope::PerPath);
    let app = web::router(Arc::new(AppState::new(rewriter, log_writer)));

    let addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    log_info!(
        addr = %addr,
        log_path = %settings.log.path().display(),
        version = env!("CARGO_PKG_VERSION"),
        "SongReWriter web server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log_info!("SongReWriter web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
