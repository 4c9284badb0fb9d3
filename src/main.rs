// Main entry point - Dependency injection, mock backend and demo session
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tracing_subscriber::EnvFilter;

use welllog_loader::application::log_repository::LogRepository;
use welllog_loader::application::log_session::{LogSession, StreamSetup};
use welllog_loader::domain::viewport::Viewport;
use welllog_loader::infrastructure::config::{
    AppConfig, TracksConfig, load_app_config, load_mock_config, load_tracks_config,
};
use welllog_loader::infrastructure::headless_renderer::HeadlessRenderer;
use welllog_loader::infrastructure::http_log_repository::HttpLogRepository;
use welllog_loader::presentation::app_state::MockServerState;
use welllog_loader::presentation::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let app_config = load_app_config()?;
    let tracks = load_tracks_config()?;
    let mock = load_mock_config()?;

    // Mock backend (presentation layer)
    let state = Arc::new(MockServerState::from_logs(&mock.logs));
    let router = build_router(state);

    let addr: SocketAddr = app_config.server.bind.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Mock log server listening on {}", addr);
    let server = tokio::spawn(async move { axum::serve(listener, router).await });

    if app_config.demo.enabled {
        let result = run_demo(&app_config, &tracks).await;
        server.abort();
        return result;
    }

    server.await??;
    Ok(())
}

/// Scroll every configured stream in its own session: depth and time logs do
/// not share an index axis, so each gets its own headless viewport.
async fn run_demo(app_config: &AppConfig, tracks: &TracksConfig) -> anyhow::Result<()> {
    let repository: Arc<dyn LogRepository> = Arc::new(HttpLogRepository::from_settings(&app_config.backend));

    let results = futures::future::join_all(
        tracks
            .to_setups()
            .into_iter()
            .map(|setup| demo_stream(app_config, Arc::clone(&repository), setup)),
    )
    .await;

    for result in results {
        if let Err(e) = result {
            tracing::warn!("Demo stream failed: {:#}", e);
        }
    }
    Ok(())
}

async fn demo_stream(
    app_config: &AppConfig,
    repository: Arc<dyn LogRepository>,
    setup: StreamSetup,
) -> anyhow::Result<()> {
    let renderer = Arc::new(HeadlessRenderer::new());
    let session = LogSession::new(app_config.loader.to_settings(), repository, renderer.clone());
    session.open(vec![setup]).await?;

    let Some(entry) = session.catalog().streams().into_iter().next() else {
        return Ok(());
    };
    let Some(first_curve) = entry.curves.first() else {
        return Ok(());
    };
    let domain = entry.domain();
    let chunk = session.store().tracker().chunk_size_for(&first_curve.id);
    let demo = &app_config.demo;
    let span = chunk * demo.viewport_chunks;
    let step = chunk * demo.scroll_chunks;

    session.start();
    let mut lo = domain.min;
    let mut ticker = tokio::time::interval(Duration::from_millis(demo.step_interval_ms));
    for _ in 0..demo.steps {
        ticker.tick().await;
        renderer.set_viewport(Viewport::new(lo, lo + span));
        lo = (lo + step).min(domain.max - span).max(domain.min);
    }

    for curve in &entry.curves {
        if let Some(extent) = session.store().extent(&curve.id) {
            tracing::info!("{}: loaded [{}, {}]", curve.display_name, extent.min, extent.max);
        }
    }
    let status = session.status();
    if !status.is_healthy() {
        tracing::warn!("Persistent fetch failures on {}: {:?}", entry.stream_id(), status.failing);
    }
    tracing::info!(
        "{}: renderer received {} updates",
        entry.stream_id(),
        renderer.update_count()
    );

    session.shutdown();
    Ok(())
}
