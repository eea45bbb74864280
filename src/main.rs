use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use intensify::application::{ArtifactCache, CreateMemeUseCase, RetentionSweeper};
use intensify::domain::ports::ArtifactStore;
use intensify::domain::services::FrameCompositor;
use intensify::infrastructure::config::{ConfigSource, format_duration, prepare_work_dir};
use intensify::infrastructure::{
    AppConfig, CliArgs, ConfigLoader, FsArtifactStore, RusttypeCaptionRenderer,
};
use intensify::presentation::{AppState, build_router};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn load_config() -> Result<(AppConfig, ConfigSource)> {
    let args = CliArgs::parse();
    let (mut config, source) = ConfigLoader::new().load(args.config.as_deref())?;
    config.merge_with_args(args);
    config.validate()?;
    Ok((config, source))
}

async fn shutdown_signal(shutdown: watch::Sender<bool>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        return;
    }
    info!("Shutdown requested");
    let _ = shutdown.send(true);
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let (config, source) = load_config()?;
    init_logging(&config)?;
    source.log();

    info!(version = intensify::VERSION, "Starting {}", intensify::NAME);

    let work_dir = config.effective_work_dir();
    prepare_work_dir(&work_dir)?;
    info!(path = %work_dir.display(), "Made work directory");

    let render = &config.render;
    let renderer = RusttypeCaptionRenderer::load(&render.font_path, render.font_size, render.dpi)?;
    info!(path = %render.font_path.display(), "Font loaded");

    let store: Arc<dyn ArtifactStore> = Arc::new(FsArtifactStore::new(work_dir).await?);
    let cache = Arc::new(ArtifactCache::new(Arc::clone(&store)));
    let use_case = Arc::new(CreateMemeUseCase::new(
        Arc::new(renderer),
        Arc::clone(&cache),
        FrameCompositor::new(render.compositor_settings()),
        render.debug_masks,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = RetentionSweeper::new(
        cache,
        config.cache.expire,
        config.cache.sweep_interval,
        config.cache.sweep_batch,
    )
    .spawn(shutdown_rx);
    info!(
        expire = %format_duration(config.cache.expire),
        interval = %format_duration(config.cache.sweep_interval),
        "Image reaper started"
    );

    let app = build_router(AppState {
        use_case,
        store,
        upload_limit: config.server.upload_limit,
    });

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .wrap_err_with(|| format!("failed to bind {address}"))?;
    info!(address = %address, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await?;

    sweeper.await?;
    info!("Server stopped");
    Ok(())
}
