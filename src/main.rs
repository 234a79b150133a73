use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use mediabatch_core::config::{
    ffmpeg_program_from_env_value, max_upload_bytes_from_env_value, media_timeout_from_env_value,
    output_extension_from_env_value, scratch_dir_from_env_value,
};
use mediabatch_core::{AudioReplaceService, CoreConfig};

/// Main entry point for the MediaBatch service
///
/// Resolves configuration once, then serves the REST API until Ctrl+C.
///
/// # Environment Variables
/// - `MEDIABATCH_REST_ADDR`: REST server address (default: "0.0.0.0:5000")
/// - `MEDIABATCH_SCRATCH_DIR`: Parent directory for per-request scratch space
///   (default: "<system temp>/mediabatch")
/// - `MEDIABATCH_FFMPEG`: ffmpeg program name or path (default: "ffmpeg")
/// - `MEDIABATCH_MEDIA_TIMEOUT_SECS`: Per-pair encode timeout (default: 600)
/// - `MEDIABATCH_OUTPUT_EXT`: Container of merged videos (default: "mp4")
/// - `MEDIABATCH_MAX_UPLOAD_BYTES`: Request body limit (default: 1 GiB)
///
/// # Returns
/// * `Ok(())` - If the server shuts down cleanly
/// * `Err(anyhow::Error)` - If configuration is invalid or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mediabatch_run=info".parse()?)
                .add_directive("mediabatch_core=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr =
        std::env::var("MEDIABATCH_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".into());
    let max_upload_bytes =
        max_upload_bytes_from_env_value(std::env::var("MEDIABATCH_MAX_UPLOAD_BYTES").ok())?;

    let cfg = Arc::new(CoreConfig::new(
        scratch_dir_from_env_value(std::env::var("MEDIABATCH_SCRATCH_DIR").ok()),
        ffmpeg_program_from_env_value(std::env::var("MEDIABATCH_FFMPEG").ok()),
        media_timeout_from_env_value(std::env::var("MEDIABATCH_MEDIA_TIMEOUT_SECS").ok())?,
        output_extension_from_env_value(std::env::var("MEDIABATCH_OUTPUT_EXT").ok()),
    )?);

    let audio_service = AudioReplaceService::with_ffmpeg(cfg.clone())?;
    tracing::info!(
        scratch_dir = %audio_service.scratch_root().display(),
        ffmpeg = cfg.ffmpeg_program(),
        "media pipeline configured"
    );

    let app = api_rest::router(AppState::new(audio_service), max_upload_bytes);

    tracing::info!("++ Starting MediaBatch REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("MediaBatch REST stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {:?}", e);
    }
}
