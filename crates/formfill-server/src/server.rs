//! HTTP routes for form processing and downloads.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::jobs;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

struct AppState {
    config: ServerConfig,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct DownloadLink {
    filename: String,
    url: String,
    #[serde(rename = "type")]
    kind: &'static str,
}

impl DownloadLink {
    /// The URL carries the name as one percent-encoded path segment.
    fn docx(filename: String) -> Self {
        Self {
            url: format!("/api/download/{}", urlencoding::encode(&filename)),
            filename,
            kind: "docx",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessResponse {
    success: bool,
    message: String,
    download_links: Vec<DownloadLink>,
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/process-forms", post(process_forms_handler))
        .route("/api/download/{filename}", get(download_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating output dir {}", config.output_dir.display()))?;
    if !config.templates_dir.is_dir() {
        warn!(dir = %config.templates_dir.display(), "templates directory does not exist");
    }

    let bind = config.bind;
    info!(
        templates = %config.templates_dir.display(),
        output = %config.output_dir.display(),
        populator = %config.populator_bin.display(),
        timeout_secs = config.timeout.as_secs(),
        "starting form server"
    );
    let app = router(Arc::new(AppState { config }));

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("binding {bind}"))?;
    info!("Server listening on http://{}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

async fn process_forms_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Value>,
) -> Result<Json<ProcessResponse>, ServerError> {
    let started = Instant::now();
    info!("processing forms");

    let names = jobs::process_forms(&state.config, &payload)
        .await
        .inspect_err(|e| error!(error = %e, "form processing failed"))?;

    info!(
        forms = names.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "forms processed"
    );
    Ok(Json(ProcessResponse {
        success: true,
        message: format!("Successfully processed {} forms", names.len()),
        download_links: names.into_iter().map(DownloadLink::docx).collect(),
    }))
}

async fn download_handler(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let path = jobs::resolve_download(&state.config.output_dir, &filename)
        .await
        .inspect_err(|e| warn!(filename = %filename, error = %e, "download refused"))?;
    let bytes = tokio::fs::read(&path).await?;
    let served = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or(filename);
    info!(filename = %served, bytes = bytes.len(), "serving download");
    Ok((
        [
            (header::CONTENT_TYPE, DOCX_MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{served}\""),
            ),
        ],
        bytes,
    ))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting graceful shutdown..."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_response_shape() {
        let body = ProcessResponse {
            success: true,
            message: "Successfully processed 1 forms".into(),
            download_links: vec![DownloadLink::docx("smart_nda.docx".into())],
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["success"], true);
        assert_eq!(v["downloadLinks"][0]["filename"], "smart_nda.docx");
        assert_eq!(v["downloadLinks"][0]["url"], "/api/download/smart_nda.docx");
        assert_eq!(v["downloadLinks"][0]["type"], "docx");
    }

    #[test]
    fn download_url_encodes_spaces() {
        let link = DownloadLink::docx("smart_Bounteous_HYD_Letterhead Template_April 2025.docx".into());
        assert_eq!(
            link.url,
            "/api/download/smart_Bounteous_HYD_Letterhead%20Template_April%202025.docx"
        );
        assert_eq!(link.filename, "smart_Bounteous_HYD_Letterhead Template_April 2025.docx");
    }

    #[tokio::test]
    async fn health_is_healthy() {
        let Json(body) = health_handler().await;
        assert_eq!(serde_json::to_value(&body).unwrap()["status"], "healthy");
    }
}
