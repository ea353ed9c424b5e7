//! Web server implementation

use crate::maintenance;
use crate::pages::{PageContext, PageRegistry};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form as UrlEncoded, Json, Router,
};
use foris_common::{
    ConfigStore, Error, Filter, FormView, Outcome, RemoteOps, Result, Submission,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Web server state
#[derive(Clone)]
pub struct WebServer {
    state: Arc<WebServerState>,
}

struct WebServerState {
    ctx: PageContext,
    pages: PageRegistry,
}

impl WebServerState {
    /// Build, validate and commit a page form; blocks on store and remote calls
    fn submit(&self, slug: &str, submission: Submission) -> Result<(Outcome, FormView)> {
        let page = self
            .pages
            .get(slug)
            .ok_or_else(|| Error::Internal(format!("unknown page {}", slug)))?;
        let mut form = page.build_form(Some(submission), &self.ctx)?;
        let outcome = form.commit(self.ctx.store.as_ref())?;
        Ok((outcome, form.render()))
    }

    fn display(&self, slug: &str) -> Result<FormView> {
        let page = self
            .pages
            .get(slug)
            .ok_or_else(|| Error::Internal(format!("unknown page {}", slug)))?;
        Ok(page.build_form(None, &self.ctx)?.render())
    }
}

impl WebServer {
    /// Create a new web server
    pub fn new(store: Arc<dyn ConfigStore>, remote: Arc<dyn RemoteOps>, lang: impl Into<String>) -> Self {
        Self::with_pages(store, remote, lang, PageRegistry::default())
    }

    pub fn with_pages(
        store: Arc<dyn ConfigStore>,
        remote: Arc<dyn RemoteOps>,
        lang: impl Into<String>,
        pages: PageRegistry,
    ) -> Self {
        Self {
            state: Arc::new(WebServerState {
                ctx: PageContext {
                    store,
                    remote,
                    lang: lang.into(),
                },
                pages,
            }),
        }
    }

    /// Create router
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/health", get(health_handler))
            .route("/config", get(list_pages_handler))
            .route("/config/maintenance/backup", get(backup_handler))
            .route("/config/maintenance/restore", post(restore_handler))
            .route("/config/maintenance/reboot", post(reboot_handler))
            .route("/config/:page", get(show_page_handler).post(submit_page_handler))
            .fallback(not_found_handler)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Start the web server
    pub async fn serve(self, addr: SocketAddr) -> anyhow::Result<()> {
        info!("Foris web interface starting on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}

// ============================================================================
// Responses
// ============================================================================

fn error_response(status: StatusCode, message: impl std::fmt::Display) -> Response {
    (
        status,
        Json(serde_json::json!({
            "success": false,
            "error": message.to_string(),
        })),
    )
        .into_response()
}

/// Status for a pipeline error: store and remote failures are upstream problems
fn pipeline_error(e: Error) -> Response {
    if e.is_external() {
        warn!("Upstream failure: {}", e);
        error_response(StatusCode::BAD_GATEWAY, e)
    } else {
        error!("Request failed: {}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, e)
    }
}

/// Restore failure: a bad upload or a store that refused it
enum RestoreError {
    Backup(maintenance::BackupError),
    Store(Error),
}

fn outcome_response(outcome: Outcome, form: FormView) -> Response {
    let tag = outcome.tag();
    match outcome {
        Outcome::FormInvalid { errors } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({
                "tag": tag,
                "success": false,
                "errors": errors,
                "form": form,
            })),
        )
            .into_response(),
        Outcome::CallbackFailed { callback, reason } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "tag": tag,
                "success": false,
                "callback": callback,
                "error": reason,
            })),
        )
            .into_response(),
        Outcome::SaveResult { payload, .. } => (
            StatusCode::OK,
            Json(serde_json::json!({
                "tag": tag,
                "success": true,
                "payload": payload,
                "form": form,
            })),
        )
            .into_response(),
        Outcome::None | Outcome::EditConfig { .. } => (
            StatusCode::OK,
            Json(serde_json::json!({
                "tag": tag,
                "success": true,
                "form": form,
            })),
        )
            .into_response(),
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "foris-web"
    }))
}

async fn list_pages_handler(State(state): State<Arc<WebServerState>>) -> impl IntoResponse {
    Json(serde_json::json!({ "pages": state.pages.list() }))
}

async fn show_page_handler(
    State(state): State<Arc<WebServerState>>,
    Path(slug): Path<String>,
) -> Response {
    if state.pages.get(&slug).is_none() {
        return not_found_handler().await.into_response();
    }
    let result = tokio::task::spawn_blocking(move || state.display(&slug)).await;
    match result {
        Ok(Ok(form)) => (StatusCode::OK, Json(form)).into_response(),
        Ok(Err(e)) => pipeline_error(e),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

async fn submit_page_handler(
    State(state): State<Arc<WebServerState>>,
    Path(slug): Path<String>,
    UrlEncoded(pairs): UrlEncoded<Vec<(String, String)>>,
) -> Response {
    if state.pages.get(&slug).is_none() {
        return not_found_handler().await.into_response();
    }
    let submission = Submission::from_pairs(pairs);
    let result = tokio::task::spawn_blocking(move || state.submit(&slug, submission)).await;
    match result {
        Ok(Ok((outcome, form))) => outcome_response(outcome, form),
        Ok(Err(e)) => pipeline_error(e),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

async fn backup_handler(State(state): State<Arc<WebServerState>>) -> Response {
    let result = tokio::task::spawn_blocking(move || -> anyhow::Result<Vec<u8>> {
        let tree = state.ctx.store.query(&Filter::all())?;
        Ok(maintenance::create_backup(&tree)?)
    })
    .await;

    match result {
        Ok(Ok(archive)) => {
            let filename = format!(
                "foris-backup-{}.tar.gz",
                chrono::Utc::now().format("%Y%m%d-%H%M%S")
            );
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "application/gzip".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", filename),
                    ),
                ],
                archive,
            )
                .into_response()
        }
        Ok(Err(e)) => error_response(StatusCode::BAD_GATEWAY, e),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

async fn restore_handler(State(state): State<Arc<WebServerState>>, body: Bytes) -> Response {
    let result = tokio::task::spawn_blocking(move || {
        let backup = maintenance::read_backup(&body).map_err(RestoreError::Backup)?;
        let configs: Vec<String> = backup.config_names().map(String::from).collect();
        state
            .ctx
            .store
            .apply(&maintenance::restore_tree(&backup))
            .map_err(RestoreError::Store)?;
        Ok::<_, RestoreError>(configs)
    })
    .await;

    match result {
        Ok(Ok(configs)) => {
            info!(?configs, "Restored configuration backup");
            Json(serde_json::json!({
                "success": true,
                "configs": configs,
            }))
            .into_response()
        }
        Ok(Err(RestoreError::Backup(e))) => {
            info!("Rejected configuration backup: {}", e);
            error_response(StatusCode::UNPROCESSABLE_ENTITY, e)
        }
        Ok(Err(RestoreError::Store(e))) => pipeline_error(e),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

async fn reboot_handler(State(state): State<Arc<WebServerState>>) -> Response {
    let result = tokio::task::spawn_blocking(move || state.ctx.remote.reboot()).await;
    match result {
        Ok(Ok(())) => Json(serde_json::json!({ "success": true })).into_response(),
        Ok(Err(e)) => pipeline_error(e),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

async fn not_found_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}
