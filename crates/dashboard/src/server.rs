//! HTTP server for the dashboard.
//!
//! Routes:
//! - `GET /` dashboard, gated by the session cookie
//! - `GET /login`, `POST /login` passcode form
//! - `GET /static/*` assets
//! - `GET /health` liveness probe

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::aggregate::Aggregator;
use crate::auth::{session_from_cookie_header, AuthError, Authenticator};
use crate::discovery::{discover, CredentialSource};
use crate::render::Renderer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Passcode check and session gate.
    pub auth: Arc<Authenticator>,
    /// Fetch driver.
    pub aggregator: Aggregator,
    /// Where accounts are discovered on each dashboard view.
    pub credentials: Arc<dyn CredentialSource>,
    /// Page templates.
    pub renderer: Arc<Renderer>,
}

/// Login form body.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub passcode: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Build the HTTP router.
pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(dashboard_handler))
        .route("/login", get(login_page_handler).post(login_submit_handler))
        .route("/health", get(health_handler))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server and run until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the server fails to bind or serve.
pub async fn run_server(state: AppState, static_dir: &Path, addr: &str) -> Result<()> {
    let app = build_router(state, static_dir);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Dashboard listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Dashboard stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(session_from_cookie_header)
}

fn redirect(location: &'static str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

fn html_page(body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        ],
        Html(body),
    )
        .into_response()
}

fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// Dashboard handler: one full aggregation pass per view.
async fn dashboard_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !state.auth.authorize(session_cookie(&headers)) {
        debug!("No session, redirecting to login");
        return redirect("/login");
    }

    let entries = discover(state.credentials.as_ref());
    let data = state.aggregator.aggregate(&entries).await;

    match state.renderer.dashboard(&data) {
        Ok(body) => html_page(body),
        Err(e) => {
            error!(error = %e, "Error executing dashboard template");
            internal_error()
        }
    }
}

async fn login_page_handler(State(state): State<AppState>) -> Response {
    match state.renderer.login() {
        Ok(body) => html_page(body),
        Err(e) => {
            error!(error = %e, "Error executing login template");
            internal_error()
        }
    }
}

async fn login_submit_handler(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Response {
    match state.auth.login(&form.passcode) {
        Ok(token) => {
            let Ok(cookie) = HeaderValue::from_str(&token.cookie_header()) else {
                error!("Session marker is not a valid header value");
                return internal_error();
            };
            info!("Login succeeded");
            (
                StatusCode::FOUND,
                [(header::LOCATION, HeaderValue::from_static("/")), (header::SET_COOKIE, cookie)],
            )
                .into_response()
        }
        Err(AuthError::Unauthorized) => {
            (StatusCode::UNAUTHORIZED, "Invalid passcode").into_response()
        }
        Err(e @ AuthError::Crypto(_)) => {
            error!(error = %e, "Failed to seal session marker");
            internal_error()
        }
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}
