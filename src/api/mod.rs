//! JSON HTTP API served by `gojo serve`.
//!
//! Handlers are thin: they parse the request, call into [`crate::core`] and serialise the
//! result. This is also where the demo fallback is decided. When the store cannot be read
//! and `listing.demo_fallback` is on, the browse endpoints answer with the configured demo
//! listings and flag the response with `demo: true`.
//!
//! There is no authentication here. Endpoints that need an acting user read it from the
//! `x-user-id` header and answer 401 when it is missing.

mod admin;
mod analytics;
mod comparison;
mod error;
mod properties;

use crate::{
    config::AppConfig,
    core::comparison::{ComparisonSet, SystemStateStore},
    errors::{Error, Result},
};
use axum::{
    Json, Router,
    http::HeaderMap,
    routing::{delete, get, post, put},
};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Header carrying the acting user's id.
pub const USER_HEADER: &str = "x-user-id";

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    /// The one comparison tray of this process
    pub comparison: Arc<Mutex<ComparisonSet<SystemStateStore>>>,
}

impl AppState {
    /// Builds the state, rehydrating the comparison tray from the store.
    pub async fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        let store = SystemStateStore::new(db.clone());
        let comparison = ComparisonSet::load(store, config.comparison.storage_key.clone()).await;
        Self {
            db,
            config: Arc::new(config),
            comparison: Arc::new(Mutex::new(comparison)),
        }
    }
}

/// The acting user, if the request names one.
fn acting_user(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Like [`acting_user`] but for endpoints that cannot work without one.
fn require_user(headers: &HeaderMap) -> Result<String> {
    acting_user(headers).ok_or_else(|| Error::Unauthorized {
        message: format!("The {USER_HEADER} header is required"),
    })
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Assembles every route.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/properties", get(properties::browse))
        .route("/properties/cities", get(properties::cities))
        .route("/properties/:id", get(properties::detail))
        .route("/properties/:id/inquiries", post(properties::send_inquiry))
        .route("/properties/:id/viewings", post(properties::schedule_viewing))
        .route("/properties/:id/favorite", post(properties::toggle_favorite))
        .route("/favorites", get(properties::my_favorites))
        .route("/my/properties", get(properties::my_properties))
        .route("/profile", put(properties::update_profile))
        .route(
            "/comparison",
            get(comparison::list).post(comparison::add).delete(comparison::clear),
        )
        .route("/comparison/:id", delete(comparison::remove))
        .route("/analytics", get(analytics::owner_report))
        .route("/admin/analytics", get(analytics::admin_report))
        .route(
            "/admin/properties",
            get(admin::list_properties).post(admin::create_property),
        )
        .route("/admin/properties/bulk-delete", post(admin::bulk_delete))
        .route(
            "/admin/properties/:id",
            put(admin::update_property).delete(admin::delete_property),
        )
        .route("/admin/properties/:id/status", put(admin::set_status))
        .route("/admin/properties/:id/featured", put(admin::set_featured))
        .route("/admin/stats", get(admin::stats))
        .route("/admin/inquiries", get(admin::list_inquiries))
        .route("/admin/inquiries/:id/status", put(admin::update_inquiry))
        .route("/admin/viewings", get(admin::list_viewings))
        .route("/admin/viewings/:id/status", put(admin::update_viewing))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/summary", get(admin::users_summary))
        .route("/admin/users/:id/upgrade", post(admin::upgrade_user))
        .route("/admin/users/:id/downgrade", post(admin::downgrade_user))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down");
}

/// Binds `config.server.bind` and serves the API until Ctrl-C.
///
/// # Errors
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(db: DatabaseConnection, config: AppConfig) -> Result<()> {
    let bind = config.server.bind.clone();
    let state = AppState::new(db, config).await;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{init_test_tracing, setup_test_db};
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    /// Router over a fresh in-memory database, plus the database itself.
    pub async fn test_app(config: AppConfig) -> Result<(Router, DatabaseConnection)> {
        init_test_tracing();
        let db = setup_test_db().await?;
        let state = AppState::new(db.clone(), config).await;
        Ok((router(state), db))
    }

    /// Sends one request and returns the status and the parsed JSON body (Null if empty).
    pub async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(USER_HEADER, user);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}
