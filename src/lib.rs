use serde::{Deserialize, Serialize};

pub mod api;
pub mod gallery;
pub mod repository;
pub mod startup_checks;
pub mod storage;

use repository::DatabaseConfig;
use storage::StorageConfig;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub app: AppConfig,
    #[serde(default)]
    pub gallery: GalleryConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub name: String,
    pub log_level: String,
    pub admin_username: String,
    pub admin_password: String,
    /// HMAC key for the admin session cookie.
    pub session_secret: String,
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u64,
}

fn default_session_ttl_hours() -> u64 {
    24
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Per-file limit, checked for each file in a batch.
    pub max_file_size_bytes: u64,
    /// Limit for a whole upload request body.
    pub max_request_bytes: usize,
    /// Insert the default hotel photos when the gallery is empty at startup.
    pub seed_on_startup: bool,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: 50 * 1024 * 1024,
            max_request_bytes: 200 * 1024 * 1024,
            seed_on_startup: false,
        }
    }
}

pub const DEFAULT_ADMIN_PASSWORD: &str = "password";
pub const DEFAULT_SESSION_SECRET: &str = "change-me-in-production";

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            app: AppConfig {
                name: "Hotel Gallery".to_string(),
                log_level: "info".to_string(),
                admin_username: "admin".to_string(),
                admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
                session_secret: DEFAULT_SESSION_SECRET.to_string(),
                session_ttl_hours: default_session_ttl_hours(),
            },
            gallery: GalleryConfig::default(),
            storage: StorageConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub gallery: gallery::SharedGallery,
    pub config: Config,
}

/// Opens the configured repository and blob store.
pub async fn build_state(config: Config) -> Result<AppState, gallery::GalleryError> {
    let gallery = Arc::new(gallery::GalleryManager::from_config(&config).await?);
    Ok(AppState { gallery, config })
}

pub async fn create_app(config: Config) -> Result<Router, gallery::GalleryError> {
    let app_state = build_state(config).await?;
    Ok(app_router(app_state))
}

pub fn app_router(app_state: AppState) -> Router {
    let body_limit = app_state.config.gallery.max_request_bytes;
    let local_storage = match &app_state.config.storage {
        StorageConfig::Local(local_config) => Some(local_config.clone()),
        _ => None,
    };

    let mut router = Router::new()
        .route(
            "/gallery",
            get(gallery::list_items_handler)
                .post(gallery::upload_handler)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/gallery/seed", post(gallery::seed_handler))
        .route(
            "/gallery/{id}",
            get(gallery::get_item_handler)
                .patch(gallery::update_item_handler)
                .delete(gallery::delete_item_handler),
        )
        .route("/api/login", post(api::login_handler))
        .route("/api/logout", post(api::logout_handler))
        .route("/api/verify", get(api::verify_handler));

    if let Some(local_config) = local_storage {
        let mount_path = local_config.mount_path();
        tracing::info!(
            "Serving uploaded files from {:?} at {}",
            local_config.directory,
            mount_path
        );
        router = router.nest_service(&mount_path, ServeDir::new(&local_config.directory));
    }

    router
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let method = request.method();
                    let uri = request.uri();
                    let matched_path = request
                        .extensions()
                        .get::<axum::extract::MatchedPath>()
                        .map(|matched_path| matched_path.as_str());

                    tracing::info_span!(
                        "http_request",
                        method = %method,
                        uri = %uri,
                        matched_path,
                    )
                })
                .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
                    let headers = request.headers();
                    let user_agent = headers
                        .get("user-agent")
                        .and_then(|h| h.to_str().ok())
                        .unwrap_or("-");
                    let content_length = headers
                        .get("content-length")
                        .and_then(|h| h.to_str().ok())
                        .unwrap_or("-");

                    tracing::info!(
                        target: "access_log",
                        method = %request.method(),
                        path = %request.uri().path(),
                        query = ?request.uri().query(),
                        user_agent = %user_agent,
                        content_length = %content_length,
                        "request"
                    );
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        let size = response
                            .headers()
                            .get("content-length")
                            .and_then(|h| h.to_str().ok())
                            .unwrap_or("-");

                        tracing::info!(
                            target: "access_log",
                            status = %response.status(),
                            size = %size,
                            latency_ms = %latency.as_millis(),
                            "response"
                        );
                    },
                ),
        )
        .with_state(app_state)
}
