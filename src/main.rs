//! Zine front end
//!
//! Serves the magazine's reader-facing views (comments, testimonials, contributors,
//! subscribe form, policy pages) and the admin issue list, backed by an external
//! REST API.

mod api;
mod auth;
mod cache;
mod config;
mod errors;
mod models;
mod upstream;
mod views;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cache::SessionStore;
use config::Config;
use upstream::UpstreamClient;
use views::ViewScope;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
    pub sessions: Arc<SessionStore>,
    pub config: Arc<Config>,
    /// Parent of every view mounted by a handler; unmounted on shutdown
    pub views: ViewScope,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Zine front end");
    tracing::info!("Upstream API: {}", config.api_base_url);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.admin_psk.is_none() {
        tracing::warn!("No admin PSK configured (ZINE_ADMIN_PSK). Admin routes are open!");
    }

    let state = AppState {
        upstream: Arc::new(UpstreamClient::from_config(&config)?),
        sessions: Arc::new(SessionStore::default()),
        config: Arc::new(config.clone()),
        views: ViewScope::new(),
    };
    let views = state.views.clone();

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutting down, cancelling in-flight view requests");
            views.unmount();
        })
        .await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let psk = state.config.admin_psk.clone();

    let admin_routes = Router::new()
        .route("/issues", get(api::list_issues).post(api::create_issue))
        .route(
            "/issues/{id}",
            put(api::update_issue).delete(api::delete_issue),
        )
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    let public_routes = Router::new()
        .route(
            "/discussions/{id}/comments",
            get(api::list_comments).post(api::post_comment),
        )
        .route("/testimonials", get(api::get_testimonials))
        .route("/contributors", get(api::list_contributors))
        .route("/contributors/roles", get(api::list_roles))
        .route("/contributors/{id}", get(api::get_contributor))
        .route("/subscribe", post(api::subscribe))
        .route("/pages", get(api::list_pages))
        .route("/pages/{slug}", get(api::get_page))
        .route("/health", get(health_check));

    Router::new()
        .nest("/admin", admin_routes)
        .merge(public_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
