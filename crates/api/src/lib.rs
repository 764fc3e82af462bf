//! # TutorSync API
//!
//! The HTTP surface of the tutoring-session platform: appointment
//! creation and listing, student booking and self-cancel, the two-step
//! reschedule, tutor availability grids, and post-session report and
//! feedback attachment.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: define the endpoint structure per area
//! - **Handlers**: authenticate the caller, run engine validations, and
//!   drive the store
//! - **Middleware**: bearer-token auth helpers and error-to-response
//!   mapping
//! - **Config**: environment-based server configuration
//!
//! Handlers talk to storage only through the
//! [`AppointmentStore`](tutorsync_core::engine::AppointmentStore) trait,
//! so the same router serves PostgreSQL in production and the in-memory
//! store in tests.

/// Configuration module for API settings
pub mod config;
/// Request handlers that implement the booking flows
pub mod handlers;
/// Middleware for authentication and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;

use axum::Router;
use eyre::Result;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::FmtSubscriber;
use tutorsync_core::engine::AppointmentStore;

/// Shared application state handed to every request handler.
pub struct ApiState {
    /// The appointment store; the only mutable resource in the system.
    pub store: Arc<dyn AppointmentStore>,
}

/// Build the full application router over the given state. Kept separate
/// from [`start_server`] so tests can drive the router directly.
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Appointment lifecycle endpoints
        .merge(routes::appointment::routes())
        // Reporting/feedback listing endpoints
        .merge(routes::info::routes())
        // Attach shared state to all routes
        .with_state(state)
}

/// Starts the API server with the provided configuration and store.
pub async fn start_server(
    config: config::ApiConfig,
    store: Arc<dyn AppointmentStore>,
) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let state = Arc::new(ApiState { store });
    let app = router(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let mut allowed: Vec<axum::http::HeaderValue> = Vec::with_capacity(origins.len());
        for origin in origins {
            allowed.push(origin.parse()?);
        }
        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(allowed)
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Add request timeout middleware
    let app = app.layer(tower_http::timeout::TimeoutLayer::new(
        std::time::Duration::from_secs(config.request_timeout),
    ));

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
