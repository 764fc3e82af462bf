use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/info/appointments",
            get(handlers::info::list_all_appointments),
        )
        .route(
            "/info/appointments/mine",
            get(handlers::info::my_appointments),
        )
        .route(
            "/info/appointments/:id/feedback",
            post(handlers::info::submit_feedback),
        )
}
