use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/appointments",
            get(handlers::appointment::list_appointments)
                .post(handlers::appointment::create_appointment),
        )
        // Static segment registered alongside /appointments/:id; the
        // router prefers the static match.
        .route(
            "/appointments/free-schedule",
            get(handlers::free_schedule::get_free_schedule)
                .post(handlers::free_schedule::set_free_schedule),
        )
        .route(
            "/appointments/:id",
            get(handlers::appointment::get_appointment)
                .delete(handlers::appointment::close_appointment),
        )
        .route(
            "/appointments/:id/book",
            post(handlers::appointment::book).delete(handlers::appointment::cancel_booking),
        )
        .route(
            "/appointments/:id/reschedule",
            post(handlers::appointment::reschedule),
        )
        .route(
            "/appointments/:id/reschedule-options",
            get(handlers::appointment::reschedule_options),
        )
        .route(
            "/appointments/:id/report",
            post(handlers::info::attach_report),
        )
}
