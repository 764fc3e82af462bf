//! # Appointment Handlers
//!
//! The booking-engine surface: creation, listing, booking, cancellation
//! and the two-step reschedule. Handlers authenticate the caller, run
//! the engine's validations against fresh store reads, and let the
//! store's compare-and-swap be the only serialization point — a lost
//! race comes back as a domain error, never as silent overbooking.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tutorsync_core::{
    engine,
    errors::TutorError,
    models::appointment::{
        AppointmentResponse, CreateAppointmentRequest, RescheduleRequest,
    },
    models::session::Role,
};
use uuid::Uuid;

use crate::{
    middleware::{auth, error_handling::AppError},
    ApiState,
};

/// Query parameters for the appointment listing endpoint.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Restrict the listing to one tutor's appointments.
    pub tutor_id: Option<String>,
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Json(payload): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<AppointmentResponse>), AppError> {
    let session = auth::authenticate(&state, &headers).await?;
    auth::require_role(&session, Role::Tutor)?;

    // Validate and build the new slot, then check it against the tutor's
    // existing schedule before persisting.
    let apt = engine::prepare_appointment(&session.user_id, &payload)?;
    let existing = state
        .store
        .list_appointments(Some(&session.user_id))
        .await?;
    engine::check_tutor_overlap(&apt, &existing)?;

    let created = state.store.create_appointment(apt).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<AppointmentResponse>>, AppError> {
    let appointments = state
        .store
        .list_appointments(query.tutor_id.as_deref())
        .await?;
    Ok(Json(appointments.into_iter().map(Into::into).collect()))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<AppointmentResponse>, AppError> {
    let apt = state
        .store
        .get_appointment(id)
        .await?
        .ok_or_else(|| TutorError::NotFound(format!("appointment {id} does not exist")))?;
    Ok(Json(apt.into()))
}

#[axum::debug_handler]
pub async fn book(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<AppointmentResponse>, AppError> {
    let session = auth::authenticate(&state, &headers).await?;
    auth::require_role(&session, Role::Student)?;

    let apt = state
        .store
        .get_appointment(id)
        .await?
        .ok_or_else(|| TutorError::NotFound(format!("appointment {id} does not exist")))?;

    // A student cannot sit in two sessions at once. The scan is advisory
    // (the capacity guarantee comes from the store's compare-and-swap);
    // it exists to give a clear answer before the booking is attempted.
    let all = state.store.list_appointments(None).await?;
    engine::check_student_overlap(&apt, &session.user_id, &all)?;

    let updated = state.store.book(id, &session.user_id).await?;
    Ok(Json(updated.into()))
}

#[axum::debug_handler]
pub async fn cancel_booking(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<AppointmentResponse>, AppError> {
    let session = auth::authenticate(&state, &headers).await?;
    auth::require_role(&session, Role::Student)?;

    let updated = state.store.cancel_booking(id, &session.user_id).await?;
    Ok(Json(updated.into()))
}

#[axum::debug_handler]
pub async fn close_appointment(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<AppointmentResponse>, AppError> {
    let session = auth::authenticate(&state, &headers).await?;
    auth::require_role(&session, Role::Tutor)?;

    let apt = state
        .store
        .get_appointment(id)
        .await?
        .ok_or_else(|| TutorError::NotFound(format!("appointment {id} does not exist")))?;
    if session.role != Role::Admin && apt.tutor_id != session.user_id {
        return Err(AppError(TutorError::Authorization(
            "only the owning tutor can cancel this session".into(),
        )));
    }

    let closed = state.store.close_appointment(id).await?;
    Ok(Json(closed.into()))
}

/// The two-step slot switch. On a step-2 loss the response carries the
/// `RESCHEDULE_BOOK_FAILED` code so the client knows the old booking is
/// already released and sends the user back to slot selection.
#[axum::debug_handler]
pub async fn reschedule(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<RescheduleRequest>,
) -> Result<Json<AppointmentResponse>, AppError> {
    let session = auth::authenticate(&state, &headers).await?;
    auth::require_role(&session, Role::Student)?;

    let moved =
        engine::reschedule(state.store.as_ref(), id, payload.to_id, &session.user_id).await?;
    Ok(Json(moved.into()))
}

/// Slots the caller could switch into from the given appointment:
/// open appointments of the same tutor the caller does not already hold.
#[axum::debug_handler]
pub async fn reschedule_options(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<AppointmentResponse>>, AppError> {
    let session = auth::authenticate(&state, &headers).await?;
    auth::require_role(&session, Role::Student)?;

    let current = state
        .store
        .get_appointment(id)
        .await?
        .ok_or_else(|| TutorError::NotFound(format!("appointment {id} does not exist")))?;
    let same_tutor = state
        .store
        .list_appointments(Some(&current.tutor_id))
        .await?;

    let candidates = engine::reschedule_candidates(&same_tutor, &current, &session.user_id);
    Ok(Json(
        candidates.into_iter().cloned().map(Into::into).collect(),
    ))
}
