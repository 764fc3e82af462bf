use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tutorsync_core::{
    engine,
    models::free_schedule::{
        FreeSchedule, FreeScheduleResponse, SetFreeScheduleRequest, SetFreeScheduleResponse,
    },
    models::session::Role,
};

use crate::{
    middleware::{auth, error_handling::AppError},
    ApiState,
};

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    pub week: i32,
}

#[axum::debug_handler]
pub async fn get_free_schedule(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Query(query): Query<WeekQuery>,
) -> Result<Json<FreeScheduleResponse>, AppError> {
    let session = auth::authenticate(&state, &headers).await?;
    auth::require_role(&session, Role::Tutor)?;

    let schedule = state
        .store
        .get_free_schedule(&session.user_id, query.week)
        .await?;
    Ok(Json(schedule.into()))
}

/// Wholesale save of one week's availability grid. With `repeat_next`
/// set, the same cells and note are saved again for the following week —
/// an independent copy, not a live link.
#[axum::debug_handler]
pub async fn set_free_schedule(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Json(payload): Json<SetFreeScheduleRequest>,
) -> Result<Json<SetFreeScheduleResponse>, AppError> {
    let session = auth::authenticate(&state, &headers).await?;
    auth::require_role(&session, Role::Tutor)?;

    engine::validate_free_schedule(&payload.cells)?;

    let mut weeks_saved = vec![payload.week];
    if payload.repeat_next {
        weeks_saved.push(payload.week + 1);
    }

    for &week in &weeks_saved {
        state
            .store
            .replace_free_schedule(FreeSchedule {
                tutor_id: session.user_id.clone(),
                week,
                cells: payload.cells.clone(),
                note: payload.note.clone(),
                updated_at: Utc::now(),
            })
            .await?;
    }

    Ok(Json(SetFreeScheduleResponse { weeks_saved }))
}
