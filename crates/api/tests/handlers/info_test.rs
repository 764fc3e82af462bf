use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::test_utils::{
    bearer, create_appointment, creation_payload, spawn, ADMIN_TOKEN, STUDENT2_TOKEN,
    STUDENT_TOKEN, TUTOR2_TOKEN, TUTOR_TOKEN,
};

#[tokio::test]
async fn occupants_rate_a_session_once() {
    let app = spawn().await;
    let id = create_appointment(&app, TUTOR_TOKEN, &creation_payload(2, 0)).await;

    let (name, value) = bearer(STUDENT_TOKEN);
    app.server
        .post(&format!("/appointments/{id}/book"))
        .add_header(name, value)
        .await;

    let (name, value) = bearer(STUDENT_TOKEN);
    let response = app
        .server
        .post(&format!("/info/appointments/{id}/feedback"))
        .add_header(name, value)
        .json(&json!({ "rating": 5, "comment": "clear and patient" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["student_id"], json!("s1"));
    assert_eq!(body["rating"], json!(5));

    // A second submission from the same student is rejected.
    let (name, value) = bearer(STUDENT_TOKEN);
    let response = app
        .server
        .post(&format!("/info/appointments/{id}/feedback"))
        .add_header(name, value)
        .json(&json!({ "rating": 1 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["code"], json!("ALREADY_SUBMITTED"));
}

#[tokio::test]
async fn feedback_requires_occupancy_and_a_valid_rating() {
    let app = spawn().await;
    let id = create_appointment(&app, TUTOR_TOKEN, &creation_payload(2, 0)).await;

    let (name, value) = bearer(STUDENT_TOKEN);
    app.server
        .post(&format!("/appointments/{id}/book"))
        .add_header(name, value)
        .await;

    // Not an occupant.
    let (name, value) = bearer(STUDENT2_TOKEN);
    let response = app
        .server
        .post(&format!("/info/appointments/{id}/feedback"))
        .add_header(name, value)
        .json(&json!({ "rating": 4 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["code"], json!("NOT_BOOKED"));

    // Rating out of range.
    let (name, value) = bearer(STUDENT_TOKEN);
    let response = app
        .server
        .post(&format!("/info/appointments/{id}/feedback"))
        .add_header(name, value)
        .json(&json!({ "rating": 6 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn the_owner_attaches_and_corrects_the_report() {
    let app = spawn().await;
    let id = create_appointment(&app, TUTOR_TOKEN, &creation_payload(3, 0)).await;

    let (name, value) = bearer(TUTOR_TOKEN);
    let response = app
        .server
        .post(&format!("/appointments/{id}/report"))
        .add_header(name, value)
        .json(&json!({ "present": 2, "notes": "good turnout" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["report"]["present"], json!(2));
    assert_eq!(body["report"]["capacity"], json!(3));

    // Re-attaching replaces the previous report.
    let (name, value) = bearer(TUTOR_TOKEN);
    let response = app
        .server
        .post(&format!("/appointments/{id}/report"))
        .add_header(name, value)
        .json(&json!({ "present": 1, "notes": "corrected" }))
        .await;
    assert_eq!(response.json::<Value>()["report"]["present"], json!(1));
}

#[tokio::test]
async fn report_is_owner_only_and_bounded_by_capacity() {
    let app = spawn().await;
    let id = create_appointment(&app, TUTOR_TOKEN, &creation_payload(3, 0)).await;

    let (name, value) = bearer(TUTOR2_TOKEN);
    let response = app
        .server
        .post(&format!("/appointments/{id}/report"))
        .add_header(name, value)
        .json(&json!({ "present": 1 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let (name, value) = bearer(TUTOR_TOKEN);
    let response = app
        .server
        .post(&format!("/appointments/{id}/report"))
        .add_header(name, value)
        .json(&json!({ "present": 4 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn the_full_listing_is_for_administrators() {
    let app = spawn().await;
    create_appointment(&app, TUTOR_TOKEN, &creation_payload(2, 0)).await;

    let (name, value) = bearer(STUDENT_TOKEN);
    let response = app
        .server
        .get("/info/appointments")
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let (name, value) = bearer(ADMIN_TOKEN);
    let response = app
        .server
        .get("/info/appointments")
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Vec<Value>>().len(), 1);
}

#[tokio::test]
async fn mine_lists_only_the_callers_bookings() {
    let app = spawn().await;
    let booked = create_appointment(&app, TUTOR_TOKEN, &creation_payload(2, 0)).await;
    create_appointment(&app, TUTOR_TOKEN, &creation_payload(2, 3)).await;

    let (name, value) = bearer(STUDENT_TOKEN);
    app.server
        .post(&format!("/appointments/{booked}/book"))
        .add_header(name, value)
        .await;

    let (name, value) = bearer(STUDENT_TOKEN);
    let response = app
        .server
        .get("/info/appointments/mine")
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let mine = response.json::<Vec<Value>>();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["id"], json!(booked));
}
