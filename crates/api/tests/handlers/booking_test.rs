use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::test_utils::{
    bearer, create_appointment, creation_payload, spawn, STUDENT2_TOKEN, STUDENT_TOKEN,
    TUTOR2_TOKEN, TUTOR_TOKEN,
};

#[test_log::test(tokio::test)]
async fn booking_flow_fills_and_reopens_a_slot() {
    let app = spawn().await;
    let id = create_appointment(&app, TUTOR_TOKEN, &creation_payload(2, 0)).await;

    // First student books.
    let (name, value) = bearer(STUDENT_TOKEN);
    let response = app
        .server
        .post(&format!("/appointments/{id}/book"))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["current_slots"], json!(["s1"]));
    assert_eq!(body["status"], json!("OPEN"));

    // Second student fills the slot.
    let (name, value) = bearer(STUDENT2_TOKEN);
    let response = app
        .server
        .post(&format!("/appointments/{id}/book"))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["status"], json!("FULL"));

    // First student cancels; the appointment reopens.
    let (name, value) = bearer(STUDENT_TOKEN);
    let response = app
        .server
        .delete(&format!("/appointments/{id}/book"))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["current_slots"], json!(["s2"]));
    assert_eq!(body["status"], json!("OPEN"));
}

#[tokio::test]
async fn booking_requires_a_valid_token_and_the_student_role() {
    let app = spawn().await;
    let id = create_appointment(&app, TUTOR_TOKEN, &creation_payload(2, 0)).await;

    let response = app.server.post(&format!("/appointments/{id}/book")).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["code"], json!("UNAUTHORIZED"));

    let (name, value) = bearer(TUTOR_TOKEN);
    let response = app
        .server
        .post(&format!("/appointments/{id}/book"))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["code"], json!("FORBIDDEN"));
}

#[tokio::test]
async fn full_and_repeat_bookings_conflict() {
    let app = spawn().await;
    let id = create_appointment(&app, TUTOR_TOKEN, &creation_payload(1, 0)).await;

    let (name, value) = bearer(STUDENT_TOKEN);
    app.server
        .post(&format!("/appointments/{id}/book"))
        .add_header(name, value)
        .await;

    // Same student again.
    let (name, value) = bearer(STUDENT_TOKEN);
    let response = app
        .server
        .post(&format!("/appointments/{id}/book"))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["code"], json!("ALREADY_BOOKED"));

    // Capacity race lost by the second student.
    let (name, value) = bearer(STUDENT2_TOKEN);
    let response = app
        .server
        .post(&format!("/appointments/{id}/book"))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["code"], json!("FULL"));
}

#[tokio::test]
async fn cancelling_without_a_booking_conflicts() {
    let app = spawn().await;
    let id = create_appointment(&app, TUTOR_TOKEN, &creation_payload(2, 0)).await;

    let (name, value) = bearer(STUDENT_TOKEN);
    let response = app
        .server
        .delete(&format!("/appointments/{id}/book"))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["code"], json!("NOT_BOOKED"));
}

#[tokio::test]
async fn creation_validates_input() {
    let app = spawn().await;

    let (name, value) = bearer(TUTOR_TOKEN);
    let response = app
        .server
        .post("/appointments")
        .add_header(name, value)
        .json(&creation_payload(0, 0))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], json!("VALIDATION"));
}

#[tokio::test]
async fn a_tutor_cannot_create_overlapping_sessions() {
    let app = spawn().await;
    create_appointment(&app, TUTOR_TOKEN, &creation_payload(2, 0)).await;

    let (name, value) = bearer(TUTOR_TOKEN);
    let response = app
        .server
        .post("/appointments")
        .add_header(name, value)
        .json(&creation_payload(2, 0))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["code"], json!("OVERLAP"));
}

#[tokio::test]
async fn a_student_cannot_book_two_overlapping_sessions() {
    let app = spawn().await;
    // Same hour, different tutors.
    let first = create_appointment(&app, TUTOR_TOKEN, &creation_payload(2, 0)).await;
    let second = create_appointment(&app, TUTOR2_TOKEN, &creation_payload(2, 0)).await;

    let (name, value) = bearer(STUDENT_TOKEN);
    app.server
        .post(&format!("/appointments/{first}/book"))
        .add_header(name, value)
        .await;

    let (name, value) = bearer(STUDENT_TOKEN);
    let response = app
        .server
        .post(&format!("/appointments/{second}/book"))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["code"], json!("OVERLAP"));
}

#[tokio::test]
async fn only_the_owner_closes_and_closed_reads_as_gone() {
    let app = spawn().await;
    let id = create_appointment(&app, TUTOR_TOKEN, &creation_payload(2, 0)).await;

    let (name, value) = bearer(TUTOR2_TOKEN);
    let response = app
        .server
        .delete(&format!("/appointments/{id}"))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let (name, value) = bearer(TUTOR_TOKEN);
    let response = app
        .server
        .delete(&format!("/appointments/{id}"))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["status"], json!("CLOSED"));

    // Occupant-side operations now observe the appointment as gone.
    let (name, value) = bearer(STUDENT_TOKEN);
    let response = app
        .server
        .post(&format!("/appointments/{id}/book"))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reschedule_moves_the_student_between_slots() {
    let app = spawn().await;
    let a = create_appointment(&app, TUTOR_TOKEN, &creation_payload(2, 0)).await;
    let b = create_appointment(&app, TUTOR_TOKEN, &creation_payload(1, 3)).await;

    let (name, value) = bearer(STUDENT_TOKEN);
    app.server
        .post(&format!("/appointments/{a}/book"))
        .add_header(name, value)
        .await;

    let (name, value) = bearer(STUDENT_TOKEN);
    let response = app
        .server
        .post(&format!("/appointments/{a}/reschedule"))
        .add_header(name, value)
        .json(&json!({ "to_id": b }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["id"], json!(b));
    assert_eq!(body["current_slots"], json!(["s1"]));

    let response = app.server.get(&format!("/appointments/{a}")).await;
    assert_eq!(response.json::<Value>()["current_slots"], json!([]));
}

#[tokio::test]
async fn reschedule_partial_failure_reports_the_vacated_slot() {
    let app = spawn().await;
    let a = create_appointment(&app, TUTOR_TOKEN, &creation_payload(2, 0)).await;
    let b = create_appointment(&app, TUTOR_TOKEN, &creation_payload(1, 3)).await;

    let (name, value) = bearer(STUDENT_TOKEN);
    app.server
        .post(&format!("/appointments/{a}/book"))
        .add_header(name, value)
        .await;

    // The other student wins B's only slot first.
    let (name, value) = bearer(STUDENT2_TOKEN);
    app.server
        .post(&format!("/appointments/{b}/book"))
        .add_header(name, value)
        .await;

    let (name, value) = bearer(STUDENT_TOKEN);
    let response = app
        .server
        .post(&format!("/appointments/{a}/reschedule"))
        .add_header(name, value)
        .json(&json!({ "to_id": b }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    let body = response.json::<Value>();
    // Distinct from a plain FULL: the old slot is already gone.
    assert_eq!(body["code"], json!("RESCHEDULE_BOOK_FAILED"));

    let response = app.server.get(&format!("/appointments/{a}")).await;
    assert_eq!(response.json::<Value>()["current_slots"], json!([]));
    let response = app.server.get(&format!("/appointments/{b}")).await;
    assert_eq!(response.json::<Value>()["current_slots"], json!(["s2"]));
}

#[tokio::test]
async fn reschedule_options_list_open_unheld_same_tutor_slots() {
    let app = spawn().await;
    let current = create_appointment(&app, TUTOR_TOKEN, &creation_payload(2, 0)).await;
    let open = create_appointment(&app, TUTOR_TOKEN, &creation_payload(2, 3)).await;
    let full = create_appointment(&app, TUTOR_TOKEN, &creation_payload(1, 6)).await;
    let other_tutor = create_appointment(&app, TUTOR2_TOKEN, &creation_payload(2, 9)).await;

    let (name, value) = bearer(STUDENT_TOKEN);
    app.server
        .post(&format!("/appointments/{current}/book"))
        .add_header(name, value)
        .await;
    let (name, value) = bearer(STUDENT2_TOKEN);
    app.server
        .post(&format!("/appointments/{full}/book"))
        .add_header(name, value)
        .await;

    let (name, value) = bearer(STUDENT_TOKEN);
    let response = app
        .server
        .get(&format!("/appointments/{current}/reschedule-options"))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let ids: Vec<String> = response
        .json::<Vec<Value>>()
        .into_iter()
        .map(|apt| apt["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec![open.clone()]);
    assert!(!ids.contains(&other_tutor));
}

#[tokio::test]
async fn listing_filters_by_tutor() {
    let app = spawn().await;
    create_appointment(&app, TUTOR_TOKEN, &creation_payload(2, 0)).await;
    create_appointment(&app, TUTOR2_TOKEN, &creation_payload(2, 3)).await;

    let response = app.server.get("/appointments?tutor_id=tutor-1").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let listed = response.json::<Vec<Value>>();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["tutor_id"], json!("tutor-1"));

    let response = app.server.get("/appointments").await;
    assert_eq!(response.json::<Vec<Value>>().len(), 2);
}
