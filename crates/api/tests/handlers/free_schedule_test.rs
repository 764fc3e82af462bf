use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::test_utils::{bearer, spawn, STUDENT_TOKEN, TUTOR_TOKEN};

#[tokio::test]
async fn unsaved_week_reads_as_an_empty_grid() {
    let app = spawn().await;

    let (name, value) = bearer(TUTOR_TOKEN);
    let response = app
        .server
        .get("/appointments/free-schedule?week=6")
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["cells"], json!([]));
    assert_eq!(body["note"], json!(""));
}

#[tokio::test]
async fn save_with_repeat_copies_the_next_week_independently() {
    let app = spawn().await;
    let cells = json!([
        { "day": 0, "period": 1 },
        { "day": 2, "period": 3 },
    ]);

    let (name, value) = bearer(TUTOR_TOKEN);
    let response = app
        .server
        .post("/appointments/free-schedule")
        .add_header(name, value)
        .json(&json!({
            "week": 6,
            "cells": cells,
            "note": "prefer mornings",
            "repeat_next": true,
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["weeks_saved"], json!([6, 7]));

    // Week 7 holds an identical copy.
    let (name, value) = bearer(TUTOR_TOKEN);
    let response = app
        .server
        .get("/appointments/free-schedule?week=7")
        .add_header(name, value)
        .await;
    let body = response.json::<Value>();
    assert_eq!(body["cells"], cells);
    assert_eq!(body["note"], json!("prefer mornings"));

    // Editing week 6 afterwards does not propagate.
    let (name, value) = bearer(TUTOR_TOKEN);
    app.server
        .post("/appointments/free-schedule")
        .add_header(name, value)
        .json(&json!({ "week": 6, "cells": [], "note": "" }))
        .await;

    let (name, value) = bearer(TUTOR_TOKEN);
    let response = app
        .server
        .get("/appointments/free-schedule?week=7")
        .add_header(name, value)
        .await;
    assert_eq!(response.json::<Value>()["cells"], cells);
}

#[tokio::test]
async fn each_save_replaces_the_week_wholesale() {
    let app = spawn().await;

    let (name, value) = bearer(TUTOR_TOKEN);
    app.server
        .post("/appointments/free-schedule")
        .add_header(name, value)
        .json(&json!({
            "week": 3,
            "cells": [
                { "day": 1, "period": 2 },
                { "day": 3, "period": 4 },
            ],
            "note": "old",
        }))
        .await;

    let (name, value) = bearer(TUTOR_TOKEN);
    app.server
        .post("/appointments/free-schedule")
        .add_header(name, value)
        .json(&json!({
            "week": 3,
            "cells": [{ "day": 5, "period": 6 }],
            "note": "new",
        }))
        .await;

    let (name, value) = bearer(TUTOR_TOKEN);
    let response = app
        .server
        .get("/appointments/free-schedule?week=3")
        .add_header(name, value)
        .await;
    let body = response.json::<Value>();
    assert_eq!(body["cells"], json!([{ "day": 5, "period": 6 }]));
    assert_eq!(body["note"], json!("new"));
}

#[tokio::test]
async fn cells_outside_the_grid_are_rejected() {
    let app = spawn().await;

    let (name, value) = bearer(TUTOR_TOKEN);
    let response = app
        .server
        .post("/appointments/free-schedule")
        .add_header(name, value)
        .json(&json!({
            "week": 6,
            "cells": [{ "day": 9, "period": 1 }],
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], json!("VALIDATION"));
}

#[tokio::test]
async fn the_grid_belongs_to_tutors() {
    let app = spawn().await;

    let (name, value) = bearer(STUDENT_TOKEN);
    let response = app
        .server
        .get("/appointments/free-schedule?week=6")
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}
