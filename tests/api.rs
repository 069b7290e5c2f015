use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use meetgrid::{app, db, state::AppState};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

async fn test_app() -> Result<Router> {
    // One connection only: each connection to sqlite::memory: would get
    // its own empty database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    db::init_schema(&pool).await.map_err(|e| anyhow::anyhow!("{e:?}"))?;
    Ok(app(AppState { pool }))
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn create_event(app: &Router) -> Result<(String, String)> {
    let response = app
        .clone()
        .oneshot(post(
            "/api/events",
            json!({
                "name": "Team Dinner",
                "description": "pick an evening",
                "slots": ["2024-03-01:10", "2024-03-01:9"]
            }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await?;
    Ok((
        body["public_id"].as_str().unwrap().to_string(),
        body["mod_key"].as_str().unwrap().to_string(),
    ))
}

async fn submit_vote(app: &Router, public_id: &str, body: Value) -> StatusCode {
    app.clone()
        .oneshot(post(&format!("/api/events/{public_id}/votes"), body))
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn create_then_fetch_event() -> Result<()> {
    let app = test_app().await?;
    let (public_id, _) = create_event(&app).await?;

    let response = app
        .clone()
        .oneshot(get(&format!("/api/events/{public_id}")))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await?;
    assert_eq!(body["name"], "Team Dinner");
    // Canonical ascending order, and the moderator key never leaks.
    assert_eq!(body["slots"], json!(["2024-03-01:9", "2024-03-01:10"]));
    assert!(body.get("mod_key").is_none());
    Ok(())
}

#[tokio::test]
async fn create_event_validation() -> Result<()> {
    let app = test_app().await?;

    let response = app
        .clone()
        .oneshot(post(
            "/api/events",
            json!({"name": "  ", "slots": ["2024-03-01:9"]}),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(post("/api/events", json!({"name": "Dinner", "slots": []})))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn unknown_event_is_404() -> Result<()> {
    let app = test_app().await?;
    let response = app.clone().oneshot(get("/api/events/doesnotexist")).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn vote_validation() -> Result<()> {
    let app = test_app().await?;
    let (public_id, _) = create_event(&app).await?;

    // Empty voter name.
    let status = submit_vote(
        &app,
        &public_id,
        json!({"voter_name": " ", "ratings": []}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Rating for a slot outside the candidate set.
    let status = submit_vote(
        &app,
        &public_id,
        json!({
            "voter_name": "A",
            "ratings": [{"slot": "2024-03-05:9", "rating": "great"}]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Same slot rated twice in one submission.
    let status = submit_vote(
        &app,
        &public_id,
        json!({
            "voter_name": "A",
            "ratings": [
                {"slot": "2024-03-01:9", "rating": "great"},
                {"slot": "2024-03-01:9", "rating": "fine"}
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn results_require_the_mod_key() -> Result<()> {
    let app = test_app().await?;
    let (public_id, mod_key) = create_event(&app).await?;

    let response = app
        .clone()
        .oneshot(get(&format!("/api/events/{public_id}/votes?key=wrong")))
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(get(&format!("/api/events/{public_id}/votes?key={mod_key}")))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await?, json!([]));
    Ok(())
}

#[tokio::test]
async fn heatmap_end_to_end() -> Result<()> {
    let app = test_app().await?;
    let (public_id, mod_key) = create_event(&app).await?;

    let status = submit_vote(
        &app,
        &public_id,
        json!({
            "voter_name": "A",
            "ratings": [{"slot": "2024-03-01:9", "rating": "great"}]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let status = submit_vote(
        &app,
        &public_id,
        json!({
            "voter_name": "B",
            "ratings": [
                {"slot": "2024-03-01:9", "rating": "good"},
                {"slot": "2024-03-01:10", "rating": "fine"}
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(get(&format!("/api/events/{public_id}/heatmap?key={mod_key}")))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let cells = json_body(response).await?;
    let cells = cells.as_array().unwrap();
    assert_eq!(cells.len(), 2);

    let nine = &cells[0];
    assert_eq!(nine["slot"], "2024-03-01:9");
    assert_eq!(nine["cant_count"], 0);
    assert_eq!(nine["can_make_count"], 2);
    assert_eq!(nine["avg_goodness"].as_f64().unwrap(), 2.5);
    assert_eq!(nine["all_can_make"], true);
    assert_eq!(nine["indicator_count"], 0);
    // avg 2.5 blends three quarters of the way from fine to great.
    assert_eq!(nine["color"], "rgb(60, 183, 85)");

    let ten = &cells[1];
    assert_eq!(ten["slot"], "2024-03-01:10");
    assert_eq!(ten["cant_count"], 1);
    assert_eq!(ten["can_make_count"], 1);
    assert_eq!(ten["avg_goodness"].as_f64().unwrap(), 1.0);
    assert_eq!(ten["all_can_make"], false);
    assert_eq!(ten["indicator_count"], 1);
    assert_eq!(ten["color"], "rgb(209, 213, 219)");
    assert_eq!(ten["voter_ratings"][0]["voter_name"], "A");
    assert_eq!(ten["voter_ratings"][0]["rating"], Value::Null);

    // Hiding B narrows the aggregation without touching stored votes.
    let response = app
        .clone()
        .oneshot(get(&format!(
            "/api/events/{public_id}/heatmap?key={mod_key}&hide=B"
        )))
        .await?;
    let cells = json_body(response).await?;
    let nine = &cells.as_array().unwrap()[0];
    assert_eq!(nine["can_make_count"], 1);
    assert_eq!(nine["avg_goodness"].as_f64().unwrap(), 3.0);
    assert_eq!(nine["all_can_make"], true);
    assert_eq!(nine["color"], "rgb(34, 197, 94)");
    Ok(())
}

#[tokio::test]
async fn resubmitting_a_name_appends_a_new_vote() -> Result<()> {
    let app = test_app().await?;
    let (public_id, mod_key) = create_event(&app).await?;

    for rating in ["great", "fine"] {
        let status = submit_vote(
            &app,
            &public_id,
            json!({
                "voter_name": "A",
                "ratings": [{"slot": "2024-03-01:9", "rating": rating}]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(get(&format!("/api/events/{public_id}/votes?key={mod_key}")))
        .await?;
    let votes = json_body(response).await?;
    assert_eq!(votes.as_array().unwrap().len(), 2);
    Ok(())
}
