use crate::{
    aggregate::{self, VoterRating},
    color,
    db,
    error::AppError,
    models::{Event, Slot, SlotRating, Vote},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

async fn require_event(pool: &sqlx::SqlitePool, public_id: &str) -> Result<Event, AppError> {
    db::find_event_by_public_id(pool, public_id)
        .await?
        .ok_or_else(|| AppError::NotFound("no such event".to_string()))
}

fn require_mod_key(event: &Event, key: &str) -> Result<(), AppError> {
    if event.mod_key != key {
        return Err(AppError::AccessDenied("invalid results key".to_string()));
    }
    Ok(())
}

#[derive(Deserialize)]
pub struct CreateEventPayload {
    name: String,
    #[serde(default)]
    description: String,
    slots: Vec<Slot>,
}

#[derive(Serialize)]
pub struct CreatedEvent {
    public_id: String,
    mod_key: String,
}

pub async fn create_event_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateEventPayload>,
) -> Result<(StatusCode, Json<CreatedEvent>), AppError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("event name is required".to_string()));
    }
    if payload.slots.is_empty() {
        return Err(AppError::BadRequest(
            "at least one time slot is required".to_string(),
        ));
    }

    let event = db::create_event(
        &app_state.pool,
        name,
        payload.description.trim(),
        &payload.slots,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedEvent {
            public_id: event.public_id,
            mod_key: event.mod_key,
        }),
    ))
}

pub async fn get_event_handler(
    State(app_state): State<AppState>,
    Path(public_id): Path<String>,
) -> Result<Json<Event>, AppError> {
    require_event(&app_state.pool, &public_id).await.map(Json)
}

#[derive(Deserialize)]
pub struct VotePayload {
    voter_name: String,
    ratings: Vec<SlotRating>,
}

pub async fn submit_vote_handler(
    State(app_state): State<AppState>,
    Path(public_id): Path<String>,
    Json(payload): Json<VotePayload>,
) -> Result<StatusCode, AppError> {
    let voter_name = payload.voter_name.trim();
    if voter_name.is_empty() {
        return Err(AppError::BadRequest("voter name is required".to_string()));
    }

    let event = require_event(&app_state.pool, &public_id).await?;

    // Every rating must target a candidate slot, at most once.
    let candidates: HashSet<Slot> = event.slots.iter().copied().collect();
    let mut seen = HashSet::new();
    for r in &payload.ratings {
        if !candidates.contains(&r.slot) {
            return Err(AppError::BadRequest(format!(
                "slot {} is not open for voting on this event",
                r.slot
            )));
        }
        if !seen.insert(r.slot) {
            return Err(AppError::BadRequest(format!(
                "slot {} is rated more than once",
                r.slot
            )));
        }
    }

    db::add_vote(&app_state.pool, event.id, voter_name, &payload.ratings).await?;
    Ok(StatusCode::CREATED)
}

#[derive(Deserialize)]
pub struct ResultsParams {
    key: String,
    /// Comma-separated voter names to hide from the aggregation.
    #[serde(default)]
    hide: Option<String>,
}

pub async fn get_votes_handler(
    State(app_state): State<AppState>,
    Path(public_id): Path<String>,
    Query(params): Query<ResultsParams>,
) -> Result<Json<Vec<Vote>>, AppError> {
    let event = require_event(&app_state.pool, &public_id).await?;
    require_mod_key(&event, &params.key)?;
    db::get_event_votes(&app_state.pool, event.id)
        .await
        .map(Json)
}

#[derive(Serialize)]
pub struct HeatmapCell {
    slot: Slot,
    cant_count: usize,
    can_make_count: usize,
    avg_goodness: f64,
    all_can_make: bool,
    color: color::Rgb,
    indicator_count: usize,
    voter_ratings: Vec<VoterRating>,
}

/// Aggregated consensus for every candidate slot, recomputed in full on
/// each request. The `hide` filter only narrows the aggregation input;
/// stored votes are never touched.
pub async fn heatmap_handler(
    State(app_state): State<AppState>,
    Path(public_id): Path<String>,
    Query(params): Query<ResultsParams>,
) -> Result<Json<Vec<HeatmapCell>>, AppError> {
    let event = require_event(&app_state.pool, &public_id).await?;
    require_mod_key(&event, &params.key)?;
    let votes = db::get_event_votes(&app_state.pool, event.id).await?;

    let hidden: HashSet<String> = params
        .hide
        .as_deref()
        .unwrap_or("")
        .split(',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    let cells = aggregate::aggregate(&event.slots, &votes, &hidden)
        .into_iter()
        .map(|(slot, agg)| HeatmapCell {
            slot,
            cant_count: agg.cant_count,
            can_make_count: agg.can_make_count,
            avg_goodness: agg.avg_goodness,
            all_can_make: agg.all_can_make,
            color: color::consensus_color(&agg),
            indicator_count: color::indicator_count(&agg),
            voter_ratings: agg.voter_ratings,
        })
        .collect();
    Ok(Json(cells))
}
