pub mod aggregate;
pub mod color;
pub mod db;
pub mod error;
pub mod grid;
pub mod handlers;
pub mod models;
pub mod paint;
pub mod selection;
pub mod state;

use axum::{
    response::Html,
    routing::{get, post},
    Router,
};
use state::AppState;
use tower_http::services::ServeDir;

async fn root_handler() -> Html<String> {
    tokio::fs::read_to_string("templates/index.html")
        .await
        .map(Html)
        .unwrap_or_else(|_| Html("<h1>Error: could not load index.html</h1>".to_string()))
}

pub fn app(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .nest_service("/assets", ServeDir::new("assets"))
        .route("/api/events", post(handlers::create_event_handler))
        .route("/api/events/{public_id}", get(handlers::get_event_handler))
        .route(
            "/api/events/{public_id}/votes",
            get(handlers::get_votes_handler).post(handlers::submit_vote_handler),
        )
        .route(
            "/api/events/{public_id}/heatmap",
            get(handlers::heatmap_handler),
        )
        .with_state(app_state)
}
