//! HTTP API surface.
//!
//! # Endpoints
//!
//! - `GET /api/v1/leaderboard`            – one ranked page for a category + window
//! - `GET /api/v1/leaderboard/categories` – available categories and windows

pub mod leaderboard;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` router.
pub fn router() -> Router<AppState> {
    Router::new().nest("/leaderboard", leaderboard::router())
}
