//! Leaderboard API handlers.
//!
//! These endpoints are public reads consumed by the community frontend.
//! Bad enum literals or pagination bounds are rejected with 400; an
//! unreachable upstream yields 503 so callers can retry, never a
//! stale-looking ranking.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use geev_core::framework::DatabaseProcessor;
use geev_core::leaderboard::{LeaderboardError, LeaderboardService};
use geev_sdk::objects::{
    Category, CategoryInfo, LeaderboardOptions, LeaderboardQuery, Window, WindowInfo,
};

use crate::config::LeaderboardConfig;
use crate::state::AppState;

/// Build the Leaderboard API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_leaderboard))
        .route("/categories", get(get_categories))
}

/// `GET /api/v1/leaderboard` — compute one ranked page.
async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<impl IntoResponse, LeaderboardApiError> {
    let config = state.leaderboard_config().await.clone();
    let service = build_service(&state, &config);

    let page = service
        .get_leaderboard(query.category, query.window, query.page, query.page_size)
        .await?;

    Ok(Json(page))
}

/// `GET /api/v1/leaderboard/categories` — enumerate categories and windows
/// with their display labels (drives the frontend's tab row and time filter).
async fn get_categories() -> impl IntoResponse {
    let categories = Category::all()
        .iter()
        .map(|&category| CategoryInfo {
            category,
            label: category.label().to_string(),
        })
        .collect();
    let windows = Window::all()
        .iter()
        .map(|&window| WindowInfo {
            window,
            label: window.label().to_string(),
        })
        .collect();

    Json(LeaderboardOptions {
        categories,
        windows,
    })
}

/// Assemble a service over the request's database pool, applying the
/// current tuning config.
fn build_service(
    state: &AppState,
    config: &LeaderboardConfig,
) -> LeaderboardService<DatabaseProcessor, DatabaseProcessor> {
    let mut service = LeaderboardService::new(
        DatabaseProcessor {
            pool: state.db.clone(),
        },
        DatabaseProcessor {
            pool: state.db.clone(),
        },
    );

    if let Some(cache) = &state.cache {
        service = service.with_cache(Arc::clone(cache));
    }

    let overrides = [
        (Window::Week, config.week_half_life_hours),
        (Window::Month, config.month_half_life_hours),
        (Window::AllTime, config.alltime_half_life_hours),
    ];
    for (window, hours) in overrides {
        if let Some(hours) = hours {
            service = service.with_half_life(window, time::Duration::hours(hours as i64));
        }
    }

    service
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors that can occur in Leaderboard API handlers.
#[derive(Debug)]
enum LeaderboardApiError {
    /// The caller sent a bad argument.
    Invalid(String),
    /// The event store or identity provider is unreachable.
    Unavailable(LeaderboardError),
}

impl From<LeaderboardError> for LeaderboardApiError {
    fn from(value: LeaderboardError) -> Self {
        match value {
            LeaderboardError::InvalidArgument(msg) => LeaderboardApiError::Invalid(msg),
            other => LeaderboardApiError::Unavailable(other),
        }
    }
}

impl IntoResponse for LeaderboardApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            LeaderboardApiError::Invalid(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            LeaderboardApiError::Unavailable(e) => {
                tracing::error!(error = %e, "leaderboard upstream unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "leaderboard temporarily unavailable",
                )
                    .into_response()
            }
        }
    }
}
