use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use tracing::{instrument, warn};

use super::{location, RecommendationResult};
use crate::{auth::extractors::MaybeAuthUser, preferences::repo, state::AppState};

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub food: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/recommend", post(recommend))
}

/// Preferences are looked up for authenticated callers only; a lookup failure
/// is logged and the advice is given without them.
#[instrument(skip(state, body), fields(food = %body.food))]
pub async fn recommend(
    State(state): State<AppState>,
    MaybeAuthUser(user_id): MaybeAuthUser,
    Json(body): Json<RecommendRequest>,
) -> Json<RecommendationResult> {
    let prefs = match user_id {
        Some(id) => repo::find_by_user(&state.db, id).await.unwrap_or_else(|e| {
            warn!(error = %e, user_id = %id, "preferences lookup failed; continuing without");
            None
        }),
        None => None,
    };

    let result = state
        .recommender
        .recommend(&body.food, location(body.lat, body.lng), prefs.as_ref())
        .await;
    Json(result)
}
