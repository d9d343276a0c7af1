use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::ShopResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ShopsRequest {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct ShopsResponse {
    pub shops: Vec<ShopResult>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/shops", post(shops))
}

#[instrument(skip(state))]
pub async fn shops(State(state): State<AppState>, Json(body): Json<ShopsRequest>) -> Json<ShopsResponse> {
    let shops = state.shops.find_nearby(body.lat, body.lng, &body.query).await;
    Json(ShopsResponse { shops })
}
