use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{LabelAnalysis, MealResponse, PredictRequest},
    repo::{MealRecord, RECENT_LIMIT},
    services::{analyze_label, score_submission},
};
use crate::{
    auth::{extractors::MaybeAuthUser, repo::User},
    state::AppState,
};

const UPLOAD_LIMIT: usize = 20 * 1024 * 1024;

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/meals", get(list_meals))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/predict", post(predict))
        .route("/img_to_text", post(img_to_text))
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT))
}

/// Token holders whose account no longer exists are treated as anonymous.
async fn owner(state: &AppState, user_id: Option<Uuid>) -> Result<Option<Uuid>, (StatusCode, String)> {
    let Some(id) = user_id else {
        return Ok(None);
    };
    match User::find_by_id(&state.db, id).await {
        Ok(user) => Ok(user.map(|u| u.id)),
        Err(e) => {
            error!(error = %e, "find_by_id failed");
            Err(internal(e))
        }
    }
}

#[instrument(skip(state, body))]
pub async fn predict(
    State(state): State<AppState>,
    MaybeAuthUser(user_id): MaybeAuthUser,
    Json(body): Json<PredictRequest>,
) -> Result<(StatusCode, Json<MealResponse>), (StatusCode, String)> {
    let user_id = owner(&state, user_id).await?;
    let (nutrients, prediction) = score_submission(&state.scorer, &body.nutrients);

    let meal = MealRecord::create(&state.db, user_id, body.meal_name.as_deref(), nutrients, prediction)
        .await
        .map_err(|e| {
            error!(error = %e, "store meal failed");
            internal(e)
        })?;

    info!(meal_id = %meal.id, prediction, "meal scored");
    Ok((StatusCode::CREATED, Json(meal.into())))
}

/// The caller's meals, or the most recent ones for anonymous callers.
#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    MaybeAuthUser(user_id): MaybeAuthUser,
) -> Result<Json<Vec<MealResponse>>, (StatusCode, String)> {
    let meals = match owner(&state, user_id).await? {
        Some(id) => MealRecord::list_by_owner(&state.db, id).await,
        None => MealRecord::list_recent(&state.db, RECENT_LIMIT).await,
    }
    .map_err(|e| {
        error!(error = %e, "list meals failed");
        internal(e)
    })?;

    Ok(Json(meals.into_iter().map(MealResponse::from).collect()))
}

/// Multipart upload with a single `image` field.
#[instrument(skip(state, mp))]
pub async fn img_to_text(
    State(state): State<AppState>,
    mut mp: Multipart,
) -> Result<Json<LabelAnalysis>, (StatusCode, String)> {
    let mut upload: Option<(String, Bytes)> = None;
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    {
        if field.name() == Some("image") {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
            upload = Some((filename, data));
            break;
        }
    }

    let Some((filename, data)) = upload else {
        warn!("img_to_text without image field");
        return Err((StatusCode::BAD_REQUEST, "image is required".into()));
    };

    let analysis = analyze_label(&state.extractor, &state.scorer, &data, &filename).await;
    Ok(Json(analysis))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
