use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use tracing::{error, info, instrument, warn};

use super::{dto::UserPreferences, repo};
use crate::{
    auth::{extractors::AuthUser, repo::User},
    db,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/preferences", get(get_preferences).post(save_preferences))
}

#[instrument(skip(state, prefs))]
pub async fn save_preferences(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(prefs): Json<UserPreferences>,
) -> Result<Json<Value>, (StatusCode, String)> {
    match User::find_by_id(&state.db, user_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!(%user_id, "preferences for unknown user");
            return Err(user_not_found());
        }
        Err(e) => {
            error!(error = %e, %user_id, "find_by_id failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    }

    repo::upsert(&state.db, user_id, &prefs).await.map_err(save_error)?;
    info!(%user_id, "preferences saved");
    Ok(Json(json!({ "message": "Preferences saved" })))
}

fn user_not_found() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, "User not found".into())
}

/// The account can disappear between the lookup and the upsert.
fn save_error(e: anyhow::Error) -> (StatusCode, String) {
    if db::is_foreign_key_violation(&e) {
        warn!("preferences owner deleted during save");
        return user_not_found();
    }
    error!(error = %e, "save preferences failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

/// Returns `{}` when the user has not saved a profile yet.
#[instrument(skip(state))]
pub async fn get_preferences(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Value>, (StatusCode, String)> {
    let prefs = repo::find_by_user(&state.db, user_id).await.map_err(|e| {
        error!(error = %e, %user_id, "load preferences failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    let body = match prefs {
        Some(p) => serde_json::to_value(p).map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?,
        None => json!({}),
    };
    Ok(Json(body))
}
