use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};

use super::{
    dto::{Credentials, MessageResponse, TokenResponse},
    jwt::JwtKeys,
    password::{hash_password, verify_password},
    repo::User,
};
use crate::{db, state::AppState};

const MIN_PASSWORD_LEN: usize = 8;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub(crate) fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.\-]{3,32}$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<Credentials>,
) -> Result<(StatusCode, Json<MessageResponse>), (StatusCode, String)> {
    let username = payload.username.trim();

    if !is_valid_username(username) {
        warn!(%username, "invalid username");
        return Err((StatusCode::BAD_REQUEST, "Invalid username".into()));
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err((StatusCode::BAD_REQUEST, "Password too short".into()));
    }

    match User::find_by_username(&state.db, username).await {
        Ok(Some(_)) => {
            warn!(%username, "username already exists");
            return Err((StatusCode::CONFLICT, "Username already exists".into()));
        }
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "find_by_username failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    }

    let hash = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    let user = User::create(&state.db, username, &hash)
        .await
        .map_err(create_user_error)?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered successfully",
        }),
    ))
}

/// A concurrent registration of the same name loses on the unique index.
fn create_user_error(e: anyhow::Error) -> (StatusCode, String) {
    if db::is_unique_violation(&e) {
        warn!("username taken by a concurrent registration");
        return (StatusCode::CONFLICT, "Username already exists".into());
    }
    error!(error = %e, "create user failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<Credentials>,
) -> Result<Json<TokenResponse>, (StatusCode, String)> {
    let username = payload.username.trim();
    let invalid = || (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string());

    let user = match User::find_by_username(&state.db, username).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(%username, "login unknown username");
            return Err(invalid());
        }
        Err(e) => {
            error!(error = %e, "find_by_username failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    let ok = verify_password(&payload.password, &user.password_hash).map_err(|e| {
        error!(error = %e, "verify_password failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(invalid());
    }

    let access_token = JwtKeys::from_ref(&state).sign(user.id).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        assert!(is_valid_username("ana_b"));
        assert!(is_valid_username("j.doe-42"));
        assert!(!is_valid_username("ab"));
        assert!(!is_valid_username("has space"));
        assert!(!is_valid_username("semi;colon"));
        assert!(!is_valid_username(&"x".repeat(33)));
    }

    #[test]
    fn duplicate_insert_maps_to_conflict() {
        use crate::db::tests::db_error;
        use sqlx::error::ErrorKind;

        let (status, _) = create_user_error(db_error(ErrorKind::UniqueViolation));
        assert_eq!(status, StatusCode::CONFLICT);
        let (status, _) = create_user_error(anyhow::anyhow!("connection reset"));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn token_response_shape() {
        let json = serde_json::to_value(TokenResponse {
            access_token: "abc".into(),
            token_type: "bearer",
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "access_token": "abc", "token_type": "bearer" }));
    }
}
