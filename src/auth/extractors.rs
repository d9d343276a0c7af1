use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
};
use tracing::warn;
use uuid::Uuid;

use super::jwt::JwtKeys;

type Rejection = (StatusCode, String);

/// Authenticated caller. Rejects requests without a valid bearer token.
pub struct AuthUser(pub Uuid);

/// Optional caller. No `Authorization` header means anonymous; a header that
/// carries a bad or expired token is still rejected.
pub struct MaybeAuthUser(pub Option<Uuid>);

fn bearer_token(parts: &Parts) -> Result<Option<&str>, Rejection> {
    let Some(header) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = header
        .to_str()
        .map_err(|_| (StatusCode::UNAUTHORIZED, "Invalid Authorization header".to_string()))?;
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(Some)
        .ok_or((StatusCode::UNAUTHORIZED, "Invalid auth scheme".to_string()))
}

fn verify(keys: &JwtKeys, token: &str) -> Result<Uuid, Rejection> {
    keys.verify(token).map(|c| c.sub).map_err(|e| {
        warn!(error = %e, "invalid or expired token");
        (StatusCode::UNAUTHORIZED, "Invalid or expired token".to_string())
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?.ok_or((
            StatusCode::UNAUTHORIZED,
            "Missing Authorization header".to_string(),
        ))?;
        verify(&JwtKeys::from_ref(state), token).map(AuthUser)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match bearer_token(parts)? {
            Some(token) => verify(&JwtKeys::from_ref(state), token).map(|id| MaybeAuthUser(Some(id))),
            None => Ok(MaybeAuthUser(None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use axum::http::Request;

    #[derive(Clone)]
    struct TestState(JwtKeys);

    impl FromRef<TestState> for JwtKeys {
        fn from_ref(s: &TestState) -> Self {
            s.0.clone()
        }
    }

    fn state() -> TestState {
        TestState(JwtKeys::from_config(&JwtConfig {
            secret: "test".into(),
            issuer: "test".into(),
            audience: "test".into(),
            ttl_minutes: 5,
        }))
    }

    fn parts(auth: Option<&str>) -> Parts {
        let mut req = Request::builder().uri("/");
        if let Some(v) = auth {
            req = req.header(AUTHORIZATION, v);
        }
        req.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn anonymous_without_header() {
        let MaybeAuthUser(id) = MaybeAuthUser::from_request_parts(&mut parts(None), &state())
            .await
            .unwrap();
        assert!(id.is_none());

        let err = AuthUser::from_request_parts(&mut parts(None), &state()).await.err().unwrap();
        assert_eq!(err.0, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_token_identifies_user() {
        let st = state();
        let user = Uuid::new_v4();
        let header = format!("Bearer {}", st.0.sign(user).unwrap());

        let MaybeAuthUser(id) = MaybeAuthUser::from_request_parts(&mut parts(Some(&header)), &st)
            .await
            .unwrap();
        assert_eq!(id, Some(user));
        let AuthUser(id) = AuthUser::from_request_parts(&mut parts(Some(&header)), &st)
            .await
            .unwrap();
        assert_eq!(id, user);
    }

    #[tokio::test]
    async fn bad_token_is_rejected_even_when_optional() {
        let err = MaybeAuthUser::from_request_parts(&mut parts(Some("Bearer nope")), &state())
            .await
            .err()
            .unwrap();
        assert_eq!(err.0, StatusCode::UNAUTHORIZED);

        let err = MaybeAuthUser::from_request_parts(&mut parts(Some("Basic abc")), &state())
            .await
            .err()
            .unwrap();
        assert_eq!(err.0, StatusCode::UNAUTHORIZED);
    }
}
