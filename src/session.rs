use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;

/// Identity-provider token payload. Only `sub` is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // user ID
    pub exp: usize, // expires at (unix timestamp)
    pub iss: String,
    pub aud: String,
}

/// Who the current call acts for. Passed explicitly into every pipeline call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Session {
    user_id: Option<Uuid>,
}

impl Session {
    pub fn signed_in(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user_id
    }
}

/// Missing `Authorization` header gives an anonymous session; a bad token is a 401.
#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(auth) = parts.headers.get(axum::http::header::AUTHORIZATION) else {
            return Ok(Session::anonymous());
        };
        let auth = auth
            .to_str()
            .map_err(|_| (StatusCode::UNAUTHORIZED, "invalid Authorization header".into()))?;

        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or((StatusCode::UNAUTHORIZED, "invalid auth scheme".into()))?;

        let cfg = &state.config.jwt;
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&cfg.audience));
        validation.set_issuer(std::slice::from_ref(&cfg.issuer));
        let decoding = DecodingKey::from_secret(cfg.secret.as_bytes());

        let data = decode::<Claims>(token, &decoding, &validation)
            .map_err(|_| (StatusCode::UNAUTHORIZED, "invalid or expired token".into()))?;

        Ok(Session::signed_in(data.claims.sub))
    }
}
