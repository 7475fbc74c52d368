use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use crate::auth::{self, TokenKind};
use crate::database::manager::DatabaseManager;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

/// POST /login - verify credentials and mint an access + refresh pair
pub async fn login(Form(form): Form<LoginForm>) -> Result<Json<TokenPair>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let user = auth::authenticate_user(&pool, &form.username, &form.password)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Incorrect username or password"))?;

    Ok(Json(TokenPair {
        access_token: auth::issue_token(
            &user.username,
            TokenKind::Access.ttl(),
            TokenKind::Access,
        )?,
        refresh_token: auth::issue_token(
            &user.username,
            TokenKind::Refresh.ttl(),
            TokenKind::Refresh,
        )?,
        token_type: "bearer",
    }))
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: &'static str,
}

/// POST /refresh - trade a valid refresh token for a fresh access token
pub async fn refresh(Json(body): Json<RefreshRequest>) -> Result<Json<AccessToken>, ApiError> {
    let subject = auth::validate_token(&body.refresh_token, TokenKind::Refresh)?;

    // The subject may have been deleted since the token was issued
    let pool = DatabaseManager::pool().await?;
    let user = auth::resolve_subject(&pool, &subject)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Could not validate credentials"))?;

    Ok(Json(AccessToken {
        access_token: auth::issue_token(
            &user.username,
            TokenKind::Access.ttl(),
            TokenKind::Access,
        )?,
        token_type: "bearer",
    }))
}
