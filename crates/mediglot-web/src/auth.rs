//! Token authentication: registration, login/logout, profile, and the
//! `CurrentUser` extractor used by every authenticated route.

use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};

use mediglot_store::{NewUser, ProfileUpdate, User};

use crate::error::ApiError;
use crate::extract::Json;
use crate::AppState;

/// The user resolved from the request's bearer token.
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".into()))?;
        let user = state
            .with_store(move |s| s.user_for_token(&token))
            .await
            .map_err(|e| match e {
                ApiError::NotFound(_) => ApiError::Unauthorized("Invalid token".into()),
                other => other,
            })?;
        Ok(CurrentUser(user))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    Json(new_user): Json<NewUser>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    if new_user.username.trim().is_empty() || new_user.email.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Username and email are required".into(),
        ));
    }
    if new_user.password.len() < 8 {
        return Err(ApiError::BadRequest(
            "Password must be at least 8 characters long".into(),
        ));
    }

    let (user, token) = state
        .with_store(move |s| {
            let user = s.create_user(&new_user)?;
            let token = s.issue_token(user.id)?;
            Ok((user, token))
        })
        .await?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<AuthResponse>, ApiError> {
    let username = body["username"].as_str().unwrap_or("").to_string();
    let password = body["password"].as_str().unwrap_or("").to_string();
    if username.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest(
            "Username and password are required".into(),
        ));
    }

    let (user, token) = state
        .with_store(move |s| {
            let user = s.authenticate(&username, &password)?;
            let token = s.issue_token(user.id)?;
            Ok((user, token))
        })
        .await?;

    Ok(Json(AuthResponse { token, user }))
}

/// `POST /api/auth/logout`
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let token = bearer_token(&headers)
        .ok_or_else(|| ApiError::BadRequest("No active session".into()))?;
    state
        .with_store(move |s| s.revoke_token(&token))
        .await
        .map_err(|e| match e {
            ApiError::NotFound(_) => ApiError::BadRequest("No active session".into()),
            other => other,
        })?;
    Ok(Json(json!({ "message": "Successfully logged out" })))
}

/// `GET /api/auth/profile`
pub async fn get_profile(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

/// `PUT /api/auth/profile`
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<User>, ApiError> {
    let updated = state
        .with_store(move |s| s.update_profile(user.id, &update))
        .await?;
    Ok(Json(updated))
}
