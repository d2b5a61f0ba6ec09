//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user signup, login, and logout.

use afrilead_core::domain::{AuthSession, NewUser, Role, User};
use afrilead_core::ports::PortError;
use afrilead_core::validation::{
    normalize_email, validate_country, validate_email, validate_name, validate_password,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult, ErrorBody};
use crate::web::extract::JsonBody;
use crate::web::middleware::{session_id_from_headers, SESSION_COOKIE};
use crate::web::state::AppState;
use crate::web::views::UserView;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub country: String,
    /// One of `mentor`, `mentee`, `both`.
    #[serde(default)]
    pub role: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserView,
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

//=========================================================================================
// Helpers
//=========================================================================================

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            AppError::internal()
        })
}

fn session_cookie(config: &Config, value: &str, max_age_secs: i64) -> String {
    let secure = if config.cookie_secure { " Secure;" } else { "" };
    format!(
        "{}={}; HttpOnly;{} SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, value, secure, max_age_secs
    )
}

/// Opens a new auth session for `user` and returns the matching `Set-Cookie` value.
async fn open_session(state: &AppState, user: &User) -> AppResult<String> {
    let ttl = Duration::days(state.config.session_ttl_days);
    let auth_session = AuthSession {
        id: Uuid::new_v4().to_string(),
        user_id: user.id,
        expires_at: Utc::now() + ttl,
    };
    let cookie = session_cookie(&state.config, &auth_session.id, ttl.num_seconds());

    state
        .db
        .create_auth_session(auth_session)
        .await
        .map_err(|e| {
            error!("Failed to create auth session: {:?}", e);
            AppError::internal()
        })?;
    Ok(cookie)
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/auth/signup - Create a new user account
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<SignupRequest>,
) -> AppResult<impl IntoResponse> {
    // 1. Validate input
    let required = [&req.name, &req.email, &req.password, &req.country, &req.role];
    if required.iter().any(|field| field.trim().is_empty()) {
        return Err(AppError::bad_request("Missing required fields"));
    }
    let email = normalize_email(&req.email);
    validate_email(&email)?;
    validate_password(&req.password)?;
    let role: Role = req.role.parse()?;
    validate_name(&req.name)?;
    validate_country(&req.country)?;

    // 2. Create user in database
    let user = state
        .db
        .create_user(NewUser {
            name: req.name.trim().to_string(),
            email,
            hashed_password: hash_password(&req.password)?,
            role,
            country: req.country.trim().to_string(),
        })
        .await?;
    info!(user_id = %user.id, role = role.as_str(), "User signed up");

    // 3. Sign the new user in
    let cookie = open_session(&state, &user).await?;

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            user: UserView::from(&user),
            message: "User created successfully".to_string(),
        }),
    ))
}

/// POST /api/auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let invalid = || AppError::new(StatusCode::UNAUTHORIZED, "Invalid email or password");

    // 1. Get user by email
    let credentials = state
        .db
        .get_user_credentials(&normalize_email(&req.email))
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => invalid(),
            other => AppError::from(other),
        })?;

    // 2. Verify password
    let parsed_hash = PasswordHash::new(&credentials.hashed_password).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        AppError::internal()
    })?;
    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| invalid())?;

    // 3. Open auth session
    let cookie = open_session(&state, &credentials.user).await?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            user: UserView::from(&credentials.user),
            message: "Login successful".to_string(),
        }),
    ))
}

/// POST /api/auth/logout - Logout and invalidate session
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logout successful", body = MessageResponse),
        (status = 401, description = "No active session", body = ErrorBody)
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let auth_session_id = session_id_from_headers(&headers)
        .ok_or_else(|| AppError::new(StatusCode::UNAUTHORIZED, "No session found"))?;

    state
        .db
        .delete_auth_session(auth_session_id)
        .await
        .map_err(|e| {
            error!("Failed to delete auth session: {:?}", e);
            AppError::internal()
        })?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(&state.config, "", 0))],
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_includes_secure_only_when_configured() {
        let mut config = Config::in_memory();
        config.cookie_secure = false;
        let cookie = session_cookie(&config, "abc", 60);
        assert_eq!(cookie, "session=abc; HttpOnly; SameSite=Lax; Path=/; Max-Age=60");

        config.cookie_secure = true;
        assert!(session_cookie(&config, "abc", 60).contains("HttpOnly; Secure;"));
    }

    #[test]
    fn hashed_passwords_verify() {
        let hash = hash_password("correct horse").unwrap();
        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(Argon2::default()
            .verify_password(b"correct horse", &parsed)
            .is_ok());
        assert!(Argon2::default()
            .verify_password(b"wrong horse", &parsed)
            .is_err());
    }
}
