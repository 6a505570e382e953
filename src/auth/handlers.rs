use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        jwt::{CurrentUser, JwtKeys},
        password::{hash_password, verify_password},
        repo::User,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), ApiError> {
    if username.is_empty() {
        return Err(ApiError::Validation("username is required".into()));
    }
    if username.len() > 64 {
        return Err(ApiError::Validation("username is too long".into()));
    }
    if !is_valid_email(email) {
        return Err(ApiError::Validation("invalid email".into()));
    }
    if password.len() < 8 {
        return Err(ApiError::Validation("password too short".into()));
    }
    if password != confirm_password {
        return Err(ApiError::Validation("passwords do not match".into()));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    payload.username = payload.username.trim().to_string();
    payload.email = payload.email.trim().to_lowercase();

    if let Err(e) = validate_registration(
        &payload.username,
        &payload.email,
        &payload.password,
        &payload.confirm_password,
    ) {
        warn!(username = %payload.username, error = %e, "registration rejected");
        return Err(e);
    }

    if let Some(existing) =
        User::find_by_username_or_email(&state.db, &payload.username, &payload.email).await?
    {
        warn!(username = %payload.username, "username or email already registered");
        let message = if existing.username == payload.username {
            "username is already taken"
        } else {
            "email is already registered"
        };
        return Err(ApiError::Conflict(message.into()));
    }

    let hash = hash_password(&payload.password)?;
    // A concurrent registration can still hit the unique constraint here;
    // sqlx maps that violation to Conflict and no row is written.
    let user = User::create(&state.db, &payload.username, &payload.email, &hash).await?;

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(user.id)?;
    let refresh_token = keys.sign_refresh(user.id)?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            access_token,
            refresh_token,
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.identifier = payload.identifier.trim().to_string();

    let user = match User::find_by_identifier(&state.db, &payload.identifier).await? {
        Some(u) => u,
        None => {
            warn!(identifier = %payload.identifier, "login with unknown identifier");
            return Err(ApiError::Unauthorized("invalid credentials".into()));
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login with invalid password");
        return Err(ApiError::Unauthorized("invalid credentials".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(user.id)?;
    let refresh_token = keys.sign_refresh(user.id)?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: user.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("user no longer exists".into()))?;

    let access_token = keys.sign_access(user.id)?;
    let refresh_token = keys.sign_refresh(user.id)?;

    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: user.into(),
    }))
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("user no longer exists".into()))?;
    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plausible_emails() {
        assert!(is_valid_email("sam@example.com"));
        assert!(is_valid_email("a.b+c@mail.co.uk"));
    }

    #[test]
    fn rejects_malformed_emails() {
        assert!(!is_valid_email("sam"));
        assert!(!is_valid_email("sam@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("sam@example"));
        assert!(!is_valid_email("sa m@example.com"));
    }

    #[test]
    fn registration_requires_a_username() {
        let err = validate_registration("", "sam@example.com", "password1", "password1");
        assert!(matches!(err, Err(ApiError::Validation(_))));
    }

    #[test]
    fn registration_rejects_short_passwords() {
        let err = validate_registration("sam", "sam@example.com", "short", "short");
        assert!(matches!(err, Err(ApiError::Validation(_))));
    }

    #[test]
    fn registration_rejects_mismatched_confirmation() {
        let err = validate_registration("sam", "sam@example.com", "password1", "password2");
        assert!(matches!(err, Err(ApiError::Validation(_))));
    }

    #[test]
    fn registration_accepts_a_valid_payload() {
        assert!(validate_registration("sam", "sam@example.com", "password1", "password1").is_ok());
    }
}
