use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, MessageResponse, SignupRequest},
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, verify_password},
        repo::User,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.name = payload.name.trim().to_string();

    if payload.name.is_empty() {
        return Err(ApiError::InvalidInput("Name is required".into()));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::InvalidInput("Invalid email".into()));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::InvalidInput("Password too short".into()));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email already exists".into()));
    }

    let hash = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        ApiError::Internal(e)
    })?;

    let user = User::create(&state.db, &payload.name, &payload.email, &hash)
        .await
        .map_err(|e| ApiError::conflict_on_unique(e, "Email already exists"))?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered successfully".into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (name, password) = match (payload.name, payload.password) {
        (Some(n), Some(p)) => (n, p),
        _ => {
            return Err(ApiError::InvalidInput(
                "Missing 'name' or 'password' field".into(),
            ))
        }
    };

    let user = User::find_by_name(&state.db, &name)
        .await?
        .ok_or_else(|| {
            warn!(name = %name, "login unknown user");
            ApiError::NotFound("User not found".into())
        })?;

    let ok = verify_password(&password, &user.password_hash).map_err(|e| {
        error!(error = %e, "verify_password failed");
        ApiError::Internal(e)
    })?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthenticated("Invalid password".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign(user.id).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        ApiError::Internal(e)
    })?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(LoginResponse {
        message: "Login successful".into(),
        access_token,
    }))
}

/// Tokens are stateless; logout only confirms the caller was authenticated
/// and the client discards the token.
#[instrument(skip_all)]
pub async fn logout(AuthUser(user_id): AuthUser) -> Json<MessageResponse> {
    info!(user_id = %user_id, "user logged out");
    Json(MessageResponse {
        message: "Logout successful. Remove token on client-side.".into(),
    })
}
