use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    profile::{
        calculator::{self, Gender},
        dto::{ProfileResponse, SubmitProfileRequest, SubmitProfileResponse, UpdateProfileResponse},
        repo::{Profile, ProfileAttrs},
    },
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/submit-data", post(submit_data))
        .route("/get-profile", get(get_profile))
        .route("/update-profile", post(update_profile))
}

/// Validates the request and computes the derived bmr/bmi. Shared between
/// create and update, which differ only in the store call.
fn validate(payload: SubmitProfileRequest) -> Result<(ProfileAttrs, f64, f64), ApiError> {
    if payload.weight <= 0.0 {
        return Err(ApiError::InvalidInput("Weight must be positive".into()));
    }
    if payload.height <= 0.0 {
        return Err(ApiError::InvalidInput("Height must be positive".into()));
    }
    if payload.age <= 0 {
        return Err(ApiError::InvalidInput("Age must be positive".into()));
    }
    let gender = Gender::parse(&payload.gender)?;
    let activity_level = payload.activity_level.multiplier()?;

    let bmr = calculator::bmr(payload.weight, payload.height, payload.age, gender);
    let bmi = calculator::bmi(payload.weight, payload.height)?;

    let attrs = ProfileAttrs {
        weight: payload.weight,
        height: payload.height,
        age: payload.age,
        gender,
        activity_level,
        weight_goal: payload.weight_goal,
        diet_type: payload.diet_type,
        health_conditions: payload.health_conditions,
    };
    Ok((attrs, bmr, bmi))
}

#[instrument(skip(state, payload))]
pub async fn submit_data(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SubmitProfileRequest>,
) -> Result<(StatusCode, Json<SubmitProfileResponse>), ApiError> {
    let (attrs, bmr, bmi) = validate(payload)?;

    if Profile::find_by_user(&state.db, user_id).await?.is_some() {
        warn!(user_id = %user_id, "profile already exists");
        return Err(ApiError::Conflict(
            "Profile already exists for this user".into(),
        ));
    }

    let profile = Profile::create(&state.db, user_id, &attrs, bmr, bmi)
        .await
        .map_err(|e| {
            ApiError::conflict_on_unique(e, "Profile already exists for this user")
        })?;
    info!(user_id = %user_id, profile_id = %profile.id, "profile created");

    Ok((
        StatusCode::CREATED,
        Json(SubmitProfileResponse {
            message: "Profile data submitted successfully".into(),
            bmi: calculator::round2(bmi),
            bmr: calculator::round2(bmr),
            profile_id: profile.id,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = Profile::find_by_user(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".into()))?;
    Ok(Json(profile.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SubmitProfileRequest>,
) -> Result<Json<UpdateProfileResponse>, ApiError> {
    let (attrs, bmr, bmi) = validate(payload)?;

    let updated = Profile::update(&state.db, user_id, &attrs, bmr, bmi)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".into()))?;
    info!(user_id = %user_id, profile_id = %updated.id, "profile updated");

    Ok(Json(UpdateProfileResponse {
        message: "Profile updated successfully".into(),
        bmi: calculator::round2(bmi),
        bmr: calculator::round2(bmr),
    }))
}
