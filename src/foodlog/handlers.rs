use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    foodlog::{
        dto::{AddFoodLogRequest, AddFoodLogResponse, DailySummary, Meal},
        repo::FoodLog,
    },
    profile::calculator::{self, round2},
    profile::repo::Profile,
    state::AppState,
};

pub fn foodlog_routes() -> Router<AppState> {
    Router::new()
        .route("/add-food-log", post(add_food_log))
        .route("/get-daily-calories", get(get_daily_calories))
}

#[instrument(skip(state, payload))]
pub async fn add_food_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<AddFoodLogRequest>,
) -> Result<(StatusCode, Json<AddFoodLogResponse>), ApiError> {
    if payload.meal_time.trim().is_empty() || payload.foods.is_empty() {
        return Err(ApiError::InvalidInput(
            "Meal time and foods are required".into(),
        ));
    }

    // The calorie target needs a profile; without one the log has nothing to
    // be measured against.
    let profile = Profile::find_by_user(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".into()))?;

    let meal = Meal::new(payload.meal_time, payload.foods);

    // Current UTC date, midnight-truncated; always UTC, never user-local.
    let today = OffsetDateTime::now_utc().date();

    let (log, created) = FoodLog::append_meal(&state.db, user_id, today, &meal).await?;

    let target = calculator::calorie_target(
        profile.bmr,
        profile.activity_level,
        &profile.weight_goal,
    );
    let left = (target.calorie_target - log.total_calories).max(0.0);

    info!(
        user_id = %user_id,
        log_date = %log.log_date,
        created,
        total_calories = log.total_calories,
        "meal logged"
    );

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    let message = if created {
        "Food log created"
    } else {
        "Food log updated"
    };

    Ok((
        status,
        Json(AddFoodLogResponse {
            message: message.into(),
            total_calories_for_day: log.totals().rounded(),
            calorie_target: round2(target.calorie_target),
            calories_left_for_day: round2(left),
        }),
    ))
}

#[instrument(skip(state))]
pub async fn get_daily_calories(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<DailySummary>, ApiError> {
    let profile = Profile::find_by_user(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".into()))?;

    let today = OffsetDateTime::now_utc().date();
    let consumed = FoodLog::find_by_day(&state.db, user_id, today)
        .await?
        .map(|log| log.total_calories)
        .unwrap_or(0.0);

    let target = calculator::calorie_target(
        profile.bmr,
        profile.activity_level,
        &profile.weight_goal,
    );
    let left = (target.calorie_target - consumed).max(0.0);

    Ok(Json(DailySummary {
        bmr: round2(target.bmr),
        tdee: round2(target.tdee),
        calorie_target: round2(target.calorie_target),
        total_calories_consumed: round2(consumed),
        calories_left_for_day: round2(left),
    }))
}
