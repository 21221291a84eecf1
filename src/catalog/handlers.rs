use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use crate::{auth::jwt::AuthUser, error::ApiError, state::AppState};

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/fetch-food-data", get(fetch_food_data))
        .route("/fetch-food-details/:fdc_id", get(fetch_food_details))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
}

#[instrument(skip(state))]
pub async fn fetch_food_data(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let foods = state.catalog.search(&params.query)?;
    Ok(Json(foods))
}

#[instrument(skip(state))]
pub async fn fetch_food_details(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(fdc_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let food = state.catalog.get_by_id(fdc_id)?;
    Ok(Json(food))
}
