use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;
use crate::profile::calculator;
use crate::profile::repo::Profile;

/// Activity level as it arrives on the wire. The canonical domain
/// representation is the numeric multiplier; a label is accepted here and
/// mapped through the pure lookup table before it goes anywhere else.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ActivityLevel {
    Multiplier(f64),
    Label(String),
}

impl ActivityLevel {
    pub fn multiplier(&self) -> Result<f64, ApiError> {
        match self {
            ActivityLevel::Multiplier(m) if *m > 0.0 => Ok(*m),
            ActivityLevel::Multiplier(_) => Err(ApiError::InvalidInput(
                "activityLevel must be a positive multiplier".into(),
            )),
            ActivityLevel::Label(label) => {
                calculator::activity_multiplier(label).ok_or_else(|| {
                    ApiError::InvalidInput(format!("Unknown activity level '{}'", label))
                })
            }
        }
    }
}

/// Body for both /submit-data and /update-profile.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitProfileRequest {
    pub weight: f64,
    pub height: f64,
    pub age: i32,
    pub gender: String,
    pub activity_level: ActivityLevel,
    #[serde(default = "not_specified")]
    pub weight_goal: String,
    #[serde(default = "not_specified")]
    pub diet_type: String,
    #[serde(default)]
    pub health_conditions: Vec<String>,
}

fn not_specified() -> String {
    "Not specified".into()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitProfileResponse {
    pub message: String,
    pub bmi: f64,
    pub bmr: f64,
    pub profile_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct UpdateProfileResponse {
    pub message: String,
    pub bmi: f64,
    pub bmr: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub weight: f64,
    pub height: f64,
    pub age: i32,
    pub gender: String,
    pub activity_level: f64,
    pub bmr: f64,
    pub bmi: f64,
    pub weight_goal: String,
    pub diet_type: String,
    pub health_conditions: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Profile> for ProfileResponse {
    fn from(p: Profile) -> Self {
        let health_conditions =
            serde_json::from_value(p.health_conditions).unwrap_or_default();
        Self {
            weight: p.weight,
            height: p.height,
            age: p.age,
            gender: p.gender,
            activity_level: p.activity_level,
            bmr: calculator::round2(p.bmr),
            bmi: calculator::round2(p.bmi),
            weight_goal: p.weight_goal,
            diet_type: p.diet_type,
            health_conditions,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}
