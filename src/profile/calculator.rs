//! Pure energy-metabolism math: BMR (Mifflin-St Jeor), BMI, TDEE and the
//! goal-adjusted calorie target. No I/O; full precision internally, rounding
//! happens only at the response boundary via [`round2`].

use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Case-insensitive parse; anything outside the closed set is rejected.
    pub fn parse(s: &str) -> Result<Gender, ApiError> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            _ => Err(ApiError::InvalidInput(
                "Invalid gender. Must be 'Male' or 'Female'.".into(),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// Mifflin-St Jeor resting energy expenditure.
pub fn bmr(weight_kg: f64, height_cm: f64, age: i32, gender: Gender) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    match gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
    }
}

/// Body mass index: weight (kg) over height (m) squared.
pub fn bmi(weight_kg: f64, height_cm: f64) -> Result<f64, ApiError> {
    if height_cm <= 0.0 {
        return Err(ApiError::InvalidInput("Height must be positive".into()));
    }
    let height_m = height_cm / 100.0;
    Ok(weight_kg / (height_m * height_m))
}

/// Activity-adjusted BMR.
pub fn tdee(bmr: f64, activity_level: f64) -> f64 {
    bmr * activity_level
}

/// Label → multiplier table. The numeric multiplier is the canonical
/// representation everywhere in the domain and the store; labels are only
/// accepted at the HTTP boundary and mapped here before anything else sees
/// them.
pub fn activity_multiplier(label: &str) -> Option<f64> {
    match label.trim().to_lowercase().as_str() {
        "sedentary" => Some(1.2),
        "light" | "lightly active" => Some(1.375),
        "moderate" | "moderately active" => Some(1.55),
        "active" => Some(1.725),
        "very active" => Some(1.9),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CalorieTarget {
    pub bmr: f64,
    pub tdee: f64,
    pub calorie_target: f64,
}

/// TDEE plus the goal adjustment: +500 kcal to gain, -500 to lose, else the
/// TDEE itself. Any unrecognized goal string means "maintain".
pub fn calorie_target(bmr: f64, activity_level: f64, weight_goal: &str) -> CalorieTarget {
    let tdee = tdee(bmr, activity_level);
    let calorie_target = match weight_goal.trim().to_lowercase().as_str() {
        "gain weight" => tdee + 500.0,
        "lose weight" => tdee - 500.0,
        _ => tdee,
    };
    CalorieTarget {
        bmr,
        tdee,
        calorie_target,
    }
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmr_male_formula() {
        // 10*70 + 6.25*175 - 5*30 + 5
        let got = bmr(70.0, 175.0, 30, Gender::Male);
        assert!((got - 1648.75).abs() < 1e-9);
    }

    #[test]
    fn bmr_female_formula() {
        // 10*60 + 6.25*165 - 5*25 - 161
        let got = bmr(60.0, 165.0, 25, Gender::Female);
        assert!((got - 1345.25).abs() < 1e-9);
    }

    #[test]
    fn gender_parse_is_case_insensitive_and_closed() {
        assert_eq!(Gender::parse("Male").unwrap(), Gender::Male);
        assert_eq!(Gender::parse("FEMALE").unwrap(), Gender::Female);
        assert!(matches!(
            Gender::parse("other"),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(Gender::parse(""), Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn bmi_reference_value() {
        let got = bmi(70.0, 175.0).unwrap();
        assert!((got - 22.86).abs() < 0.01);
    }

    #[test]
    fn bmi_rejects_non_positive_height() {
        assert!(matches!(bmi(70.0, 0.0), Err(ApiError::InvalidInput(_))));
        assert!(matches!(bmi(70.0, -170.0), Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn calorie_target_goal_adjustments() {
        let base = 1600.0;
        let lose = calorie_target(base, 1.5, "lose weight");
        assert!((lose.calorie_target - (lose.tdee - 500.0)).abs() < 1e-9);
        let gain = calorie_target(base, 1.5, "gain weight");
        assert!((gain.calorie_target - (gain.tdee + 500.0)).abs() < 1e-9);
        let maintain = calorie_target(base, 1.5, "maintain");
        assert!((maintain.calorie_target - maintain.tdee).abs() < 1e-9);
        let other = calorie_target(base, 1.5, "Not specified");
        assert!((other.calorie_target - other.tdee).abs() < 1e-9);
    }

    #[test]
    fn tdee_is_plain_product() {
        assert!((tdee(1500.0, 1.55) - 2325.0).abs() < 1e-9);
    }

    #[test]
    fn activity_labels_map_to_multipliers() {
        assert_eq!(activity_multiplier("sedentary"), Some(1.2));
        assert_eq!(activity_multiplier("Moderately Active"), Some(1.55));
        assert_eq!(activity_multiplier("very active"), Some(1.9));
        assert_eq!(activity_multiplier("couch potato"), None);
    }

    #[test]
    fn round2_boundary_only() {
        assert_eq!(round2(22.857142857), 22.86);
        assert_eq!(round2(1648.749), 1648.75);
    }
}
