use serde::{Deserialize, Serialize};

use crate::profile::calculator::round2;

/// Running nutrient totals, either for one meal or for a whole day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientTotals {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
}

impl NutrientTotals {
    pub fn rounded(self) -> Self {
        Self {
            calories: round2(self.calories),
            protein: round2(self.protein),
            fat: round2(self.fat),
            carbs: round2(self.carbs),
        }
    }
}

/// A logged food item. Missing nutrient fields count as 0 (tolerant
/// accumulation); descriptive extras like name or serving size pass through
/// untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodItem {
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One meal inside a daily log: label, foods in logging order, and the
/// field-wise sum of the foods' nutrients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub meal_time: String,
    pub foods: Vec<FoodItem>,
    pub meal_totals: NutrientTotals,
}

impl Meal {
    pub fn new(meal_time: String, foods: Vec<FoodItem>) -> Self {
        let meal_totals = meal_totals(&foods);
        Self {
            meal_time,
            foods,
            meal_totals,
        }
    }
}

pub fn meal_totals(foods: &[FoodItem]) -> NutrientTotals {
    foods.iter().fold(NutrientTotals::default(), |mut acc, f| {
        acc.calories += f.calories;
        acc.protein += f.protein;
        acc.fat += f.fat;
        acc.carbs += f.carbs;
        acc
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFoodLogRequest {
    #[serde(default)]
    pub meal_time: String,
    #[serde(default)]
    pub foods: Vec<FoodItem>,
}

/// Summary keys are snake_case; `totalCaloriesForDay` keeps the log
/// document's field name.
#[derive(Debug, Serialize)]
pub struct AddFoodLogResponse {
    pub message: String,
    #[serde(rename = "totalCaloriesForDay")]
    pub total_calories_for_day: NutrientTotals,
    pub calorie_target: f64,
    pub calories_left_for_day: f64,
}

#[derive(Debug, Serialize)]
pub struct DailySummary {
    pub bmr: f64,
    pub tdee: f64,
    pub calorie_target: f64,
    pub total_calories_consumed: f64,
    pub calories_left_for_day: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn food(calories: f64, protein: f64, fat: f64, carbs: f64) -> FoodItem {
        FoodItem {
            calories,
            protein,
            fat,
            carbs,
            extra: Default::default(),
        }
    }

    #[test]
    fn meal_totals_is_fieldwise_sum() {
        let foods = vec![food(89.0, 1.1, 0.3, 22.8), food(165.0, 31.0, 3.6, 0.0)];
        let totals = meal_totals(&foods);
        assert!((totals.calories - 254.0).abs() < 1e-9);
        assert!((totals.protein - 32.1).abs() < 1e-9);
        assert!((totals.fat - 3.9).abs() < 1e-9);
        assert!((totals.carbs - 22.8).abs() < 1e-9);
    }

    #[test]
    fn missing_nutrient_fields_default_to_zero() {
        let item: FoodItem =
            serde_json::from_str(r#"{"name":"Apple","calories":52}"#).unwrap();
        assert_eq!(item.calories, 52.0);
        assert_eq!(item.protein, 0.0);
        assert_eq!(item.fat, 0.0);
        assert_eq!(item.carbs, 0.0);
        assert_eq!(item.extra.get("name").unwrap(), "Apple");
    }

    #[test]
    fn meal_serializes_with_camel_case_keys() {
        let meal = Meal::new("breakfast".into(), vec![food(100.0, 5.0, 2.0, 10.0)]);
        let json = serde_json::to_value(&meal).unwrap();
        assert_eq!(json["mealTime"], "breakfast");
        assert!(json["mealTotals"].is_object());
        assert_eq!(json["mealTotals"]["calories"], 100.0);
    }

    #[test]
    fn totals_round_at_boundary() {
        let t = NutrientTotals {
            calories: 100.006,
            protein: 1.23456,
            fat: 0.0,
            carbs: 2.999,
        }
        .rounded();
        assert_eq!(t.calories, 100.01);
        assert_eq!(t.protein, 1.23);
        assert_eq!(t.carbs, 3.0);
    }
}
