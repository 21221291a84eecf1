use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::foodlog::dto::{Meal, NutrientTotals};

/// One food-log row per (user, UTC calendar day).
#[derive(Debug, Clone, FromRow)]
pub struct FoodLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub log_date: Date,
    pub meals: serde_json::Value,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_fat: f64,
    pub total_carbs: f64,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, FromRow)]
struct UpsertRow {
    id: Uuid,
    user_id: Uuid,
    log_date: Date,
    meals: serde_json::Value,
    total_calories: f64,
    total_protein: f64,
    total_fat: f64,
    total_carbs: f64,
    created_at: OffsetDateTime,
    inserted: bool,
}

impl FoodLog {
    pub fn totals(&self) -> NutrientTotals {
        NutrientTotals {
            calories: self.total_calories,
            protein: self.total_protein,
            fat: self.total_fat,
            carbs: self.total_carbs,
        }
    }

    pub async fn find_by_day(
        db: &PgPool,
        user_id: Uuid,
        log_date: Date,
    ) -> anyhow::Result<Option<FoodLog>> {
        let log = sqlx::query_as::<_, FoodLog>(
            r#"
            SELECT id, user_id, log_date, meals,
                   total_calories, total_protein, total_fat, total_carbs, created_at
            FROM food_logs
            WHERE user_id = $1 AND log_date = $2
            "#,
        )
        .bind(user_id)
        .bind(log_date)
        .fetch_optional(db)
        .await?;
        Ok(log)
    }

    /// Appends a meal to the (user, day) log in ONE statement. The upsert
    /// both pushes onto the jsonb meals array and increments the totals
    /// columns, so concurrent appends for the same day serialize in the
    /// store and neither can lose the other's update. `(xmax = 0)` tells
    /// whether the row was freshly created or appended to.
    pub async fn append_meal(
        db: &PgPool,
        user_id: Uuid,
        log_date: Date,
        meal: &Meal,
    ) -> anyhow::Result<(FoodLog, bool)> {
        let meal_json = serde_json::to_value(meal)?;
        let t = meal.meal_totals;

        let row = sqlx::query_as::<_, UpsertRow>(
            r#"
            INSERT INTO food_logs
                (id, user_id, log_date, meals,
                 total_calories, total_protein, total_fat, total_carbs)
            VALUES ($1, $2, $3, jsonb_build_array($4::jsonb), $5, $6, $7, $8)
            ON CONFLICT (user_id, log_date) DO UPDATE SET
                meals          = food_logs.meals || jsonb_build_array($4::jsonb),
                total_calories = food_logs.total_calories + EXCLUDED.total_calories,
                total_protein  = food_logs.total_protein  + EXCLUDED.total_protein,
                total_fat      = food_logs.total_fat      + EXCLUDED.total_fat,
                total_carbs    = food_logs.total_carbs    + EXCLUDED.total_carbs
            RETURNING id, user_id, log_date, meals,
                      total_calories, total_protein, total_fat, total_carbs,
                      created_at, (xmax = 0) AS inserted
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(log_date)
        .bind(meal_json)
        .bind(t.calories)
        .bind(t.protein)
        .bind(t.fat)
        .bind(t.carbs)
        .fetch_one(db)
        .await?;

        let inserted = row.inserted;
        Ok((
            FoodLog {
                id: row.id,
                user_id: row.user_id,
                log_date: row.log_date,
                meals: row.meals,
                total_calories: row.total_calories,
                total_protein: row.total_protein,
                total_fat: row.total_fat,
                total_carbs: row.total_carbs,
                created_at: row.created_at,
            },
            inserted,
        ))
    }
}

// These run against a real Postgres and skip when DATABASE_URL is not set;
// the accumulation lives in the upsert statement, so it can only be
// exercised by the store itself.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::User;
    use crate::foodlog::dto::FoodItem;
    use sqlx::postgres::PgPoolOptions;
    use time::macros::date;

    async fn test_pool() -> Option<PgPool> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await
            .ok()?;
        sqlx::migrate!("./migrations").run(&pool).await.ok()?;
        Some(pool)
    }

    async fn test_user(db: &PgPool) -> User {
        let tag = Uuid::new_v4();
        User::create(
            db,
            &format!("log-test-{tag}"),
            &format!("log-test-{tag}@example.com"),
            "unused-hash",
        )
        .await
        .expect("create test user")
    }

    fn meal(label: &str, calories: f64, protein: f64, fat: f64, carbs: f64) -> Meal {
        Meal::new(
            label.into(),
            vec![FoodItem {
                calories,
                protein,
                fat,
                carbs,
                extra: Default::default(),
            }],
        )
    }

    async fn cleanup(db: &PgPool, user_id: Uuid) {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(db)
            .await
            .expect("cleanup test user");
    }

    #[tokio::test]
    async fn same_day_appends_accumulate_and_days_stay_separate() {
        let Some(db) = test_pool().await else {
            eprintln!("skipping: DATABASE_URL not set");
            return;
        };
        let user = test_user(&db).await;
        let day = date!(2024 - 05 - 01);
        let next_day = date!(2024 - 05 - 02);

        let (log, created) =
            FoodLog::append_meal(&db, user.id, day, &meal("breakfast", 300.0, 20.0, 10.0, 30.0))
                .await
                .unwrap();
        assert!(created);
        assert_eq!(log.meals.as_array().unwrap().len(), 1);

        let (log, created) =
            FoodLog::append_meal(&db, user.id, day, &meal("lunch", 450.0, 25.0, 15.0, 40.0))
                .await
                .unwrap();
        assert!(!created, "second same-day append must not create a new row");
        let meals = log.meals.as_array().unwrap();
        assert_eq!(meals.len(), 2);
        assert_eq!(meals[0]["mealTime"], "breakfast");
        assert_eq!(meals[1]["mealTime"], "lunch");
        assert!((log.total_calories - 750.0).abs() < 1e-9);
        assert!((log.total_protein - 45.0).abs() < 1e-9);
        assert!((log.total_fat - 25.0).abs() < 1e-9);
        assert!((log.total_carbs - 70.0).abs() < 1e-9);

        let (other, created) =
            FoodLog::append_meal(&db, user.id, next_day, &meal("dinner", 600.0, 30.0, 20.0, 50.0))
                .await
                .unwrap();
        assert!(created, "a new day gets its own row");
        assert_ne!(other.id, log.id);

        // The first day's row is untouched by the second day's append.
        let first = FoodLog::find_by_day(&db, user.id, day).await.unwrap().unwrap();
        assert_eq!(first.meals.as_array().unwrap().len(), 2);
        assert!((first.total_calories - 750.0).abs() < 1e-9);

        cleanup(&db, user.id).await;
    }

    #[tokio::test]
    async fn concurrent_appends_lose_nothing() {
        let Some(db) = test_pool().await else {
            eprintln!("skipping: DATABASE_URL not set");
            return;
        };
        let user = test_user(&db).await;
        let day = date!(2024 - 06 - 01);

        let mut handles = Vec::new();
        for i in 0..8 {
            let db = db.clone();
            let user_id = user.id;
            handles.push(tokio::spawn(async move {
                let m = meal(&format!("meal-{i}"), 100.0, 5.0, 2.0, 10.0);
                FoodLog::append_meal(&db, user_id, day, &m).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let log = FoodLog::find_by_day(&db, user.id, day).await.unwrap().unwrap();
        assert_eq!(log.meals.as_array().unwrap().len(), 8);
        assert!((log.total_calories - 800.0).abs() < 1e-9);
        assert!((log.total_protein - 40.0).abs() < 1e-9);
        assert!((log.total_fat - 16.0).abs() < 1e-9);
        assert!((log.total_carbs - 80.0).abs() < 1e-9);

        cleanup(&db, user.id).await;
    }
}
