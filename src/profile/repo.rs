use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::profile::calculator::Gender;

/// One profile row per user, unique on user_id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub weight: f64,
    pub height: f64,
    pub age: i32,
    pub gender: String,
    pub activity_level: f64,
    pub bmr: f64,
    pub bmi: f64,
    pub weight_goal: String,
    pub diet_type: String,
    pub health_conditions: serde_json::Value,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Validated attributes going into a create or full-replace update. Derived
/// bmr/bmi are computed by the caller before persisting.
#[derive(Debug, Clone)]
pub struct ProfileAttrs {
    pub weight: f64,
    pub height: f64,
    pub age: i32,
    pub gender: Gender,
    pub activity_level: f64,
    pub weight_goal: String,
    pub diet_type: String,
    pub health_conditions: Vec<String>,
}

const PROFILE_COLUMNS: &str = "id, user_id, weight, height, age, gender, activity_level, \
     bmr, bmi, weight_goal, diet_type, health_conditions, created_at, updated_at";

impl Profile {
    pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }

    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        attrs: &ProfileAttrs,
        bmr: f64,
        bmi: f64,
    ) -> anyhow::Result<Profile> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"
            INSERT INTO profiles
                (id, user_id, weight, height, age, gender, activity_level,
                 bmr, bmi, weight_goal, diet_type, health_conditions)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(attrs.weight)
        .bind(attrs.height)
        .bind(attrs.age)
        .bind(attrs.gender.as_str())
        .bind(attrs.activity_level)
        .bind(bmr)
        .bind(bmi)
        .bind(&attrs.weight_goal)
        .bind(&attrs.diet_type)
        .bind(serde_json::json!(attrs.health_conditions))
        .fetch_one(db)
        .await?;
        Ok(profile)
    }

    /// Full replace of mutable fields in one statement; returns None when
    /// there is no profile to update.
    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        attrs: &ProfileAttrs,
        bmr: f64,
        bmi: f64,
    ) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"
            UPDATE profiles SET
                weight = $2, height = $3, age = $4, gender = $5,
                activity_level = $6, bmr = $7, bmi = $8,
                weight_goal = $9, diet_type = $10, health_conditions = $11,
                updated_at = now()
            WHERE user_id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(attrs.weight)
        .bind(attrs.height)
        .bind(attrs.age)
        .bind(attrs.gender.as_str())
        .bind(attrs.activity_level)
        .bind(bmr)
        .bind(bmi)
        .bind(&attrs.weight_goal)
        .bind(&attrs.diet_type)
        .bind(serde_json::json!(attrs.health_conditions))
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }
}

// Runs against a real Postgres and skips when DATABASE_URL is not set.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::User;
    use crate::error::ApiError;
    use sqlx::postgres::PgPoolOptions;

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

    fn attrs() -> ProfileAttrs {
        ProfileAttrs {
            weight: 70.0,
            height: 175.0,
            age: 30,
            gender: Gender::Male,
            activity_level: 1.55,
            weight_goal: "maintain".into(),
            diet_type: "Not specified".into(),
            health_conditions: vec![],
        }
    }

    // A concurrent create can slip past the handler's existence precheck;
    // the unique index is then the duplicate signal and it must surface as
    // Conflict, not a 500.
    #[tokio::test]
    async fn duplicate_create_maps_to_conflict() {
        let Some(db) = test_pool().await else {
            eprintln!("skipping: DATABASE_URL not set");
            return;
        };
        let tag = uuid::Uuid::new_v4();
        let user = User::create(
            &db,
            &format!("profile-test-{tag}"),
            &format!("profile-test-{tag}@example.com"),
            "unused-hash",
        )
        .await
        .expect("create test user");

        Profile::create(&db, user.id, &attrs(), 1648.75, 22.86)
            .await
            .expect("first create succeeds");

        let err = Profile::create(&db, user.id, &attrs(), 1648.75, 22.86)
            .await
            .expect_err("second create hits the unique index");
        let mapped = ApiError::conflict_on_unique(err, "Profile already exists for this user");
        assert!(matches!(mapped, ApiError::Conflict(_)));
        assert_eq!(mapped.status(), axum::http::StatusCode::BAD_REQUEST);

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user.id)
            .execute(&db)
            .await
            .expect("cleanup test user");
    }
}
