use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Number of meals shown to anonymous callers.
pub const RECENT_LIMIT: i64 = 5;

/// One scored meal. Rows are only ever inserted.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MealRecord {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub meal_name: Option<String>,
    pub nutrients: Json<Map<String, Value>>,
    pub prediction: f64,
    pub created_at: OffsetDateTime,
}

impl MealRecord {
    pub async fn create(
        db: &PgPool,
        user_id: Option<Uuid>,
        meal_name: Option<&str>,
        nutrients: Map<String, Value>,
        prediction: f64,
    ) -> anyhow::Result<MealRecord> {
        let meal = sqlx::query_as::<_, MealRecord>(
            r#"
            INSERT INTO meal_history (user_id, meal_name, nutrients, prediction)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, meal_name, nutrients, prediction, created_at
            "#,
        )
        .bind(user_id)
        .bind(meal_name)
        .bind(Json(nutrients))
        .bind(prediction)
        .fetch_one(db)
        .await?;
        Ok(meal)
    }

    pub async fn list_by_owner(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<MealRecord>> {
        let rows = sqlx::query_as::<_, MealRecord>(
            r#"
            SELECT id, user_id, meal_name, nutrients, prediction, created_at
            FROM meal_history
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn list_recent(db: &PgPool, limit: i64) -> anyhow::Result<Vec<MealRecord>> {
        let rows = sqlx::query_as::<_, MealRecord>(
            r#"
            SELECT id, user_id, meal_name, nutrients, prediction, created_at
            FROM meal_history
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
