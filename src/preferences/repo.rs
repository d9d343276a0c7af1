use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::dto::{DietType, PrimaryGoal, UserPreferences};

#[derive(Debug, FromRow)]
struct PreferencesRow {
    diet_type: Option<String>,
    is_low_sugar: bool,
    is_low_carb: bool,
    is_lactose_free: bool,
    primary_goal: Option<String>,
}

impl From<PreferencesRow> for UserPreferences {
    fn from(r: PreferencesRow) -> Self {
        Self {
            diet_type: r.diet_type.as_deref().and_then(DietType::parse),
            is_low_sugar: r.is_low_sugar,
            is_low_carb: r.is_low_carb,
            is_lactose_free: r.is_lactose_free,
            primary_goal: r.primary_goal.as_deref().and_then(PrimaryGoal::parse),
        }
    }
}

/// Creates the user's profile or overwrites the existing one in place.
pub async fn upsert(db: &PgPool, user_id: Uuid, prefs: &UserPreferences) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO user_preferences
            (user_id, diet_type, is_low_sugar, is_low_carb, is_lactose_free, primary_goal)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (user_id) DO UPDATE SET
            diet_type = EXCLUDED.diet_type,
            is_low_sugar = EXCLUDED.is_low_sugar,
            is_low_carb = EXCLUDED.is_low_carb,
            is_lactose_free = EXCLUDED.is_lactose_free,
            primary_goal = EXCLUDED.primary_goal,
            updated_at = now()
        "#,
    )
    .bind(user_id)
    .bind(prefs.diet_type.map(DietType::as_str))
    .bind(prefs.is_low_sugar)
    .bind(prefs.is_low_carb)
    .bind(prefs.is_lactose_free)
    .bind(prefs.primary_goal.map(PrimaryGoal::as_str))
    .execute(db)
    .await?;
    Ok(())
}

pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<UserPreferences>> {
    let row = sqlx::query_as::<_, PreferencesRow>(
        r#"
        SELECT diet_type, is_low_sugar, is_low_carb, is_lactose_free, primary_goal
        FROM user_preferences
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(row.map(Into::into))
}
