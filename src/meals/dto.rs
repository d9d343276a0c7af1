use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::MealRecord;

/// `/predict` body: an optional name plus any nutrient fields.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub meal_name: Option<String>,
    #[serde(flatten)]
    pub nutrients: Map<String, Value>,
}

/// A stored meal with its nutrient snapshot inlined next to the score.
#[derive(Debug, Serialize)]
pub struct MealResponse {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub meal_name: Option<String>,
    #[serde(flatten)]
    pub nutrients: Map<String, Value>,
    pub prediction: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<MealRecord> for MealResponse {
    fn from(m: MealRecord) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            meal_name: m.meal_name,
            nutrients: m.nutrients.0,
            prediction: m.prediction,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelAnalysis {
    pub prediction: f64,
    pub meal_name: String,
}
