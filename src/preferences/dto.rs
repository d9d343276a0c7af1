use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DietType {
    Vegan,
    Vegetarian,
    NonVeg,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryGoal {
    Muscle,
    WeightLoss,
    Maintenance,
}

/// A user's dietary profile. Also the request body of `POST /auth/preferences`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserPreferences {
    pub diet_type: Option<DietType>,
    #[serde(default)]
    pub is_low_sugar: bool,
    #[serde(default)]
    pub is_low_carb: bool,
    #[serde(default)]
    pub is_lactose_free: bool,
    pub primary_goal: Option<PrimaryGoal>,
}

impl DietType {
    pub fn as_str(self) -> &'static str {
        match self {
            DietType::Vegan => "vegan",
            DietType::Vegetarian => "vegetarian",
            DietType::NonVeg => "non_veg",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "vegan" => Some(DietType::Vegan),
            "vegetarian" => Some(DietType::Vegetarian),
            "non_veg" => Some(DietType::NonVeg),
            _ => None,
        }
    }
}

impl PrimaryGoal {
    pub fn as_str(self) -> &'static str {
        match self {
            PrimaryGoal::Muscle => "muscle",
            PrimaryGoal::WeightLoss => "weight_loss",
            PrimaryGoal::Maintenance => "maintenance",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "muscle" => Some(PrimaryGoal::Muscle),
            "weight_loss" => Some(PrimaryGoal::WeightLoss),
            "maintenance" => Some(PrimaryGoal::Maintenance),
            _ => None,
        }
    }
}
