//! Canonical nutrient vocabulary.
//!
//! The order of [`NUTRIENTS`] is the column order the density model was trained
//! with. Reordering it silently corrupts every score.

mod features;

pub use features::{assemble, assemble_pairs, FeatureVector};

/// Canonical nutrient names in model training order.
pub const NUTRIENTS: [&str; 28] = [
    "Carbohydrates",
    "Sugars",
    "Protein",
    "Dietary_Fiber",
    "Cholesterol",
    "Sodium",
    "Water",
    "Vitamin_A",
    "Vitamin_B1",
    "Vitamin_B11",
    "Vitamin_B12",
    "Vitamin_B2",
    "Vitamin_B3",
    "Vitamin_B5",
    "Vitamin_B6",
    "Vitamin_C",
    "Vitamin_D",
    "Vitamin_E",
    "Vitamin_K",
    "Calcium",
    "Copper",
    "Iron",
    "Magnesium",
    "Manganese",
    "Potassium",
    "Phosporus",
    "Selenium",
    "Zinc",
];

pub const FEATURE_COUNT: usize = NUTRIENTS.len();

/// Reserved pseudo-key an extraction may use to rename the meal.
pub const MEAL_NAME_KEY: &str = "meal_name";

/// Slot of a canonical nutrient in the feature vector.
pub fn position(name: &str) -> Option<usize> {
    NUTRIENTS.iter().position(|n| *n == name)
}

/// Returns the `'static` canonical spelling for `name`, if it is one.
pub fn canonical(name: &str) -> Option<&'static str> {
    position(name).map(|i| NUTRIENTS[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_has_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        for n in NUTRIENTS {
            assert!(seen.insert(n), "duplicate nutrient {n}");
        }
        assert_eq!(seen.len(), FEATURE_COUNT);
    }

    #[test]
    fn training_order_is_preserved() {
        assert_eq!(position("Carbohydrates"), Some(0));
        assert_eq!(position("Sugars"), Some(1));
        assert_eq!(position("Potassium"), Some(24));
        assert_eq!(position("Phosporus"), Some(25));
        assert_eq!(position("Zinc"), Some(FEATURE_COUNT - 1));
        assert_eq!(position("Fat"), None);
        assert_eq!(canonical("Iron"), Some("Iron"));
        assert_eq!(canonical(MEAL_NAME_KEY), None);
    }
}
