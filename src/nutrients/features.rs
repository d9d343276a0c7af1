use serde_json::{Map, Value};

use super::{position, FEATURE_COUNT, NUTRIENTS};

/// Model input: one finite, non-negative value per canonical nutrient.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn zeros() -> Self {
        Self([0.0; FEATURE_COUNT])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, nutrient: &str) -> Option<f64> {
        position(nutrient).map(|i| self.0[i])
    }

    /// Snapshot keyed by canonical name; every nutrient is present.
    pub fn to_profile(&self) -> Map<String, Value> {
        NUTRIENTS
            .iter()
            .zip(self.0.iter())
            .map(|(name, v)| ((*name).to_string(), Value::from(*v)))
            .collect()
    }
}

/// Builds the model input from an untrusted nutrient mapping.
///
/// Unknown keys are ignored. Missing, null, non-numeric, non-finite and negative
/// values all resolve to `0.0`; this never fails.
pub fn assemble(input: &Map<String, Value>) -> FeatureVector {
    let mut slots = [0.0; FEATURE_COUNT];
    for (slot, name) in slots.iter_mut().zip(NUTRIENTS.iter()) {
        *slot = input.get(*name).map_or(0.0, coerce);
    }
    FeatureVector(slots)
}

/// Same policy as [`assemble`] for already-typed `(name, value)` pairs.
/// Later duplicates win.
pub fn assemble_pairs<'a, I>(pairs: I) -> FeatureVector
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut slots = [0.0; FEATURE_COUNT];
    for (name, value) in pairs {
        if let Some(i) = position(name) {
            slots[i] = sanitize(value);
        }
    }
    FeatureVector(slots)
}

fn coerce(value: &Value) -> f64 {
    let raw = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    raw.map_or(0.0, sanitize)
}

fn sanitize(v: f64) -> f64 {
    if v.is_finite() && v >= 0.0 {
        v
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(v: Value) -> Map<String, Value> {
        v.as_object().cloned().expect("object literal")
    }

    #[test]
    fn label_example_populates_only_reported_slots() {
        let input = as_map(json!({
            "Carbohydrates": 4, "Dietary_Fiber": 1, "Sugars": 2, "Protein": 2,
            "Vitamin_D": 0, "Calcium": 10, "Iron": 0.3, "Potassium": 90
        }));
        let v = assemble(&input);

        assert_eq!(v.as_slice().len(), FEATURE_COUNT);
        assert_eq!(v.get("Carbohydrates"), Some(4.0));
        assert_eq!(v.get("Dietary_Fiber"), Some(1.0));
        assert_eq!(v.get("Sugars"), Some(2.0));
        assert_eq!(v.get("Protein"), Some(2.0));
        assert_eq!(v.get("Calcium"), Some(10.0));
        assert_eq!(v.get("Iron"), Some(0.3));
        assert_eq!(v.get("Potassium"), Some(90.0));

        let reported = input.keys().map(String::as_str).collect::<Vec<_>>();
        for name in NUTRIENTS.iter().filter(|n| !reported.contains(n)) {
            assert_eq!(v.get(name), Some(0.0), "{name} should default to zero");
        }
    }

    #[test]
    fn invalid_and_missing_values_become_zero() {
        let input = as_map(json!({
            "Sodium": "lots",
            "Protein": null,
            "Water": [1, 2],
            "Sugars": -3.0,
            "Zinc": " 1.5 ",
            "Fat": 12,
            "meal_name": "oats"
        }));
        let v = assemble(&input);

        assert_eq!(v.as_slice().len(), FEATURE_COUNT);
        assert_eq!(v.get("Sodium"), Some(0.0));
        assert_eq!(v.get("Protein"), Some(0.0));
        assert_eq!(v.get("Water"), Some(0.0));
        assert_eq!(v.get("Sugars"), Some(0.0));
        assert_eq!(v.get("Zinc"), Some(1.5));
        assert_eq!(v.as_slice().iter().filter(|x| **x != 0.0).count(), 1);
    }

    #[test]
    fn empty_input_is_all_zero() {
        let v = assemble(&Map::new());
        assert_eq!(v, FeatureVector::zeros());
        assert!(v.as_slice().iter().all(|x| *x == 0.0));
    }

    #[test]
    fn pairs_ignore_unknown_names_and_non_finite_values() {
        let v = assemble_pairs([("Iron", 4.0), ("Bogus", 9.0), ("Calcium", f64::NAN), ("Iron", 5.0)]);
        assert_eq!(v.get("Iron"), Some(5.0));
        assert_eq!(v.get("Calcium"), Some(0.0));
    }

    #[test]
    fn profile_snapshot_contains_every_nutrient() {
        let v = assemble_pairs([("Protein", 7.5)]);
        let profile = v.to_profile();
        assert_eq!(profile.len(), FEATURE_COUNT);
        assert_eq!(profile["Protein"], json!(7.5));
        assert_eq!(profile["Zinc"], json!(0.0));
    }
}
