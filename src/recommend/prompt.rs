use crate::preferences::UserPreferences;

const TEMPLATE: &str = r#"ROLE:
You are a nutrition recommendation assistant. For a food item you report:
1) its main nutritional issues
2) simple, actionable fixes
3) quick additions or pairings that improve it

DIRECTION:
Given a food name or nutrition text, reason about the nutritional issues it commonly has, then give
clear recommendations that are realistic for everyday people. Focus on real nutrient problems: high
sugar, high sodium, low protein, low fiber, excess calories, low nutrient density.

DOMAIN:
Nutrition guidance based on typical nutrient profiles of packaged foods, snacks and common meals.

OUTPUT FORMAT:
Respond with this JSON structure ONLY:

{
  "food": "<food name>",
  "main_issues": ["issue1", "issue2", ...],
  "simple_fixes": ["fix1", "fix2", ...],
  "recommendations": ["recommendation1", "recommendation2", ...]
}

EXAMPLES:

INPUT: "Potato chips"
OUTPUT:
{
  "food": "Potato chips",
  "main_issues": ["High sodium", "Low protein", "Low fiber"],
  "simple_fixes": ["Choose a smaller portion", "Pick lightly-salted versions"],
  "recommendations": ["Pair with a handful of nuts for protein and satiety"]
}

INPUT: "Instant noodles"
OUTPUT:
{
  "food": "Instant noodles",
  "main_issues": ["Very high sodium", "Low protein", "Low fiber"],
  "simple_fixes": ["Use half the seasoning packet", "Add an egg or tofu"],
  "recommendations": ["Add 150g vegetables and 1 egg to turn it into a balanced meal"]
}

INPUT: "Candy bar"
OUTPUT:
{
  "food": "Candy bar",
  "main_issues": ["High sugar", "Low satiety", "Low protein"],
  "simple_fixes": ["Eat half the bar", "Pair with nuts to slow sugar absorption"],
  "recommendations": ["Add 20g almonds to create a balanced snack"]
}

INPUT: "Sweetened yogurt"
OUTPUT:
{
  "food": "Sweetened yogurt",
  "main_issues": ["Added sugar", "Low fiber"],
  "simple_fixes": ["Choose low-sugar or plain yogurt", "Add fruit instead of flavored mix"],
  "recommendations": ["Add chia seeds for fiber and omega-3"]
}

INPUT: "Breakfast cereal"
OUTPUT:
{
  "food": "Breakfast cereal",
  "main_issues": ["High sugar", "Low protein", "Low fiber (for many brands)"],
  "simple_fixes": ["Mix with oats to reduce sugar per serving", "Use a smaller bowl"],
  "recommendations": ["Add Greek yogurt and 1 fruit to improve protein and fiber"]
}

END OF EXAMPLES.

NOW ANSWER THE USER INPUT STRICTLY USING THE JSON FORMAT.
"#;

pub const TAILOR_INSTRUCTION: &str = "STRICTLY TAILOR your output to these preferences \
(for example, if vegan, do not recommend meat or dairy). If the food violates a preference \
(for example a low-sugar user eating candy), WARN them in 'main_issues'.";

/// Full recommendation prompt. The location clause needs both coordinates.
pub fn build(food: &str, location: Option<(f64, f64)>, prefs: Option<&UserPreferences>) -> String {
    let mut prompt = String::from(TEMPLATE);

    if let Some((lat, lng)) = location {
        prompt.push_str(&format!(
            "\nUSER LOCATION: Latitude {lat}, Longitude {lng}. (If relevant, consider regional \
             availability or cuisine styles for this location.)\n"
        ));
    }

    if let Some(prefs) = prefs {
        let serialized = serde_json::to_string(prefs).unwrap_or_else(|_| "{}".into());
        prompt.push_str(&format!("\nUSER PREFERENCES: {serialized}. {TAILOR_INSTRUCTION}\n"));
    }

    prompt.push_str(&format!("\nINPUT: \"{food}\"\n"));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::dto::DietType;

    #[test]
    fn bare_prompt_has_examples_and_input_only() {
        let p = build("apple pie", None, None);
        assert!(p.starts_with("ROLE:"));
        for example in ["Potato chips", "Instant noodles", "Candy bar", "Sweetened yogurt", "Breakfast cereal"] {
            assert!(p.contains(&format!("INPUT: \"{example}\"")), "missing example {example}");
        }
        assert!(!p.contains("USER LOCATION"));
        assert!(!p.contains("USER PREFERENCES"));
        assert!(p.trim_end().ends_with("INPUT: \"apple pie\""));
    }

    #[test]
    fn location_clause_uses_both_coordinates() {
        let p = build("ramen", Some((35.68, 139.76)), None);
        assert!(p.contains("USER LOCATION: Latitude 35.68, Longitude 139.76."));
    }

    #[test]
    fn preferences_clause_serializes_profile_and_instruction() {
        let prefs = UserPreferences {
            diet_type: Some(DietType::Vegan),
            is_low_sugar: true,
            ..Default::default()
        };
        let p = build("candy bar", None, Some(&prefs));
        assert!(p.contains(r#""diet_type":"vegan""#));
        assert!(p.contains(r#""is_low_sugar":true"#));
        assert!(p.contains("STRICTLY TAILOR"));
        assert!(p.contains("WARN them in 'main_issues'"));
        assert!(p.trim_end().ends_with("INPUT: \"candy bar\""));
    }
}
