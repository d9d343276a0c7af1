//! Preference-aware dietary recommendations from the language model.

pub mod handlers;
pub mod prompt;

use std::sync::Arc;

use axum::Router;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::external::{fence::strip_fences, LlmClient};
use crate::preferences::UserPreferences;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    handlers::routes()
}

pub const UNAVAILABLE_ISSUE: &str = "AI service temporarily unavailable";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub food: String,
    pub main_issues: Vec<String>,
    pub simple_fixes: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Structured advice, or the model's text verbatim when it is not valid JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecommendationResult {
    Structured(Recommendation),
    Raw { raw: String },
}

impl Recommendation {
    /// Answer used when the model cannot be reached or says nothing.
    pub fn unavailable(food: &str) -> Self {
        Self {
            food: food.to_string(),
            main_issues: vec![UNAVAILABLE_ISSUE.to_string()],
            simple_fixes: Vec::new(),
            recommendations: Vec::new(),
        }
    }
}

pub struct Recommender {
    llm: Arc<dyn LlmClient>,
}

impl Recommender {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Never fails: transport problems produce [`Recommendation::unavailable`],
    /// unparseable answers come back as [`RecommendationResult::Raw`].
    #[instrument(skip(self, prefs), fields(has_prefs = prefs.is_some()))]
    pub async fn recommend(
        &self,
        food: &str,
        location: Option<(f64, f64)>,
        prefs: Option<&UserPreferences>,
    ) -> RecommendationResult {
        let prompt = prompt::build(food, location, prefs);
        match self.llm.generate(&prompt).await {
            Ok(answer) if !answer.trim().is_empty() => parse_answer(&answer),
            Ok(_) => {
                warn!("recommendation model returned an empty answer");
                RecommendationResult::Structured(Recommendation::unavailable(food))
            }
            Err(e) => {
                warn!(error = %e, "recommendation call failed");
                RecommendationResult::Structured(Recommendation::unavailable(food))
            }
        }
    }
}

pub fn parse_answer(answer: &str) -> RecommendationResult {
    match serde_json::from_str::<Recommendation>(strip_fences(answer)) {
        Ok(rec) => RecommendationResult::Structured(rec),
        Err(e) => {
            debug!(error = %e, "recommendation answer is not the expected JSON");
            RecommendationResult::Raw {
                raw: answer.to_string(),
            }
        }
    }
}

/// `Some` only when both coordinates are present.
pub fn location(lat: Option<f64>, lng: Option<f64>) -> Option<(f64, f64)> {
    lat.zip(lng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::tests::FakeLlm;
    use crate::preferences::dto::DietType;
    use std::sync::atomic::Ordering;

    const ANSWER: &str = r#"{
  "food": "Candy bar",
  "main_issues": ["High sugar", "Conflicts with your low-sugar preference"],
  "simple_fixes": ["Eat half the bar"],
  "recommendations": ["Add 20g almonds"]
}"#;

    #[test]
    fn fenced_and_plain_answers_parse_identically() {
        let plain = parse_answer(ANSWER);
        let fenced = parse_answer(&format!("```json\n{ANSWER}\n```"));
        assert_eq!(plain, fenced);
        let RecommendationResult::Structured(rec) = plain else {
            panic!("expected structured result");
        };
        assert_eq!(rec.food, "Candy bar");
        assert_eq!(rec.main_issues.len(), 2);
    }

    #[test]
    fn prose_answer_is_returned_raw() {
        let text = "Candy bars are high in sugar; try nuts instead.";
        assert_eq!(parse_answer(text), RecommendationResult::Raw { raw: text.into() });
        let json = serde_json::to_value(parse_answer(text)).unwrap();
        assert_eq!(json, serde_json::json!({ "raw": text }));
    }

    #[tokio::test]
    async fn call_failure_yields_canned_answer() {
        let llm = Arc::new(FakeLlm::failing());
        let result = Recommender::new(llm.clone()).recommend("candy bar", None, None).await;
        let RecommendationResult::Structured(rec) = result else {
            panic!("expected canned structured result");
        };
        assert_eq!(rec.food, "candy bar");
        assert_eq!(rec.main_issues, vec![UNAVAILABLE_ISSUE.to_string()]);
        assert!(rec.simple_fixes.is_empty());
        assert!(rec.recommendations.is_empty());
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn blank_answer_yields_canned_answer() {
        let llm = Arc::new(FakeLlm::answering("   "));
        let result = Recommender::new(llm).recommend("soda", None, None).await;
        assert_eq!(result, RecommendationResult::Structured(Recommendation::unavailable("soda")));
    }

    #[tokio::test]
    async fn preferences_reach_the_prompt() {
        let llm = Arc::new(FakeLlm::answering(ANSWER));
        let prefs = UserPreferences {
            diet_type: Some(DietType::Vegan),
            is_low_sugar: true,
            ..Default::default()
        };
        let result = Recommender::new(llm.clone())
            .recommend("candy bar", location(Some(1.0), None), Some(&prefs))
            .await;

        assert!(matches!(result, RecommendationResult::Structured(_)));
        let prompt = llm.last_prompt();
        assert!(prompt.contains(r#""diet_type":"vegan""#));
        assert!(prompt.contains(r#""is_low_sugar":true"#));
        assert!(prompt.contains(prompt::TAILOR_INSTRUCTION));
        assert!(!prompt.contains("USER LOCATION"));
    }

    #[test]
    fn location_requires_both_coordinates() {
        assert_eq!(location(Some(1.0), Some(2.0)), Some((1.0, 2.0)));
        assert_eq!(location(Some(1.0), None), None);
        assert_eq!(location(None, Some(2.0)), None);
    }
}
