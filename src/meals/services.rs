use serde_json::{Map, Value};
use tracing::{info, instrument};

use super::dto::LabelAnalysis;
use crate::extraction::{ExtractedItem, NutrientExtractor};
use crate::nutrients::{assemble, assemble_pairs};
use crate::scoring::DensityScorer;

/// Scores submitted nutrient fields. Returns the full snapshot to store
/// (every canonical key, unresolved values 0.0) and the score.
pub fn score_submission(scorer: &DensityScorer, fields: &Map<String, Value>) -> (Map<String, Value>, f64) {
    let features = assemble(fields);
    let prediction = scorer.score(&features);
    (features.to_profile(), prediction)
}

/// Label photo to score. The meal name defaults to the upload's file name and
/// is replaced by one read from the label.
#[instrument(skip(extractor, scorer, image), fields(bytes = image.len()))]
pub async fn analyze_label(
    extractor: &NutrientExtractor,
    scorer: &DensityScorer,
    image: &[u8],
    filename: &str,
) -> LabelAnalysis {
    let mut meal_name = filename.to_string();
    let mut nutrients = Vec::new();
    for item in extractor.extract_from_image(image).await {
        match item {
            ExtractedItem::Nutrient { name, value } => nutrients.push((name, value)),
            ExtractedItem::MealName(name) => meal_name = name,
        }
    }

    let prediction = scorer.score(&assemble_pairs(nutrients.iter().copied()));
    info!(nutrients = nutrients.len(), prediction, "label analysed");
    LabelAnalysis { prediction, meal_name }
}
