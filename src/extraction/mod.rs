//! Label photo → nutrient pairs: OCR first, then one language-model pass that
//! maps the free text onto the canonical vocabulary.

mod parse;

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::external::LlmClient;
use crate::nutrients::NUTRIENTS;
use crate::ocr::OcrEngine;

pub use parse::{parse_pairs, ExtractedItem};

const INSTRUCTIONS: &str = "\
You are a nutrient extraction assistant. Read the text of a food label and map every \
nutrient you find to one of the standard nutrient names below. Ignore nutrients that \
have no standard name (for example Total Fat or Calories).

Standard nutrients: {NUTRIENTS}

If the label names the product, add [\"meal_name\", \"<product name>\"].

Answer with a JSON array of [name, value] pairs and nothing else. Values are plain \
numbers without units.";

const EXAMPLES: &str = r#"Extract from: Nutrition Facts Serving Size: 2 tbsp (32g) Calories 80 Total Fat 7g Saturated Fat 1g Trans Fat 0g Cholesterol 0mg Sodium 80mg Total Carbohydrate 4g Dietary Fiber 1g Sugars 2g Protein 2g Vitamin D 0mcg Calcium 10mg Iron 0.3mg Potassium 90mg
[["Carbohydrates", 4], ["Dietary_Fiber", 1], ["Sugars", 2], ["Protein", 2], ["Vitamin_D", 0], ["Calcium", 10], ["Iron", 0.3], ["Potassium", 90]]

Extract from: Classic Sea Salt Potato Chips Nutrition Facts Serving Size 1 oz (28g/about 25 chips) Servings Per Container 7 Amount Per Serving Calories 140 Total Fat 10g Cholesterol 0mg Sodium 100mg Total Carbohydrate 13g Dietary Fiber less than 1g Sugars 1g Protein 2g Vitamin A 2% Vitamin C 6% Calcium 0% Iron 4%
[["meal_name", "Classic Sea Salt Potato Chips"], ["Carbohydrates", 13], ["Dietary_Fiber", 0.9], ["Sugars", 1], ["Protein", 2], ["Vitamin_A", 2], ["Vitamin_C", 6], ["Calcium", 0], ["Iron", 4]]"#;

/// Reads nutrient data from label photos. Both stages are best-effort: a failure
/// in either yields empty output, never an error.
pub struct NutrientExtractor {
    ocr: Arc<dyn OcrEngine>,
    llm: Arc<dyn LlmClient>,
}

impl NutrientExtractor {
    pub fn new(ocr: Arc<dyn OcrEngine>, llm: Arc<dyn LlmClient>) -> Self {
        Self { ocr, llm }
    }

    /// Flat label text, or `""` when recognition fails.
    pub async fn read_label(&self, image: &[u8]) -> String {
        match self.ocr.recognize(image).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "ocr failed; continuing with empty text");
                String::new()
            }
        }
    }

    /// Nutrient pairs found in `text`, in answer order.
    #[instrument(skip(self, text), fields(chars = text.len()))]
    pub async fn extract(&self, text: &str) -> Vec<ExtractedItem> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let answer = match self.llm.generate(&build_prompt(text)).await {
            Ok(a) => a,
            Err(e) => {
                warn!(error = %e, "nutrient extraction call failed");
                return Vec::new();
            }
        };
        let items = parse_pairs(&answer);
        info!(pairs = items.len(), "nutrients extracted");
        items
    }

    pub async fn extract_from_image(&self, image: &[u8]) -> Vec<ExtractedItem> {
        let text = self.read_label(image).await;
        self.extract(&text).await
    }
}

pub fn build_prompt(label_text: &str) -> String {
    let instructions = INSTRUCTIONS.replace("{NUTRIENTS}", &NUTRIENTS.join(", "));
    format!("{instructions}\n\n{EXAMPLES}\n\nExtract from: {label_text}")
}
