use serde_json::Value;
use tracing::debug;

use crate::external::fence::strip_fences;
use crate::nutrients::{canonical, MEAL_NAME_KEY};

/// One `(name, value)` pair from a label.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractedItem {
    Nutrient { name: &'static str, value: f64 },
    MealName(String),
}

/// Parses the model's answer as a JSON array of `[name, value]` pairs.
///
/// All or nothing: any element outside the schema (unknown name, non-numeric
/// nutrient value, wrong arity) yields an empty list.
pub fn parse_pairs(answer: &str) -> Vec<ExtractedItem> {
    match try_parse(strip_fences(answer)) {
        Ok(items) => items,
        Err(reason) => {
            debug!(%reason, "extraction answer rejected");
            Vec::new()
        }
    }
}

fn try_parse(body: &str) -> Result<Vec<ExtractedItem>, String> {
    let value: Value = serde_json::from_str(body).map_err(|e| e.to_string())?;
    let Value::Array(elements) = value else {
        return Err("top level is not an array".into());
    };

    elements
        .iter()
        .enumerate()
        .map(|(i, element)| match element.as_array().map(Vec::as_slice) {
            Some([Value::String(name), value]) => item(name, value)
                .ok_or_else(|| format!("element {i}: {name:?} = {value} outside schema")),
            _ => Err(format!("element {i} is not a [name, value] pair")),
        })
        .filter_map(Result::transpose)
        .collect()
}

/// `None` is a schema violation; `Some(None)` is a blank meal name, which is
/// skipped without affecting the other pairs.
fn item(name: &str, value: &Value) -> Option<Option<ExtractedItem>> {
    if name == MEAL_NAME_KEY {
        let label = value.as_str()?.trim();
        return Some((!label.is_empty()).then(|| ExtractedItem::MealName(label.to_string())));
    }
    let name = canonical(name)?;
    let value = value.as_f64().filter(|v| v.is_finite())?;
    Some(Some(ExtractedItem::Nutrient { name, value }))
}
