//! Nutrition density scoring.

mod xgboost;

use std::path::Path;

use tracing::info;

use crate::nutrients::FeatureVector;

pub use xgboost::{ModelLoadError, TreeEnsemble};

/// Pretrained density model. Loaded once at startup and only read afterwards.
#[derive(Debug, Clone)]
pub struct DensityScorer {
    model: TreeEnsemble,
}

impl DensityScorer {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelLoadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ModelLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let scorer = Self::from_json(&text)?;
        info!(path = %path.display(), trees = scorer.model.tree_count(), "density model loaded");
        Ok(scorer)
    }

    pub fn from_json(text: &str) -> Result<Self, ModelLoadError> {
        Ok(Self {
            model: TreeEnsemble::from_json(text)?,
        })
    }

    pub fn score(&self, features: &FeatureVector) -> f64 {
        self.model.predict(features.as_slice())
    }
}
