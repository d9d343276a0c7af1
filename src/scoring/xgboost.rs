//! Gradient-boosted tree ensemble read from XGBoost's JSON model export.

use serde::Deserialize;
use thiserror::Error;

use crate::nutrients::FEATURE_COUNT;

/// Objectives whose prediction is the raw margin.
const IDENTITY_OBJECTIVES: &[&str] = &[
    "reg:squarederror",
    "reg:linear",
    "reg:absoluteerror",
    "reg:pseudohubererror",
    "reg:quantileerror",
];

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("read model artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid base_score {0:?}")]
    BaseScore(String),
    #[error("model was trained on {found} features, pipeline produces {expected}")]
    FeatureCount { expected: usize, found: String },
    #[error("unsupported objective {0}")]
    Objective(String),
    #[error("model contains no trees")]
    Empty,
    #[error("tree {tree}: {reason}")]
    Tree { tree: usize, reason: String },
}

#[derive(Deserialize)]
struct ModelFile {
    learner: Learner,
}

#[derive(Deserialize)]
struct Learner {
    learner_model_param: LearnerParam,
    gradient_booster: GradientBooster,
    objective: Option<Objective>,
}

#[derive(Deserialize)]
struct LearnerParam {
    base_score: String,
    num_feature: String,
}

#[derive(Deserialize)]
struct GradientBooster {
    model: BoosterModel,
}

#[derive(Deserialize)]
struct BoosterModel {
    trees: Vec<RawTree>,
}

#[derive(Deserialize)]
struct Objective {
    name: String,
}

#[derive(Deserialize)]
struct RawTree {
    left_children: Vec<i64>,
    right_children: Vec<i64>,
    split_indices: Vec<i64>,
    split_conditions: Vec<f64>,
    default_left: Vec<Flag>,
}

/// Older exports write `default_left` as booleans, newer ones as 0/1.
#[derive(Deserialize, Clone, Copy)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

impl Flag {
    fn is_set(self) -> bool {
        match self {
            Flag::Bool(b) => b,
            Flag::Int(i) => i != 0,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
        default_left: bool,
    },
    Leaf(f32),
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_raw(idx: usize, raw: RawTree) -> Result<Self, ModelLoadError> {
        let fail = |reason: String| ModelLoadError::Tree { tree: idx, reason };

        let n = raw.left_children.len();
        if n == 0 {
            return Err(fail("no nodes".into()));
        }
        if [
            raw.right_children.len(),
            raw.split_indices.len(),
            raw.split_conditions.len(),
            raw.default_left.len(),
        ]
        .iter()
        .any(|len| *len != n)
        {
            return Err(fail("node arrays differ in length".into()));
        }

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let (l, r) = (raw.left_children[i], raw.right_children[i]);
            if l == -1 {
                if r != -1 {
                    return Err(fail(format!("node {i} has a right child but no left child")));
                }
                nodes.push(Node::Leaf(raw.split_conditions[i] as f32));
                continue;
            }
            // Children always follow their parent; this also rules out cycles.
            let child = |c: i64| -> Result<usize, ModelLoadError> {
                usize::try_from(c)
                    .ok()
                    .filter(|c| *c > i && *c < n)
                    .ok_or_else(|| fail(format!("node {i} points at invalid child {c}")))
            };
            let feature = usize::try_from(raw.split_indices[i])
                .ok()
                .filter(|f| *f < FEATURE_COUNT)
                .ok_or_else(|| {
                    fail(format!("node {i} splits on feature {}", raw.split_indices[i]))
                })?;
            nodes.push(Node::Split {
                feature,
                threshold: raw.split_conditions[i] as f32,
                left: child(l)?,
                right: child(r)?,
                default_left: raw.default_left[i].is_set(),
            });
        }
        Ok(Self { nodes })
    }

    /// Features are compared at `f32` precision, as XGBoost does.
    fn leaf_value(&self, x: &[f64]) -> f32 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf(v) => return *v,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let v = x[*feature];
                    let go_left = if v.is_finite() {
                        (v as f32) < *threshold
                    } else {
                        *default_left
                    };
                    idx = if go_left { *left } else { *right };
                }
            }
        }
    }
}

/// Immutable, validated ensemble. Cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    base_score: f32,
    trees: Vec<Tree>,
}

impl TreeEnsemble {
    pub fn from_json(text: &str) -> Result<Self, ModelLoadError> {
        let file: ModelFile = serde_json::from_str(text)?;
        let learner = file.learner;

        if let Some(obj) = &learner.objective {
            if !IDENTITY_OBJECTIVES.contains(&obj.name.as_str()) {
                return Err(ModelLoadError::Objective(obj.name.clone()));
            }
        }

        let num_feature = learner.learner_model_param.num_feature;
        if num_feature.trim().parse::<usize>().ok() != Some(FEATURE_COUNT) {
            return Err(ModelLoadError::FeatureCount {
                expected: FEATURE_COUNT,
                found: num_feature,
            });
        }

        let base_score = parse_base_score(&learner.learner_model_param.base_score)?;

        let raw_trees = learner.gradient_booster.model.trees;
        if raw_trees.is_empty() {
            return Err(ModelLoadError::Empty);
        }
        let trees = raw_trees
            .into_iter()
            .enumerate()
            .map(|(i, t)| Tree::from_raw(i, t))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { base_score, trees })
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// `x` must hold exactly [`FEATURE_COUNT`] values in training order.
    /// Leaves are summed in `f32`, matching the booster's own output.
    pub fn predict(&self, x: &[f64]) -> f64 {
        debug_assert_eq!(x.len(), FEATURE_COUNT);
        let margin = self
            .trees
            .iter()
            .fold(self.base_score, |acc, t| acc + t.leaf_value(x));
        f64::from(margin)
    }
}

/// XGBoost 2.x writes `"5E-1"`, 3.x writes `"[5E-1]"`.
fn parse_base_score(raw: &str) -> Result<f32, ModelLoadError> {
    raw.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ModelLoadError::BaseScore(raw.to_string()))
}
