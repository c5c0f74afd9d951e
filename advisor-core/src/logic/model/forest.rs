//! Tree ensemble inference (random forest / single decision tree).
//!
//! Trees are exported from sklearn as the parallel arrays of `tree_`
//! (`children_left`, `children_right`, `feature`, `threshold`, `value`).
//! This module handles inference only.
//!
//! # Prediction
//!
//! Each leaf holds a class distribution. `predict_proba` is the mean of
//! the normalized leaf distributions reached by every tree; `predict` is
//! the class with the highest mean probability (first one on ties). Same
//! rule sklearn's `RandomForestClassifier` uses, so the confidence shown
//! always belongs to the predicted label.

use serde::{Deserialize, Serialize};

use super::classifier::{
    check_shape, labels_for_classes, ClassProbabilities, Classifier, InferenceError, Label,
};
use crate::constants::ARTIFACT_FORMAT_VERSION;
use crate::logic::features::layout::{validate_feature_names, FEATURE_COUNT};

/// Marker sklearn uses for "no child"
pub const TREE_LEAF: i64 = -1;

// ============================================================================
// ARTIFACT FORMAT
// ============================================================================

/// sklearn `tree_` arrays of one fitted tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeArrays {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class counts or fractions, in `classes` order
    pub value: Vec<Vec<f64>>,
}

/// Serialized classifier as written by the export script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub feature_names: Vec<String>,
    /// Class value of each column in the leaf distributions
    pub classes: Vec<i64>,
    #[serde(flatten)]
    pub model: ModelParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelParams {
    RandomForest { trees: Vec<TreeArrays> },
    DecisionTree { tree: TreeArrays },
}

impl ModelArtifact {
    pub fn from_json(json: &str) -> Result<Self, InferenceError> {
        serde_json::from_str(json)
            .map_err(|e| InferenceError::InvalidArtifact(format!("model JSON: {}", e)))
    }

    /// Validate structure and build the classifier
    pub fn build(self) -> Result<TreeEnsemble, InferenceError> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(InferenceError::InvalidArtifact(format!(
                "unsupported model format version {}",
                self.format_version
            )));
        }
        validate_feature_names(&self.feature_names)
            .map_err(|e| InferenceError::InvalidArtifact(e.to_string()))?;

        let labels = labels_for_classes(&self.classes)?;

        let (kind, arrays) = match self.model {
            ModelParams::RandomForest { trees } => ("random_forest", trees),
            ModelParams::DecisionTree { tree } => ("decision_tree", vec![tree]),
        };
        if arrays.is_empty() {
            return Err(InferenceError::InvalidArtifact("empty forest".into()));
        }

        let trees = arrays
            .iter()
            .enumerate()
            .map(|(i, t)| {
                DecisionTree::from_arrays(t, labels.len())
                    .map_err(|e| InferenceError::InvalidArtifact(format!("tree {}: {}", i, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!("Built {} with {} tree(s)", kind, trees.len());

        Ok(TreeEnsemble { trees, labels, kind })
    }
}

// ============================================================================
// DECISION TREE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Normalized class distribution
    Leaf(Vec<f64>),
}

/// One validated tree. Children always point forward, so traversal
/// terminates and never indexes out of bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Build a tree from sklearn's parallel arrays.
    ///
    /// # Errors
    ///
    /// Returns `Err` if arrays have inconsistent lengths, a child index
    /// doesn't point forward, a split uses an unknown feature, or a leaf
    /// distribution is malformed.
    pub fn from_arrays(arrays: &TreeArrays, n_classes: usize) -> Result<Self, String> {
        let n = arrays.children_left.len();
        if n == 0 {
            return Err("tree has no nodes".into());
        }
        if arrays.children_right.len() != n
            || arrays.feature.len() != n
            || arrays.threshold.len() != n
            || arrays.value.len() != n
        {
            return Err("inconsistent array lengths".into());
        }

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let left = arrays.children_left[i];
            let right = arrays.children_right[i];

            if left == TREE_LEAF || right == TREE_LEAF {
                if left != right {
                    return Err(format!("node {} has a single child", i));
                }
                nodes.push(TreeNode::Leaf(normalize_leaf(&arrays.value[i], n_classes, i)?));
                continue;
            }

            let child = |c: i64| -> Result<usize, String> {
                usize::try_from(c)
                    .ok()
                    .filter(|&c| c > i && c < n)
                    .ok_or_else(|| format!("node {} has invalid child {}", i, c))
            };
            let feature = usize::try_from(arrays.feature[i])
                .ok()
                .filter(|&f| f < FEATURE_COUNT)
                .ok_or_else(|| format!("node {} splits on invalid feature {}", i, arrays.feature[i]))?;
            let threshold = arrays.threshold[i];
            if !threshold.is_finite() {
                return Err(format!("node {} has non-finite threshold", i));
            }

            nodes.push(TreeNode::Split {
                feature,
                threshold,
                left: child(left)?,
                right: child(right)?,
            });
        }

        Ok(Self { nodes })
    }

    /// Leaf distribution reached by one sample
    fn leaf(&self, features: &[f64]) -> &[f64] {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf(distribution) => return distribution,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    // trees are fitted on float32 inputs
                    let value = f64::from(features[*feature] as f32);
                    idx = if value <= *threshold { *left } else { *right };
                }
            }
        }
    }

    /// Longest root-to-leaf path
    pub fn depth(&self) -> usize {
        self.node_depth(0)
    }

    fn node_depth(&self, idx: usize) -> usize {
        match &self.nodes[idx] {
            TreeNode::Leaf(_) => 0,
            TreeNode::Split { left, right, .. } => {
                1 + self.node_depth(*left).max(self.node_depth(*right))
            }
        }
    }
}

fn normalize_leaf(value: &[f64], n_classes: usize, node: usize) -> Result<Vec<f64>, String> {
    if value.len() != n_classes {
        return Err(format!(
            "leaf {} has {} class values, expected {}",
            node,
            value.len(),
            n_classes
        ));
    }
    if value.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(format!("leaf {} has negative or non-finite values", node));
    }
    let total: f64 = value.iter().sum();
    if total <= 0.0 {
        return Err(format!("leaf {} is empty", node));
    }
    Ok(value.iter().map(|v| v / total).collect())
}

// ============================================================================
// ENSEMBLE
// ============================================================================

/// Averaging tree ensemble over the two potability labels
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    trees: Vec<DecisionTree>,
    /// Label of each distribution column
    labels: Vec<Label>,
    kind: &'static str,
}

impl TreeEnsemble {
    /// Mean leaf distribution, in `labels` order
    fn mean_distribution(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_shape(features, FEATURE_COUNT)?;

        let mut sum = vec![0.0; self.labels.len()];
        for tree in &self.trees {
            for (acc, p) in sum.iter_mut().zip(tree.leaf(features)) {
                *acc += p;
            }
        }
        let n = self.trees.len() as f64;
        Ok(sum.into_iter().map(|s| s / n).collect())
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(DecisionTree::depth).max().unwrap_or(0)
    }
}

/// Index of the first maximum
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

impl Classifier for TreeEnsemble {
    fn predict(&self, features: &[f64]) -> Result<Label, InferenceError> {
        let distribution = self.mean_distribution(features)?;
        Ok(self.labels[argmax(&distribution)])
    }

    fn predict_proba(&self, features: &[f64]) -> Result<ClassProbabilities, InferenceError> {
        let distribution = self.mean_distribution(features)?;
        ClassProbabilities::from_pairs(
            self.labels
                .iter()
                .map(|l| l.class_value())
                .zip(distribution),
        )
    }

    fn kind(&self) -> &'static str {
        self.kind
    }
}
