//! Classifier capability
//!
//! Any fitted binary classifier over the nine-feature layout. Probabilities
//! are keyed by label value, never by position, so a retrained artifact
//! with a different class order can't silently swap the confidence.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("expected {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("class value {0} is not a potability label")]
    UnknownClass(i64),

    #[error("invalid probability distribution: {0}")]
    InvalidDistribution(String),

    #[error("invalid artifact: {0}")]
    InvalidArtifact(String),

    #[error("inference runtime error: {0}")]
    Runtime(String),
}

/// Ensure a vector has the layout's dimensionality
pub fn check_shape(features: &[f64], expected: usize) -> Result<(), InferenceError> {
    if features.len() != expected {
        return Err(InferenceError::ShapeMismatch {
            expected,
            actual: features.len(),
        });
    }
    Ok(())
}

// ============================================================================
// LABEL
// ============================================================================

/// Binary potability label. Class value 0 = not potable, 1 = potable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    NotPotable,
    Potable,
}

impl Label {
    pub fn from_class(class: i64) -> Result<Self, InferenceError> {
        match class {
            0 => Ok(Label::NotPotable),
            1 => Ok(Label::Potable),
            other => Err(InferenceError::UnknownClass(other)),
        }
    }

    pub const fn class_value(self) -> i64 {
        match self {
            Label::NotPotable => 0,
            Label::Potable => 1,
        }
    }

    pub const fn is_potable(self) -> bool {
        matches!(self, Label::Potable)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::NotPotable => f.write_str("not potable"),
            Label::Potable => f.write_str("potable"),
        }
    }
}

/// Map an artifact's `classes` list (column order of its probability
/// output) to labels. Exactly the two potability classes, each once.
pub fn labels_for_classes(classes: &[i64]) -> Result<Vec<Label>, InferenceError> {
    if classes.len() != 2 {
        return Err(InferenceError::InvalidArtifact(format!(
            "expected 2 classes, artifact declares {:?}",
            classes
        )));
    }
    let labels = classes
        .iter()
        .map(|c| Label::from_class(*c))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| InferenceError::InvalidArtifact(e.to_string()))?;
    if labels[0] == labels[1] {
        return Err(InferenceError::InvalidArtifact(format!(
            "duplicate class in {:?}",
            classes
        )));
    }
    Ok(labels)
}

// ============================================================================
// CLASS PROBABILITIES
// ============================================================================

/// Tolerance when checking that a distribution sums to one
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Probability mass per label
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    pub not_potable: f64,
    pub potable: f64,
}

impl ClassProbabilities {
    /// Build from (class value, probability) pairs.
    ///
    /// Both labels must appear exactly once, every value must be finite
    /// and non-negative, and the total must be one.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, InferenceError>
    where
        I: IntoIterator<Item = (i64, f64)>,
    {
        let mut not_potable = None;
        let mut potable = None;

        for (class, p) in pairs {
            if !p.is_finite() || p < 0.0 {
                return Err(InferenceError::InvalidDistribution(format!(
                    "probability {} for class {}",
                    p, class
                )));
            }
            let slot = match Label::from_class(class)? {
                Label::NotPotable => &mut not_potable,
                Label::Potable => &mut potable,
            };
            if slot.replace(p).is_some() {
                return Err(InferenceError::InvalidDistribution(format!(
                    "class {} listed twice",
                    class
                )));
            }
        }

        let (Some(not_potable), Some(potable)) = (not_potable, potable) else {
            return Err(InferenceError::InvalidDistribution(
                "both classes must be present".to_string(),
            ));
        };

        let total = not_potable + potable;
        if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(InferenceError::InvalidDistribution(format!(
                "probabilities sum to {}",
                total
            )));
        }

        Ok(Self { not_potable, potable })
    }

    pub fn get(&self, label: Label) -> f64 {
        match label {
            Label::NotPotable => self.not_potable,
            Label::Potable => self.potable,
        }
    }

    /// Label with the larger mass (not potable on ties)
    pub fn most_likely(&self) -> Label {
        if self.potable > self.not_potable {
            Label::Potable
        } else {
            Label::NotPotable
        }
    }
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Fitted binary classifier (random forest, ONNX graph, test double, ...)
pub trait Classifier: Send + Sync {
    /// Predicted label for one normalized vector
    fn predict(&self, features: &[f64]) -> Result<Label, InferenceError>;

    /// Distribution over both labels for one normalized vector
    fn predict_proba(&self, features: &[f64]) -> Result<ClassProbabilities, InferenceError>;

    /// Short model description for status output
    fn kind(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_classes() {
        assert_eq!(Label::from_class(0).unwrap(), Label::NotPotable);
        assert_eq!(Label::from_class(1).unwrap(), Label::Potable);
        assert_eq!(Label::from_class(2), Err(InferenceError::UnknownClass(2)));
        assert_eq!(Label::Potable.class_value(), 1);
    }

    #[test]
    fn test_probabilities_keyed_by_class_not_position() {
        // class 1 listed first
        let p = ClassProbabilities::from_pairs([(1, 0.8), (0, 0.2)]).unwrap();
        assert_eq!(p.get(Label::Potable), 0.8);
        assert_eq!(p.get(Label::NotPotable), 0.2);
        assert_eq!(p.most_likely(), Label::Potable);
    }

    #[test]
    fn test_probabilities_rejects_bad_sum() {
        assert!(matches!(
            ClassProbabilities::from_pairs([(0, 0.5), (1, 0.6)]),
            Err(InferenceError::InvalidDistribution(_))
        ));
    }

    #[test]
    fn test_probabilities_rejects_missing_or_duplicate_class() {
        assert!(ClassProbabilities::from_pairs([(0, 1.0)]).is_err());
        assert!(ClassProbabilities::from_pairs([(0, 0.5), (0, 0.5)]).is_err());
        assert!(ClassProbabilities::from_pairs([(0, -0.1), (1, 1.1)]).is_err());
    }

    #[test]
    fn test_check_shape() {
        assert!(check_shape(&[0.0; 9], 9).is_ok());
        assert_eq!(
            check_shape(&[0.0; 8], 9),
            Err(InferenceError::ShapeMismatch { expected: 9, actual: 8 })
        );
    }
}
