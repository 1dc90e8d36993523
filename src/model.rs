//! Scoring models
//!
//! The engine does not train anything. It evaluates a pre-built model shipped in
//! the bundle through the narrow [`ScoringFunction`] interface: a pure,
//! deterministic map from a feature vector to a raw stress score, optionally
//! declaring how many features it expects. Bundled models always declare it.

use crate::error::BundleLoadError;
use crate::types::FeatureVector;
use serde::{Deserialize, Serialize};

/// Capability the engine needs from a scoring model
pub trait ScoringFunction {
    /// Raw (unclamped) score for a feature vector
    fn predict(&self, features: &FeatureVector) -> f64;

    /// Number of features the model was trained on, if it declares one
    fn expected_input_count(&self) -> Option<usize> {
        None
    }
}

/// Serializable model shipped inside a bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoringModel {
    Linear(LinearModel),
    TreeEnsemble(TreeEnsemble),
}

impl ScoringModel {
    pub fn kind(&self) -> &'static str {
        match self {
            ScoringModel::Linear(_) => "linear",
            ScoringModel::TreeEnsemble(_) => "tree_ensemble",
        }
    }

    /// Number of features the model consumes
    pub fn n_features(&self) -> usize {
        match self {
            ScoringModel::Linear(model) => model.n_features(),
            ScoringModel::TreeEnsemble(model) => model.n_features_in,
        }
    }

    /// Structural checks run once at bundle load
    pub fn validate(&self) -> Result<(), BundleLoadError> {
        match self {
            ScoringModel::Linear(model) => model.validate(),
            ScoringModel::TreeEnsemble(model) => model.validate(),
        }
    }
}

impl ScoringFunction for ScoringModel {
    fn predict(&self, features: &FeatureVector) -> f64 {
        match self {
            ScoringModel::Linear(model) => model.predict(features),
            ScoringModel::TreeEnsemble(model) => model.predict(features),
        }
    }

    fn expected_input_count(&self) -> Option<usize> {
        Some(self.n_features())
    }
}

/// `intercept + sum(coefficient_i * feature_i)`
///
/// `n_features_in` is optional in the bundle; the coefficient count is the
/// arity either way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_features_in: Option<usize>,
}

impl LinearModel {
    pub fn n_features(&self) -> usize {
        self.n_features_in.unwrap_or(self.coefficients.len())
    }

    fn validate(&self) -> Result<(), BundleLoadError> {
        if self.coefficients.is_empty() {
            return Err(BundleLoadError::InvalidModel(
                "linear model has no coefficients".to_string(),
            ));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(BundleLoadError::InvalidModel(
                "linear model has non-finite parameters".to_string(),
            ));
        }
        if let Some(n) = self.n_features_in {
            if n != self.coefficients.len() {
                return Err(BundleLoadError::InvalidModel(format!(
                    "linear model declares {} features but has {} coefficients",
                    n,
                    self.coefficients.len()
                )));
            }
        }
        Ok(())
    }
}

impl ScoringFunction for LinearModel {
    fn predict(&self, features: &FeatureVector) -> f64 {
        self.coefficients
            .iter()
            .zip(features.as_slice())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept
    }

    fn expected_input_count(&self) -> Option<usize> {
        Some(self.n_features())
    }
}

/// One node of a regression tree stored as a flat array.
///
/// Children always have a higher index than their parent, so evaluation
/// terminates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    /// Go to `left` when `features[feature] <= threshold`, else `right`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf { value: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    fn predict(&self, features: &FeatureVector) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    // Validated splits stay below n_features_in
                    let value = features.get(*feature).unwrap_or(0.0);
                    index = if value <= *threshold { *left } else { *right };
                }
                Some(TreeNode::Leaf { value }) => return *value,
                // Unreachable for validated trees
                None => return 0.0,
            }
        }
    }

    fn validate(&self, tree_index: usize, n_features: usize) -> Result<(), BundleLoadError> {
        if self.nodes.is_empty() {
            return Err(BundleLoadError::InvalidModel(format!(
                "tree {tree_index} has no nodes"
            )));
        }

        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    for child in [left, right] {
                        if *child <= index || *child >= self.nodes.len() {
                            return Err(BundleLoadError::InvalidModel(format!(
                                "tree {tree_index} node {index} has invalid child {child}"
                            )));
                        }
                    }
                    if !threshold.is_finite() {
                        return Err(BundleLoadError::InvalidModel(format!(
                            "tree {tree_index} node {index} has non-finite threshold"
                        )));
                    }
                    if *feature >= n_features {
                        return Err(BundleLoadError::InvalidModel(format!(
                            "tree {tree_index} node {index} splits on feature {feature}, model has {n_features}"
                        )));
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(BundleLoadError::InvalidModel(format!(
                            "tree {tree_index} node {index} has non-finite leaf value"
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

/// Averaged ensemble of regression trees (random-forest style).
///
/// Unlike the linear model, a tree cannot reveal its arity, so
/// `n_features_in` is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub trees: Vec<RegressionTree>,
    pub n_features_in: usize,
}

impl TreeEnsemble {
    fn validate(&self) -> Result<(), BundleLoadError> {
        if self.trees.is_empty() {
            return Err(BundleLoadError::InvalidModel(
                "tree ensemble has no trees".to_string(),
            ));
        }
        for (index, tree) in self.trees.iter().enumerate() {
            tree.validate(index, self.n_features_in)?;
        }
        Ok(())
    }
}

impl ScoringFunction for TreeEnsemble {
    fn predict(&self, features: &FeatureVector) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let total: f64 = self.trees.iter().map(|tree| tree.predict(features)).sum();
        total / self.trees.len() as f64
    }

    fn expected_input_count(&self) -> Option<usize> {
        Some(self.n_features_in)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: usize, threshold: f64, low: f64, high: f64) -> RegressionTree {
        RegressionTree {
            nodes: vec![
                TreeNode::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { value: low },
                TreeNode::Leaf { value: high },
            ],
        }
    }

    #[test]
    fn test_linear_predict() {
        let model = LinearModel {
            intercept: 10.0,
            coefficients: vec![2.0, -1.0, 0.5],
            n_features_in: Some(3),
        };
        let features = FeatureVector::new(vec![3.0, 4.0, 8.0]);
        // 10 + 6 - 4 + 4 = 16
        assert!((model.predict(&features) - 16.0).abs() < 1e-12);
        assert_eq!(model.expected_input_count(), Some(3));
    }

    #[test]
    fn test_tree_ensemble_averages_trees() {
        let model = TreeEnsemble {
            trees: vec![stump(0, 5.5, 80.0, 20.0), stump(1, 2.0, 30.0, 60.0)],
            n_features_in: 2,
        };
        let features = FeatureVector::new(vec![4.0, 3.0]);
        // (80 + 60) / 2
        assert!((model.predict(&features) - 70.0).abs() < 1e-12);
        assert_eq!(model.expected_input_count(), Some(2));
    }

    #[test]
    fn test_split_threshold_goes_left_on_equal() {
        let model = TreeEnsemble {
            trees: vec![stump(0, 5.0, 1.0, 2.0)],
            n_features_in: 1,
        };
        assert_eq!(model.predict(&FeatureVector::new(vec![5.0])), 1.0);
        assert_eq!(model.predict(&FeatureVector::new(vec![5.1])), 2.0);
    }

    #[test]
    fn test_validate_rejects_backward_child() {
        let model = ScoringModel::TreeEnsemble(TreeEnsemble {
            trees: vec![RegressionTree {
                nodes: vec![
                    TreeNode::Leaf { value: 1.0 },
                    TreeNode::Split {
                        feature: 0,
                        threshold: 1.0,
                        left: 0,
                        right: 0,
                    },
                ],
            }],
            n_features_in: 1,
        });
        assert!(matches!(
            model.validate(),
            Err(BundleLoadError::InvalidModel(_))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_ensemble() {
        let model = ScoringModel::TreeEnsemble(TreeEnsemble {
            trees: vec![],
            n_features_in: 13,
        });
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_coefficient_count_mismatch() {
        let model = ScoringModel::Linear(LinearModel {
            intercept: 0.0,
            coefficients: vec![1.0; 12],
            n_features_in: Some(13),
        });
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_linear_arity_defaults_to_coefficient_count() {
        let model = ScoringModel::Linear(LinearModel {
            intercept: 0.0,
            coefficients: vec![1.0; 12],
            n_features_in: None,
        });
        assert!(model.validate().is_ok());
        assert_eq!(model.n_features(), 12);
        assert_eq!(model.expected_input_count(), Some(12));
    }

    #[test]
    fn test_validate_rejects_empty_linear_model() {
        let model = ScoringModel::Linear(LinearModel {
            intercept: 1.0,
            coefficients: vec![],
            n_features_in: None,
        });
        assert!(matches!(
            model.validate(),
            Err(BundleLoadError::InvalidModel(_))
        ));
    }

    #[test]
    fn test_validate_rejects_split_past_declared_features() {
        let model = ScoringModel::TreeEnsemble(TreeEnsemble {
            trees: vec![stump(13, 1.0, 0.0, 1.0)],
            n_features_in: 13,
        });
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_tree_ensemble_requires_feature_count() {
        let json = r#"{
            "kind": "tree_ensemble",
            "trees": [{ "nodes": [{ "leaf": { "value": 10.0 } }] }]
        }"#;
        assert!(serde_json::from_str::<ScoringModel>(json).is_err());
    }

    #[test]
    fn test_model_json_shape() {
        let json = r#"{
            "kind": "tree_ensemble",
            "n_features_in": 2,
            "trees": [{ "nodes": [
                { "split": { "feature": 1, "threshold": 0.5, "left": 1, "right": 2 } },
                { "leaf": { "value": 10.0 } },
                { "leaf": { "value": 90.0 } }
            ]}]
        }"#;
        let model: ScoringModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.kind(), "tree_ensemble");
        assert!(model.validate().is_ok());
        assert_eq!(model.predict(&FeatureVector::new(vec![0.0, 1.0])), 90.0);
    }
}
