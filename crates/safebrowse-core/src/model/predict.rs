//! Additive tree scoring and the logistic link.

use serde::Serialize;

use super::tree::{DecisionTree, Node, NodeId, TreeEnsemble};
use crate::scaler::ScaledVector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// Integrity fault hit while routing through one tree. The tree contributes
/// nothing to the margin for that request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum TreeFault {
    #[error("tree {tree}: split node {node} has no {side:?} child")]
    MissingChild { tree: usize, node: NodeId, side: Side },
    #[error("tree {tree}: split node {node} reads feature {feature}, which does not exist")]
    FeatureOutOfRange { tree: usize, node: NodeId, feature: usize },
    #[error("tree {tree}: node {node} does not exist")]
    DanglingNode { tree: usize, node: NodeId },
}

/// Ensemble output for one scaled vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Sum of reached leaf values (log-odds).
    pub margin: f64,
    /// `sigmoid(margin)`.
    pub probability: f64,
    pub faults: Vec<TreeFault>,
}

impl Prediction {
    pub fn is_degraded(&self) -> bool {
        !self.faults.is_empty()
    }
}

pub fn sigmoid(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}

impl DecisionTree {
    /// Leaf value reached by `scaled`. `tree` is only used to label faults.
    pub fn leaf_value(&self, tree: usize, scaled: &[f64]) -> Result<f64, TreeFault> {
        let mut id: NodeId = 0;
        loop {
            match self.node(id) {
                None => return Err(TreeFault::DanglingNode { tree, node: id }),
                Some(Node::Leaf { value }) => return Ok(*value),
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = scaled.get(*feature).copied().ok_or(TreeFault::FeatureOutOfRange {
                        tree,
                        node: id,
                        feature: *feature,
                    })?;
                    let (side, next) = if x <= *threshold {
                        (Side::Left, *left)
                    } else {
                        (Side::Right, *right)
                    };
                    id = next.ok_or(TreeFault::MissingChild { tree, node: id, side })?;
                }
            }
        }
    }
}

impl TreeEnsemble {
    /// Sum every tree's leaf value into the margin and apply the sigmoid.
    pub fn predict(&self, scaled: &ScaledVector) -> Prediction {
        let mut margin = 0.0f64;
        let mut faults = Vec::new();
        for (index, tree) in self.trees().iter().enumerate() {
            match tree.leaf_value(index, scaled.as_slice()) {
                Ok(value) => margin += value,
                Err(fault) => {
                    tracing::warn!(%fault, "corrupt tree skipped");
                    faults.push(fault);
                }
            }
        }
        Prediction {
            margin,
            probability: sigmoid(margin),
            faults,
        }
    }
}

/// Convenience wrapper returning only the probability.
pub fn predict(ensemble: &TreeEnsemble, scaled: &ScaledVector) -> f64 {
    ensemble.predict(scaled).probability
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FEATURE_COUNT;

    fn vector(pairs: &[(usize, f64)]) -> ScaledVector {
        let mut v = [0.0; FEATURE_COUNT];
        for &(i, x) in pairs {
            v[i] = x;
        }
        ScaledVector::from_array(v)
    }

    #[test]
    fn equal_to_threshold_goes_left() {
        let tree = DecisionTree::stump(0, 1.5, -1.0, 1.0);
        assert_eq!(tree.leaf_value(0, vector(&[(0, 1.5)]).as_slice()), Ok(-1.0));
        assert_eq!(tree.leaf_value(0, vector(&[(0, 1.5000001)]).as_slice()), Ok(1.0));
    }

    #[test]
    fn margin_is_sum_of_leaves() {
        let ensemble = TreeEnsemble::new(vec![
            DecisionTree::stump(5, 1.5, -0.2, 0.8),
            DecisionTree::stump(14, 2.5, -0.4, 1.3),
            DecisionTree::leaf(0.05),
        ]);
        let p = ensemble.predict(&vector(&[(5, 2.0), (14, 3.0)]));
        assert!((p.margin - 2.15).abs() < 1e-12);
        assert_eq!(p.probability, sigmoid(p.margin));
        assert!(!p.is_degraded());
    }

    #[test]
    fn empty_ensemble_is_even_odds() {
        let p = TreeEnsemble::default().predict(&vector(&[]));
        assert_eq!(p.margin, 0.0);
        assert_eq!(p.probability, 0.5);
    }

    #[test]
    fn missing_child_contributes_zero_and_is_reported() {
        let broken = DecisionTree::from_nodes(vec![
            Node::Split {
                feature: 0,
                threshold: 0.0,
                left: Some(1),
                right: None,
            },
            Node::Leaf { value: 5.0 },
        ])
        .unwrap();
        let ensemble = TreeEnsemble::new(vec![DecisionTree::leaf(0.7), broken]);

        let routed_left = ensemble.predict(&vector(&[(0, -1.0)]));
        assert!((routed_left.margin - 5.7).abs() < 1e-12);
        assert!(routed_left.faults.is_empty());

        let routed_right = ensemble.predict(&vector(&[(0, 1.0)]));
        assert!((routed_right.margin - 0.7).abs() < 1e-12);
        assert_eq!(
            routed_right.faults,
            vec![TreeFault::MissingChild {
                tree: 1,
                node: 0,
                side: Side::Right
            }]
        );
    }

    #[test]
    fn out_of_range_feature_is_a_fault() {
        let ensemble = TreeEnsemble::new(vec![DecisionTree::stump(FEATURE_COUNT, 0.0, 1.0, 1.0)]);
        let p = ensemble.predict(&vector(&[]));
        assert_eq!(p.margin, 0.0);
        assert!(matches!(p.faults[0], TreeFault::FeatureOutOfRange { feature, .. } if feature == FEATURE_COUNT));
    }

    #[test]
    fn probability_stays_inside_unit_interval() {
        for margin in [-30.0, -5.0, -0.1, 0.0, 0.1, 5.0, 30.0] {
            let p = sigmoid(margin);
            assert!(p > 0.0 && p < 1.0, "margin {margin} gave {p}");
        }
    }

    #[test]
    fn sigmoid_reference_value() {
        assert!((sigmoid(2.1) - 0.890903).abs() < 1e-6);
    }
}
