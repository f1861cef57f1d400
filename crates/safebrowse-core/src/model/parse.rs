//! Serde view of the exported model artifact (LightGBM `dump_model()` plus
//! the standard scaler's mean and scale). Unknown fields are ignored.

use serde::Deserialize;

use super::tree::{DecisionTree, Node, NodeId, TreeError};

#[derive(Debug, Deserialize)]
pub struct ModelDocument {
    pub model: BoosterDump,
    pub scaler_mean: Vec<f64>,
    pub scaler_scale: Vec<f64>,
}

#[derive(Debug, Deserialize)]
pub struct BoosterDump {
    #[serde(default)]
    pub objective: Option<String>,
    #[serde(default)]
    pub max_feature_idx: Option<usize>,
    #[serde(default)]
    pub tree_info: Vec<TreeInfo>,
}

#[derive(Debug, Deserialize)]
pub struct TreeInfo {
    pub tree_structure: RawNode,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawNode {
    Leaf {
        leaf_value: f64,
    },
    Split {
        split_feature: usize,
        threshold: f64,
        #[serde(default)]
        decision_type: Option<String>,
        #[serde(default)]
        left_child: Option<Box<RawNode>>,
        #[serde(default)]
        right_child: Option<Box<RawNode>>,
    },
}

impl RawNode {
    /// First split whose `decision_type` is not numeric `<=`.
    pub fn unsupported_decision(&self) -> Option<&str> {
        match self {
            RawNode::Leaf { .. } => None,
            RawNode::Split {
                decision_type,
                left_child,
                right_child,
                ..
            } => match decision_type.as_deref() {
                Some(d) if d != "<=" => Some(d),
                _ => left_child
                    .as_deref()
                    .and_then(RawNode::unsupported_decision)
                    .or_else(|| right_child.as_deref().and_then(RawNode::unsupported_decision)),
            },
        }
    }

    /// Flatten into a pre-order arena rooted at index 0.
    pub fn into_tree(self) -> Result<DecisionTree, TreeError> {
        let mut nodes = Vec::new();
        push(self, &mut nodes);
        DecisionTree::from_nodes(nodes)
    }
}

fn push(raw: RawNode, nodes: &mut Vec<Node>) -> NodeId {
    let id = nodes.len();
    match raw {
        RawNode::Leaf { leaf_value } => nodes.push(Node::Leaf { value: leaf_value }),
        RawNode::Split {
            split_feature,
            threshold,
            left_child,
            right_child,
            ..
        } => {
            nodes.push(Node::Split {
                feature: split_feature,
                threshold,
                left: None,
                right: None,
            });
            let left_id = left_child.map(|c| push(*c, nodes));
            let right_id = right_child.map(|c| push(*c, nodes));
            if let Node::Split { left, right, .. } = &mut nodes[id] {
                *left = left_id;
                *right = right_id;
            }
        }
    }
    id
}
