//! Arena-backed decision trees.

use serde::Serialize;

/// Index of a node inside its tree's arena.
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// Route left when `scaled[feature] <= threshold`, right otherwise.
    /// A `None` child marks a structurally corrupt split.
    Split {
        feature: usize,
        threshold: f64,
        left: Option<NodeId>,
        right: Option<NodeId>,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TreeError {
    #[error("tree has no nodes")]
    Empty,
    #[error("node {node} points at child {child}, which is outside the tree or not after its parent")]
    BadChild { node: NodeId, child: NodeId },
}

/// One tree of the ensemble. The root is node 0 and every child index is
/// greater than its parent's, so traversal always terminates.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    pub fn from_nodes(nodes: Vec<Node>) -> Result<Self, TreeError> {
        if nodes.is_empty() {
            return Err(TreeError::Empty);
        }
        for (id, node) in nodes.iter().enumerate() {
            if let Node::Split { left, right, .. } = node {
                for child in [left, right].into_iter().flatten() {
                    if *child <= id || *child >= nodes.len() {
                        return Err(TreeError::BadChild { node: id, child: *child });
                    }
                }
            }
        }
        Ok(Self { nodes })
    }

    /// A tree made of a single leaf.
    pub fn leaf(value: f64) -> Self {
        Self {
            nodes: vec![Node::Leaf { value }],
        }
    }

    /// A depth-one tree: one split with two leaves.
    pub fn stump(feature: usize, threshold: f64, left: f64, right: f64) -> Self {
        Self {
            nodes: vec![
                Node::Split {
                    feature,
                    threshold,
                    left: Some(1),
                    right: Some(2),
                },
                Node::Leaf { value: left },
                Node::Leaf { value: right },
            ],
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Splits missing one or both children.
    pub fn incomplete_splits(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Split { left, right, .. } if left.is_none() || right.is_none()))
            .count()
    }

    /// Largest feature index referenced by any split.
    pub fn max_feature(&self) -> Option<usize> {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                Node::Split { feature, .. } => Some(*feature),
                Node::Leaf { .. } => None,
            })
            .max()
    }

    /// Number of edges on the longest root-to-node path.
    pub fn depth(&self) -> usize {
        let mut depth = vec![0usize; self.nodes.len()];
        let mut max = 0;
        for (id, node) in self.nodes.iter().enumerate() {
            if let Node::Split { left, right, .. } = node {
                for child in [left, right].into_iter().flatten() {
                    depth[*child] = depth[id] + 1;
                    max = max.max(depth[*child]);
                }
            }
        }
        max
    }
}

/// Ordered collection of trees whose leaf values sum to the margin.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TreeEnsemble {
    trees: Vec<DecisionTree>,
}

impl TreeEnsemble {
    pub fn new(trees: Vec<DecisionTree>) -> Self {
        Self { trees }
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}
