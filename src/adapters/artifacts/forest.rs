//! Random-forest classifier stored as flat per-tree arrays.
//!
//! Each tree uses the parallel-array layout of the training library:
//! node `i` is a leaf when `children_left[i] == -1`, otherwise samples with
//! `x[feature[i]] <= threshold[i]` go to `children_left[i]` and the rest to
//! `children_right[i]`. `value[i]` holds the class distribution at the node.

use serde::{Deserialize, Serialize};

use super::ArtifactError;
use crate::domain::PredictionError;
use crate::ports::Classifier;

/// Child index marking a leaf.
const LEAF: i64 = -1;

/// One fitted decision tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

impl FlatTree {
    fn node_count(&self) -> usize {
        self.children_left.len()
    }

    /// Check the arrays describe a well-formed tree.
    ///
    /// Children must come after their parent, which rules out cycles and
    /// guarantees traversal terminates.
    fn validate(&self, index: usize, n_features: usize, n_classes: usize) -> Result<(), String> {
        let n = self.node_count();
        if n == 0 {
            return Err(format!("tree {index} has no nodes"));
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err(format!("tree {index} has arrays of unequal length"));
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if self.value[node].len() != n_classes {
                return Err(format!(
                    "tree {index} node {node} has {} class weights, expected {n_classes}",
                    self.value[node].len()
                ));
            }
            if left == LEAF {
                if right != LEAF {
                    return Err(format!("tree {index} node {node} has only one child"));
                }
                continue;
            }
            let in_range = |child: i64| child > node as i64 && (child as usize) < n;
            if !in_range(left) || !in_range(right) {
                return Err(format!("tree {index} node {node} has out-of-range children"));
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(format!(
                    "tree {index} node {node} splits on feature {feature}, model has {n_features}"
                ));
            }
            if !self.threshold[node].is_finite() {
                return Err(format!("tree {index} node {node} has a non-finite threshold"));
            }
        }
        Ok(())
    }

    /// Index of the leaf reached by `x`.
    fn leaf_for(&self, x: &[f64]) -> usize {
        let mut node = 0usize;
        loop {
            let left = self.children_left[node];
            if left == LEAF {
                return node;
            }
            node = if x[self.feature[node] as usize] <= self.threshold[node] {
                left as usize
            } else {
                self.children_right[node] as usize
            };
        }
    }
}

/// On-disk form of `model.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestFile {
    pub format_version: u32,
    pub n_features: usize,
    /// Class code for each distribution slot
    pub classes: Vec<u32>,
    pub trees: Vec<FlatTree>,
}

/// Ensemble of decision trees voting by averaged class distributions.
///
/// Only built through [`RandomForest::from_file`], so every tree has passed
/// the structural checks that traversal relies on.
#[derive(Debug, Clone)]
pub struct RandomForest {
    n_features: usize,
    classes: Vec<u32>,
    trees: Vec<FlatTree>,
}

impl RandomForest {
    /// Structural checks run once after deserialization.
    ///
    /// # Errors
    /// Returns `ArtifactError::Incompatible` describing the first defect.
    pub fn from_file(file: RandomForestFile) -> Result<Self, ArtifactError> {
        if file.n_features == 0 {
            return Err(ArtifactError::Incompatible("model has zero features".into()));
        }
        if file.classes.is_empty() {
            return Err(ArtifactError::Incompatible("model has no classes".into()));
        }
        if file.trees.is_empty() {
            return Err(ArtifactError::Incompatible("model has no trees".into()));
        }
        for (i, tree) in file.trees.iter().enumerate() {
            tree.validate(i, file.n_features, file.classes.len())
                .map_err(ArtifactError::Incompatible)?;
        }
        Ok(Self {
            n_features: file.n_features,
            classes: file.classes,
            trees: file.trees,
        })
    }

    #[must_use]
    pub fn classes(&self) -> &[u32] {
        &self.classes
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Mean normalized class distribution across trees.
    ///
    /// # Errors
    /// Returns `PredictionError::ShapeMismatch` on a wrong-width sample.
    pub fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, PredictionError> {
        if features.len() != self.n_features {
            return Err(PredictionError::ShapeMismatch {
                expected: self.n_features,
                got: features.len(),
            });
        }

        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            let dist = &tree.value[tree.leaf_for(features)];
            let total: f64 = dist.iter().sum();
            if total > 0.0 {
                for (p, w) in proba.iter_mut().zip(dist) {
                    *p += w / total;
                }
            }
        }
        let n_trees = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        Ok(proba)
    }
}

impl Classifier for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &[f64]) -> Result<u32, PredictionError> {
        let proba = self.predict_proba(features)?;

        // First maximum wins on ties.
        let mut best = 0;
        for (i, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = i;
            }
        }
        Ok(self.classes[best])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Single split on feature 0 at 0.0: left votes class 10, right class 20.
    fn stump(left: [f64; 2], right: [f64; 2]) -> FlatTree {
        FlatTree {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![0, -2, -2],
            threshold: vec![0.0, -2.0, -2.0],
            value: vec![vec![1.0, 1.0], left.to_vec(), right.to_vec()],
        }
    }

    fn file(trees: Vec<FlatTree>) -> RandomForestFile {
        RandomForestFile {
            format_version: 1,
            n_features: 2,
            classes: vec![10, 20],
            trees,
        }
    }

    fn forest(trees: Vec<FlatTree>) -> RandomForest {
        RandomForest::from_file(file(trees)).expect("valid forest")
    }

    #[test]
    fn test_split_direction() {
        let model = forest(vec![stump([5.0, 0.0], [0.0, 5.0])]);

        // Equal to the threshold goes left.
        assert_eq!(model.predict(&[0.0, 9.0]), Ok(10));
        assert_eq!(model.predict(&[-1.0, 9.0]), Ok(10));
        assert_eq!(model.predict(&[0.1, 9.0]), Ok(20));
    }

    #[test]
    fn test_distributions_are_normalized_before_averaging() {
        let model = forest(vec![
            stump([0.0, 1000.0], [0.0, 1.0]),
            stump([3.0, 2.0], [0.0, 1.0]),
            stump([3.0, 2.0], [0.0, 1.0]),
        ]);
        let proba = model.predict_proba(&[-1.0, 0.0]).expect("proba");
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!((proba[0] - 0.4).abs() < 1e-9);
        assert_eq!(model.predict(&[-1.0, 0.0]), Ok(20));

        // Raw counts would favour class 20 (1000 vs 8); each tree gets one vote.
        let model = forest(vec![
            stump([0.0, 1000.0], [0.0, 1.0]),
            stump([4.0, 0.0], [0.0, 1.0]),
            stump([4.0, 0.0], [0.0, 1.0]),
        ]);
        assert_eq!(model.predict(&[-1.0, 0.0]), Ok(10));
    }

    #[test]
    fn test_tie_resolves_to_first_class() {
        let model = forest(vec![stump([1.0, 1.0], [1.0, 1.0])]);
        assert_eq!(model.predict(&[0.0, 0.0]), Ok(10));
    }

    #[test]
    fn test_shape_mismatch() {
        let model = forest(vec![stump([1.0, 0.0], [0.0, 1.0])]);
        assert_eq!(
            model.predict(&[0.0]),
            Err(PredictionError::ShapeMismatch {
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn test_validate_rejects_backward_child() {
        let mut tree = stump([1.0, 0.0], [0.0, 1.0]);
        tree.children_right[0] = 0;
        let err = RandomForest::from_file(file(vec![tree])).expect_err("cycle");
        assert!(err.to_string().contains("out-of-range children"));
    }

    #[test]
    fn test_validate_rejects_unknown_feature() {
        let mut tree = stump([1.0, 0.0], [0.0, 1.0]);
        tree.feature[0] = 5;
        assert!(RandomForest::from_file(file(vec![tree])).is_err());
    }

    #[test]
    fn test_validate_rejects_wrong_class_width() {
        let mut tree = stump([1.0, 0.0], [0.0, 1.0]);
        tree.value[1] = vec![1.0, 0.0, 0.0];
        assert!(RandomForest::from_file(file(vec![tree])).is_err());
    }

    #[test]
    fn test_truncated_tree_never_reaches_prediction() {
        let mut tree = stump([1.0, 0.0], [0.0, 1.0]);
        tree.children_left.truncate(1);
        tree.children_right.truncate(1);
        let err = RandomForest::from_file(file(vec![tree])).expect_err("truncated");
        assert!(matches!(err, ArtifactError::Incompatible(_)));

        let err = RandomForest::from_file(file(Vec::new())).expect_err("empty");
        assert!(err.to_string().contains("no trees"));
    }
}
