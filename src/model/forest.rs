use serde::{Deserialize, Serialize};

use super::{FeatureRow, ModelError};

/// Child index marking a leaf.
pub const LEAF: i64 = -1;

/// One regression tree stored as parallel node arrays.
///
/// Node `i` is a leaf when `children_left[i] == LEAF`; otherwise a sample goes
/// left when `x[feature[i]] <= threshold[i]`. Leaves predict `value[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

/// How tree outputs are combined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Ensemble {
    /// Bagged forest: mean of the trees.
    #[default]
    Average,
    /// Gradient boosting: `base_score + learning_rate * Σ trees`.
    Boosted { base_score: f64, learning_rate: f64 },
}

/// Tree ensemble regressor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    pub trees: Vec<RegressionTree>,
    #[serde(default)]
    pub ensemble: Ensemble,
}

impl RegressionTree {
    pub fn len(&self) -> usize {
        self.children_left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children_left.is_empty()
    }

    fn validate(&self, tree_idx: usize) -> Result<(), ModelError> {
        let n = self.len();
        let invalid = |msg: String| ModelError::Invalid(format!("tree {tree_idx}: {msg}"));
        if n == 0 {
            return Err(invalid("no nodes".into()));
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return Err(invalid("node arrays differ in length".into()));
        }

        for i in 0..n {
            let (left, right) = (self.children_left[i], self.children_right[i]);
            if left == LEAF {
                if right != LEAF {
                    return Err(invalid(format!("node {i} has only a right child")));
                }
                if !self.value[i].is_finite() {
                    return Err(invalid(format!("leaf {i} has non-finite value")));
                }
                continue;
            }
            // Children always come after their parent, which also rules out cycles.
            for child in [left, right] {
                if child <= i as i64 || child >= n as i64 {
                    return Err(invalid(format!("node {i} has child {child} out of range")));
                }
            }
            let f = self.feature[i];
            if f < 0 || f >= FeatureRow::LEN as i64 {
                return Err(invalid(format!("node {i} splits on unknown feature {f}")));
            }
            if !self.threshold[i].is_finite() {
                return Err(invalid(format!("node {i} has non-finite threshold")));
            }
        }
        Ok(())
    }

    /// Walk from the root to a leaf.
    pub fn evaluate(&self, x: &[f64; FeatureRow::LEN]) -> Result<f64, ModelError> {
        let broken = || ModelError::Inference("malformed regression tree".into());
        let mut node = 0usize;
        // A valid path visits each node at most once.
        for _ in 0..self.len() {
            let left = *self.children_left.get(node).ok_or_else(broken)?;
            if left == LEAF {
                return self.value.get(node).copied().ok_or_else(broken);
            }
            let feature = self.feature.get(node).copied().ok_or_else(broken)?;
            let sample = usize::try_from(feature)
                .ok()
                .and_then(|f| x.get(f))
                .copied()
                .ok_or_else(broken)?;
            let threshold = *self.threshold.get(node).ok_or_else(broken)?;
            let next = if sample <= threshold {
                left
            } else {
                *self.children_right.get(node).ok_or_else(broken)?
            };
            node = usize::try_from(next).map_err(|_| broken())?;
        }
        Err(broken())
    }
}

impl ForestModel {
    pub fn node_count(&self) -> usize {
        self.trees.iter().map(RegressionTree::len).sum()
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::Invalid("forest has no trees".into()));
        }
        if let Ensemble::Boosted {
            base_score,
            learning_rate,
        } = self.ensemble
        {
            if !base_score.is_finite() || !learning_rate.is_finite() {
                return Err(ModelError::Invalid(
                    "boosting parameters must be finite".into(),
                ));
            }
        }
        self.trees
            .iter()
            .enumerate()
            .try_for_each(|(i, tree)| tree.validate(i))
    }

    pub fn evaluate(&self, x: &[f64; FeatureRow::LEN]) -> Result<f64, ModelError> {
        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.evaluate(x)?;
        }
        Ok(match self.ensemble {
            Ensemble::Average => total / self.trees.len() as f64,
            Ensemble::Boosted {
                base_score,
                learning_rate,
            } => base_score + learning_rate * total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Splits on hydrogen mass at 5.0, then wind speed at 6.0 on the right.
    fn stump_pair() -> RegressionTree {
        RegressionTree {
            children_left: vec![1, LEAF, 3, LEAF, LEAF],
            children_right: vec![2, LEAF, 4, LEAF, LEAF],
            feature: vec![0, -2, 1, -2, -2],
            threshold: vec![5.0, -2.0, 6.0, -2.0, -2.0],
            value: vec![0.0, 0.1, 0.0, 0.4, 0.2],
        }
    }

    fn constant(value: f64) -> RegressionTree {
        RegressionTree {
            children_left: vec![LEAF],
            children_right: vec![LEAF],
            feature: vec![-2],
            threshold: vec![-2.0],
            value: vec![value],
        }
    }

    #[test]
    fn test_tree_paths() {
        let tree = stump_pair();
        assert!(tree.validate(0).is_ok());
        assert_eq!(tree.evaluate(&[5.0, 100.0]).unwrap(), 0.1);
        assert_eq!(tree.evaluate(&[5.5, 6.0]).unwrap(), 0.4);
        assert_eq!(tree.evaluate(&[5.5, 6.5]).unwrap(), 0.2);
    }

    #[test]
    fn test_average_and_boosted() {
        let forest = ForestModel {
            trees: vec![stump_pair(), constant(0.3)],
            ensemble: Ensemble::Average,
        };
        assert!(forest.validate().is_ok());
        assert_eq!(forest.evaluate(&[1.0, 1.0]).unwrap(), (0.1 + 0.3) / 2.0);

        let boosted = ForestModel {
            trees: vec![constant(1.0), constant(3.0)],
            ensemble: Ensemble::Boosted {
                base_score: 0.5,
                learning_rate: 0.1,
            },
        };
        assert_eq!(boosted.evaluate(&[0.0, 0.0]).unwrap(), 0.5 + 0.1 * 4.0);
    }

    #[test]
    fn test_rejects_cycle() {
        let mut tree = stump_pair();
        tree.children_left[2] = 0;
        let forest = ForestModel {
            trees: vec![tree],
            ensemble: Ensemble::Average,
        };
        assert!(matches!(forest.validate(), Err(ModelError::Invalid(_))));
    }

    #[test]
    fn test_rejects_bad_feature_and_lengths() {
        let mut tree = stump_pair();
        tree.feature[0] = 2;
        assert!(tree.validate(0).is_err());

        let mut tree = stump_pair();
        tree.value.pop();
        assert!(tree.validate(0).is_err());
    }

    #[test]
    fn test_rejects_empty_forest() {
        let forest = ForestModel {
            trees: vec![],
            ensemble: Ensemble::default(),
        };
        assert!(forest.validate().is_err());
    }

    #[test]
    fn test_unvalidated_cycle_does_not_hang() {
        let tree = RegressionTree {
            children_left: vec![0],
            children_right: vec![0],
            feature: vec![0],
            threshold: vec![1.0],
            value: vec![0.0],
        };
        assert!(matches!(
            tree.evaluate(&[0.0, 0.0]),
            Err(ModelError::Inference(_))
        ));
    }

    #[test]
    fn test_ensemble_defaults_to_average_in_json() {
        let json = r#"{"trees": [{"children_left": [-1], "children_right": [-1],
            "feature": [-2], "threshold": [-2.0], "value": [0.7]}]}"#;
        let forest: ForestModel = serde_json::from_str(json).unwrap();
        assert_eq!(forest.ensemble, Ensemble::Average);
        assert_eq!(forest.evaluate(&[0.0, 0.0]).unwrap(), 0.7);
    }
}
