//! Tree-ensemble predictors loaded from exported JSON artifacts

use crate::error::{Result, VacancyInsightsError};
use crate::prediction::{GradeClassifier, SalaryRegressor};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LeafValue {
    Scalar(f32),
    Distribution(Vec<f32>),
}

/// Node of a binary decision tree; samples with `x[feature] <= threshold` go left
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
    Leaf {
        value: LeafValue,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Children must point forward so evaluation always terminates
    fn validate(&self, tree_index: usize, n_features: usize) -> std::result::Result<(), String> {
        if self.nodes.is_empty() {
            return Err(format!("tree {} has no nodes", tree_index));
        }
        for (index, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split { feature, left, right, .. } = node {
                if *feature >= n_features {
                    return Err(format!(
                        "tree {} node {} splits on feature {} of {}",
                        tree_index, index, feature, n_features
                    ));
                }
                for child in [*left, *right] {
                    if child <= index || child >= self.nodes.len() {
                        return Err(format!(
                            "tree {} node {} has invalid child {}",
                            tree_index, index, child
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    fn leaf(&self, x: ArrayView1<f32>) -> &LeafValue {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    // NaN compares false and follows the right branch
                    index = if x[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputTransform {
    /// Model was trained on `ln(1 + salary)`
    Expm1,
}

/// Gradient-boosted regression ensemble: `base_score + Σ leaf`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostedRegressor {
    pub n_features: usize,
    #[serde(default)]
    pub base_score: f32,
    pub trees: Vec<DecisionTree>,
    #[serde(default)]
    pub output_transform: Option<OutputTransform>,
}

impl GradientBoostedRegressor {
    pub fn from_json(json: &str) -> Result<Self> {
        let model: Self = serde_json::from_str(json)
            .map_err(|e| VacancyInsightsError::artifact("salary model", e))?;
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<()> {
        for (tree_index, tree) in self.trees.iter().enumerate() {
            tree.validate(tree_index, self.n_features)
                .map_err(|reason| VacancyInsightsError::artifact("salary model", reason))?;
            let scalar_leaves = tree.nodes.iter().all(|node| match node {
                TreeNode::Leaf { value } => matches!(value, LeafValue::Scalar(_)),
                TreeNode::Split { .. } => true,
            });
            if !scalar_leaves {
                return Err(VacancyInsightsError::artifact(
                    "salary model",
                    format!("tree {} has non-scalar leaves", tree_index),
                ));
            }
        }
        Ok(())
    }
}

impl SalaryRegressor for GradientBoostedRegressor {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, x: ArrayView1<f32>) -> Result<f64> {
        check_width("salary model", self.n_features, x.len())?;

        let raw: f64 = self.base_score as f64
            + self
                .trees
                .iter()
                .map(|tree| match tree.leaf(x) {
                    LeafValue::Scalar(v) => *v as f64,
                    LeafValue::Distribution(v) => v.first().copied().unwrap_or(0.0) as f64,
                })
                .sum::<f64>();

        Ok(match self.output_transform {
            Some(OutputTransform::Expm1) => raw.exp_m1(),
            None => raw,
        })
    }
}

/// Random-forest classifier: mean of per-tree class distributions, then argmax
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    pub n_features: usize,
    pub classes: Vec<i64>,
    pub trees: Vec<DecisionTree>,
}

impl RandomForestClassifier {
    pub fn from_json(json: &str) -> Result<Self> {
        let model: Self = serde_json::from_str(json)
            .map_err(|e| VacancyInsightsError::artifact("grade model", e))?;
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<()> {
        if self.classes.is_empty() || self.trees.is_empty() {
            return Err(VacancyInsightsError::artifact(
                "grade model",
                "classifier needs at least one class and one tree",
            ));
        }
        for (tree_index, tree) in self.trees.iter().enumerate() {
            tree.validate(tree_index, self.n_features)
                .map_err(|reason| VacancyInsightsError::artifact("grade model", reason))?;
            for node in &tree.nodes {
                if let TreeNode::Leaf { value } = node {
                    let ok = matches!(value, LeafValue::Distribution(d) if d.len() == self.classes.len());
                    if !ok {
                        return Err(VacancyInsightsError::artifact(
                            "grade model",
                            format!(
                                "tree {} leaf does not hold {} class weights",
                                tree_index,
                                self.classes.len()
                            ),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Averaged class probabilities in `classes` order
    pub fn predict_proba(&self, x: ArrayView1<f32>) -> Result<Vec<f64>> {
        check_width("grade model", self.n_features, x.len())?;

        let mut totals = vec![0.0f64; self.classes.len()];
        for tree in &self.trees {
            if let LeafValue::Distribution(weights) = tree.leaf(x) {
                let sum: f32 = weights.iter().sum();
                if sum <= 0.0 {
                    continue;
                }
                for (total, weight) in totals.iter_mut().zip(weights) {
                    *total += (*weight / sum) as f64;
                }
            }
        }

        let trees = self.trees.len() as f64;
        totals.iter_mut().for_each(|t| *t /= trees);
        Ok(totals)
    }
}

impl GradeClassifier for RandomForestClassifier {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_class(&self, x: ArrayView1<f32>) -> Result<i64> {
        let proba = self.predict_proba(x)?;

        // First maximum wins on ties
        let mut best = 0;
        for (index, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = index;
            }
        }
        Ok(self.classes[best])
    }
}

fn check_width(model: &str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(VacancyInsightsError::FeatureWidthMismatch {
            model: model.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}
