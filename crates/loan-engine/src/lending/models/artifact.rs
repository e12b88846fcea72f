use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{ModelError, TrainedClassifier, TrainedRegressor};

/// Error raised while reading a model artifact.
#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("failed to read model artifact {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse model artifact {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid model artifact {}: {reason}", .path.display())]
    Invalid { path: PathBuf, reason: String },
}

fn read_artifact<T>(path: &Path) -> Result<T, ModelLoadError>
where
    T: for<'de> Deserialize<'de>,
{
    let raw = fs::read_to_string(path).map_err(|source| ModelLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ModelLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Ordinary least squares fit exported as coefficients plus intercept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressionArtifact {
    #[serde(default)]
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub r2_score: Option<f64>,
}

impl LinearRegressionArtifact {
    pub fn from_path(path: &Path) -> Result<Self, ModelLoadError> {
        let artifact: Self = read_artifact(path)?;
        artifact
            .validate()
            .map_err(|reason| ModelLoadError::Invalid {
                path: path.to_path_buf(),
                reason,
            })?;
        Ok(artifact)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.coefficients.len() != 2 {
            return Err(format!(
                "expected 2 coefficients, found {}",
                self.coefficients.len()
            ));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err("coefficients must be finite".to_string());
        }
        Ok(())
    }
}

impl TrainedRegressor for LinearRegressionArtifact {
    fn predict(&self, features: &[f64; 2]) -> Result<f64, ModelError> {
        if self.coefficients.len() != features.len() {
            return Err(ModelError::Malformed(format!(
                "{} coefficients for {} features",
                self.coefficients.len(),
                features.len()
            )));
        }
        let value = self
            .coefficients
            .iter()
            .zip(features)
            .fold(self.intercept, |acc, (coefficient, feature)| {
                acc + coefficient * feature
            });
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ModelError::NonFiniteOutput)
        }
    }
}

/// A node in a flattened decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    /// `features[feature] <= threshold` descends left.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        label: i64,
    },
}

/// Single tree; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeArtifact {
    pub nodes: Vec<TreeNode>,
}

impl TreeArtifact {
    fn validate(&self, feature_count: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (index, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } = node
            {
                if *feature >= feature_count {
                    return Err(format!("node {index} splits on unknown feature {feature}"));
                }
                if !threshold.is_finite() {
                    return Err(format!("node {index} has a non-finite threshold"));
                }
                if *left >= self.nodes.len() || *right >= self.nodes.len() {
                    return Err(format!("node {index} points outside the tree"));
                }
            }
        }
        Ok(())
    }

    fn classify(&self, features: &[f64]) -> Result<i64, ModelError> {
        let mut index = 0;
        // A well-formed tree reaches a leaf in fewer steps than it has nodes.
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { label }) => return Ok(*label),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = features.get(*feature).ok_or_else(|| {
                        ModelError::Malformed(format!("split on missing feature {feature}"))
                    })?;
                    index = if value <= threshold { *left } else { *right };
                }
                None => {
                    return Err(ModelError::Malformed(format!(
                        "node {index} does not exist"
                    )))
                }
            }
        }
        Err(ModelError::Malformed("tree traversal did not terminate".to_string()))
    }
}

/// Bagged decision trees voting on a class label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestClassifierArtifact {
    #[serde(default)]
    pub feature_names: Vec<String>,
    pub trees: Vec<TreeArtifact>,
    /// Held-out accuracy as a fraction.
    #[serde(default)]
    pub accuracy: Option<f64>,
}

impl ForestClassifierArtifact {
    const FEATURES: usize = 4;

    pub fn from_path(path: &Path) -> Result<Self, ModelLoadError> {
        let artifact: Self = read_artifact(path)?;
        artifact
            .validate()
            .map_err(|reason| ModelLoadError::Invalid {
                path: path.to_path_buf(),
                reason,
            })?;
        Ok(artifact)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (index, tree) in self.trees.iter().enumerate() {
            tree.validate(Self::FEATURES)
                .map_err(|reason| format!("tree {index}: {reason}"))?;
        }
        if let Some(accuracy) = self.accuracy {
            if !(0.0..=1.0).contains(&accuracy) {
                return Err(format!("accuracy {accuracy} outside [0, 1]"));
            }
        }
        Ok(())
    }
}

impl TrainedClassifier for ForestClassifierArtifact {
    fn predict(&self, features: &[f64; 4]) -> Result<i64, ModelError> {
        let mut votes: BTreeMap<i64, usize> = BTreeMap::new();
        for tree in &self.trees {
            *votes.entry(tree.classify(features)?).or_default() += 1;
        }

        // Strictly greater keeps the smallest label on ties.
        let mut winner: Option<(i64, usize)> = None;
        for (label, count) in votes {
            match winner {
                Some((_, best)) if count <= best => {}
                _ => winner = Some((label, count)),
            }
        }
        winner
            .map(|(label, _)| label)
            .ok_or_else(|| ModelError::Malformed("forest has no trees".to_string()))
    }
}
