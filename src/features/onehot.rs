//! Fitted one-hot encoder for the (region, currency) categorical pair

use crate::error::{Result, VacancyInsightsError};
use serde::{Deserialize, Serialize};

/// Categories learned per input column, in output order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotArtifact {
    pub categories: Vec<Vec<String>>,
}

pub struct OneHotEncoder {
    categories: Vec<Vec<String>>,
    offsets: Vec<usize>,
    width: usize,
}

impl OneHotEncoder {
    pub fn from_artifact(artifact: OneHotArtifact) -> Result<Self> {
        if artifact.categories.is_empty() {
            return Err(VacancyInsightsError::artifact(
                "category encoder",
                "no categorical columns",
            ));
        }

        let mut offsets = Vec::with_capacity(artifact.categories.len());
        let mut width = 0;
        for column in &artifact.categories {
            offsets.push(width);
            width += column.len();
        }

        Ok(Self {
            categories: artifact.categories,
            offsets,
            width,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: OneHotArtifact = serde_json::from_str(json)
            .map_err(|e| VacancyInsightsError::artifact("category encoder", e))?;
        Self::from_artifact(artifact)
    }

    /// Total number of output columns
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn columns(&self) -> usize {
        self.categories.len()
    }

    /// Encode one row. Unseen values leave their sub-block all zero;
    /// missing trailing values are treated as unseen.
    pub fn transform(&self, values: &[&str]) -> Vec<f32> {
        let mut block = vec![0.0; self.width];

        for (column, categories) in self.categories.iter().enumerate() {
            let Some(value) = values.get(column) else {
                continue;
            };
            if let Some(position) = categories.iter().position(|c| c.as_str() == *value) {
                block[self.offsets[column] + position] = 1.0;
            }
        }

        block
    }
}
