//! Pre-fitted TF-IDF vectorizer over a fixed vocabulary

use crate::error::{Result, VacancyInsightsError};
use crate::features::text::TextProcessor;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Fitted vectorizer parameters as exported after training
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfArtifact {
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f32>,
    #[serde(default = "default_true")]
    pub lowercase: bool,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

fn default_true() -> bool {
    true
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

/// Sparse row produced by a vectorizer; entries are sorted by column
#[derive(Debug, Clone, PartialEq)]
pub struct SparseVector {
    pub dimension: usize,
    pub entries: Vec<(usize, f32)>,
}

impl SparseVector {
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Write the row into a dense slice of exactly `dimension` cells
    pub fn scatter_into(&self, target: &mut [f32]) {
        debug_assert_eq!(target.len(), self.dimension);
        target.iter_mut().for_each(|x| *x = 0.0);
        for &(column, value) in &self.entries {
            target[column] = value;
        }
    }

    pub fn to_dense(&self) -> Vec<f32> {
        let mut dense = vec![0.0; self.dimension];
        self.scatter_into(&mut dense);
        dense
    }
}

pub struct TfidfVectorizer {
    name: String,
    artifact: TfidfArtifact,
    processor: TextProcessor,
}

impl TfidfVectorizer {
    /// Build from a fitted artifact, validating vocabulary and idf agree
    pub fn from_artifact(name: impl Into<String>, artifact: TfidfArtifact) -> Result<Self> {
        let name = name.into();

        if artifact.vocabulary.len() != artifact.idf.len() {
            return Err(VacancyInsightsError::artifact(
                &name,
                format!(
                    "vocabulary has {} terms but idf has {} weights",
                    artifact.vocabulary.len(),
                    artifact.idf.len()
                ),
            ));
        }
        if let Some((term, column)) = artifact
            .vocabulary
            .iter()
            .find(|&(_, &column)| column >= artifact.idf.len())
        {
            return Err(VacancyInsightsError::artifact(
                &name,
                format!("term '{}' maps to column {} outside the idf table", term, column),
            ));
        }
        let (min_n, max_n) = artifact.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(VacancyInsightsError::artifact(
                &name,
                format!("invalid ngram range ({}, {})", min_n, max_n),
            ));
        }

        let processor = TextProcessor::new(artifact.lowercase);
        Ok(Self { name, artifact, processor })
    }

    pub fn from_json(name: impl Into<String>, json: &str) -> Result<Self> {
        let name = name.into();
        let artifact: TfidfArtifact =
            serde_json::from_str(json).map_err(|e| VacancyInsightsError::artifact(&name, e))?;
        Self::from_artifact(name, artifact)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of output columns
    pub fn dimension(&self) -> usize {
        self.artifact.idf.len()
    }

    /// Transform text into its TF-IDF row
    pub fn transform(&self, text: &str) -> SparseVector {
        let (min_n, max_n) = self.artifact.ngram_range;
        let mut counts: BTreeMap<usize, u32> = BTreeMap::new();

        for gram in self.processor.ngrams(text, min_n, max_n) {
            if let Some(&column) = self.artifact.vocabulary.get(&gram) {
                *counts.entry(column).or_insert(0) += 1;
            }
        }

        let mut entries: Vec<(usize, f32)> = counts
            .into_iter()
            .map(|(column, count)| {
                let tf = if self.artifact.sublinear_tf {
                    1.0 + (count as f32).ln()
                } else {
                    count as f32
                };
                (column, tf * self.artifact.idf[column])
            })
            .collect();

        let norm = match self.artifact.norm {
            Some(Norm::L2) => entries.iter().map(|(_, v)| v * v).sum::<f32>().sqrt(),
            Some(Norm::L1) => entries.iter().map(|(_, v)| v.abs()).sum::<f32>(),
            None => 1.0,
        };
        if norm > 0.0 {
            entries.iter_mut().for_each(|(_, v)| *v /= norm);
        }

        SparseVector {
            dimension: self.dimension(),
            entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn artifact() -> TfidfArtifact {
        let vocabulary = [("python", 0), ("django", 1), ("sql", 2), ("удалёнка", 3)]
            .into_iter()
            .map(|(t, c)| (t.to_string(), c))
            .collect();
        TfidfArtifact {
            vocabulary,
            idf: vec![1.0, 2.0, 1.5, 3.0],
            lowercase: true,
            ngram_range: (1, 1),
            sublinear_tf: false,
            norm: Some(Norm::L2),
        }
    }

    #[test]
    fn test_transform_is_l2_normalized() {
        let vectorizer = TfidfVectorizer::from_artifact("desc", artifact()).unwrap();
        let row = vectorizer.transform("Python python Django");

        assert_eq!(row.dimension, 4);
        assert_eq!(row.nnz(), 2);
        let norm: f32 = row.entries.iter().map(|(_, v)| v * v).sum::<f32>().sqrt();
        assert_relative_eq!(norm, 1.0, epsilon = 1e-6);
        // python: 2 * 1.0, django: 1 * 2.0 -> equal weights after normalization
        assert_relative_eq!(row.entries[0].1, row.entries[1].1, epsilon = 1e-6);
    }

    #[test]
    fn test_unknown_terms_and_empty_text_give_zero_row() {
        let vectorizer = TfidfVectorizer::from_artifact("desc", artifact()).unwrap();
        assert_eq!(vectorizer.transform("").nnz(), 0);
        assert_eq!(vectorizer.transform("kotlin swift").to_dense(), vec![0.0; 4]);
    }

    #[test]
    fn test_cyrillic_terms_match() {
        let vectorizer = TfidfVectorizer::from_artifact("desc", artifact()).unwrap();
        let row = vectorizer.transform("УДАЛЁНКА");
        assert_eq!(row.entries, vec![(3, 1.0)]);
    }

    #[test]
    fn test_sublinear_tf_without_norm() {
        let mut fitted = artifact();
        fitted.sublinear_tf = true;
        fitted.norm = None;
        let vectorizer = TfidfVectorizer::from_artifact("desc", fitted).unwrap();
        let row = vectorizer.transform("sql sql sql");

        assert_relative_eq!(row.entries[0].1, (1.0 + 3f32.ln()) * 1.5, epsilon = 1e-6);
    }

    #[test]
    fn test_mismatched_idf_is_rejected() {
        let mut fitted = artifact();
        fitted.idf.pop();
        let err = TfidfVectorizer::from_artifact("title", fitted).err().unwrap();
        assert!(matches!(err, VacancyInsightsError::ArtifactUnavailable { .. }));
    }

    #[test]
    fn test_json_defaults() {
        let json = r#"{"vocabulary": {"rust": 0}, "idf": [1.0]}"#;
        let vectorizer = TfidfVectorizer::from_json("title", json).unwrap();
        assert_eq!(vectorizer.dimension(), 1);
        assert_eq!(vectorizer.transform("Rust").entries, vec![(0, 1.0)]);
    }
}
