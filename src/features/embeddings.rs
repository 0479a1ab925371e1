//! Dense sentence embeddings for vacancy descriptions

use crate::error::{Result, VacancyInsightsError, EMBEDDING_ENCODER};
use anyhow::Context;
use log::info;
use model2vec_rs::model::StaticModel;
use std::path::Path;
use std::time::Instant;

/// Fixed-width dense text encoder shared by both feature layouts
pub trait SentenceEncoder: Send + Sync {
    fn encode(&self, text: &str) -> Vec<f32>;

    fn dimension(&self) -> usize;

    fn name(&self) -> &str;
}

/// Model2Vec static embedding model
pub struct StaticEmbeddingEncoder {
    model: StaticModel,
    dimension: usize,
    model_name: String,
}

impl StaticEmbeddingEncoder {
    /// Load from a local model folder or a hub repository id
    pub fn load(model_path: &Path, normalize: Option<bool>) -> Result<Self> {
        let start_time = Instant::now();
        info!("Loading sentence embedding model from: {}", model_path.display());

        let model = StaticModel::from_pretrained(
            model_path,
            None, // token
            normalize,
            None, // subfolder
        )
        .with_context(|| format!("cannot load {}", model_path.display()))?;

        // An empty sentence pools to a zero vector of the model width
        let dimension = model.encode_single("").len();
        if dimension == 0 {
            return Err(VacancyInsightsError::artifact(
                EMBEDDING_ENCODER,
                "model produced zero-width embeddings",
            ));
        }

        info!(
            "Embedding model loaded in {:.2?} ({} dimensions)",
            start_time.elapsed(),
            dimension
        );

        Ok(Self {
            model,
            dimension,
            model_name: model_path.to_string_lossy().to_string(),
        })
    }
}

impl SentenceEncoder for StaticEmbeddingEncoder {
    fn encode(&self, text: &str) -> Vec<f32> {
        self.model.encode_single(text)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}

/// Deterministic feature-hashing encoder.
///
/// Tokens are hashed (FNV-1a) into `dimension` signed buckets and the
/// result is L2-normalized. Needs no model files.
pub struct HashingEncoder {
    dimension: usize,
}

impl HashingEncoder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn fnv1a(token: &str) -> u64 {
        let mut hash: u64 = 0xcbf29ce484222325;
        for byte in token.as_bytes() {
            hash ^= *byte as u64;
            hash = hash.wrapping_mul(0x100000001b3);
        }
        hash
    }
}

impl SentenceEncoder for HashingEncoder {
    fn encode(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for token in text.to_lowercase().split_whitespace() {
            let hash = Self::fnv1a(token);
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if (hash >> 63) == 1 { -1.0 } else { 1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hashing_encoder_is_deterministic() {
        let encoder = HashingEncoder::new(16);
        let a = encoder.encode("Python developer, Django");
        let b = encoder.encode("Python developer, Django");

        assert_eq!(a.len(), 16);
        assert_eq!(a, b);
        let norm = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert_relative_eq!(norm, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_hashing_encoder_empty_text() {
        let encoder = HashingEncoder::new(8);
        assert_eq!(encoder.encode("   "), vec![0.0; 8]);
    }

    #[test]
    fn test_missing_model_is_artifact_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("no-such-model");
        std::fs::create_dir_all(&missing).unwrap();

        let err = StaticEmbeddingEncoder::load(&missing, None).err().unwrap();
        assert!(matches!(err, VacancyInsightsError::ArtifactUnavailable { .. }));
    }
}
