//! Error handling for the vacancy insights service

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VacancyInsightsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Artifact '{artifact}' unavailable: {reason}")]
    ArtifactUnavailable { artifact: String, reason: String },

    #[error("Feature width mismatch for {model}: expected {expected}, got {actual}")]
    FeatureWidthMismatch {
        model: String,
        expected: usize,
        actual: usize,
    },

    #[error("Model output error: {0}")]
    ModelOutput(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),
}

pub type Result<T> = std::result::Result<T, VacancyInsightsError>;

/// Artifact name used for the sentence embedding model
pub const EMBEDDING_ENCODER: &str = "embedding encoder";

impl VacancyInsightsError {
    pub fn artifact(artifact: impl Into<String>, reason: impl ToString) -> Self {
        VacancyInsightsError::ArtifactUnavailable {
            artifact: artifact.into(),
            reason: reason.to_string(),
        }
    }

    /// Message safe to show to an end user. Internals stay in the log.
    pub fn user_message(&self) -> String {
        match self {
            VacancyInsightsError::InvalidFilter(msg) | VacancyInsightsError::InvalidInput(msg) => {
                format!("Invalid input: {}", msg)
            }
            VacancyInsightsError::ArtifactUnavailable { artifact, .. } => {
                format!("Prediction models are unavailable ({} failed to load)", artifact)
            }
            VacancyInsightsError::Configuration(msg) => format!("Configuration problem: {}", msg),
            _ => "Could not complete the request, see the log for details".to_string(),
        }
    }

    /// Whether the error stems from caller input rather than the service itself
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            VacancyInsightsError::InvalidFilter(_) | VacancyInsightsError::InvalidInput(_)
        )
    }
}

/// Embedding model loading reports anyhow errors; keep the whole context chain
impl From<anyhow::Error> for VacancyInsightsError {
    fn from(err: anyhow::Error) -> Self {
        VacancyInsightsError::artifact(EMBEDDING_ENCODER, format!("{:#}", err))
    }
}
