//! Configuration management for vacancy insights

use crate::error::{Result, VacancyInsightsError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub artifacts: ArtifactConfig,
    pub storage: StorageConfig,
    pub analytics: AnalyticsConfig,
    pub output: OutputConfig,
}

/// Locations of the fitted vectorizers and models
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    pub artifacts_dir: PathBuf,
    pub description_vectorizer: String,
    pub title_vectorizer: String,
    pub category_encoder: String,
    pub salary_model: String,
    pub grade_model: String,
    /// Local folder (relative to `artifacts_dir` or absolute) or hub repo id
    pub embedding_model: String,
    #[serde(default)]
    pub normalize_embeddings: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub database_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    pub min_cohort_size: usize,
    pub top_vacancies_limit: usize,
    pub promotion_top_n: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("vacancy-insights");

        Self {
            artifacts: ArtifactConfig {
                artifacts_dir: data_dir.join("artifacts"),
                description_vectorizer: "description_tfidf.json".to_string(),
                title_vectorizer: "title_tfidf.json".to_string(),
                category_encoder: "category_onehot.json".to_string(),
                salary_model: "salary_model.json".to_string(),
                grade_model: "grade_model.json".to_string(),
                embedding_model: "minishlab/potion-multilingual-128M".to_string(),
                normalize_embeddings: None,
            },
            storage: StorageConfig {
                database_path: data_dir.join("vacancies.db"),
            },
            analytics: AnalyticsConfig {
                min_cohort_size: crate::market::promotion::MIN_COHORT_SIZE,
                top_vacancies_limit: crate::market::query::DEFAULT_VACANCY_LIMIT,
                promotion_top_n: crate::market::promotion::DEFAULT_PROMOTION_SKILLS,
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults on first run
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| VacancyInsightsError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Overwrite `path` with defaults without reading what is there
    pub fn reset_at(path: &Path) -> Result<Self> {
        let config = Self::default();
        config.save_to(path)?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| VacancyInsightsError::Configuration(format!("Failed to serialize config: {}", e)))
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("vacancy-insights")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        if self.analytics.min_cohort_size == 0 {
            return Err(VacancyInsightsError::Configuration(
                "analytics.min_cohort_size must be at least 1".to_string(),
            ));
        }
        if self.analytics.top_vacancies_limit == 0 || self.analytics.promotion_top_n == 0 {
            return Err(VacancyInsightsError::Configuration(
                "analytics limits must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl ArtifactConfig {
    pub fn path(&self, file: &str) -> PathBuf {
        self.artifacts_dir.join(file)
    }

    /// A local folder wins over a hub id of the same name
    pub fn embedding_model_path(&self) -> PathBuf {
        let local = self.artifacts_dir.join(&self.embedding_model);
        if local.exists() {
            local
        } else {
            PathBuf::from(&self.embedding_model)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip_through_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.analytics.min_cohort_size = 5;
        config.output.format = OutputFormat::Json;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.analytics.min_cohort_size, 5);
        assert_eq!(loaded.output.format, OutputFormat::Json);
        assert_eq!(loaded.artifacts.salary_model, "salary_model.json");
    }

    #[test]
    fn test_invalid_toml_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[analytics\nmin_cohort_size = ").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, VacancyInsightsError::Configuration(_)));
    }

    #[test]
    fn test_reset_repairs_unloadable_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        std::fs::write(&path, "[analytics\nmin_cohort_size = ").unwrap();
        assert!(Config::load_from(&path).is_err());
        Config::reset_at(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().analytics.min_cohort_size, 3);

        let mut invalid = Config::default();
        invalid.analytics.min_cohort_size = 0;
        invalid.save_to(&path).unwrap();
        assert!(Config::load_from(&path).is_err());
        Config::reset_at(&path).unwrap();
        assert!(Config::load_from(&path).is_ok());
    }

    #[test]
    fn test_zero_cohort_size_rejected() {
        let mut config = Config::default();
        config.analytics.min_cohort_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_embedding_model_falls_back_to_hub_id() {
        let dir = TempDir::new().unwrap();
        let mut artifacts = Config::default().artifacts;
        artifacts.artifacts_dir = dir.path().to_path_buf();
        artifacts.embedding_model = "org/model".to_string();
        assert_eq!(artifacts.embedding_model_path(), PathBuf::from("org/model"));

        std::fs::create_dir_all(dir.path().join("local-model")).unwrap();
        artifacts.embedding_model = "local-model".to_string();
        assert_eq!(artifacts.embedding_model_path(), dir.path().join("local-model"));
    }
}
