//! Loading of every fitted artifact into one immutable bundle

use crate::config::ArtifactConfig;
use crate::error::{Result, VacancyInsightsError, EMBEDDING_ENCODER};
use crate::features::assembler::NUMERIC_FEATURES;
use crate::features::embeddings::{SentenceEncoder, StaticEmbeddingEncoder};
use crate::features::onehot::OneHotEncoder;
use crate::features::tfidf::TfidfVectorizer;
use crate::prediction::trees::{GradientBoostedRegressor, RandomForestClassifier};
use crate::prediction::{GradeClassifier, SalaryRegressor};
use log::info;
use std::path::PathBuf;
use std::time::Instant;

pub struct ArtifactBundle {
    pub description_vectorizer: TfidfVectorizer,
    pub title_vectorizer: TfidfVectorizer,
    pub category_encoder: OneHotEncoder,
    pub sentence_encoder: Box<dyn SentenceEncoder>,
    pub salary_model: Box<dyn SalaryRegressor>,
    pub grade_model: Box<dyn GradeClassifier>,
}

impl ArtifactBundle {
    /// Assemble a bundle, checking each model against the layout it will receive
    pub fn new(
        description_vectorizer: TfidfVectorizer,
        title_vectorizer: TfidfVectorizer,
        category_encoder: OneHotEncoder,
        sentence_encoder: Box<dyn SentenceEncoder>,
        salary_model: Box<dyn SalaryRegressor>,
        grade_model: Box<dyn GradeClassifier>,
    ) -> Result<Self> {
        let full_width = NUMERIC_FEATURES
            + description_vectorizer.dimension()
            + title_vectorizer.dimension()
            + category_encoder.width()
            + sentence_encoder.dimension();

        if salary_model.n_features() != full_width {
            return Err(VacancyInsightsError::FeatureWidthMismatch {
                model: "salary model".to_string(),
                expected: salary_model.n_features(),
                actual: full_width,
            });
        }
        if grade_model.n_features() != sentence_encoder.dimension() {
            return Err(VacancyInsightsError::FeatureWidthMismatch {
                model: "grade model".to_string(),
                expected: grade_model.n_features(),
                actual: sentence_encoder.dimension(),
            });
        }

        Ok(Self {
            description_vectorizer,
            title_vectorizer,
            category_encoder,
            sentence_encoder,
            salary_model,
            grade_model,
        })
    }

    /// Load every artifact named by the configuration.
    ///
    /// The embedding model loads on a blocking task while the JSON
    /// artifacts are read concurrently.
    pub async fn load(config: &ArtifactConfig) -> Result<Self> {
        let model_path = config.embedding_model_path();
        let normalize = config.normalize_embeddings;
        let encoder_task =
            tokio::task::spawn_blocking(move || StaticEmbeddingEncoder::load(&model_path, normalize));

        let (json, encoder) = tokio::join!(JsonArtifacts::read(config), encoder_task);
        let encoder = encoder.map_err(|e| VacancyInsightsError::artifact(EMBEDDING_ENCODER, e))??;

        json?.into_bundle(Box::new(encoder))
    }

    /// Load the JSON artifacts and pair them with an already built encoder
    pub async fn load_with_encoder(
        config: &ArtifactConfig,
        sentence_encoder: Box<dyn SentenceEncoder>,
    ) -> Result<Self> {
        JsonArtifacts::read(config).await?.into_bundle(sentence_encoder)
    }
}

struct JsonArtifacts {
    description: String,
    title: String,
    categories: String,
    salary: String,
    grade: String,
}

impl JsonArtifacts {
    async fn read(config: &ArtifactConfig) -> Result<Self> {
        let start_time = Instant::now();
        let (description, title, categories, salary, grade) = tokio::try_join!(
            read_artifact("description vectorizer", config.path(&config.description_vectorizer)),
            read_artifact("title vectorizer", config.path(&config.title_vectorizer)),
            read_artifact("category encoder", config.path(&config.category_encoder)),
            read_artifact("salary model", config.path(&config.salary_model)),
            read_artifact("grade model", config.path(&config.grade_model)),
        )?;
        info!("Read JSON artifacts in {:.2?}", start_time.elapsed());

        Ok(Self {
            description,
            title,
            categories,
            salary,
            grade,
        })
    }

    fn into_bundle(self, sentence_encoder: Box<dyn SentenceEncoder>) -> Result<ArtifactBundle> {
        let bundle = ArtifactBundle::new(
            TfidfVectorizer::from_json("description vectorizer", &self.description)?,
            TfidfVectorizer::from_json("title vectorizer", &self.title)?,
            OneHotEncoder::from_json(&self.categories)?,
            sentence_encoder,
            Box::new(GradientBoostedRegressor::from_json(&self.salary)?),
            Box::new(RandomForestClassifier::from_json(&self.grade)?),
        )
        .map_err(|e| match e {
            VacancyInsightsError::FeatureWidthMismatch { model, expected, actual } => {
                VacancyInsightsError::artifact(
                    model,
                    format!("trained on {} features, layout provides {}", expected, actual),
                )
            }
            other => other,
        })?;

        info!(
            "Artifacts ready: description {} / title {} / categorical {} / embedding {} columns",
            bundle.description_vectorizer.dimension(),
            bundle.title_vectorizer.dimension(),
            bundle.category_encoder.width(),
            bundle.sentence_encoder.dimension()
        );
        Ok(bundle)
    }
}

async fn read_artifact(artifact: &str, path: PathBuf) -> Result<String> {
    tokio::fs::read_to_string(&path).await.map_err(|e| {
        VacancyInsightsError::artifact(artifact, format!("{}: {}", path.display(), e))
    })
}
