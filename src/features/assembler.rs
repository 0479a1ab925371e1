//! Feature assembly into the two layouts the trained models expect

use crate::error::{Result, VacancyInsightsError};
use crate::features::artifacts::ArtifactBundle;
use crate::vacancy::{Grade, VacancyFeatures};
use log::debug;
use ndarray::Array1;
use std::ops::Range;
use std::sync::Arc;

/// Number of leading numeric scalars in the full layout
pub const NUMERIC_FEATURES: usize = 9;

/// Title length is capped before it enters the numeric block
pub const TITLE_LENGTH_CAP: usize = 40;

/// Blocks of the full layout, in their fixed order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureBlock {
    Numeric,
    Description,
    Title,
    Categorical,
    Embedding,
}

impl FeatureBlock {
    pub const ORDER: [FeatureBlock; 5] = [
        FeatureBlock::Numeric,
        FeatureBlock::Description,
        FeatureBlock::Title,
        FeatureBlock::Categorical,
        FeatureBlock::Embedding,
    ];
}

/// Widths of each block of the full layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureLayout {
    pub numeric: usize,
    pub description: usize,
    pub title: usize,
    pub categorical: usize,
    pub embedding: usize,
}

impl FeatureLayout {
    pub fn width(&self, block: FeatureBlock) -> usize {
        match block {
            FeatureBlock::Numeric => self.numeric,
            FeatureBlock::Description => self.description,
            FeatureBlock::Title => self.title,
            FeatureBlock::Categorical => self.categorical,
            FeatureBlock::Embedding => self.embedding,
        }
    }

    /// Column range a block occupies in the full vector
    pub fn range(&self, block: FeatureBlock) -> Range<usize> {
        let start: usize = FeatureBlock::ORDER
            .iter()
            .take_while(|b| **b != block)
            .map(|b| self.width(*b))
            .sum();
        start..start + self.width(block)
    }

    pub fn total(&self) -> usize {
        FeatureBlock::ORDER.iter().map(|b| self.width(*b)).sum()
    }
}

pub struct FeatureAssembler {
    artifacts: Arc<ArtifactBundle>,
}

impl FeatureAssembler {
    pub fn new(artifacts: Arc<ArtifactBundle>) -> Self {
        Self { artifacts }
    }

    pub fn layout(&self) -> FeatureLayout {
        FeatureLayout {
            numeric: NUMERIC_FEATURES,
            description: self.artifacts.description_vectorizer.dimension(),
            title: self.artifacts.title_vectorizer.dimension(),
            categorical: self.artifacts.category_encoder.width(),
            embedding: self.artifacts.sentence_encoder.dimension(),
        }
    }

    /// Region, description length, description words, capped title length,
    /// skill count, then junior/middle/senior/lead indicator bits.
    /// Absent scalars are 0.
    pub fn numeric_scalars(features: &VacancyFeatures) -> [f32; NUMERIC_FEATURES] {
        let scalar = |value: Option<u32>| value.unwrap_or(0) as f32;
        let title_length = features.title_length.unwrap_or(0).min(TITLE_LENGTH_CAP as u32);
        let bits = Grade::indicator_bits(features.grade);

        [
            features.area_id.unwrap_or(0) as f32,
            scalar(features.description_length),
            scalar(features.description_words),
            title_length as f32,
            scalar(features.num_skills),
            bits[0],
            bits[1],
            bits[2],
            bits[3],
        ]
    }

    /// Full layout for the salary model
    pub fn assemble_full(&self, features: &VacancyFeatures) -> Result<Array1<f32>> {
        let layout = self.layout();
        let mut vector = Array1::<f32>::zeros(layout.total());
        let values = vector
            .as_slice_mut()
            .ok_or_else(|| VacancyInsightsError::AnalysisFailed("feature buffer is not contiguous".to_string()))?;

        values[layout.range(FeatureBlock::Numeric)].copy_from_slice(&Self::numeric_scalars(features));

        self.artifacts
            .description_vectorizer
            .transform(&features.description)
            .scatter_into(&mut values[layout.range(FeatureBlock::Description)]);

        self.artifacts
            .title_vectorizer
            .transform(&features.title)
            .scatter_into(&mut values[layout.range(FeatureBlock::Title)]);

        let region = features.area_id.map(|id| id.to_string()).unwrap_or_default();
        let categorical = self
            .artifacts
            .category_encoder
            .transform(&[region.as_str(), features.currency()]);
        values[layout.range(FeatureBlock::Categorical)].copy_from_slice(&categorical);

        let embedding = self.embed(&features.description, layout.embedding)?;
        values[layout.range(FeatureBlock::Embedding)].copy_from_slice(&embedding);

        debug!("Assembled full feature vector of width {}", layout.total());
        Ok(vector)
    }

    /// Embedding-only layout for the grade model
    pub fn assemble_embedding_only(&self, features: &VacancyFeatures) -> Result<Array1<f32>> {
        let width = self.artifacts.sentence_encoder.dimension();
        Ok(Array1::from(self.embed(&features.description, width)?))
    }

    fn embed(&self, text: &str, expected: usize) -> Result<Vec<f32>> {
        let embedding = self.artifacts.sentence_encoder.encode(text);
        if embedding.len() != expected {
            return Err(VacancyInsightsError::FeatureWidthMismatch {
                model: self.artifacts.sentence_encoder.name().to_string(),
                expected,
                actual: embedding.len(),
            });
        }
        Ok(embedding)
    }
}
