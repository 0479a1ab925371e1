//! Prediction service normalizing model outputs into typed results

use crate::error::{Result, VacancyInsightsError};
use crate::features::artifacts::ArtifactBundle;
use crate::features::assembler::FeatureAssembler;
use crate::vacancy::{GradeLabel, VacancyFeatures};
use log::debug;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryPrediction {
    /// Finite and never negative
    pub amount: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradePrediction {
    pub code: i64,
    pub label: GradeLabel,
}

pub struct PredictionService {
    artifacts: Arc<ArtifactBundle>,
    assembler: FeatureAssembler,
}

impl PredictionService {
    pub fn new(artifacts: Arc<ArtifactBundle>) -> Self {
        let assembler = FeatureAssembler::new(Arc::clone(&artifacts));
        Self { artifacts, assembler }
    }

    pub fn assembler(&self) -> &FeatureAssembler {
        &self.assembler
    }

    /// Predict the salary for a vacancy; currency is echoed from the input
    pub fn predict_salary(&self, features: &VacancyFeatures) -> Result<SalaryPrediction> {
        let vector = self.assembler.assemble_full(features)?;
        let raw = self.artifacts.salary_model.predict(vector.view())?;

        if !raw.is_finite() {
            return Err(VacancyInsightsError::ModelOutput(format!(
                "salary model returned a non-finite value ({})",
                raw
            )));
        }
        debug!("Salary model raw output: {}", raw);

        Ok(SalaryPrediction {
            amount: raw.max(0.0),
            currency: features.currency().to_string(),
        })
    }

    /// Predict the seniority grade from the description embedding
    pub fn predict_grade(&self, features: &VacancyFeatures) -> Result<GradePrediction> {
        let vector = self.assembler.assemble_embedding_only(features)?;
        let code = self.artifacts.grade_model.predict_class(vector.view())?;
        debug!("Grade model class: {}", code);

        Ok(GradePrediction {
            code,
            label: GradeLabel::from_class(code),
        })
    }
}
