//! Salary and grade prediction over assembled feature vectors

pub mod service;
pub mod trees;

use crate::error::Result;
use ndarray::ArrayView1;

/// Trained salary regression model over the full feature layout
pub trait SalaryRegressor: Send + Sync {
    fn n_features(&self) -> usize;

    fn predict(&self, x: ArrayView1<f32>) -> Result<f64>;
}

/// Trained grade classifier over the embedding-only layout
pub trait GradeClassifier: Send + Sync {
    fn n_features(&self) -> usize;

    /// Raw class label as emitted by the model
    fn predict_class(&self, x: ArrayView1<f32>) -> Result<i64>;
}

pub use service::{GradePrediction, PredictionService, SalaryPrediction};
pub use trees::{GradientBoostedRegressor, RandomForestClassifier};
