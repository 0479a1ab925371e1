//! Vacancy insights library: salary and grade prediction plus market analytics

pub mod cli;
pub mod config;
pub mod error;
pub mod features;
pub mod market;
pub mod output;
pub mod prediction;
pub mod vacancy;

pub use config::Config;
pub use error::{Result, VacancyInsightsError};
