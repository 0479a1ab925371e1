//! Report payloads rendered by the formatters

use crate::market::{MarketComparison, PromotionSkill, SkillFrequency, VacancySummary};
use crate::prediction::{GradePrediction, SalaryPrediction};
use crate::vacancy::Grade;
use serde::Serialize;

/// Every result the front-end can render
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "report", rename_all = "snake_case")]
pub enum InsightReport {
    Salary(SalaryPrediction),
    Grade(GradePrediction),
    Skills {
        filters: MarketFilters,
        skills: Vec<SkillFrequency>,
    },
    Vacancies {
        filters: MarketFilters,
        vacancies: Vec<VacancySummary>,
    },
    Comparison {
        comparison: MarketComparison,
    },
    Promotion {
        title: String,
        area_id: Option<i64>,
        from: Grade,
        to: Grade,
        skills: Vec<PromotionSkill>,
    },
    Area {
        query: String,
        area_id: Option<i64>,
    },
}

/// Filters echoed back alongside market results
#[derive(Debug, Clone, Default, Serialize)]
pub struct MarketFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
}

impl MarketFilters {
    pub fn describe(&self) -> String {
        let parts: Vec<String> = [
            self.title.as_ref().map(|t| format!("title \"{}\"", t)),
            self.area.as_ref().map(|a| format!("area {}", a)),
            self.grade.as_ref().map(|g| format!("grade {}", g)),
        ]
        .into_iter()
        .flatten()
        .collect();

        if parts.is_empty() {
            "whole market".to_string()
        } else {
            parts.join(", ")
        }
    }
}
