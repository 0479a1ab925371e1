//! Comparison of a single vacancy with its market cohort.
//!
//! The cohort (region, grade, title substring, known salary) feeds both the
//! salary median and the top-skill list, so skills from vacancies without a
//! salary are not counted.

use crate::error::Result;
use crate::market::store::{MarketStore, VacancyFilter};
use crate::vacancy::{skill_key, VacancyProfile};
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Rendered when the cohort is empty
pub const NO_COMPARABLE_VACANCIES: &str = "No comparable vacancies found for comparison.";

/// Size of the market skill list compared against the caller's skills
pub const MARKET_TOP_SKILLS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MarketComparison {
    NoComparableVacancies,
    Report(ComparisonReport),
}

impl fmt::Display for MarketComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketComparison::NoComparableVacancies => write!(f, "{}", NO_COMPARABLE_VACANCIES),
            MarketComparison::Report(report) => write!(
                f,
                "Compared with {} vacancies, median salary {:.0}",
                report.cohort_size, report.median_salary
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub cohort_size: usize,
    pub median_salary: f64,
    pub salary: Option<SalaryDelta>,
    pub skills: SkillAnalysis,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryDelta {
    pub salary: f64,
    /// `salary - median`, rounded
    pub delta: i64,
    /// Signed percentage of the median, one decimal place, halves to even
    pub percentage: f64,
}

impl SalaryDelta {
    pub fn new(salary: f64, median: f64) -> Self {
        let difference = salary - median;
        Self {
            salary,
            delta: difference.round() as i64,
            percentage: (100.0 * difference / median * 10.0).round_ties_even() / 10.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SkillAnalysis {
    /// Most frequent cohort skills, most frequent first
    pub market_top: Vec<String>,
    /// Caller skills among the market top
    pub common: Vec<String>,
    /// Caller skills outside the market top
    pub unique: Vec<String>,
    /// Market top skills the caller lacks
    pub missing: Vec<String>,
}

impl SkillAnalysis {
    pub fn new(market_top: Vec<String>, caller: &[String]) -> Self {
        let market_keys: HashSet<String> = market_top.iter().map(|s| skill_key(s)).collect();
        let caller_keys: HashSet<String> = caller.iter().map(|s| skill_key(s)).collect();

        let (common, unique): (Vec<String>, Vec<String>) = caller
            .iter()
            .cloned()
            .partition(|skill| market_keys.contains(&skill_key(skill)));
        let missing = market_top
            .iter()
            .filter(|skill| !caller_keys.contains(&skill_key(skill)))
            .cloned()
            .collect();

        Self {
            market_top,
            common,
            unique,
            missing,
        }
    }
}

/// Median of an ascending slice; mean of the middle pair for even lengths
pub fn median(sorted: &[f64]) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    })
}

impl MarketStore {
    /// Compare a vacancy with others of the same region, grade and title
    pub fn compare_vacancy_to_market(&self, vacancy: &VacancyProfile) -> Result<MarketComparison> {
        let cohort = VacancyFilter::new()
            .area(Some(vacancy.area_id))
            .grade(Some(vacancy.grade))
            .title_contains(Some(vacancy.title.as_str()))
            .with_salary();

        let salaries = self.salaries(&cohort)?;
        let median_salary = match median(&salaries) {
            Some(median) => median,
            None => {
                info!(
                    "No comparable vacancies for '{}' in area {} ({})",
                    vacancy.title, vacancy.area_id, vacancy.grade
                );
                return Ok(MarketComparison::NoComparableVacancies);
            }
        };
        debug!("Cohort of {} salaries, median {}", salaries.len(), median_salary);

        let market_top: Vec<String> = self
            .skill_counts(&cohort, Some(MARKET_TOP_SKILLS))?
            .into_iter()
            .map(|row| row.name)
            .collect();

        Ok(MarketComparison::Report(ComparisonReport {
            cohort_size: salaries.len(),
            median_salary,
            salary: vacancy
                .known_salary()
                .map(|salary| SalaryDelta::new(salary, median_salary)),
            skills: SkillAnalysis::new(market_top, &vacancy.skills.normalized()),
            generated_at: Utc::now(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[100.0]), Some(100.0));
        assert_eq!(median(&[80.0, 100.0, 300.0]), Some(100.0));
        assert_eq!(median(&[80.0, 100.0, 120.0, 300.0]), Some(110.0));
    }

    #[test]
    fn test_salary_delta_signs() {
        let above = SalaryDelta::new(120000.0, 100000.0);
        assert_eq!(above.delta, 20000);
        assert_relative_eq!(above.percentage, 20.0);

        let below = SalaryDelta::new(90000.0, 120000.0);
        assert_eq!(below.delta, -30000);
        assert_relative_eq!(below.percentage, -25.0);

        let fractional = SalaryDelta::new(100000.0, 150000.0);
        assert_relative_eq!(fractional.percentage, -33.3);
    }

    #[test]
    fn test_percentage_halves_round_to_even() {
        assert_relative_eq!(SalaryDelta::new(449000.0, 400000.0).percentage, 12.2);
        assert_relative_eq!(SalaryDelta::new(351000.0, 400000.0).percentage, -12.2);
        assert_relative_eq!(SalaryDelta::new(401000.0, 400000.0).percentage, 0.2);
    }

    #[test]
    fn test_skill_analysis_partitions() {
        let analysis = SkillAnalysis::new(
            strings(&["Python", "SQL", "Docker"]),
            &strings(&["python", "Rust", "Docker"]),
        );
        assert_eq!(analysis.common, strings(&["python", "Docker"]));
        assert_eq!(analysis.unique, strings(&["Rust"]));
        assert_eq!(analysis.missing, strings(&["SQL"]));
    }

    #[test]
    fn test_sentinel_rendering() {
        assert_eq!(
            MarketComparison::NoComparableVacancies.to_string(),
            "No comparable vacancies found for comparison."
        );
    }
}
