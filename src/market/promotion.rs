//! Skills that distinguish a higher grade from a lower one

use crate::error::Result;
use crate::market::store::{MarketStore, VacancyFilter};
use crate::vacancy::Grade;
use log::{debug, info};
use serde::Serialize;
use std::collections::HashMap;

/// Cohorts smaller than this are too thin to compare
pub const MIN_COHORT_SIZE: usize = 3;

/// Default number of skills `promotion_skills` returns
pub const DEFAULT_PROMOTION_SKILLS: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromotionSkill {
    pub skill: String,
    pub from_frequency: i64,
    pub to_frequency: i64,
    /// Always positive
    pub delta: i64,
}

impl PromotionSkill {
    pub fn total(&self) -> i64 {
        self.from_frequency + self.to_frequency
    }
}

impl MarketStore {
    /// Skills more frequent in the `grade_to` cohort than in `grade_from`.
    ///
    /// Empty when either cohort holds fewer than the configured minimum
    /// of distinct vacancies.
    pub fn promotion_skills(
        &self,
        title: &str,
        area_id: Option<i64>,
        grade_from: &str,
        grade_to: &str,
        top_n: usize,
    ) -> Result<Vec<PromotionSkill>> {
        let from = Grade::parse(grade_from)?;
        let to = Grade::parse(grade_to)?;

        let base = VacancyFilter::new().title_contains(Some(title)).area(area_id);
        let from_cohort = base.clone().grade(Some(from));
        let to_cohort = base.grade(Some(to));

        let from_size = self.count_vacancies(&from_cohort)?;
        let to_size = self.count_vacancies(&to_cohort)?;
        if from_size < self.min_cohort_size() || to_size < self.min_cohort_size() {
            info!(
                "Cohorts too small for promotion analysis ({}: {}, {}: {}, minimum {})",
                from,
                from_size,
                to,
                to_size,
                self.min_cohort_size()
            );
            return Ok(Vec::new());
        }

        let from_counts: HashMap<String, i64> = self
            .skill_counts(&from_cohort, None)?
            .into_iter()
            .map(|row| (row.key, row.frequency))
            .collect();

        let mut skills: Vec<(String, PromotionSkill)> = self
            .skill_counts(&to_cohort, None)?
            .into_iter()
            .filter_map(|row| {
                let from_frequency = from_counts.get(&row.key).copied().unwrap_or(0);
                let delta = row.frequency - from_frequency;
                (delta > 0).then(|| {
                    (
                        row.key,
                        PromotionSkill {
                            skill: row.name,
                            from_frequency,
                            to_frequency: row.frequency,
                            delta,
                        },
                    )
                })
            })
            .collect();

        skills.sort_by(|(a_key, a), (b_key, b)| {
            b.delta
                .cmp(&a.delta)
                .then_with(|| b.total().cmp(&a.total()))
                .then_with(|| a_key.cmp(b_key))
        });
        skills.truncate(top_n);
        debug!("{} promotion skills from {} to {}", skills.len(), from, to);

        Ok(skills.into_iter().map(|(_, skill)| skill).collect())
    }
}
