//! Market analytics over the stored vacancy corpus

pub mod comparison;
pub mod promotion;
pub mod query;
pub mod store;

pub use comparison::{ComparisonReport, MarketComparison, SalaryDelta, SkillAnalysis, NO_COMPARABLE_VACANCIES};
pub use promotion::{PromotionSkill, DEFAULT_PROMOTION_SKILLS, MIN_COHORT_SIZE};
pub use query::{SkillFrequency, VacancySummary, DEFAULT_VACANCY_LIMIT};
pub use store::{MarketStore, VacancyFilter};
