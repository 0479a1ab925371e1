//! Vacancy domain types shared by prediction and market analytics

pub mod grade;
pub mod record;
pub mod skills;

pub use grade::{Grade, GradeLabel};
pub use record::{RawVacancyFields, VacancyFeatures, VacancyProfile, DEFAULT_CURRENCY};
pub use skills::{skill_key, SkillList};
