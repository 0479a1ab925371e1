//! Structured vacancy inputs and their boundary validation

use crate::error::{Result, VacancyInsightsError};
use crate::features::text::TextProcessor;
use crate::vacancy::grade::Grade;
use crate::vacancy::skills::SkillList;
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// Currency assumed when the caller does not name one
pub const DEFAULT_CURRENCY: &str = "RUR";

/// Vacancy fields consumed by the feature assembler.
///
/// Every field is optional. Scalars the caller leaves out enter the model
/// as 0 unless [`VacancyFeatures::with_derived_scalars`] fills them first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VacancyFeatures {
    pub area_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub description_length: Option<u32>,
    pub description_words: Option<u32>,
    pub title_length: Option<u32>,
    pub num_skills: Option<u32>,
    pub skills: SkillList,
    pub grade: Option<Grade>,
    pub salary_currency: Option<String>,
}

impl VacancyFeatures {
    pub fn currency(&self) -> &str {
        self.salary_currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CURRENCY)
    }

    /// Fill absent lengths and counts from the title, description and skills
    pub fn with_derived_scalars(mut self) -> Self {
        let description = TextProcessor::stats(&self.description);
        let title = TextProcessor::stats(&self.title);
        let count = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);

        self.description_length.get_or_insert(count(description.character_count));
        self.description_words.get_or_insert(count(description.word_count));
        self.title_length.get_or_insert(count(title.character_count));
        self.num_skills.get_or_insert(count(self.skills.len()));
        self
    }
}

/// A vacancy to be compared with its market cohort
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacancyProfile {
    pub title: String,
    pub area_id: i64,
    pub grade: Grade,
    #[serde(default)]
    pub skills: SkillList,
    #[serde(default)]
    pub salary: Option<f64>,
}

impl VacancyProfile {
    /// Salary if it is usable for comparison (finite and positive)
    pub fn known_salary(&self) -> Option<f64> {
        self.salary.filter(|s| s.is_finite() && *s > 0.0)
    }
}

/// Untyped vacancy fields as they arrive from a front-end (JSON or flags).
///
/// Numbers may be given as JSON numbers or strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawVacancyFields {
    #[serde(deserialize_with = "string_or_number")]
    pub area_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub desc_len: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub desc_words: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub title_len: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub num_skills: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub exp_junior: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub exp_middle: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub exp_senior: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub exp_lead: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub grade: Option<String>,
    pub skills: Option<SkillList>,
    pub salary_currency: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub salary_rub: Option<String>,
}

impl RawVacancyFields {
    /// Validate once into the structured record. Never fails: malformed
    /// optional values are dropped with a warning.
    pub fn into_features(self) -> VacancyFeatures {
        let grade = self.resolve_grade();

        VacancyFeatures {
            area_id: lenient("area_id", self.area_id.as_deref()),
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            description_length: lenient("desc_len", self.desc_len.as_deref()),
            description_words: lenient("desc_words", self.desc_words.as_deref()),
            title_length: lenient("title_len", self.title_len.as_deref()),
            num_skills: lenient("num_skills", self.num_skills.as_deref()),
            skills: self.skills.unwrap_or_default(),
            grade,
            salary_currency: self.salary_currency.filter(|c| !c.trim().is_empty()),
        }
    }

    /// Salary in roubles, if present and parsable
    pub fn salary(&self) -> Option<f64> {
        lenient::<f64>("salary_rub", self.salary_rub.as_deref()).filter(|s| s.is_finite() && *s > 0.0)
    }

    /// Validate into a comparison profile. Title, region and grade are
    /// required here; an unrecognised grade is an `InvalidFilter` error.
    pub fn into_profile(self) -> Result<VacancyProfile> {
        let salary = self.salary();
        let title = self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| VacancyInsightsError::InvalidInput("a vacancy title is required".to_string()))?
            .to_string();
        let area_id = self
            .area_id
            .as_deref()
            .and_then(|a| a.trim().parse::<i64>().ok())
            .ok_or_else(|| VacancyInsightsError::InvalidInput("a numeric area id is required".to_string()))?;
        let grade = match self.grade.as_deref().filter(|g| !g.trim().is_empty()) {
            Some(value) => Grade::parse(value)?,
            None => self.resolve_grade().ok_or_else(|| {
                VacancyInsightsError::InvalidInput("a grade is required for market comparison".to_string())
            })?,
        };

        Ok(VacancyProfile {
            title,
            area_id,
            grade,
            skills: self.skills.unwrap_or_default(),
            salary,
        })
    }

    fn resolve_grade(&self) -> Option<Grade> {
        if let Some(value) = self.grade.as_deref().filter(|v| !v.trim().is_empty()) {
            return match Grade::parse(value) {
                Ok(grade) => Some(grade),
                Err(e) => {
                    warn!("Ignoring grade field: {}", e);
                    None
                }
            };
        }

        let bits = [&self.exp_junior, &self.exp_middle, &self.exp_senior, &self.exp_lead];
        let set: Vec<Grade> = bits
            .iter()
            .zip(Grade::ALL)
            .filter(|(bit, _)| lenient::<f64>("exp_*", bit.as_deref()).unwrap_or(0.0) > 0.0)
            .map(|(_, grade)| grade)
            .collect();

        match set.as_slice() {
            [] => None,
            [grade] => Some(*grade),
            _ => {
                warn!("Ignoring {} conflicting seniority indicators", set.len());
                None
            }
        }
    }
}

fn lenient<T: FromStr>(field: &str, value: Option<&str>) -> Option<T> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    match value.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("Ignoring unparsable {} value '{}'", field, value);
            None
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Bool(b)) => Some(if b { "1" } else { "0" }.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_scalars_fill_only_absent_fields() {
        let features = VacancyFeatures {
            title: "Python developer".to_string(),
            description: "Python разработчик, Django и SQL".to_string(),
            skills: SkillList::from("Python;Django;SQL;Git"),
            description_words: Some(120),
            ..Default::default()
        }
        .with_derived_scalars();

        assert_eq!(features.description_length, Some(32));
        assert_eq!(features.description_words, Some(120));
        assert_eq!(features.title_length, Some(16));
        assert_eq!(features.num_skills, Some(4));
    }

    #[test]
    fn test_raw_fields_from_json_numbers_and_strings() {
        let raw: RawVacancyFields = serde_json::from_str(
            r#"{"area_id": 3, "desc_len": "1200", "title": "Python developer",
                "exp_middle": 1, "salary_currency": "RUR"}"#,
        )
        .unwrap();
        let features = raw.into_features();

        assert_eq!(features.area_id, Some(3));
        assert_eq!(features.description_length, Some(1200));
        assert_eq!(features.grade, Some(Grade::Middle));
        assert_eq!(features.currency(), "RUR");
    }

    #[test]
    fn test_malformed_optional_fields_become_absent() {
        let raw = RawVacancyFields {
            area_id: Some("moscow".to_string()),
            num_skills: Some("-".to_string()),
            salary_rub: Some("a lot".to_string()),
            ..Default::default()
        };
        assert_eq!(raw.salary(), None);

        let features = raw.into_features();
        assert_eq!(features.area_id, None);
        assert_eq!(features.num_skills, None);
    }

    #[test]
    fn test_conflicting_seniority_bits_mean_unspecified() {
        let raw = RawVacancyFields {
            exp_junior: Some("1".to_string()),
            exp_lead: Some("1".to_string()),
            ..Default::default()
        };
        assert_eq!(raw.into_features().grade, None);
    }

    #[test]
    fn test_grade_field_takes_precedence_over_bits() {
        let raw = RawVacancyFields {
            grade: Some("lead".to_string()),
            exp_junior: Some("1".to_string()),
            ..Default::default()
        };
        assert_eq!(raw.into_features().grade, Some(Grade::Lead));
    }

    #[test]
    fn test_default_currency() {
        let features = VacancyFeatures {
            salary_currency: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(features.currency(), DEFAULT_CURRENCY);
    }

    #[test]
    fn test_into_profile_requires_core_fields() {
        let raw: RawVacancyFields = serde_json::from_str(
            r#"{"title": "Python", "area_id": "3", "grade": "middle",
                "skills": ["Python", "SQL"], "salary_rub": 120000}"#,
        )
        .unwrap();
        let profile = raw.into_profile().unwrap();
        assert_eq!(profile.area_id, 3);
        assert_eq!(profile.grade, Grade::Middle);
        assert_eq!(profile.salary, Some(120000.0));
        assert_eq!(profile.skills.len(), 2);

        let missing_area = RawVacancyFields {
            title: Some("Python".to_string()),
            grade: Some("1".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            missing_area.into_profile(),
            Err(VacancyInsightsError::InvalidInput(_))
        ));

        let bad_grade = RawVacancyFields {
            title: Some("Python".to_string()),
            area_id: Some("1".to_string()),
            grade: Some("guru".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            bad_grade.into_profile(),
            Err(VacancyInsightsError::InvalidFilter(_))
        ));
    }

    #[test]
    fn test_profile_known_salary() {
        let mut profile = VacancyProfile {
            title: "python".to_string(),
            area_id: 1,
            grade: Grade::Middle,
            skills: SkillList::default(),
            salary: Some(0.0),
        };
        assert_eq!(profile.known_salary(), None);
        profile.salary = Some(120000.0);
        assert_eq!(profile.known_salary(), Some(120000.0));
    }
}
