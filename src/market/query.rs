//! Skill frequency, top-paying vacancy, and region lookups

use crate::error::Result;
use crate::market::store::{MarketStore, VacancyFilter, VACANCY_FROM};
use crate::vacancy::Grade;
use log::{debug, warn};
use rusqlite::types::Value;
use serde::Serialize;

/// Number of rows `top_5_skills` returns
pub const TOP_SKILLS: usize = 5;

/// Default row count for `top_vacancies`
pub const DEFAULT_VACANCY_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillFrequency {
    pub skill: String,
    pub frequency: i64,
    /// Mean over vacancies with a known salary, rounded to the nearest integer
    pub mean_salary: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VacancySummary {
    pub id: i64,
    pub title: String,
    pub employer: Option<String>,
    pub area_id: Option<i64>,
    pub experience: String,
    pub grade: Option<Grade>,
    pub salary: f64,
}

fn parse_grade(grade: Option<&str>) -> Result<Option<Grade>> {
    grade
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(Grade::parse)
        .transpose()
}

impl MarketStore {
    /// Five most frequent skills among vacancies matching the optional filters
    pub fn top_5_skills(
        &self,
        title: Option<&str>,
        area_id: Option<i64>,
        grade: Option<&str>,
    ) -> Result<Vec<SkillFrequency>> {
        let filter = VacancyFilter::new()
            .title_contains(title)
            .area(area_id)
            .grade(parse_grade(grade)?);

        let rows = self.skill_counts(&filter, Some(TOP_SKILLS))?;
        debug!("Top skills query returned {} rows", rows.len());

        Ok(rows
            .into_iter()
            .map(|row| SkillFrequency {
                skill: row.name,
                frequency: row.frequency,
                mean_salary: row.mean_salary.map(|m| m.round() as i64),
            })
            .collect())
    }

    /// Highest-paying vacancies, salary descending then id ascending.
    ///
    /// An `area_name` that resolves to no region drops the region filter.
    pub fn top_vacancies(
        &self,
        area_name: Option<&str>,
        keyword: Option<&str>,
        grade: Option<&str>,
        limit: usize,
    ) -> Result<Vec<VacancySummary>> {
        let grade = parse_grade(grade)?;
        if limit == 0 {
            return Ok(Vec::new());
        }

        let area_id = match area_name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => {
                let area_id = self.get_area_id_by_city(name)?;
                if area_id.is_none() {
                    warn!("Region '{}' not found, searching all regions", name);
                }
                area_id
            }
            None => None,
        };

        let filter = VacancyFilter::new()
            .with_salary()
            .area(area_id)
            .title_contains(keyword)
            .grade(grade);
        let sql = format!(
            "SELECT v.id, v.title, v.employer, v.area_id, v.experience_bucket, s.salary_rub \
             {}{} ORDER BY s.salary_rub DESC, v.id ASC LIMIT ?",
            VACANCY_FROM,
            filter.where_clause()
        );
        let mut params = filter.params().to_vec();
        params.push(Value::Integer(limit as i64));

        self.query_rows(&sql, &params, |row| {
            let experience: String = row.get(4)?;
            Ok(VacancySummary {
                id: row.get(0)?,
                title: row.get(1)?,
                employer: row.get(2)?,
                area_id: row.get(3)?,
                grade: Grade::from_bucket(&experience),
                experience,
                salary: row.get(5)?,
            })
        })
    }

    /// First region (lowest id) whose name contains `name`, case-insensitively.
    ///
    /// Overlapping names such as a city and its surrounding oblast are not
    /// disambiguated.
    pub fn get_area_id_by_city(&self, name: &str) -> Result<Option<i64>> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(None);
        }

        let ids = self.query_rows(
            "SELECT id FROM area WHERE instr(unicode_lower(name), ?) > 0 ORDER BY id ASC LIMIT 1",
            &[Value::Text(needle)],
            |row| row.get::<_, i64>(0),
        )?;
        Ok(ids.first().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VacancyInsightsError;
    use crate::market::store::SCHEMA;
    use rusqlite::Connection;

    fn store() -> MarketStore {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute_batch(
            "INSERT INTO area VALUES (1, 'Москва'), (2, 'Санкт-Петербург'), (2019, 'Московская область');
             INSERT INTO vacancy VALUES
                (1, 'Python developer', 1, 'От 1 года до 3 лет', 'Яндекс'),
                (2, 'Senior Python developer', 2, 'От 3 до 6 лет', 'VK'),
                (3, 'Python разработчик', 1, 'От 1 года до 3 лет', 'Сбер'),
                (4, 'Go developer', 1, 'От 1 года до 3 лет', 'Ozon');
             INSERT INTO vacancy_salary VALUES (1, 150000), (2, 250000), (3, 150000), (4, NULL);
             INSERT INTO vacancy_skill VALUES
                (1, 'Python'), (1, 'SQL'), (2, 'python'), (2, 'Kafka'), (3, 'Python'), (4, 'Go');",
        )
        .unwrap();
        MarketStore::from_connection(conn).unwrap()
    }

    #[test]
    fn test_top_skills_respects_filters() {
        let store = store();
        let skills = store.top_5_skills(Some("python"), Some(1), Some("1")).unwrap();

        assert_eq!(skills.len(), 2);
        assert_eq!(skills[0].skill, "Python");
        assert_eq!(skills[0].frequency, 2);
        assert_eq!(skills[0].mean_salary, Some(150000));
        assert_eq!(skills[1].skill, "SQL");
    }

    #[test]
    fn test_top_skills_without_salaries() {
        let store = store();
        let skills = store.top_5_skills(Some("go"), None, None).unwrap();
        assert_eq!(skills, vec![SkillFrequency { skill: "Go".to_string(), frequency: 1, mean_salary: None }]);
    }

    #[test]
    fn test_invalid_grade_is_rejected() {
        let store = store();
        let err = store.top_5_skills(None, None, Some("principal")).unwrap_err();
        assert!(matches!(err, VacancyInsightsError::InvalidFilter(_)));

        let err = store.top_vacancies(None, None, Some("9"), 5).unwrap_err();
        assert!(matches!(err, VacancyInsightsError::InvalidFilter(_)));
    }

    #[test]
    fn test_top_vacancies_orders_by_salary_then_id() {
        let store = store();
        let vacancies = store.top_vacancies(None, Some("python"), None, 5).unwrap();

        let ids: Vec<i64> = vacancies.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
        assert_eq!(vacancies[0].grade, Some(Grade::Senior));
        assert_eq!(vacancies[0].employer.as_deref(), Some("VK"));
    }

    #[test]
    fn test_top_vacancies_skips_unknown_salary_and_limits() {
        let store = store();
        let vacancies = store.top_vacancies(Some("москва"), None, None, 1).unwrap();
        assert_eq!(vacancies.len(), 1);
        assert_eq!(vacancies[0].id, 1);

        assert!(store.top_vacancies(None, Some("go"), None, 5).unwrap().is_empty());
        assert!(store.top_vacancies(None, None, None, 0).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_area_name_drops_region_filter() {
        let store = store();
        let vacancies = store.top_vacancies(Some("Атлантида"), Some("python"), None, 5).unwrap();
        assert_eq!(vacancies.len(), 3);
    }

    #[test]
    fn test_area_lookup_first_match() {
        let store = store();
        assert_eq!(store.get_area_id_by_city("Москва").unwrap(), Some(1));
        assert_eq!(store.get_area_id_by_city("моск").unwrap(), Some(1));
        assert_eq!(store.get_area_id_by_city("ОБЛАСТЬ").unwrap(), Some(2019));
        assert_eq!(store.get_area_id_by_city("Казань").unwrap(), None);
        assert_eq!(store.get_area_id_by_city("  ").unwrap(), None);
    }
}
