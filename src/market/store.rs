//! Read-only access to the stored vacancy corpus

use crate::error::{Result, VacancyInsightsError};
use crate::market::promotion::MIN_COHORT_SIZE;
use crate::vacancy::{skill_key, Grade};
use log::{debug, info};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OpenFlags, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Tables the corpus import job maintains
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS area (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS vacancy (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    area_id INTEGER REFERENCES area(id),
    experience_bucket TEXT NOT NULL,
    employer TEXT
);
CREATE TABLE IF NOT EXISTS vacancy_salary (
    vacancy_id INTEGER PRIMARY KEY REFERENCES vacancy(id),
    salary_rub REAL
);
CREATE TABLE IF NOT EXISTS vacancy_skill (
    vacancy_id INTEGER NOT NULL REFERENCES vacancy(id),
    skill_name TEXT NOT NULL
);
";

/// Every vacancy query reads from this join; the salary side may be null
pub(crate) const VACANCY_FROM: &str =
    "FROM vacancy v LEFT JOIN vacancy_salary s ON s.vacancy_id = v.id";

/// Composable vacancy predicate. Values are always bound, never inlined.
#[derive(Debug, Clone, Default)]
pub struct VacancyFilter {
    clauses: Vec<&'static str>,
    params: Vec<Value>,
}

impl VacancyFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive title substring; blank input adds no constraint
    pub fn title_contains(mut self, title: Option<&str>) -> Self {
        if let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) {
            self.clauses.push("instr(unicode_lower(v.title), ?) > 0");
            self.params.push(Value::Text(title.to_lowercase()));
        }
        self
    }

    pub fn area(mut self, area_id: Option<i64>) -> Self {
        if let Some(area_id) = area_id {
            self.clauses.push("v.area_id = ?");
            self.params.push(Value::Integer(area_id));
        }
        self
    }

    pub fn grade(mut self, grade: Option<Grade>) -> Self {
        if let Some(grade) = grade {
            self.clauses.push("v.experience_bucket = ?");
            self.params.push(Value::Text(grade.bucket().to_string()));
        }
        self
    }

    /// Only vacancies with a known positive salary
    pub fn with_salary(mut self) -> Self {
        self.clauses.push("s.salary_rub > 0");
        self
    }

    pub fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

/// Aggregated skill row for a filtered slice of the corpus
#[derive(Debug, Clone, PartialEq)]
pub struct SkillCount {
    /// Display spelling as stored
    pub name: String,
    /// Trimmed, lowercased grouping key
    pub key: String,
    pub frequency: i64,
    pub mean_salary: Option<f64>,
}

pub struct MarketStore {
    conn: Mutex<Connection>,
    min_cohort_size: usize,
}

impl MarketStore {
    /// Open the corpus database without write access
    pub fn open_read_only(path: &Path) -> Result<Self> {
        info!("Opening vacancy corpus: {}", path.display());
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Self::from_connection(conn)
    }

    /// Wrap an existing connection, registering the matching functions
    pub fn from_connection(conn: Connection) -> Result<Self> {
        register_functions(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            min_cohort_size: MIN_COHORT_SIZE,
        })
    }

    pub fn with_min_cohort_size(mut self, min_cohort_size: usize) -> Self {
        self.min_cohort_size = min_cohort_size.max(1);
        self
    }

    pub fn min_cohort_size(&self) -> usize {
        self.min_cohort_size
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| VacancyInsightsError::AnalysisFailed("store connection lock poisoned".to_string()))
    }

    /// Run a query with positional parameters and collect mapped rows
    pub(crate) fn query_rows<T, F>(&self, sql: &str, params: &[Value], map: F) -> Result<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        debug!("SQL: {} {:?}", sql, params);
        let conn = self.connection()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), map)?;
        Ok(rows.collect::<rusqlite::Result<Vec<T>>>()?)
    }

    /// Skill frequencies over the vacancies matching `filter`, most frequent first
    pub(crate) fn skill_counts(&self, filter: &VacancyFilter, limit: Option<usize>) -> Result<Vec<SkillCount>> {
        let mut sql = format!(
            "SELECT MIN(trim(k.skill_name)), skill_key(k.skill_name) AS skill_norm, COUNT(*) AS frequency, \
             AVG(s.salary_rub) \
             {} JOIN vacancy_skill k ON k.vacancy_id = v.id{}",
            VACANCY_FROM,
            filter.where_clause()
        );
        sql.push_str(if filter.where_clause().is_empty() {
            " WHERE skill_key(k.skill_name) <> ''"
        } else {
            " AND skill_key(k.skill_name) <> ''"
        });
        sql.push_str(" GROUP BY skill_norm ORDER BY frequency DESC, skill_norm ASC");

        let mut params = filter.params().to_vec();
        if let Some(limit) = limit {
            sql.push_str(" LIMIT ?");
            params.push(Value::Integer(limit as i64));
        }

        self.query_rows(&sql, &params, |row| {
            Ok(SkillCount {
                name: row.get(0)?,
                key: row.get(1)?,
                frequency: row.get(2)?,
                mean_salary: row.get(3)?,
            })
        })
    }

    /// Number of distinct vacancies matching `filter`
    pub(crate) fn count_vacancies(&self, filter: &VacancyFilter) -> Result<usize> {
        let sql = format!("SELECT COUNT(DISTINCT v.id) {}{}", VACANCY_FROM, filter.where_clause());
        let counts = self.query_rows(&sql, filter.params(), |row| row.get::<_, i64>(0))?;
        Ok(counts.first().copied().unwrap_or(0).max(0) as usize)
    }

    /// Known salaries of the vacancies matching `filter`, ascending
    pub(crate) fn salaries(&self, filter: &VacancyFilter) -> Result<Vec<f64>> {
        let filter = filter.clone().with_salary();
        let sql = format!(
            "SELECT s.salary_rub {}{} ORDER BY s.salary_rub ASC",
            VACANCY_FROM,
            filter.where_clause()
        );
        self.query_rows(&sql, filter.params(), |row| row.get(0))
    }
}

fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;

    // SQLite's built-in lower() only folds ASCII
    conn.create_scalar_function("unicode_lower", 1, flags, |ctx| {
        let value: Option<String> = ctx.get(0)?;
        Ok(value.map(|v| v.to_lowercase()))
    })?;

    conn.create_scalar_function("skill_key", 1, flags, |ctx| {
        let value: Option<String> = ctx.get(0)?;
        Ok(value.map(|v| skill_key(&v)).unwrap_or_default())
    })?;

    Ok(())
}
