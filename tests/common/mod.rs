//! Shared fixtures: a small vacancy corpus and a set of tiny model artifacts

#![allow(dead_code)]

use rusqlite::{params, Connection};
use std::path::Path;
use tempfile::TempDir;
use vacancy_insights::config::{ArtifactConfig, Config};
use vacancy_insights::market::store::SCHEMA;
use vacancy_insights::market::MarketStore;

pub const JUNIOR: &str = "Нет опыта";
pub const MIDDLE: &str = "От 1 года до 3 лет";
pub const LEAD: &str = "Более 6 лет";

/// (id, title, area, bucket, salary, skills)
pub const VACANCIES: &[(i64, &str, i64, &str, Option<f64>, &[&str])] = &[
    (1, "Python developer", 3, MIDDLE, Some(80000.0), &["Python", "Django", "SQL"]),
    (2, "Python backend developer", 3, MIDDLE, Some(100000.0), &["Python", "PostgreSQL", "Docker"]),
    (3, "Python разработчик", 3, MIDDLE, Some(150000.0), &["python", "Docker", "Kafka", " SQL "]),
    (4, "Python developer", 3, MIDDLE, None, &["Python", "Git"]),
    (5, "Junior Python developer", 3, JUNIOR, Some(50000.0), &["Python", "Git"]),
    (6, "Python стажёр", 3, JUNIOR, None, &["Python", "SQL"]),
    (7, "Python developer", 3, JUNIOR, Some(60000.0), &["Python", "Git", "HTML"]),
    (8, "Java developer", 3, MIDDLE, Some(130000.0), &["Java", "Spring", "SQL"]),
    (9, "Python developer", 1, MIDDLE, Some(200000.0), &["Python", "Kubernetes"]),
    (10, "Lead Python engineer", 1, LEAD, Some(400000.0), &["Python", "Architecture"]),
    (11, "Python developer", 2019, MIDDLE, Some(90000.0), &["Python"]),
];

pub const AREAS: &[(i64, &str)] = &[
    (1, "Москва"),
    (2, "Санкт-Петербург"),
    (3, "Екатеринбург"),
    (2019, "Московская область"),
];

pub fn populate(conn: &Connection) {
    conn.execute_batch(SCHEMA).unwrap();
    for (id, name) in AREAS {
        conn.execute("INSERT INTO area (id, name) VALUES (?1, ?2)", params![id, name])
            .unwrap();
    }
    for (id, title, area, bucket, salary, skills) in VACANCIES {
        conn.execute(
            "INSERT INTO vacancy (id, title, area_id, experience_bucket, employer) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, title, area, bucket, format!("Employer {}", id)],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO vacancy_salary (vacancy_id, salary_rub) VALUES (?1, ?2)",
            params![id, salary],
        )
        .unwrap();
        for skill in skills.iter() {
            conn.execute(
                "INSERT INTO vacancy_skill (vacancy_id, skill_name) VALUES (?1, ?2)",
                params![id, skill],
            )
            .unwrap();
        }
    }
}

pub fn fixture_store() -> MarketStore {
    let conn = Connection::open_in_memory().unwrap();
    populate(&conn);
    MarketStore::from_connection(conn).unwrap()
}

/// Skills declared by the given vacancy ids, lowercased and trimmed
pub fn skill_keys_of(ids: &[i64]) -> Vec<String> {
    VACANCIES
        .iter()
        .filter(|v| ids.contains(&v.0))
        .flat_map(|v| v.5.iter().map(|s| s.trim().to_lowercase()))
        .collect()
}

pub const EMBEDDING_WIDTH: usize = 8;

pub const DESCRIPTION_TFIDF: &str = r#"{
    "vocabulary": {"python": 0, "django": 1, "sql": 2, "docker": 3, "kafka": 4},
    "idf": [1.1, 1.9, 1.4, 1.6, 2.2],
    "sublinear_tf": true
}"#;

pub const TITLE_TFIDF: &str = r#"{
    "vocabulary": {"python": 0, "developer": 1, "senior": 2, "lead": 3},
    "idf": [1.2, 1.0, 1.8, 2.1]
}"#;

pub const CATEGORIES: &str = r#"{"categories": [["1", "2", "3", "2019"], ["RUR", "USD", "EUR"]]}"#;

/// 9 numeric + 5 description + 4 title + 7 categorical + 8 embedding = 33,
/// trained on log salary
pub const SALARY_MODEL: &str = r#"{
    "n_features": 33,
    "base_score": 11.0,
    "output_transform": "expm1",
    "trees": [
        {"nodes": [
            {"feature": 8, "threshold": 0.5, "left": 1, "right": 2},
            {"value": 0.2},
            {"value": 1.1}
        ]},
        {"nodes": [
            {"feature": 17, "threshold": 0.0, "left": 1, "right": 2},
            {"value": 0.0},
            {"value": 0.4}
        ]},
        {"nodes": [
            {"feature": 0, "threshold": 1.5, "left": 1, "right": 2},
            {"value": 0.3},
            {"value": -0.1}
        ]}
    ]
}"#;

pub const GRADE_MODEL: &str = r#"{
    "n_features": 8,
    "classes": [0, 1, 2, 3],
    "trees": [
        {"nodes": [
            {"feature": 0, "threshold": 0.0, "left": 1, "right": 2},
            {"value": [2, 5, 2, 1]},
            {"value": [0, 2, 5, 3]}
        ]},
        {"nodes": [
            {"feature": 3, "threshold": 0.1, "left": 1, "right": 2},
            {"value": [1, 6, 2, 1]},
            {"value": [0, 1, 3, 6]}
        ]}
    ]
}"#;

pub fn write_artifacts(dir: &Path) -> ArtifactConfig {
    let mut config = Config::default().artifacts;
    config.artifacts_dir = dir.to_path_buf();
    for (file, content) in [
        (&config.description_vectorizer, DESCRIPTION_TFIDF),
        (&config.title_vectorizer, TITLE_TFIDF),
        (&config.category_encoder, CATEGORIES),
        (&config.salary_model, SALARY_MODEL),
        (&config.grade_model, GRADE_MODEL),
    ] {
        std::fs::write(dir.join(file), content).unwrap();
    }
    config
}

pub fn artifact_dir() -> (TempDir, ArtifactConfig) {
    let dir = TempDir::new().unwrap();
    let config = write_artifacts(dir.path());
    (dir, config)
}
