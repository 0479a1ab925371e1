//! Seniority grades and the single ordinal / label / bucket lookup

use crate::error::{Result, VacancyInsightsError};
use serde::{Deserialize, Serialize};
use std::fmt;
use strsim::jaro_winkler;

/// One of the four canonical seniority buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Junior,
    Middle,
    Senior,
    Lead,
}

impl Grade {
    pub const ALL: [Grade; 4] = [Grade::Junior, Grade::Middle, Grade::Senior, Grade::Lead];

    pub fn ordinal(self) -> u8 {
        match self {
            Grade::Junior => 0,
            Grade::Middle => 1,
            Grade::Senior => 2,
            Grade::Lead => 3,
        }
    }

    pub fn from_ordinal(ordinal: i64) -> Option<Grade> {
        match ordinal {
            0 => Some(Grade::Junior),
            1 => Some(Grade::Middle),
            2 => Some(Grade::Senior),
            3 => Some(Grade::Lead),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Grade::Junior => "junior",
            Grade::Middle => "middle",
            Grade::Senior => "senior",
            Grade::Lead => "lead",
        }
    }

    /// Experience bucket as stored in the vacancy corpus
    pub fn bucket(self) -> &'static str {
        match self {
            Grade::Junior => "Нет опыта",
            Grade::Middle => "От 1 года до 3 лет",
            Grade::Senior => "От 3 до 6 лет",
            Grade::Lead => "Более 6 лет",
        }
    }

    pub fn from_bucket(bucket: &str) -> Option<Grade> {
        let bucket = bucket.trim();
        Grade::ALL.into_iter().find(|g| g.bucket() == bucket)
    }

    pub fn from_label(label: &str) -> Option<Grade> {
        let label = label.trim().to_lowercase();
        Grade::ALL.into_iter().find(|g| g.label() == label)
    }

    /// Parse an ordinal, an english label or a stored bucket string.
    ///
    /// Anything else is an `InvalidFilter` error.
    pub fn parse(value: &str) -> Result<Grade> {
        let trimmed = value.trim();

        if let Ok(ordinal) = trimmed.parse::<i64>() {
            return Grade::from_ordinal(ordinal).ok_or_else(|| {
                VacancyInsightsError::InvalidFilter(format!(
                    "grade {} is out of range, expected 0-3",
                    ordinal
                ))
            });
        }

        if let Some(grade) = Grade::from_label(trimmed).or_else(|| Grade::from_bucket(trimmed)) {
            return Ok(grade);
        }

        Err(VacancyInsightsError::InvalidFilter(Self::rejection_message(trimmed)))
    }

    fn rejection_message(value: &str) -> String {
        let accepted: Vec<String> = Grade::ALL
            .iter()
            .map(|g| format!("{} ({}, \"{}\")", g.ordinal(), g.label(), g.bucket()))
            .collect();
        let mut message = format!(
            "grade '{}' is not recognised; expected one of: {}",
            value,
            accepted.join(", ")
        );

        let lowered = value.to_lowercase();
        let suggestion = Grade::ALL
            .iter()
            .map(|g| (g, jaro_winkler(&lowered, g.label())))
            .filter(|(_, score)| *score >= 0.8)
            .max_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((grade, _)) = suggestion {
            message.push_str(&format!(" (did you mean '{}'?)", grade.label()));
        }
        message
    }

    /// One-hot seniority indicator bits in junior, middle, senior, lead order
    pub fn indicator_bits(grade: Option<Grade>) -> [f32; 4] {
        let mut bits = [0.0; 4];
        if let Some(grade) = grade {
            bits[grade.ordinal() as usize] = 1.0;
        }
        bits
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Grade as reported by the classifier; out-of-range classes stay representable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeLabel {
    Known(Grade),
    Unknown,
}

impl GradeLabel {
    pub fn from_class(class: i64) -> Self {
        Grade::from_ordinal(class).map_or(GradeLabel::Unknown, GradeLabel::Known)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GradeLabel::Known(grade) => grade.label(),
            GradeLabel::Unknown => "unknown",
        }
    }
}

impl Serialize for GradeLabel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for GradeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
