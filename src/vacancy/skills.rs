//! Declared skill lists and skill-name normalization

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Delimiter used when skills arrive as one string
pub const SKILL_DELIMITER: char = ';';

/// Canonical comparison key for a skill name: trimmed and lowercased
pub fn skill_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Skills as supplied by a caller, either one delimited string or a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkillList {
    Delimited(String),
    Items(Vec<String>),
}

impl Default for SkillList {
    fn default() -> Self {
        SkillList::Items(Vec::new())
    }
}

impl From<&str> for SkillList {
    fn from(value: &str) -> Self {
        SkillList::Delimited(value.to_string())
    }
}

impl From<Vec<String>> for SkillList {
    fn from(value: Vec<String>) -> Self {
        SkillList::Items(value)
    }
}

impl SkillList {
    /// Trimmed, non-empty skills with case-insensitive duplicates removed.
    /// The first spelling of each skill is kept for display.
    pub fn normalized(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            SkillList::Delimited(text) => text.split(SKILL_DELIMITER).collect(),
            SkillList::Items(items) => items.iter().map(|s| s.as_str()).collect(),
        };

        let mut seen = HashSet::new();
        raw.into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter(|s| seen.insert(skill_key(s)))
            .map(str::to_string)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.normalized().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimited_skills_are_trimmed_and_deduplicated() {
        let skills = SkillList::from(" Python; SQL ;;python; Django ");
        assert_eq!(skills.normalized(), vec!["Python", "SQL", "Django"]);
        assert_eq!(skills.len(), 3);
    }

    #[test]
    fn test_list_skills_keep_original_casing() {
        let skills = SkillList::from(vec!["PostgreSQL".to_string(), "  ".to_string(), "postgresql".to_string()]);
        assert_eq!(skills.normalized(), vec!["PostgreSQL"]);
    }

    #[test]
    fn test_skill_key_handles_cyrillic() {
        assert_eq!(skill_key("  Английский Язык "), "английский язык");
    }

    #[test]
    fn test_untagged_deserialization() {
        let text: SkillList = serde_json::from_str("\"Rust;Go\"").unwrap();
        assert_eq!(text.normalized(), vec!["Rust", "Go"]);

        let list: SkillList = serde_json::from_str("[\"Rust\", \"Go\"]").unwrap();
        assert_eq!(list.normalized(), vec!["Rust", "Go"]);
    }
}
