//! CLI interface for vacancy insights

use crate::config::OutputFormat;
use crate::error::{Result, VacancyInsightsError};
use crate::vacancy::{RawVacancyFields, SkillList, VacancyFeatures};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "vacancy-insights")]
#[command(about = "Salary and grade prediction with labor-market analytics")]
#[command(long_about = "Predict salary and seniority for a vacancy and explore skill demand, salaries and promotion paths in a stored vacancy corpus")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format, overrides the configured one
    #[arg(short, long, global = true, value_enum)]
    pub format: Option<OutputFormat>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Predict the salary of a vacancy
    Salary(VacancyArgs),

    /// Predict the seniority grade of a vacancy
    Grade(VacancyArgs),

    /// Most demanded skills for a market slice
    Skills {
        /// Title substring, case-insensitive
        #[arg(short, long)]
        title: Option<String>,

        /// Region id
        #[arg(short, long)]
        area_id: Option<i64>,

        /// Grade: 0-3, junior/middle/senior/lead or a stored experience bucket
        #[arg(short, long)]
        grade: Option<String>,
    },

    /// Highest-paying vacancies
    Top {
        /// City or region name, first match wins
        #[arg(short, long)]
        area: Option<String>,

        /// Title keyword, case-insensitive
        #[arg(short, long)]
        keyword: Option<String>,

        #[arg(short, long)]
        grade: Option<String>,

        /// Number of vacancies to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Compare a vacancy with its market cohort
    Compare(VacancyArgs),

    /// Skills that separate one grade from the next
    Promote {
        /// Title substring shared by both cohorts
        title: String,

        #[arg(short, long)]
        area_id: Option<i64>,

        /// Current grade
        #[arg(long)]
        from: String,

        /// Target grade
        #[arg(long)]
        to: String,

        /// Number of skills to show
        #[arg(short = 'n', long)]
        top: Option<usize>,
    },

    /// Resolve a city name to its region id
    Area {
        name: String,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

/// Vacancy fields given as flags, a JSON file, or both (flags win)
#[derive(Args, Debug, Default)]
pub struct VacancyArgs {
    /// JSON file with vacancy fields
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    #[arg(short, long)]
    pub title: Option<String>,

    #[arg(short, long)]
    pub description: Option<String>,

    #[arg(short, long)]
    pub area_id: Option<i64>,

    /// Skills separated by ';'
    #[arg(short, long)]
    pub skills: Option<String>,

    #[arg(short, long)]
    pub grade: Option<String>,

    /// Salary currency, RUR when omitted
    #[arg(long)]
    pub currency: Option<String>,

    /// Offered salary in roubles (compare only)
    #[arg(long)]
    pub salary: Option<f64>,

    #[arg(long)]
    pub desc_len: Option<u32>,

    #[arg(long)]
    pub desc_words: Option<u32>,

    #[arg(long)]
    pub title_len: Option<u32>,

    #[arg(long)]
    pub num_skills: Option<u32>,

    /// Compute lengths and counts left unset from the text instead of using 0
    #[arg(long)]
    pub derive_scalars: bool,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}

impl VacancyArgs {
    /// Model inputs, with absent scalars derived when `--derive-scalars` is set
    pub fn into_features(self) -> Result<VacancyFeatures> {
        let derive = self.derive_scalars;
        let features = self.into_raw()?.into_features();
        Ok(if derive {
            features.with_derived_scalars()
        } else {
            features
        })
    }

    /// Merge the input file (if any) with flag values
    pub fn into_raw(self) -> Result<RawVacancyFields> {
        let mut raw = match &self.input {
            Some(path) => read_fields(path)?,
            None => RawVacancyFields::default(),
        };

        fn set<T: ToString>(target: &mut Option<String>, value: Option<T>) {
            if let Some(value) = value {
                *target = Some(value.to_string());
            }
        }

        set(&mut raw.title, self.title);
        set(&mut raw.description, self.description);
        set(&mut raw.area_id, self.area_id);
        set(&mut raw.grade, self.grade);
        set(&mut raw.salary_currency, self.currency);
        set(&mut raw.salary_rub, self.salary);
        set(&mut raw.desc_len, self.desc_len);
        set(&mut raw.desc_words, self.desc_words);
        set(&mut raw.title_len, self.title_len);
        set(&mut raw.num_skills, self.num_skills);
        if let Some(skills) = self.skills {
            raw.skills = Some(SkillList::Delimited(skills));
        }
        Ok(raw)
    }
}

fn read_fields(path: &Path) -> Result<RawVacancyFields> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        VacancyInsightsError::InvalidInput(format!("cannot read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        VacancyInsightsError::InvalidInput(format!("{} is not a vacancy JSON object: {}", path.display(), e))
    })
}
