//! Console and JSON rendering of insight reports

use crate::config::OutputFormat;
use crate::error::Result;
use crate::market::{ComparisonReport, MarketComparison, PromotionSkill, SkillFrequency, VacancySummary};
use crate::output::report::{InsightReport, MarketFilters};
use crate::vacancy::Grade;
use colored::{Color, Colorize};

/// Trait for formatting insight reports
pub trait OutputFormatter {
    fn format_report(&self, report: &InsightReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Console formatter with optional colors
pub struct ConsoleFormatter {
    use_colors: bool,
}

/// JSON formatter for scripting and integrations
pub struct JsonFormatter {
    pretty: bool,
}

/// Picks the formatter for the requested output format
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };
        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    /// Signed amount, green above the market and red below
    fn format_signed(&self, value: i64) -> String {
        let text = format!("{:+}", value);
        match value.signum() {
            1 => self.colorize(&text, Color::Green),
            -1 => self.colorize(&text, Color::Red),
            _ => text,
        }
    }

    fn format_percentage(&self, percentage: f64) -> String {
        let text = format!("{:+.1}%", percentage);
        if percentage > 0.0 {
            self.colorize(&text, Color::Green)
        } else if percentage < 0.0 {
            self.colorize(&text, Color::Red)
        } else {
            text
        }
    }

    fn format_skills(&self, filters: &MarketFilters, skills: &[SkillFrequency]) -> String {
        let mut output = self.format_header(&format!("Top skills ({})", filters.describe()), 1);
        if skills.is_empty() {
            output.push_str("No skills found for these filters.\n");
            return output;
        }
        for (i, skill) in skills.iter().enumerate() {
            let salary = skill
                .mean_salary
                .map(|s| format!("avg salary {}", group_thousands(s)))
                .unwrap_or_else(|| "no salary data".to_string());
            output.push_str(&format!(
                "{:>2}. {} - {} mentions, {}\n",
                i + 1,
                self.colorize(&skill.skill, Color::Cyan),
                skill.frequency,
                salary
            ));
        }
        output
    }

    fn format_vacancies(&self, filters: &MarketFilters, vacancies: &[VacancySummary]) -> String {
        let mut output = self.format_header(&format!("Top paying vacancies ({})", filters.describe()), 1);
        if vacancies.is_empty() {
            output.push_str("No vacancies with a known salary match these filters.\n");
            return output;
        }
        for (i, vacancy) in vacancies.iter().enumerate() {
            let grade = vacancy
                .grade
                .map(|g| g.label().to_string())
                .unwrap_or_else(|| vacancy.experience.clone());
            output.push_str(&format!(
                "{:>2}. {} - {}\n    {} | area {} | {}\n",
                i + 1,
                self.colorize(&vacancy.title, Color::Cyan),
                self.colorize(&group_thousands(vacancy.salary.round() as i64), Color::Green),
                vacancy.employer.as_deref().unwrap_or("unknown employer"),
                vacancy
                    .area_id
                    .map(|a| a.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                grade
            ));
        }
        output
    }

    fn format_comparison(&self, report: &ComparisonReport) -> String {
        let mut output = self.format_header("Market comparison", 1);
        output.push_str(&format!(
            "Generated: {} | Cohort: {} vacancies\n",
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.cohort_size
        ));
        output.push_str(&format!(
            "Median salary: {}\n",
            group_thousands(report.median_salary.round() as i64)
        ));
        if let Some(salary) = &report.salary {
            output.push_str(&format!(
                "Your salary: {} ({}, {})\n",
                group_thousands(salary.salary.round() as i64),
                self.format_signed(salary.delta),
                self.format_percentage(salary.percentage)
            ));
        }

        let skills = &report.skills;
        output.push_str(&self.format_header("Skills", 2));
        output.push_str(&format!("Market top: {}\n", join_or_dash(&skills.market_top)));
        output.push_str(&format!(
            "Common: {}\n",
            self.colorize(&join_or_dash(&skills.common), Color::Green)
        ));
        output.push_str(&format!("Unique: {}\n", join_or_dash(&skills.unique)));
        if !skills.missing.is_empty() {
            output.push_str(&self.format_header("Recommended to learn", 3));
            for skill in &skills.missing {
                output.push_str(&format!("  • {}\n", self.colorize(skill, Color::Yellow)));
            }
        }
        output
    }

    fn format_promotion(
        &self,
        title: &str,
        area_id: Option<i64>,
        from: Grade,
        to: Grade,
        skills: &[PromotionSkill],
    ) -> String {
        let area = area_id.map(|a| format!(", area {}", a)).unwrap_or_default();
        let mut output =
            self.format_header(&format!("From {} to {}: \"{}\"{}", from, to, title, area), 1);
        if skills.is_empty() {
            output.push_str("Not enough data to suggest skills for this step.\n");
            return output;
        }
        for (i, skill) in skills.iter().enumerate() {
            output.push_str(&format!(
                "{:>2}. {} {} ({} → {})\n",
                i + 1,
                self.colorize(&skill.skill, Color::Cyan),
                self.format_signed(skill.delta),
                skill.from_frequency,
                skill.to_frequency
            ));
        }
        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &InsightReport) -> Result<String> {
        let output = match report {
            InsightReport::Salary(prediction) => format!(
                "{} {} {}\n",
                self.colorize("Predicted salary:", Color::Cyan),
                group_thousands(prediction.amount.round() as i64),
                prediction.currency
            ),
            InsightReport::Grade(prediction) => format!(
                "{} {} (class {})\n",
                self.colorize("Predicted grade:", Color::Cyan),
                prediction.label,
                prediction.code
            ),
            InsightReport::Skills { filters, skills } => self.format_skills(filters, skills),
            InsightReport::Vacancies { filters, vacancies } => self.format_vacancies(filters, vacancies),
            InsightReport::Comparison { comparison } => match comparison {
                MarketComparison::NoComparableVacancies => format!("{}\n", comparison),
                MarketComparison::Report(report) => self.format_comparison(report),
            },
            InsightReport::Promotion {
                title,
                area_id,
                from,
                to,
                skills,
            } => self.format_promotion(title, *area_id, *from, *to, skills),
            InsightReport::Area { query, area_id } => match area_id {
                Some(id) => format!("{} → area {}\n", query, self.colorize(&id.to_string(), Color::Green)),
                None => format!("{} → {}\n", query, self.colorize("not found", Color::Red)),
            },
        };
        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &InsightReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl ReportGenerator {
    pub fn new(use_colors: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors),
            json_formatter: JsonFormatter::new(true),
        }
    }

    pub fn generate_report(&self, report: &InsightReport, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new(true)
    }
}

/// `1234567` → `1 234 567`
fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}
