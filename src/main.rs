//! vacancy-insights: salary and grade prediction with labor-market analytics

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::path::Path;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use vacancy_insights::cli::{Cli, Commands, ConfigAction};
use vacancy_insights::config::Config;
use vacancy_insights::features::ArtifactBundle;
use vacancy_insights::market::MarketStore;
use vacancy_insights::output::{InsightReport, MarketFilters, ReportGenerator};
use vacancy_insights::prediction::PredictionService;
use vacancy_insights::vacancy::Grade;
use vacancy_insights::{Result, VacancyInsightsError};

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // Config maintenance must work even when the current file is broken
    if let Commands::Config { action } = &cli.command {
        if let Err(e) = run_config_action(action.as_ref(), cli.config.as_deref()) {
            error!("Config command failed: {}", e);
            eprintln!("{}", e.user_message());
            process::exit(1);
        }
        return;
    }

    // Load configuration
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("{}", e.user_message());
            eprintln!("Run `vacancy-insights config reset` to restore the defaults.");
            process::exit(1);
        }
    };

    // Execute command
    if let Err(e) = run_command(cli, config).await {
        error!("Command failed: {}", e);
        eprintln!("{}", e.user_message());
        process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn run_config_action(action: Option<&ConfigAction>, path: Option<&Path>) -> Result<()> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(Config::config_path);
    match action {
        Some(ConfigAction::Show) | None => {
            let config = load_config(path)?;
            println!("Configuration file: {}\n", config_path.display());
            println!("{}", config.to_toml()?);
        }

        Some(ConfigAction::Reset) => {
            Config::reset_at(&config_path)?;
            println!("Configuration reset: {}", config_path.display());
        }

        Some(ConfigAction::Path) => {
            println!("{}", config_path.display());
        }
    }
    Ok(())
}

async fn run_command(cli: Cli, config: Config) -> Result<()> {
    let format = cli.format.unwrap_or(config.output.format);
    let generator = ReportGenerator::new(config.output.color_output);
    let emit = |report: InsightReport| -> Result<()> {
        println!("{}", generator.generate_report(&report, format)?.trim_end());
        Ok(())
    };

    match cli.command {
        Commands::Salary(args) => {
            let features = args.into_features()?;
            let service = load_prediction_service(&config).await?;
            emit(InsightReport::Salary(service.predict_salary(&features)?))
        }

        Commands::Grade(args) => {
            let features = args.into_features()?;
            let service = load_prediction_service(&config).await?;
            emit(InsightReport::Grade(service.predict_grade(&features)?))
        }

        Commands::Skills { title, area_id, grade } => {
            let store = open_store(&config)?;
            let skills = store.top_5_skills(title.as_deref(), area_id, grade.as_deref())?;
            emit(InsightReport::Skills {
                filters: MarketFilters {
                    title,
                    area: area_id.map(|a| a.to_string()),
                    grade,
                },
                skills,
            })
        }

        Commands::Top {
            area,
            keyword,
            grade,
            limit,
        } => {
            let store = open_store(&config)?;
            let limit = limit.unwrap_or(config.analytics.top_vacancies_limit);
            let vacancies =
                store.top_vacancies(area.as_deref(), keyword.as_deref(), grade.as_deref(), limit)?;
            emit(InsightReport::Vacancies {
                filters: MarketFilters {
                    title: keyword,
                    area,
                    grade,
                },
                vacancies,
            })
        }

        Commands::Compare(args) => {
            let profile = args.into_raw()?.into_profile()?;
            let store = open_store(&config)?;
            let comparison = store.compare_vacancy_to_market(&profile)?;
            emit(InsightReport::Comparison { comparison })
        }

        Commands::Promote {
            title,
            area_id,
            from,
            to,
            top,
        } => {
            let store = open_store(&config)?;
            let top_n = top.unwrap_or(config.analytics.promotion_top_n);
            let skills = store.promotion_skills(&title, area_id, &from, &to, top_n)?;
            emit(InsightReport::Promotion {
                title,
                area_id,
                from: Grade::parse(&from)?,
                to: Grade::parse(&to)?,
                skills,
            })
        }

        Commands::Area { name } => {
            let store = open_store(&config)?;
            let area_id = store.get_area_id_by_city(&name)?;
            emit(InsightReport::Area { query: name, area_id })
        }

        Commands::Config { action } => run_config_action(action.as_ref(), cli.config.as_deref()),
    }
}

async fn load_prediction_service(config: &Config) -> Result<PredictionService> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Loading prediction models...");
    spinner.enable_steady_tick(Duration::from_millis(120));

    let bundle = ArtifactBundle::load(&config.artifacts).await;
    spinner.finish_and_clear();

    let bundle = bundle?;
    info!("Prediction models loaded from {}", config.artifacts.artifacts_dir.display());
    Ok(PredictionService::new(Arc::new(bundle)))
}

fn open_store(config: &Config) -> Result<MarketStore> {
    let path = &config.storage.database_path;
    if !path.exists() {
        return Err(VacancyInsightsError::Configuration(format!(
            "vacancy database not found at {}",
            path.display()
        )));
    }
    Ok(MarketStore::open_read_only(path)?.with_min_cohort_size(config.analytics.min_cohort_size))
}
