use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::{info, warn};

mod config;

use weft::classify::classify_group;
use weft::compare;
use weft::db::models::StoredProject;
use weft::db::ProjectStore;
use weft::output::{export, terminal};
use weft::params::{AnalysisParams, ComparisonMethod, ExportFormat, ExtractionMethod};
use weft::pipeline::{self, AnalysisResult};
use weft::status;

/// Weft: Cross-group theme analysis for interview research.
///
/// Ingests interview responses from multiple participant groups, extracts
/// a shared theme taxonomy, and compares how themes land across groups.
#[derive(Parser)]
#[command(name = "weft", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the project database
    Init,

    /// Analyze group files and save the result as a project
    Process {
        /// Group input as name=path (repeat per group), e.g. --group managers=data/managers.csv
        #[arg(long = "group", required = true)]
        groups: Vec<String>,

        /// Extraction method: tfidf-clustering, keyword-extraction, or topic-modeling
        #[arg(long, default_value = "tfidf-clustering")]
        method: String,

        /// Minimum corpus frequency for a theme to be kept
        #[arg(long, default_value = "2")]
        min_freq: u32,

        /// Number of themes to extract
        #[arg(long, default_value = "8")]
        num_themes: u32,

        /// Project name to save under
        #[arg(long)]
        name: String,

        /// Optional project description
        #[arg(long, default_value = "")]
        description: String,
    },

    /// List saved projects
    Projects,

    /// Load a saved project as the current one
    Load {
        /// Project id (from `weft projects`)
        id: i64,
    },

    /// Show the current project's taxonomy
    Show,

    /// Compare groups in the current (or given) project
    Compare {
        /// Comparison method: theme-prevalence, question-distribution, or response-length
        #[arg(long, default_value = "theme-prevalence")]
        method: String,

        /// Theme name (required for question-distribution)
        #[arg(long)]
        theme: Option<String>,

        /// Project id; defaults to the current project
        #[arg(long)]
        id: Option<i64>,
    },

    /// Export a comparison view to a file
    Export {
        /// Comparison method: theme-prevalence, question-distribution, or response-length
        #[arg(long, default_value = "theme-prevalence")]
        method: String,

        /// Theme name (required for question-distribution)
        #[arg(long)]
        theme: Option<String>,

        /// Export format: csv, excel, or pdf
        #[arg(long, default_value = "csv")]
        format: String,

        /// Output file path
        #[arg(long)]
        out: PathBuf,

        /// Project id; defaults to the current project
        #[arg(long)]
        id: Option<i64>,
    },

    /// Write a markdown summary report for a project
    Report {
        /// Output file path; prints to stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,

        /// Project id; defaults to the current project
        #[arg(long)]
        id: Option<i64>,
    },

    /// Delete a saved project
    Delete {
        /// Project id (from `weft projects`)
        id: i64,
    },

    /// Show system status (DB stats, project count, current project)
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("weft=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            info!("Initializing Weft database...");
            let config = config::Config::load()?;
            let conn = weft::db::initialize(&config.db_path)?;
            let table_count = weft::db::schema::table_count(&conn)?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("\nWeft is ready. Next step:");
            println!("  weft process --group <name>=<file.csv> --name <project>");
        }

        Commands::Process {
            groups,
            method,
            min_freq,
            num_themes,
            name,
            description,
        } => {
            let config = config::Config::load()?;
            let store = open_store(&config)?;

            let extraction_method: ExtractionMethod = method.parse()?;
            let params = AnalysisParams::new(min_freq, num_themes, extraction_method)?;
            let group_files = parse_group_specs(&groups)?;

            info!(groups = group_files.len(), method = %extraction_method, "Starting analysis");
            let result = pipeline::run(&group_files, &params)?;

            terminal::display_taxonomy(&result.taxonomy);

            // Persistence failure shouldn't throw away a finished analysis;
            // the result is already on screen
            match store.save_analysis(&name, &description, &result).await {
                Ok(id) => {
                    store.set_current_project(id).await?;
                    println!("Saved as project {id} ({name})");
                    println!("{}", "Next: weft compare --method theme-prevalence".dimmed());
                }
                Err(e) => {
                    warn!(error = %e, "Failed to save project");
                    println!(
                        "{}",
                        format!("Warning: analysis completed but saving failed: {e}").yellow()
                    );
                }
            }
        }

        Commands::Projects => {
            let config = config::Config::load()?;
            let store = open_store(&config)?;
            let projects = store.list_projects().await?;
            let current = store.current_project().await?;
            terminal::display_projects(&projects, current);
        }

        Commands::Load { id } => {
            let config = config::Config::load()?;
            let store = open_store(&config)?;
            let project = store
                .load_project(id)
                .await?
                .with_context(|| format!("No project with id {id}"))?;
            store.set_current_project(id).await?;
            println!("Loaded project {} ({})", id, project.meta.name);
            terminal::display_taxonomy(&project.taxonomy);
        }

        Commands::Show => {
            let config = config::Config::load()?;
            let store = open_store(&config)?;
            let (id, project) = current_project(&store).await?;

            println!("Project {} ({})", id, project.meta.name);
            if !project.meta.description.is_empty() {
                println!("  {}", project.meta.description.dimmed());
            }
            terminal::display_taxonomy(&project.taxonomy);

            // Per-theme match totals from the saved counts
            for theme in project.taxonomy.themes() {
                let total: u32 = project
                    .counts
                    .iter()
                    .filter(|qc| qc.theme_name == theme.name)
                    .map(|qc| qc.count)
                    .sum();
                println!("  {:<32} {} occurrences", theme.name, total);
            }
        }

        Commands::Compare { method, theme, id } => {
            let config = config::Config::load()?;
            let store = open_store(&config)?;
            let comparison_method: ComparisonMethod = method.parse()?;
            let (_, result) = resolve_result(&store, id).await?;

            let view = compare::aggregate(
                &result.taxonomy,
                &result.classifications,
                comparison_method,
                theme.as_deref(),
            )?;
            terminal::display_comparison(&view);
        }

        Commands::Export {
            method,
            theme,
            format,
            out,
            id,
        } => {
            let config = config::Config::load()?;
            let store = open_store(&config)?;
            let comparison_method: ComparisonMethod = method.parse()?;
            let export_format: ExportFormat = format.parse()?;

            match export_format {
                ExportFormat::Csv => {}
                ExportFormat::Excel | ExportFormat::Pdf => {
                    anyhow::bail!(
                        "{export_format} export is not available in this build; use --format csv"
                    );
                }
            }

            let (_, result) = resolve_result(&store, id).await?;
            let view = compare::aggregate(
                &result.taxonomy,
                &result.classifications,
                comparison_method,
                theme.as_deref(),
            )?;
            export::write_comparison_csv(&view, &out)?;
            println!("Wrote {}", out.display());
        }

        Commands::Report { out, id } => {
            let config = config::Config::load()?;
            let store = open_store(&config)?;
            let (name, result) = resolve_result(&store, id).await?;

            match out {
                Some(path) => {
                    export::write_summary_report(&name, &result, &path)?;
                    println!("Wrote {}", path.display());
                }
                None => {
                    print!("{}", export::summary_markdown(&name, &result));
                }
            }
        }

        Commands::Delete { id } => {
            let config = config::Config::load()?;
            let store = open_store(&config)?;

            // The store refuses to delete the current project
            if store.delete_project(id).await? {
                println!("Deleted project {id}");
            } else {
                println!("No project with id {id}");
            }
        }

        Commands::Status => {
            let config = config::Config::load()?;
            let store = open_store(&config)?;
            status::show(&store, &config.db_path).await?;
        }
    }

    Ok(())
}

/// Open the database and wrap it in the store trait.
fn open_store(config: &config::Config) -> Result<Arc<dyn ProjectStore>> {
    let conn = weft::db::open(&config.db_path)?;
    Ok(Arc::new(weft::db::SqliteStore::new(conn)))
}

/// Parse repeated `name=path` group flags, rejecting duplicate names.
fn parse_group_specs(specs: &[String]) -> Result<Vec<(String, PathBuf)>> {
    let mut groups: Vec<(String, PathBuf)> = Vec::with_capacity(specs.len());
    for arg in specs {
        let (name, path) = arg
            .split_once('=')
            .with_context(|| format!("Invalid group argument '{arg}', expected name=path"))?;
        if name.is_empty() {
            anyhow::bail!("Invalid group argument '{arg}': group name is empty");
        }
        if groups.iter().any(|(existing, _)| existing == name) {
            anyhow::bail!("Duplicate group name '{name}'");
        }
        groups.push((name.to_string(), PathBuf::from(path)));
    }
    Ok(groups)
}

/// Load the current project, failing with a hint when none is set.
async fn current_project(store: &Arc<dyn ProjectStore>) -> Result<(i64, StoredProject)> {
    let id = store
        .current_project()
        .await?
        .context("No current project. Run `weft load <id>` or `weft process` first.")?;
    let project = store
        .load_project(id)
        .await?
        .with_context(|| format!("Current project {id} no longer exists"))?;
    Ok((id, project))
}

/// Materialize a stored project (by id, or the current one) back into a
/// full analysis result. Classification is deterministic, so re-running
/// it over the saved records reproduces the original tallies.
async fn resolve_result(
    store: &Arc<dyn ProjectStore>,
    id: Option<i64>,
) -> Result<(String, AnalysisResult)> {
    let (_, project) = match id {
        Some(id) => {
            let project = store
                .load_project(id)
                .await?
                .with_context(|| format!("No project with id {id}"))?;
            (id, project)
        }
        None => current_project(store).await?,
    };

    let classifications = project
        .groups
        .iter()
        .map(|group| classify_group(group, &project.taxonomy))
        .collect();

    Ok((
        project.meta.name.clone(),
        AnalysisResult {
            params: project.meta.params,
            taxonomy: project.taxonomy,
            groups: project.groups,
            classifications,
        },
    ))
}
