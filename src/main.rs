//! relevance-judge: rubric scoring and NDCG for LLM-as-judge evaluations

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use relevance_judge::{
    cli,
    config::{load_or_default, AppConfig},
    pipeline::{exit_codes, OutputFormat},
    ranking::IdealOrdering,
};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "relevance-judge")]
#[command(version)]
#[command(
    about = "Rubric scoring and NDCG for LLM-as-judge relevance evaluations",
    long_about = None
)]
#[command(after_help = "EXIT CODES:
    0  Success
    1  Mean NDCG below --min-ndcg
    3  Error occurred

EXAMPLES:
    # Score judged queries with the default store rubric
    relevance-judge score judgments.json

    # Fuzzy-query rubric with a heavier preference check, facet breakdown
    relevance-judge score judgments.json --rubric fuzzy-query:3 --facets -o summary

    # Fail CI when ranking quality drops
    relevance-judge score judgments.json --min-ndcg 0.85")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments for the `score` subcommand
#[derive(Parser)]
struct ScoreArgs {
    /// Judged queries (JSON or YAML)
    input: PathBuf,

    /// Rubric preset name or rubric file path
    #[arg(short, long)]
    rubric: Option<String>,

    /// NDCG cutoff
    #[arg(short)]
    k: Option<usize>,

    /// Score the whole list instead of the top k
    #[arg(long, conflicts_with = "k")]
    full_list: bool,

    /// Ideal ordering for IDCG
    #[arg(long, value_enum)]
    ideal: Option<IdealOrdering>,

    /// Break NDCG down by facet
    #[arg(long)]
    facets: bool,

    /// Facet definitions file (implies --facets)
    #[arg(long)]
    facet_definitions: Option<PathBuf>,

    /// Query category table used to backfill facet membership (implies --facets)
    #[arg(long)]
    categories: Option<PathBuf>,

    /// Skip items whose text similarity to the query is below this value
    #[arg(long)]
    prefilter: Option<f64>,

    /// Exit with code 1 if mean NDCG is below this value
    #[arg(long)]
    min_ndcg: Option<f64>,

    /// Do not compare judge-claimed scores with recomputed ones
    #[arg(long)]
    no_verify: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,
}

impl ScoreArgs {
    /// Command-line values take precedence over the config file.
    fn apply(self, mut config: AppConfig) -> (PathBuf, AppConfig) {
        let scoring = &mut config.scoring;
        if let Some(rubric) = self.rubric {
            scoring.rubric = rubric;
        }
        if self.full_list {
            scoring.k = None;
        } else if self.k.is_some() {
            scoring.k = self.k;
        }
        if let Some(ideal) = self.ideal {
            scoring.ideal = ideal;
        }
        if self.min_ndcg.is_some() {
            scoring.min_ndcg = self.min_ndcg;
        }
        if self.no_verify {
            scoring.verify_claimed = false;
        }

        let facets = &mut config.facets;
        if self.facets || self.facet_definitions.is_some() || self.categories.is_some() {
            facets.enabled = true;
        }
        if self.facet_definitions.is_some() {
            facets.definitions = self.facet_definitions;
        }
        if self.categories.is_some() {
            facets.categories = self.categories;
        }

        if self.prefilter.is_some() {
            config.prefilter.threshold = self.prefilter;
        }
        if let Some(format) = self.output {
            config.output.format = format;
        }
        if self.output_file.is_some() {
            config.output.file = self.output_file;
        }

        (self.input, config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Score judged queries and compute ranking metrics
    Score(ScoreArgs),

    /// List rubric presets, or print one rubric as YAML
    Rubrics {
        /// Preset name or rubric file
        name: Option<String>,
    },

    /// Print the effective configuration
    Config,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate JSON Schema for the config file format
    ConfigSchema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let exit_code = match cli.command {
        Commands::Score(args) => {
            let (config, loaded_from) = load_or_default(cli.config.as_deref());
            if let Some(path) = &loaded_from {
                tracing::debug!("Loaded config from {}", path.display());
            }
            let (input, config) = args.apply(config);
            match cli::run_score(input, &config, cli.quiet) {
                Ok(code) => code,
                Err(err) => {
                    tracing::error!("{err:#}");
                    exit_codes::ERROR
                }
            }
        }

        Commands::Rubrics { name } => cli::run_rubrics(name.as_deref())?,

        Commands::Config => {
            let (config, loaded_from) = load_or_default(cli.config.as_deref());
            match &loaded_from {
                Some(path) => eprintln!("# Loaded from: {}", path.display()),
                None => eprintln!("# No config file found; showing defaults"),
            }
            let yaml = serde_yaml_ng::to_string(&config).context("failed to serialize config")?;
            print!("{yaml}");
            exit_codes::SUCCESS
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "relevance-judge", &mut io::stdout());
            exit_codes::SUCCESS
        }

        Commands::ConfigSchema { output } => {
            let schema = relevance_judge::config::generate_json_schema();
            match output {
                Some(path) => {
                    std::fs::write(&path, &schema)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => println!("{schema}"),
            }
            exit_codes::SUCCESS
        }
    };

    if exit_code != exit_codes::SUCCESS {
        std::process::exit(exit_code);
    }
    Ok(())
}
