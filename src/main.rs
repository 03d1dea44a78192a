//! catalog-dump: paginated Linked Data dump of a DCAT triple store

use anyhow::{Context, Result};
use catalog_dump::{
    config::{Config, LogFormat, DEFAULT_CONFIG_FILE},
    schedule, DumpOrchestrator,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "catalog-dump")]
#[command(about = "Paginated Turtle dump of a DCAT triple store")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one dump now
    Run {
        /// Override the output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the run report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Run dumps periodically until interrupted
    Schedule,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default()
    };

    init_logging(&config, cli.verbose)?;
    if !cli.config.exists() && !matches!(cli.command, Commands::Init { .. }) {
        warn!(
            "Config file {} not found, using defaults",
            cli.config.display()
        );
    }

    match cli.command {
        Commands::Run { output, report } => run_once(config, output, report),
        Commands::Schedule => run_schedule(config),
        Commands::Init { force } => init_config(&cli.config, force),
    }
}

fn init_logging(config: &Config, verbose: u8) -> Result<()> {
    let level = config.logging.level.raised(verbose).to_tracing();
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false);

    match config.logging.format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish())?,
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
    }
    Ok(())
}

fn run_once(
    mut config: Config,
    output: Option<PathBuf>,
    report_path: Option<PathBuf>,
) -> Result<()> {
    if let Some(output) = output {
        config.dump.output_dir = output;
    }

    let orchestrator = DumpOrchestrator::from_config(&config)?;
    let report = orchestrator.run().context("Dump run failed")?;

    println!(
        "Dumped {} of {} datasets into {} pages under {}",
        report.datasets_written,
        report.total_items,
        report.pages.len(),
        config.dump.output_dir.display()
    );
    if !report.skipped.is_empty() {
        println!("Skipped {} datasets without a unique portal", report.skipped.len());
    }
    if !report.assignments.is_empty() {
        println!("Disambiguated {} titles", report.assignments.len());
    }

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!("Report written to {}", path.display());
    }
    Ok(())
}

fn run_schedule(config: Config) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
    let schedule_config = config.schedule.clone();

    let runs = runtime.block_on(schedule::run_scheduled(
        &schedule_config,
        move || schedule::dump_once(&config),
        async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Cannot listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Received Ctrl+C, shutting down");
        },
    ));

    info!("Scheduler finished after {} runs", runs);
    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let content = format!(
        "# catalog-dump configuration\n#\n\
         # [portal] resolver is one of:\n\
         #   \"store\"  look up ?portal dcat:dataset <dataset>\n\
         #   \"uri\"    first host label of the dataset URI (needs namespace)\n\
         #   \"fixed\"  one portal for everything (needs iri and name)\n\n{}",
        Config::default().to_toml()?
    );
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Created configuration: {}", path.display());
    Ok(())
}
