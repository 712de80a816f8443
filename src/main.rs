use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::error;

use feature_pipeline::app::ports::WorkbookReader;
use feature_pipeline::constants;
use feature_pipeline::infra::CalamineWorkbookReader;
use feature_pipeline::logging;
use feature_pipeline::pipeline::ingestion::SheetLoader;
use feature_pipeline::pipeline::quality_gate::QualityRule;
use feature_pipeline::{FeaturePipeline, PipelineConfig, PipelineReport, Settings};

#[derive(Parser)]
#[command(name = "feature_pipeline")]
#[command(about = "Builds the clean topic/transcript table from the hot-topics workbook")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run merge, cleaning and postprocessing, and write the clean and dropped tables
    Run {
        #[command(flatten)]
        inputs: InputArgs,
        /// Clean table file name inside the data directory
        #[arg(long)]
        output: Option<String>,
        /// Dropped rows file name inside the data directory
        #[arg(long)]
        dropped: Option<String>,
        /// Do not log the cleaning report
        #[arg(long)]
        quiet: bool,
        /// Print the run report as JSON instead of the text summary
        #[arg(long)]
        json: bool,
    },
    /// Parse the workbook only and print record counts per sheet and network
    Load {
        #[command(flatten)]
        workbook: WorkbookArgs,
    },
}

/// Arguments shared by every command: where the workbook and config live.
#[derive(Args)]
struct WorkbookArgs {
    /// Data directory (defaults to $DATA_DIR, then ./data)
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Pipeline configuration file (TOML)
    #[arg(long, default_value = constants::DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Workbook file name inside the data directory
    #[arg(long)]
    excel: Option<String>,
}

impl WorkbookArgs {
    fn settings(&self) -> Settings {
        let mut settings = match &self.data_dir {
            Some(dir) => Settings::with_data_dir(dir),
            None => Settings::from_env(),
        };
        if let Some(name) = &self.excel {
            settings.excel_filename = name.clone();
        }
        settings
    }

    fn pipeline_config(&self) -> Result<PipelineConfig> {
        PipelineConfig::load_or_default(&self.config)
            .with_context(|| format!("loading config from {}", self.config.display()))
    }
}

#[derive(Args)]
struct InputArgs {
    #[command(flatten)]
    workbook: WorkbookArgs,
    /// Transcript table file name inside the data directory
    #[arg(long)]
    transcripts: Option<String>,
}

impl InputArgs {
    fn settings(&self) -> Settings {
        let mut settings = self.workbook.settings();
        if let Some(name) = &self.transcripts {
            settings.transcripts_filename = name.clone();
        }
        settings
    }
}

fn print_summary(report: &PipelineReport) {
    println!("\n📊 Feature pipeline results:");
    println!("   Parsed records: {}", report.parsed_records);
    println!("   Other networks: {}", report.network_filtered);
    println!("   Missing transcript: {}", report.missing_transcript);
    for rule in QualityRule::ALL {
        println!("   Dropped ({}): {}", rule, report.quality.dropped(rule));
    }
    println!("   Duplicate-id rows: {}", report.duplicate_id_rows);
    println!("   💾 Clean: {} ({} rows)", report.output_path.display(), report.clean_rows);
    println!(
        "   🗑️ Dropped: {} ({} rows)",
        report.dropped_path.display(),
        report.dropped_rows_written
    );
}

fn run(
    inputs: &InputArgs,
    output: Option<String>,
    dropped: Option<String>,
    quiet: bool,
    json: bool,
) -> Result<()> {
    let mut settings = inputs.settings();
    if let Some(name) = output {
        settings.output_filename = name;
    }
    if let Some(name) = dropped {
        settings.dropped_filename = name;
    }
    let config = inputs.workbook.pipeline_config()?;

    let mut pipeline = FeaturePipeline::new(settings, config);
    pipeline.set_verbose(!quiet);
    pipeline.run()?;

    if let Some(report) = pipeline.last_report() {
        if json {
            println!("{}", serde_json::to_string_pretty(report)?);
        } else {
            print_summary(report);
        }
    }
    Ok(())
}

fn load(workbook: &WorkbookArgs) -> Result<()> {
    let settings = workbook.settings();
    let config = workbook.pipeline_config()?;
    let reader = CalamineWorkbookReader::new();

    let path = settings.excel_path();
    anyhow::ensure!(path.exists(), "workbook not found: {}", path.display());

    let records = SheetLoader::new(&config, &reader as &dyn WorkbookReader).load(&path)?;

    let mut by_sheet: BTreeMap<&str, usize> = BTreeMap::new();
    let mut by_network: BTreeMap<&str, usize> = BTreeMap::new();
    for record in &records {
        *by_sheet.entry(record.main_subject.as_str()).or_default() += 1;
        *by_network.entry(record.social_network.as_str()).or_default() += 1;
    }

    println!("\n📂 {} ({} records)", path.display(), records.len());
    println!("   By sheet:");
    for (sheet, count) in &by_sheet {
        println!("     {}: {}", sheet, count);
    }
    println!("   By network:");
    for (network, count) in &by_network {
        println!("     {}: {}", network, count);
    }
    Ok(())
}

fn main() -> Result<()> {
    logging::init_logging();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Run {
            inputs,
            output,
            dropped,
            quiet,
            json,
        } => run(inputs, output.clone(), dropped.clone(), *quiet, *json),
        Commands::Load { workbook } => load(workbook),
    };

    if let Err(e) = &result {
        error!("❌ Feature pipeline failed: {:#}", e);
    }
    result
}
