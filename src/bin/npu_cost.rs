//! `npu-cost` — thin CLI over the cost engine: validate, size, and cost a
//! workload described as a single CSV row on stdin or in a file.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use npu_cost_model::predictor::local::LocalPredictor;
use npu_cost_model::predictor::remote::{RemotePredictor, RemotePredictorConfig};
use npu_cost_model::{serializer, CostEngine, Device, EngineConfig};

#[derive(Parser)]
#[command(name = "npu-cost")]
#[command(version)]
#[command(about = "Validate, size, and cost NPU workload placements", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a workload against its device's valid-values table.
    Validate {
        /// CSV row describing the workload; reads stdin if omitted.
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Report the CMX memory breakdown for a workload.
    Memory {
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Run the full validate -> size -> predict pipeline.
    Cost {
        #[arg(long)]
        input: Option<PathBuf>,

        /// Use the remote HTTP profiling service instead of the local
        /// placeholder predictor.
        #[arg(long)]
        remote: bool,
    },
}

fn read_row(input: &Option<PathBuf>) -> Result<String> {
    let raw = match input {
        Some(path) => fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            buf
        }
    };
    Ok(raw.trim().to_string())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = EngineConfig::load_from_cwd().unwrap_or_default();

    match cli.command {
        Commands::Validate { input } => {
            let row = read_row(&input)?;
            let record = serializer::from_csv_row(&row).context("parsing workload row")?;
            let limits = record.device.limits();
            let report = npu_cost_model::validator::validate(&record, &limits);
            print_report(&record.device, &report);
        }
        Commands::Memory { input } => {
            let row = read_row(&input)?;
            let record = serializer::from_csv_row(&row).context("parsing workload row")?;
            let engine = CostEngine::new(LocalPredictor::new());
            let info = engine.cost_info(&record.to_workload());
            let aligned = config.memory.align(info.memory.total_bytes());
            println!(
                "input_0={}B output_0={}B weight={}B sep_table={}B total={}B (aligned {}B)",
                info.memory.input_0_bytes,
                info.memory.output_0_bytes,
                info.memory.weight_bytes,
                info.memory.sep_pointer_table_bytes,
                info.memory.total_bytes(),
                aligned
            );
        }
        Commands::Cost { input, remote } => {
            let row = read_row(&input)?;
            let record = serializer::from_csv_row(&row).context("parsing workload row")?;
            let workload = record.to_workload();

            let result = if remote || config.predictor.use_remote {
                let remote_config = RemotePredictorConfig {
                    base_url: config.predictor.remote_base_url.clone(),
                    timeout: std::time::Duration::from_secs(config.predictor.remote_timeout_secs),
                };
                CostEngine::new(RemotePredictor::new(remote_config)).cost(&workload)
            } else {
                CostEngine::new(LocalPredictor::new()).cost(&workload)
            };

            match result {
                Ok(estimate) => println!("cycles={} confidence={:?}", estimate.cycles, estimate.confidence),
                Err(err) => {
                    eprintln!("{}: {}", err.code().as_str(), err);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn print_report(device: &Device, report: &npu_cost_model::ValidationReport) {
    if report.is_valid() {
        println!("valid on {device:?}");
    } else {
        println!("invalid on {device:?}:");
    }
    for issue in &report.issues {
        println!("  [{:?}] {}: {}", issue.severity, issue.check, issue.message);
    }
}
