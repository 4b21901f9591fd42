use clap::{Parser, Subcommand};
use keymorph_core::fitness::FitnessWeights;
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about = "Corpus-driven keyboard layout optimizer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(global = true, long, help = "JSON file overriding the reference fitness weights")]
    weights: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search for an optimized layout against a corpus
    Optimize(cmd::optimize::OptimizeArgs),
    /// Score an explicit layout string against a corpus
    Analyze(cmd::analyze::AnalyzeArgs),
    /// Score several layout strings side by side
    Compare(cmd::compare::CompareArgs),
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let weights = match &cli.weights {
        Some(path) => match FitnessWeights::load_from_file(path) {
            Ok(w) => {
                info!("Loaded weights from {:?}", path);
                Some(w)
            }
            Err(e) => {
                error!("Failed to load weights {:?}: {}", path, e);
                process::exit(1);
            }
        },
        None => None,
    };

    let exit_code = match cli.command {
        Commands::Optimize(args) => cmd::optimize::run(args, weights),
        Commands::Analyze(args) => cmd::analyze::run(args, weights),
        Commands::Compare(args) => cmd::compare::run(args, weights),
    };

    match exit_code {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}
