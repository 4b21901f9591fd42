use crate::reports;
use clap::Args;
use keymorph_core::analytics;
use keymorph_core::charset::CharacterSet;
use keymorph_core::config::{EngineConfig, SearchOverrides};
use keymorph_core::corpus::FrequencyModel;
use keymorph_core::error::KmResult;
use keymorph_core::fitness::{FitnessEvaluator, FitnessWeights, LayerMap};
use keymorph_core::optimizer::engine::{CancelToken, ParallelEngine, ProgressObserver};
use keymorph_core::persist;
use keymorph_core::Individual;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct OptimizeArgs {
    #[arg(short, long, help = "Corpus text file")]
    pub input: Option<PathBuf>,

    #[arg(short, long, help = "Inline corpus text")]
    pub text: Option<String>,

    #[arg(short, long, default_value = "best_layout.json")]
    pub output: PathBuf,

    #[arg(short = 'S', long, help = "Master seed for a reproducible run")]
    pub seed: Option<u64>,

    #[arg(short = 'c', long, help = "JSON file with search parameter overrides")]
    pub config: Option<PathBuf>,

    #[arg(long, default_value_t = false, help = "Suppress per-generation progress lines")]
    pub quiet: bool,

    #[command(flatten)]
    pub overrides: SearchOverrides,
}

/// Logs throttled progress lines and snapshots the best layout every
/// `save_interval` generations.
struct ProgressLogger {
    quiet: bool,
    save_interval: usize,
    output: PathBuf,
    last_print: Mutex<Instant>,
    last_saved: AtomicUsize,
    started: Instant,
}

impl ProgressObserver for ProgressLogger {
    fn on_generation(&self, generation: usize, best: &Individual) -> Result<(), String> {
        if !self.quiet {
            let mut last = self.last_print.lock().map_err(|e| e.to_string())?;
            if last.elapsed().as_secs_f64() >= 1.0 || generation == 0 {
                info!(
                    "Generation {:4} | best {:.6} | elapsed {:?}",
                    generation,
                    best.fitness,
                    self.started.elapsed()
                );
                *last = Instant::now();
            }
        }

        if self.save_interval > 0 {
            let last_saved = self.last_saved.load(Ordering::Relaxed);
            if generation >= last_saved + self.save_interval {
                self.last_saved.store(generation, Ordering::Relaxed);
                let snapshot_path = self.output.with_extension(format!("gen{generation}.json"));
                persist::save_layout(best, &snapshot_path).map_err(|e| e.to_string())?;
            }
        }

        Ok(())
    }
}

pub fn run(args: OptimizeArgs, weights: Option<FitnessWeights>) -> KmResult<i32> {
    let charset = Arc::new(CharacterSet::full_keyboard());
    let stats = super::load_corpus(&args.input, &args.text, &charset)?;

    info!(
        "Corpus: {} characters, {} distinct, {} digrams",
        stats.total_chars(),
        stats.distinct_chars(),
        stats.digrams().len()
    );

    let base = EngineConfig::adaptive(stats.total_chars());
    // Command-line flags beat the config file, the file beats the
    // adaptive profile.
    let mut overrides = args.overrides.clone();
    if let Some(path) = &args.config {
        overrides = overrides.or(SearchOverrides::load_from_file(path)?);
    }
    let config = overrides.apply(base);
    reports::print_config(&config);

    let mut evaluator = FitnessEvaluator::standard(&charset);
    if let Some(w) = weights {
        evaluator.set_weights(w);
    }
    let report_evaluator = evaluator.clone();

    let engine = ParallelEngine::new(config, charset.clone(), evaluator)?;

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        warn!("interrupt received, finishing current generation...");
        handler_token.cancel();
    }) {
        warn!("could not install interrupt handler: {}", e);
    }

    let observer = ProgressLogger {
        quiet: args.quiet,
        save_interval: config.save_interval,
        output: args.output.clone(),
        last_print: Mutex::new(Instant::now()),
        last_saved: AtomicUsize::new(0),
        started: Instant::now(),
    };

    let started = Instant::now();
    let outcome = engine.run(&stats, args.seed, &observer, &cancel)?;

    info!(
        "Finished in {:?}: best fitness {:.6} after {} generations",
        started.elapsed(),
        outcome.best.fitness,
        outcome.generations
    );

    let scores = report_evaluator.component_scores(&outcome.best.layout, &charset, &stats);
    let layout_stats = analytics::analyze(
        &outcome.best,
        report_evaluator.geometry(),
        &LayerMap::us_qwerty(),
        &stats,
        &scores,
    );
    let comparison =
        analytics::compare_with_qwerty(&outcome.best, &charset, &report_evaluator, &stats);

    reports::print_layout_grid(&outcome.best, report_evaluator.geometry());
    reports::print_components(&comparison);
    reports::print_finger_loads(&layout_stats);
    reports::print_heatmap(&outcome.best, report_evaluator.geometry(), &stats);
    reports::print_convergence_chart(&outcome.trajectory);

    persist::save_layout(&outcome.best, &args.output)?;

    if outcome.cancelled {
        warn!("run was cancelled; saved the best layout observed so far");
        return Ok(130);
    }

    Ok(0)
}
