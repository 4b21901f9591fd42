use crate::reports;
use clap::Args;
use keymorph_core::analytics;
use keymorph_core::charset::CharacterSet;
use keymorph_core::error::KmResult;
use keymorph_core::fitness::{FitnessEvaluator, FitnessWeights, LayerMap};
use keymorph_core::Individual;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    #[arg(help = "Layout string: the character for each slot in order")]
    pub layout: String,

    #[arg(short, long, help = "Corpus text file")]
    pub input: Option<PathBuf>,

    #[arg(short, long, help = "Inline corpus text")]
    pub text: Option<String>,
}

pub fn run(args: AnalyzeArgs, weights: Option<FitnessWeights>) -> KmResult<i32> {
    let charset = Arc::new(CharacterSet::full_keyboard());
    let stats = super::load_corpus(&args.input, &args.text, &charset)?;
    let layout = super::parse_layout(&args.layout, &charset)?;

    let mut evaluator = FitnessEvaluator::standard(&charset);
    if let Some(w) = weights {
        evaluator.set_weights(w);
    }

    let mut individual = Individual::new(layout, charset.clone());
    individual.fitness = evaluator.evaluate(&individual.layout, &charset, &stats);

    if individual.fitness == 0.0 && !individual.is_valid() {
        info!("layout is not a valid permutation of the charset");
    }

    let scores = evaluator.component_scores(&individual.layout, &charset, &stats);
    let layout_stats = analytics::analyze(
        &individual,
        evaluator.geometry(),
        &LayerMap::us_qwerty(),
        &stats,
        &scores,
    );
    let comparison = analytics::compare_with_qwerty(&individual, &charset, &evaluator, &stats);

    info!("Fitness: {:.6}", individual.fitness);
    reports::print_layout_grid(&individual, evaluator.geometry());
    reports::print_components(&comparison);
    reports::print_finger_loads(&layout_stats);

    Ok(0)
}
