use crate::reports;
use clap::Args;
use keymorph_core::charset::CharacterSet;
use keymorph_core::error::KmResult;
use keymorph_core::fitness::{FitnessEvaluator, FitnessWeights};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    #[arg(required = true, num_args = 1.., help = "Layout strings to score")]
    pub layouts: Vec<String>,

    #[arg(short, long, help = "Corpus text file")]
    pub input: Option<PathBuf>,

    #[arg(short, long, help = "Inline corpus text")]
    pub text: Option<String>,

    #[arg(long, default_value_t = false, help = "Omit the QWERTY baseline row")]
    pub no_baseline: bool,
}

pub fn run(args: CompareArgs, weights: Option<FitnessWeights>) -> KmResult<i32> {
    let charset = Arc::new(CharacterSet::full_keyboard());
    let stats = super::load_corpus(&args.input, &args.text, &charset)?;

    let mut evaluator = FitnessEvaluator::standard(&charset);
    if let Some(w) = weights {
        evaluator.set_weights(w);
    }

    let mut rows = Vec::new();

    if !args.no_baseline {
        let qwerty: Vec<char> = charset.chars().to_vec();
        let scores = evaluator.component_scores(&qwerty, &charset, &stats);
        rows.push(("qwerty".to_string(), scores));
    }

    for (i, layout_str) in args.layouts.iter().enumerate() {
        let layout = super::parse_layout(layout_str, &charset)?;
        let scores = evaluator.component_scores(&layout, &charset, &stats);
        rows.push((format!("layout-{}", i + 1), scores));
    }

    reports::print_comparison_table(&rows, evaluator.weights());

    Ok(0)
}
