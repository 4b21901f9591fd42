pub mod evaluator;
pub mod layers;
pub mod weights;

pub use evaluator::{ComponentScores, FitnessEvaluator};
pub use layers::{KeyLayer, LayerMap};
pub use weights::FitnessWeights;
