pub mod crossover;
pub mod engine;
pub mod initialize;
pub mod mutation;
pub mod repair;
pub mod selection;

pub use crossover::{crossover, CrossoverMethod};
pub use engine::{CancelToken, NullObserver, ParallelEngine, ProgressObserver, SearchOutcome};
pub use mutation::{population_diversity, AdaptiveMutator, MutationMethod, Mutator};
pub use repair::repair;
