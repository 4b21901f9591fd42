pub mod analytics;
pub mod charset;
pub mod config;
pub mod core_types;
pub mod corpus;
pub mod error;
pub mod fitness;
pub mod geometry;
pub mod optimizer;
pub mod persist;

pub use charset::CharacterSet;
pub use config::EngineConfig;
pub use core_types::Individual;
pub use corpus::{CorpusStats, FrequencyModel};
pub use error::{KeymorphError, KmResult};
pub use fitness::FitnessEvaluator;
pub use geometry::Geometry;
pub use optimizer::engine::{CancelToken, ParallelEngine, ProgressObserver, SearchOutcome};
