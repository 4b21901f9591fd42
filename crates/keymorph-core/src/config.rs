use crate::error::{KeymorphError, KmResult};
use clap::Args;
use serde::{Deserialize, Serialize};

/// Immutable knobs for one engine run.
///
/// `max_generations == 0` means unbounded and is only valid when
/// convergence stopping is enabled. `worker_count == 0` auto-detects the
/// hardware thread count.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub population_size: usize,
    pub max_generations: usize,
    pub mutation_rate: f64,
    pub crossover_rate: f64,
    pub elite_count: usize,
    pub tournament_size: usize,
    pub worker_count: usize,
    pub convergence_stops: usize,
    pub convergence_tolerance: f64,
    pub save_interval: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 1000,
            mutation_rate: 0.1,
            crossover_rate: 0.8,
            elite_count: 5,
            tournament_size: 3,
            worker_count: 0,
            convergence_stops: 0,
            convergence_tolerance: 1e-6,
            save_interval: 50,
        }
    }
}

impl EngineConfig {
    /// Profile for medium corpora (10k-100k characters).
    pub fn medium_dataset() -> Self {
        Self {
            population_size: 200,
            max_generations: 200,
            mutation_rate: 0.2,
            crossover_rate: 0.85,
            elite_count: 3,
            tournament_size: 5,
            ..Self::default()
        }
    }

    /// Profile for large corpora (>100k characters): a much larger
    /// population with aggressive mixing and minimal elitism.
    pub fn large_dataset() -> Self {
        Self {
            population_size: 500,
            max_generations: 100,
            mutation_rate: 0.3,
            crossover_rate: 0.9,
            elite_count: 2,
            tournament_size: 7,
            ..Self::default()
        }
    }

    /// Decision table keyed on corpus size, thresholds at 10k and 100k
    /// characters.
    pub fn adaptive(total_chars: u64) -> Self {
        if total_chars > 100_000 {
            Self::large_dataset()
        } else if total_chars > 10_000 {
            Self::medium_dataset()
        } else {
            Self::default()
        }
    }

    pub fn validate(&self) -> KmResult<()> {
        if self.population_size < 10 {
            return Err(KeymorphError::Config(
                "population size must be at least 10".into(),
            ));
        }
        if self.max_generations == 0 && self.convergence_stops == 0 {
            return Err(KeymorphError::Config(
                "either max generations or convergence stops must be set".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(KeymorphError::Config(
                "mutation rate must be between 0 and 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err(KeymorphError::Config(
                "crossover rate must be between 0 and 1".into(),
            ));
        }
        if self.elite_count >= self.population_size {
            return Err(KeymorphError::Config(
                "elite count must be below population size".into(),
            ));
        }
        if self.tournament_size < 1 {
            return Err(KeymorphError::Config(
                "tournament size must be at least 1".into(),
            ));
        }
        if self.convergence_tolerance < 0.0 {
            return Err(KeymorphError::Config(
                "convergence tolerance must be non-negative".into(),
            ));
        }
        Ok(())
    }

    /// Effective worker count after auto-detection.
    pub fn resolved_workers(&self) -> usize {
        if self.worker_count > 0 {
            self.worker_count
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        }
    }
}

/// Explicit user settings layered over an adaptive base. Unset fields keep
/// the adaptive value, so there is no guessing whether a numeral happens
/// to equal a default.
#[derive(Args, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchOverrides {
    #[arg(long, help = "Layouts per generation (minimum 10)")]
    pub population_size: Option<usize>,

    #[arg(long, help = "Generation cap; 0 = unbounded with convergence")]
    pub max_generations: Option<usize>,

    #[arg(long, help = "Base per-individual mutation probability")]
    pub mutation_rate: Option<f64>,

    #[arg(long, help = "Probability of crossover over parent cloning")]
    pub crossover_rate: Option<f64>,

    #[arg(long, help = "Individuals copied unchanged each generation")]
    pub elite_count: Option<usize>,

    #[arg(long, help = "Tournament draw size")]
    pub tournament_size: Option<usize>,

    #[arg(long, help = "Worker threads; 0 = auto-detect")]
    pub workers: Option<usize>,

    #[arg(long, help = "Stop after N stagnant generations; 0 = disabled")]
    pub convergence_stops: Option<usize>,

    #[arg(long, help = "Best-fitness delta counted as stagnation")]
    pub convergence_tolerance: Option<f64>,

    #[arg(long, help = "Snapshot the best layout every N generations")]
    pub save_interval: Option<usize>,
}

impl SearchOverrides {
    /// Loads overrides from a JSON document; absent fields stay unset.
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> KmResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Field-wise precedence merge: values set here win, `fallback`
    /// fills the gaps.
    pub fn or(self, fallback: Self) -> Self {
        Self {
            population_size: self.population_size.or(fallback.population_size),
            max_generations: self.max_generations.or(fallback.max_generations),
            mutation_rate: self.mutation_rate.or(fallback.mutation_rate),
            crossover_rate: self.crossover_rate.or(fallback.crossover_rate),
            elite_count: self.elite_count.or(fallback.elite_count),
            tournament_size: self.tournament_size.or(fallback.tournament_size),
            workers: self.workers.or(fallback.workers),
            convergence_stops: self.convergence_stops.or(fallback.convergence_stops),
            convergence_tolerance: self.convergence_tolerance.or(fallback.convergence_tolerance),
            save_interval: self.save_interval.or(fallback.save_interval),
        }
    }

    pub fn apply(&self, base: EngineConfig) -> EngineConfig {
        EngineConfig {
            population_size: self.population_size.unwrap_or(base.population_size),
            max_generations: self.max_generations.unwrap_or(base.max_generations),
            mutation_rate: self.mutation_rate.unwrap_or(base.mutation_rate),
            crossover_rate: self.crossover_rate.unwrap_or(base.crossover_rate),
            elite_count: self.elite_count.unwrap_or(base.elite_count),
            tournament_size: self.tournament_size.unwrap_or(base.tournament_size),
            worker_count: self.workers.unwrap_or(base.worker_count),
            convergence_stops: self.convergence_stops.unwrap_or(base.convergence_stops),
            convergence_tolerance: self
                .convergence_tolerance
                .unwrap_or(base.convergence_tolerance),
            save_interval: self.save_interval.unwrap_or(base.save_interval),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adaptive_thresholds() {
        assert_eq!(EngineConfig::adaptive(500).population_size, 100);
        assert_eq!(EngineConfig::adaptive(50_000).population_size, 200);
        let large = EngineConfig::adaptive(200_000);
        assert_eq!(large.population_size, 500);
        assert!(large.mutation_rate >= 0.3);
        assert!(large.elite_count <= 2);
    }

    #[test]
    fn validation_catches_bad_configs() {
        let mut cfg = EngineConfig {
            population_size: 5,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        cfg = EngineConfig {
            max_generations: 0,
            convergence_stops: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        cfg = EngineConfig {
            max_generations: 0,
            convergence_stops: 5,
            ..Default::default()
        };
        assert!(cfg.validate().is_ok());

        cfg = EngineConfig {
            mutation_rate: 1.5,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        cfg = EngineConfig {
            elite_count: 100,
            population_size: 100,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn override_merge_prefers_the_left_side() {
        let cli = SearchOverrides {
            population_size: Some(64),
            ..Default::default()
        };
        let file = SearchOverrides {
            population_size: Some(128),
            mutation_rate: Some(0.25),
            ..Default::default()
        };

        let merged = cli.or(file);
        assert_eq!(merged.population_size, Some(64));
        assert_eq!(merged.mutation_rate, Some(0.25));
        assert_eq!(merged.elite_count, None);
    }

    #[test]
    fn overrides_parse_from_partial_json() {
        let parsed: SearchOverrides =
            serde_json::from_str(r#"{"population_size": 42, "convergence_stops": 9}"#).unwrap();
        assert_eq!(parsed.population_size, Some(42));
        assert_eq!(parsed.convergence_stops, Some(9));
        assert_eq!(parsed.mutation_rate, None);
    }

    #[test]
    fn overrides_layer_over_adaptive_base() {
        let overrides = SearchOverrides {
            population_size: Some(50),
            convergence_stops: Some(5),
            ..Default::default()
        };
        let cfg = overrides.apply(EngineConfig::adaptive(200_000));
        assert_eq!(cfg.population_size, 50);
        assert_eq!(cfg.convergence_stops, 5);
        // Untouched knobs keep the adaptive profile
        assert_eq!(cfg.mutation_rate, 0.3);
    }
}
