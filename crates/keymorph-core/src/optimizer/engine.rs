use crate::charset::CharacterSet;
use crate::config::EngineConfig;
use crate::core_types::Individual;
use crate::corpus::FrequencyModel;
use crate::error::{KeymorphError, KmResult};
use crate::fitness::FitnessEvaluator;
use crate::optimizer::crossover::{crossover, CrossoverMethod};
use crate::optimizer::mutation::{population_diversity, AdaptiveMutator, MutationMethod, Mutator};
use crate::optimizer::repair::repair;
use crate::optimizer::{initialize, selection};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Best fitness at which the search stops early.
const PERFECTION_THRESHOLD: f64 = 0.99;

/// Population size from which diversity maintenance engages.
const DIVERSITY_MAINTENANCE_FLOOR: usize = 200;

/// Diversity below which random individuals displace the weakest elites.
const DIVERSITY_CRITICAL: f64 = 0.1;

/// Diversity at which adaptive mutation starts ramping toward its maximum.
const DIVERSITY_RAMP_START: f64 = 0.3;

/// Cooperative cancellation flag, polled between generations and at each
/// worker's job-loop entry.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Per-generation observation hook. The engine hands over a deep-copied
/// snapshot; observers must not assume it aliases engine state. A returned
/// error is logged and the search continues.
pub trait ProgressObserver: Send + Sync {
    fn on_generation(&self, generation: usize, best: &Individual) -> Result<(), String>;
}

/// Observer that ignores every event.
pub struct NullObserver;

impl ProgressObserver for NullObserver {
    fn on_generation(&self, _generation: usize, _best: &Individual) -> Result<(), String> {
        Ok(())
    }
}

/// Result of one engine run.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub best: Individual,
    /// Best-ever fitness after each completed generation.
    pub trajectory: Vec<f64>,
    pub generations: usize,
    pub cancelled: bool,
}

/// Population-based parallel search over layout permutations.
///
/// Fixed master seed implies identical trajectories and an identical
/// winner: worker generators are derived per (generation, slot) and every
/// result is written back by index, so thread scheduling cannot leak into
/// the evolution.
pub struct ParallelEngine {
    config: EngineConfig,
    charset: Arc<CharacterSet>,
    evaluator: Arc<FitnessEvaluator>,
    pool: rayon::ThreadPool,
}

impl ParallelEngine {
    pub fn new(
        config: EngineConfig,
        charset: Arc<CharacterSet>,
        evaluator: FitnessEvaluator,
    ) -> KmResult<Self> {
        config.validate()?;

        let workers = config.resolved_workers();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| KeymorphError::Config(format!("worker pool: {e}")))?;

        debug!("engine pool ready with {} workers", workers);

        Ok(Self {
            config,
            charset,
            evaluator: Arc::new(evaluator),
            pool,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs the full search. `seed` fixes the master seed for reproducible
    /// runs; `None` draws one from entropy.
    pub fn run(
        &self,
        model: &dyn FrequencyModel,
        seed: Option<u64>,
        observer: &dyn ProgressObserver,
        cancel: &CancelToken,
    ) -> KmResult<SearchOutcome> {
        self.check_corpus(model)?;

        let cfg = &self.config;
        let master = seed.unwrap_or_else(|| fastrand::u64(..));
        let mut rng = fastrand::Rng::with_seed(splitmix64(master));

        info!(
            "starting search: population={} workers={} seed={:#x}",
            cfg.population_size,
            cfg.resolved_workers(),
            master
        );

        let mut population = initialize::diverse_population(
            cfg.population_size,
            &self.charset,
            self.evaluator.geometry(),
            Some(model),
            &mut rng,
        );
        self.evaluate_population(&mut population, model);

        // The deterministic first individual seeds best-ever, so a run over
        // an all-zero fitness landscape still returns something definite.
        let mut best = population[0].clone();
        for ind in &population[1..] {
            if ind.fitness > best.fitness {
                best = ind.clone();
            }
        }

        let mut trajectory = Vec::new();
        let mut convergence_count = 0usize;
        let mut last_best = f64::NEG_INFINITY;
        let mut cancelled = false;

        let max_generations = if cfg.max_generations == 0 {
            usize::MAX
        } else {
            cfg.max_generations
        };

        for generation in 0..max_generations {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let diversity = if self.diversity_maintenance_active() {
                Some(population_diversity(&population))
            } else {
                None
            };

            let elite_count = self.adaptive_elite_count();
            let mut elites = selection::elites(&population, elite_count);

            if let Some(d) = diversity {
                if d < DIVERSITY_CRITICAL && !elites.is_empty() {
                    let keep = (elite_count * 2 / 3).max(1);
                    elites.truncate(keep);
                    debug!(
                        "diversity {:.3} below critical; injecting {} random individuals",
                        d,
                        elite_count - keep
                    );
                    for _ in keep..elite_count {
                        let mut fresh = Individual::random(self.charset.clone(), &mut rng);
                        fresh.fitness =
                            self.evaluator
                                .evaluate(&fresh.layout, &self.charset, model);
                        elites.push(fresh);
                    }
                }
            }

            let offspring_count = cfg.population_size.saturating_sub(elites.len());
            let mut offspring =
                self.spawn_offspring(&population, offspring_count, generation, master, diversity, cancel);
            self.evaluate_population(&mut offspring, model);

            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            population = elites;
            population.append(&mut offspring);
            population.truncate(cfg.population_size);

            let mut improved = false;
            for ind in &population {
                if ind.fitness > best.fitness {
                    best = ind.clone();
                    best.age = generation;
                    improved = true;
                }
            }
            if improved {
                debug!("generation {}: best-ever {:.6}", generation, best.fitness);
            }

            trajectory.push(best.fitness);

            let snapshot = best.clone();
            if let Err(e) = observer.on_generation(generation, &snapshot) {
                warn!("observer failed at generation {}: {}", generation, e);
            }

            if cfg.convergence_stops > 0 {
                if last_best > f64::NEG_INFINITY {
                    if (best.fitness - last_best).abs() <= cfg.convergence_tolerance {
                        convergence_count += 1;
                        if convergence_count >= cfg.convergence_stops {
                            info!(
                                "converged after {} stagnant generations at {:.6}",
                                convergence_count, best.fitness
                            );
                            break;
                        }
                    } else {
                        convergence_count = 0;
                    }
                }
                last_best = best.fitness;
            }

            if best.fitness >= PERFECTION_THRESHOLD {
                info!("perfection threshold reached at generation {}", generation);
                break;
            }
        }

        let generations = trajectory.len();
        info!(
            "search finished: {} generations, best {:.6}{}",
            generations,
            best.fitness,
            if cancelled { " (cancelled)" } else { "" }
        );

        Ok(SearchOutcome {
            best,
            trajectory,
            generations,
            cancelled,
        })
    }

    fn check_corpus(&self, model: &dyn FrequencyModel) -> KmResult<()> {
        let total = model.total_chars();
        if total < 100 {
            return Err(KeymorphError::InsufficientCorpus(format!(
                "only {total} characters, need at least 100"
            )));
        }

        let distinct = self
            .charset
            .chars()
            .iter()
            .filter(|&&c| model.char_count(c) > 0)
            .count();
        if distinct < 10 {
            return Err(KeymorphError::InsufficientCorpus(format!(
                "only {distinct} distinct characters, need at least 10"
            )));
        }

        let digrams = model.digrams().len();
        if digrams < 20 {
            return Err(KeymorphError::InsufficientCorpus(format!(
                "only {digrams} distinct digrams, need at least 20"
            )));
        }

        Ok(())
    }

    fn diversity_maintenance_active(&self) -> bool {
        self.config.population_size >= DIVERSITY_MAINTENANCE_FLOOR
    }

    /// Elite window: the configured count, clamped to 1%..3% of the
    /// population when diversity maintenance is active.
    fn adaptive_elite_count(&self) -> usize {
        let configured = self.config.elite_count;
        if !self.diversity_maintenance_active() {
            return configured;
        }
        let p = self.config.population_size;
        let min_elites = (p / 100).max(1);
        let max_elites = (p / 33).max(3);
        configured.clamp(min_elites, max_elites)
    }

    fn evaluate_population(&self, population: &mut [Individual], model: &dyn FrequencyModel) {
        let evaluator = self.evaluator.clone();
        let charset = self.charset.clone();
        self.pool.install(|| {
            population.par_iter_mut().for_each(|ind| {
                ind.fitness = evaluator.evaluate(&ind.layout, &charset, model);
            });
        });
    }

    fn spawn_offspring(
        &self,
        population: &[Individual],
        count: usize,
        generation: usize,
        master: u64,
        diversity: Option<f64>,
        cancel: &CancelToken,
    ) -> Vec<Individual> {
        let cfg = &self.config;
        let mutator = Mutator::new(MutationMethod::Swap, cfg.mutation_rate);
        let adaptive = AdaptiveMutator::new(
            MutationMethod::Swap,
            cfg.mutation_rate,
            cfg.mutation_rate * 3.0,
            DIVERSITY_RAMP_START,
        );

        self.pool.install(|| {
            (0..count)
                .into_par_iter()
                .map(|slot| {
                    // Cancellation makes the slot a throwaway clone; the
                    // generation is discarded before it can matter.
                    if cancel.is_cancelled() {
                        return population[slot % population.len()].clone();
                    }

                    let mut rng = fastrand::Rng::with_seed(worker_seed(
                        master,
                        generation as u64,
                        slot as u64,
                    ));

                    let (parent1, parent2) =
                        selection::select_parents(population, cfg.tournament_size, &mut rng);

                    let mut child = if rng.f64() < cfg.crossover_rate {
                        crossover(CrossoverMethod::Order, &parent1, &parent2, &mut rng)
                    } else if rng.bool() {
                        parent1.clone()
                    } else {
                        parent2.clone()
                    };

                    match diversity {
                        Some(d) => adaptive.apply(&mut child, d, &mut rng),
                        None => mutator.apply(&mut child, &mut rng),
                    }

                    repair(&mut child);
                    debug_assert!(child.is_valid(), "repair produced an invalid layout");
                    if !child.is_valid() {
                        child = Individual::random(self.charset.clone(), &mut rng);
                    }

                    child
                })
                .collect()
        })
    }
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Deterministic per-slot generator seed: thread scheduling never touches
/// the random stream an offspring slot sees.
fn worker_seed(master: u64, generation: u64, slot: u64) -> u64 {
    splitmix64(splitmix64(master ^ generation.wrapping_mul(0x9E37_79B9)) ^ slot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_seeds_are_distinct_across_slots_and_generations() {
        let mut seen = std::collections::HashSet::new();
        for generation in 0..50u64 {
            for slot in 0..50u64 {
                assert!(seen.insert(worker_seed(42, generation, slot)));
            }
        }
    }

    #[test]
    fn cancel_token_round_trip() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
