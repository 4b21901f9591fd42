use crate::core_types::Individual;
use itertools::Itertools;

/// Permutation-preserving mutation strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationMethod {
    Swap,
    Insertion,
    Inversion,
    Scramble,
    Displacement,
}

/// Applies one mutation with a fixed probability. Any applied mutation
/// invalidates the cached fitness.
#[derive(Debug, Clone, Copy)]
pub struct Mutator {
    pub method: MutationMethod,
    pub rate: f64,
}

impl Mutator {
    pub fn new(method: MutationMethod, rate: f64) -> Self {
        Self { method, rate }
    }

    pub fn apply(&self, individual: &mut Individual, rng: &mut fastrand::Rng) {
        self.apply_with_rate(individual, self.rate, rng);
    }

    fn apply_with_rate(&self, individual: &mut Individual, rate: f64, rng: &mut fastrand::Rng) {
        if rng.f64() > rate {
            return;
        }

        match self.method {
            MutationMethod::Swap => swap(&mut individual.layout, rng),
            MutationMethod::Insertion => insertion(&mut individual.layout, rng),
            MutationMethod::Inversion => inversion(&mut individual.layout, rng),
            MutationMethod::Scramble => scramble(&mut individual.layout, rng),
            MutationMethod::Displacement => displacement(&mut individual.layout, rng),
        }

        individual.fitness = 0.0;
    }
}

/// Swap two distinct positions.
fn swap(layout: &mut [char], rng: &mut fastrand::Rng) {
    let len = layout.len();
    if len < 2 {
        return;
    }

    let a = rng.usize(0..len);
    let mut b = rng.usize(0..len);
    while b == a {
        b = rng.usize(0..len);
    }

    layout.swap(a, b);
}

/// Remove one character and reinsert it at another position.
fn insertion(layout: &mut Vec<char>, rng: &mut fastrand::Rng) {
    let len = layout.len();
    if len < 2 {
        return;
    }

    let from = rng.usize(0..len);
    let mut to = rng.usize(0..len);
    while to == from {
        to = rng.usize(0..len);
    }

    let c = layout.remove(from);
    layout.insert(to, c);
}

/// Reverse a random subsequence.
fn inversion(layout: &mut [char], rng: &mut fastrand::Rng) {
    let len = layout.len();
    if len < 2 {
        return;
    }

    let a = rng.usize(0..len);
    let b = rng.usize(0..len);
    let (lo, hi) = (a.min(b), a.max(b));
    layout[lo..=hi].reverse();
}

/// Shuffle a random subsequence in place.
fn scramble(layout: &mut [char], rng: &mut fastrand::Rng) {
    let len = layout.len();
    if len < 2 {
        return;
    }

    let a = rng.usize(0..len);
    let b = rng.usize(0..len);
    let (lo, hi) = (a.min(b), a.max(b));
    rng.shuffle(&mut layout[lo..=hi]);
}

/// Move a random subsequence to a new position.
fn displacement(layout: &mut Vec<char>, rng: &mut fastrand::Rng) {
    let len = layout.len();
    if len < 3 {
        return;
    }

    let start = rng.usize(0..len - 1);
    let end = start + rng.usize(0..len - start);
    let chunk: Vec<char> = layout.drain(start..=end).collect();

    let dest = rng.usize(0..=layout.len());
    for (k, c) in chunk.into_iter().enumerate() {
        layout.insert(dest + k, c);
    }
}

/// Raises the mutation rate as population diversity collapses:
/// at or above the diversity floor the base rate applies, and the rate
/// climbs linearly toward `max_rate` as diversity approaches zero.
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveMutator {
    base: Mutator,
    max_rate: f64,
    diversity_floor: f64,
}

impl AdaptiveMutator {
    pub fn new(method: MutationMethod, base_rate: f64, max_rate: f64, diversity_floor: f64) -> Self {
        Self {
            base: Mutator::new(method, base_rate),
            max_rate,
            diversity_floor,
        }
    }

    pub fn effective_rate(&self, diversity: f64) -> f64 {
        if diversity >= self.diversity_floor {
            self.base.rate
        } else {
            let deficit = 1.0 - diversity / self.diversity_floor;
            self.base.rate + (self.max_rate - self.base.rate) * deficit
        }
    }

    pub fn apply(&self, individual: &mut Individual, diversity: f64, rng: &mut fastrand::Rng) {
        let rate = self.effective_rate(diversity);
        self.base.apply_with_rate(individual, rate, rng);
    }
}

/// Mean pairwise fraction of differing positions over all unordered pairs.
/// 0.0 for a population of clones, approaching 1.0 for unrelated layouts.
pub fn population_diversity(population: &[Individual]) -> f64 {
    if population.len() < 2 {
        return 0.0;
    }

    let mut total = 0.0;
    let mut pairs = 0u64;

    for (a, b) in population.iter().tuple_combinations() {
        total += layout_distance(a, b);
        pairs += 1;
    }

    total / pairs as f64
}

fn layout_distance(a: &Individual, b: &Individual) -> f64 {
    let differing = a
        .layout
        .iter()
        .zip(&b.layout)
        .filter(|(x, y)| x != y)
        .count();
    differing as f64 / a.layout.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::CharacterSet;
    use std::sync::Arc;

    fn individual(seed: u64) -> Individual {
        let cs = Arc::new(CharacterSet::full_keyboard());
        let mut rng = fastrand::Rng::with_seed(seed);
        Individual::random(cs, &mut rng)
    }

    #[test]
    fn every_method_preserves_validity() {
        let mut rng = fastrand::Rng::with_seed(5);
        for method in [
            MutationMethod::Swap,
            MutationMethod::Insertion,
            MutationMethod::Inversion,
            MutationMethod::Scramble,
            MutationMethod::Displacement,
        ] {
            let mutator = Mutator::new(method, 1.0);
            for seed in 0..40 {
                let mut ind = individual(seed);
                mutator.apply(&mut ind, &mut rng);
                assert!(ind.is_valid(), "{:?} broke permutation validity", method);
            }
        }
    }

    #[test]
    fn applied_mutation_invalidates_fitness() {
        let mut ind = individual(1);
        ind.fitness = 0.8;
        let mutator = Mutator::new(MutationMethod::Swap, 1.0);
        let mut rng = fastrand::Rng::with_seed(2);
        mutator.apply(&mut ind, &mut rng);
        assert_eq!(ind.fitness, 0.0);
    }

    #[test]
    fn zero_rate_never_mutates() {
        let mut ind = individual(1);
        ind.fitness = 0.8;
        let before = ind.layout.clone();
        let mutator = Mutator::new(MutationMethod::Swap, 0.0);
        let mut rng = fastrand::Rng::with_seed(2);
        for _ in 0..100 {
            mutator.apply(&mut ind, &mut rng);
        }
        assert_eq!(ind.layout, before);
        assert_eq!(ind.fitness, 0.8);
    }

    #[test]
    fn adaptive_rate_ramps_as_diversity_collapses() {
        let adaptive = AdaptiveMutator::new(MutationMethod::Swap, 0.1, 0.3, 0.3);
        assert!((adaptive.effective_rate(0.5) - 0.1).abs() < 1e-12);
        assert!((adaptive.effective_rate(0.3) - 0.1).abs() < 1e-12);
        assert!((adaptive.effective_rate(0.15) - 0.2).abs() < 1e-12);
        assert!((adaptive.effective_rate(0.0) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn diversity_of_clones_is_zero() {
        let ind = individual(3);
        let pop = vec![ind.clone(), ind.clone(), ind];
        assert_eq!(population_diversity(&pop), 0.0);
    }

    #[test]
    fn diversity_of_random_population_is_high() {
        let pop: Vec<Individual> = (0..10).map(individual).collect();
        assert!(population_diversity(&pop) > 0.8);
    }
}
