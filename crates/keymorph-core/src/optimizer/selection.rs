use crate::core_types::Individual;

/// Tournament selection: draw `size` individuals uniformly with
/// replacement and return a clone of the fittest. Ties go to the earliest
/// draw. The clone owns independent permutation storage.
pub fn tournament(population: &[Individual], size: usize, rng: &mut fastrand::Rng) -> Individual {
    debug_assert!(!population.is_empty());

    let mut best = &population[rng.usize(0..population.len())];
    for _ in 1..size {
        let candidate = &population[rng.usize(0..population.len())];
        if candidate.fitness > best.fitness {
            best = candidate;
        }
    }

    best.clone()
}

/// Two independent tournament winners for crossover.
pub fn select_parents(
    population: &[Individual],
    size: usize,
    rng: &mut fastrand::Rng,
) -> (Individual, Individual) {
    (
        tournament(population, size, rng),
        tournament(population, size, rng),
    )
}

/// Top `count` individuals by fitness, stable-sorted so equal scores keep
/// population order. Clones own their storage.
pub fn elites(population: &[Individual], count: usize) -> Vec<Individual> {
    let mut order: Vec<usize> = (0..population.len()).collect();
    order.sort_by(|&a, &b| {
        population[b]
            .fitness
            .partial_cmp(&population[a].fitness)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    order
        .into_iter()
        .take(count)
        .map(|i| population[i].clone())
        .collect()
}
