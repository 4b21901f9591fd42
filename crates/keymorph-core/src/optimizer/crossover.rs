use crate::core_types::Individual;
use fnv::{FnvHashMap, FnvHashSet};

/// Permutation-preserving crossover strategies. All variants produce one
/// child per call; given valid parents the child is a permutation of the
/// character set without repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossoverMethod {
    Order,
    PartiallyMatched,
    Cycle,
    Uniform,
}

pub fn crossover(
    method: CrossoverMethod,
    parent1: &Individual,
    parent2: &Individual,
    rng: &mut fastrand::Rng,
) -> Individual {
    match method {
        CrossoverMethod::Order => order_crossover(parent1, parent2, rng),
        CrossoverMethod::PartiallyMatched => pmx_crossover(parent1, parent2, rng),
        CrossoverMethod::Cycle => cycle_crossover(parent1, parent2),
        CrossoverMethod::Uniform => uniform_crossover(parent1, parent2, rng),
    }
}

fn sorted_cut_points(len: usize, rng: &mut fastrand::Rng) -> (usize, usize) {
    let a = rng.usize(0..len);
    let b = rng.usize(0..len);
    (a.min(b), a.max(b))
}

/// Order crossover (OX): copies parent1's `[p1..=p2]` window, then fills
/// the remaining slots with parent2's characters in the order they appear
/// starting at `(p2 + 1) mod L`, preserving parent2's relative order
/// outside the window.
fn order_crossover(
    parent1: &Individual,
    parent2: &Individual,
    rng: &mut fastrand::Rng,
) -> Individual {
    let len = parent1.layout.len();
    let (p1, p2) = sorted_cut_points(len, rng);

    let mut layout = vec!['\0'; len];
    let mut used: FnvHashSet<char> = FnvHashSet::default();

    for i in p1..=p2 {
        layout[i] = parent1.layout[i];
        used.insert(parent1.layout[i]);
    }

    let mut write = (p2 + 1) % len;
    for offset in 0..len {
        let c = parent2.layout[(p2 + 1 + offset) % len];
        if used.contains(&c) {
            continue;
        }
        while layout[write] != '\0' {
            write = (write + 1) % len;
        }
        layout[write] = c;
        used.insert(c);
    }

    Individual::new(layout, parent1.charset.clone())
}

/// Partially matched crossover (PMX): copies parent1's window, then fills
/// each outside slot with parent2's character, chased through the window
/// mapping until it no longer collides with a copied character.
fn pmx_crossover(
    parent1: &Individual,
    parent2: &Individual,
    rng: &mut fastrand::Rng,
) -> Individual {
    let len = parent1.layout.len();
    let (p1, p2) = sorted_cut_points(len, rng);

    let pos_in_p1: FnvHashMap<char, usize> = parent1
        .layout
        .iter()
        .enumerate()
        .map(|(i, &c)| (c, i))
        .collect();

    let window: FnvHashSet<char> = parent1.layout[p1..=p2].iter().copied().collect();

    let mut layout = parent2.layout.clone();
    layout[p1..=p2].copy_from_slice(&parent1.layout[p1..=p2]);

    for i in (0..p1).chain(p2 + 1..len) {
        let mut c = parent2.layout[i];
        while window.contains(&c) {
            c = parent2.layout[pos_in_p1[&c]];
        }
        layout[i] = c;
    }

    Individual::new(layout, parent1.charset.clone())
}

/// Cycle crossover (CX): partitions positions into cycles and copies
/// alternate cycles from alternate parents, so every character keeps the
/// position it holds in one of its parents.
fn cycle_crossover(parent1: &Individual, parent2: &Individual) -> Individual {
    let len = parent1.layout.len();

    let pos_in_p1: FnvHashMap<char, usize> = parent1
        .layout
        .iter()
        .enumerate()
        .map(|(i, &c)| (c, i))
        .collect();

    let mut layout = vec!['\0'; len];
    let mut assigned = vec![false; len];
    let mut from_parent1 = true;

    for start in 0..len {
        if assigned[start] {
            continue;
        }

        let mut i = start;
        loop {
            layout[i] = if from_parent1 {
                parent1.layout[i]
            } else {
                parent2.layout[i]
            };
            assigned[i] = true;

            i = match pos_in_p1.get(&parent2.layout[i]) {
                Some(&next) => next,
                None => break,
            };
            if i == start || assigned[i] {
                break;
            }
        }

        from_parent1 = !from_parent1;
    }

    Individual::new(layout, parent1.charset.clone())
}

/// Uniform crossover with two-pass conflict resolution: tentatively pick a
/// parent character per slot, then fill collisions from the leftover
/// characters in canonical order.
fn uniform_crossover(
    parent1: &Individual,
    parent2: &Individual,
    rng: &mut fastrand::Rng,
) -> Individual {
    let len = parent1.layout.len();
    let mut layout = vec!['\0'; len];
    let mut used: FnvHashSet<char> = FnvHashSet::default();

    for i in 0..len {
        let pick = if rng.bool() {
            parent1.layout[i]
        } else {
            parent2.layout[i]
        };
        if used.insert(pick) {
            layout[i] = pick;
        }
    }

    let mut leftovers = parent1
        .charset
        .chars()
        .iter()
        .filter(|c| !used.contains(c));

    for slot in layout.iter_mut() {
        if *slot == '\0' {
            if let Some(&c) = leftovers.next() {
                *slot = c;
            }
        }
    }

    Individual::new(layout, parent1.charset.clone())
}
