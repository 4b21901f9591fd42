use crate::charset::CharacterSet;
use crate::core_types::{Individual, Layout};
use crate::corpus::FrequencyModel;
use crate::geometry::{Geometry, Hand, Row};
use std::sync::Arc;

/// Seeding heuristics blended into the initial population alongside pure
/// random permutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStrategy {
    FrequencyBased,
    HandBalance,
    RowBalance,
    CommonPatternsFirst,
    AntiQwerty,
}

const STRATEGIES: [InitStrategy; 5] = [
    InitStrategy::FrequencyBased,
    InitStrategy::HandBalance,
    InitStrategy::RowBalance,
    InitStrategy::CommonPatternsFirst,
    InitStrategy::AntiQwerty,
];

/// Builds the initial population: a heuristic share cycling through the
/// five strategies, the rest uniformly random. Larger populations get a
/// smaller heuristic share so strong seeds cannot dominate early.
pub fn diverse_population(
    size: usize,
    charset: &Arc<CharacterSet>,
    geometry: &Geometry,
    model: Option<&dyn FrequencyModel>,
    rng: &mut fastrand::Rng,
) -> Vec<Individual> {
    let diverse_ratio = if size >= 500 {
        0.3
    } else if size >= 200 {
        0.4
    } else {
        0.5
    };
    let diverse_count = (size as f64 * diverse_ratio) as usize;

    let mut population = Vec::with_capacity(size);

    for i in 0..diverse_count {
        let strategy = STRATEGIES[i % STRATEGIES.len()];
        population.push(strategy_individual(charset, geometry, model, strategy, rng));
    }

    for _ in diverse_count..size {
        population.push(Individual::random(charset.clone(), rng));
    }

    population
}

/// One individual seeded by the given heuristic. Data-aware strategies
/// fall back to canonical character order when no model is supplied.
pub fn strategy_individual(
    charset: &Arc<CharacterSet>,
    geometry: &Geometry,
    model: Option<&dyn FrequencyModel>,
    strategy: InitStrategy,
    rng: &mut fastrand::Rng,
) -> Individual {
    let layout = match strategy {
        InitStrategy::FrequencyBased => frequency_based(charset, geometry, model, rng),
        InitStrategy::HandBalance => hand_balance(charset, geometry, model, rng),
        InitStrategy::RowBalance => row_balance(charset, geometry, model, rng),
        InitStrategy::CommonPatternsFirst => common_patterns_first(charset, geometry, model, rng),
        InitStrategy::AntiQwerty => anti_qwerty(charset, rng),
    };

    let individual = Individual::new(layout, charset.clone());
    debug_assert!(individual.is_valid());
    individual
}

/// Characters ordered by corpus frequency, most frequent first; canonical
/// order breaks ties and stands in when no model is available.
fn chars_by_frequency(charset: &CharacterSet, model: Option<&dyn FrequencyModel>) -> Vec<char> {
    let mut chars: Vec<char> = charset.chars().to_vec();
    if let Some(model) = model {
        let mut keyed: Vec<(u64, usize, char)> = chars
            .iter()
            .enumerate()
            .map(|(i, &c)| (model.char_count(c), i, c))
            .collect();
        keyed.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        chars = keyed.into_iter().map(|(_, _, c)| c).collect();
    }
    chars
}

/// Positions ordered by ergonomic quality, best first, index breaking ties.
fn positions_by_comfort(geometry: &Geometry) -> Vec<usize> {
    let mut order: Vec<usize> = (0..geometry.len()).collect();
    order.sort_by(|&a, &b| {
        geometry
            .ergonomic_score(b)
            .partial_cmp(&geometry.ergonomic_score(a))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });
    order
}

/// A few random swaps so heuristic seeds do not all collapse to one point.
fn jitter(layout: &mut [char], swaps: usize, rng: &mut fastrand::Rng) {
    let len = layout.len();
    if len < 2 {
        return;
    }
    for _ in 0..swaps {
        let a = rng.usize(0..len);
        let b = rng.usize(0..len);
        layout.swap(a, b);
    }
}

/// Most frequent characters on the most comfortable slots.
fn frequency_based(
    charset: &CharacterSet,
    geometry: &Geometry,
    model: Option<&dyn FrequencyModel>,
    rng: &mut fastrand::Rng,
) -> Layout {
    let chars = chars_by_frequency(charset, model);
    let order = positions_by_comfort(geometry);

    let mut layout = vec!['\0'; charset.size()];
    for (c, pos) in chars.into_iter().zip(order) {
        layout[pos] = c;
    }

    jitter(&mut layout, charset.size() / 10, rng);
    layout
}

/// Frequent characters alternate between hands so neither side carries the
/// bulk of the load.
fn hand_balance(
    charset: &CharacterSet,
    geometry: &Geometry,
    model: Option<&dyn FrequencyModel>,
    rng: &mut fastrand::Rng,
) -> Layout {
    let chars = chars_by_frequency(charset, model);

    let comfortable = positions_by_comfort(geometry);
    let mut left: Vec<usize> = comfortable
        .iter()
        .copied()
        .filter(|&p| geometry.slot(p).hand == Hand::Left)
        .collect();
    let mut right: Vec<usize> = comfortable
        .iter()
        .copied()
        .filter(|&p| geometry.slot(p).hand == Hand::Right)
        .collect();
    left.reverse();
    right.reverse();

    let mut layout = vec!['\0'; charset.size()];
    let mut take_left = true;
    for c in chars {
        let pos = if take_left {
            left.pop().or_else(|| right.pop())
        } else {
            right.pop().or_else(|| left.pop())
        };
        if let Some(pos) = pos {
            layout[pos] = c;
        }
        take_left = !take_left;
    }

    jitter(&mut layout, charset.size() / 10, rng);
    layout
}

/// Frequent characters spread across rows round-robin, home row first.
fn row_balance(
    charset: &CharacterSet,
    geometry: &Geometry,
    model: Option<&dyn FrequencyModel>,
    rng: &mut fastrand::Rng,
) -> Layout {
    let chars = chars_by_frequency(charset, model);

    let row_order = [Row::Home, Row::Top, Row::Bottom, Row::Number, Row::Thumb];
    let comfortable = positions_by_comfort(geometry);
    let mut buckets: Vec<Vec<usize>> = row_order
        .iter()
        .map(|&row| {
            let mut bucket: Vec<usize> = comfortable
                .iter()
                .copied()
                .filter(|&p| geometry.row(p) == row)
                .collect();
            bucket.reverse();
            bucket
        })
        .collect();

    let mut layout = vec!['\0'; charset.size()];
    let mut turn = 0usize;
    for c in chars {
        // Next non-exhausted row in rotation.
        let mut placed = false;
        for k in 0..buckets.len() {
            let bucket = &mut buckets[(turn + k) % row_order.len()];
            if let Some(pos) = bucket.pop() {
                layout[pos] = c;
                placed = true;
                break;
            }
        }
        debug_assert!(placed);
        turn += 1;
    }

    jitter(&mut layout, charset.size() / 10, rng);
    layout
}

/// Letters of the most common English digrams packed onto the home row so
/// frequent pairs start out as neighbors.
fn common_patterns_first(
    charset: &CharacterSet,
    geometry: &Geometry,
    model: Option<&dyn FrequencyModel>,
    rng: &mut fastrand::Rng,
) -> Layout {
    const PATTERN_CHARS: &str = "theinradous";

    let mut home: Vec<usize> = (0..geometry.len())
        .filter(|&p| geometry.row(p) == Row::Home)
        .collect();
    home.sort_by(|&a, &b| {
        geometry
            .slot(a)
            .x
            .partial_cmp(&geometry.slot(b).x)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut layout = vec!['\0'; charset.size()];
    let mut placed: Vec<char> = Vec::new();

    for (c, &pos) in PATTERN_CHARS
        .chars()
        .filter(|&c| charset.contains(c))
        .zip(home.iter())
    {
        layout[pos] = c;
        placed.push(c);
    }

    let mut rest: Vec<char> = chars_by_frequency(charset, model)
        .into_iter()
        .filter(|c| !placed.contains(c))
        .collect();
    rng.shuffle(&mut rest);

    let free: Vec<usize> = (0..layout.len()).filter(|&p| layout[p] == '\0').collect();
    for (pos, c) in free.into_iter().zip(rest) {
        layout[pos] = c;
    }

    layout
}

/// A shuffle that avoids every canonical (QWERTY) slot, pushing the search
/// away from the baseline.
fn anti_qwerty(charset: &CharacterSet, rng: &mut fastrand::Rng) -> Layout {
    let mut layout: Layout = charset.chars().to_vec();
    rng.shuffle(&mut layout);

    let n = layout.len();
    for i in 0..n {
        if Some(layout[i]) == charset.char_at(i) {
            layout.swap(i, (i + 1) % n);
        }
    }

    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::CorpusStats;

    fn fixture() -> (Arc<CharacterSet>, Geometry, CorpusStats) {
        let cs = Arc::new(CharacterSet::full_keyboard());
        let geom = Geometry::standard(&cs);
        let stats = CorpusStats::from_text(
            &"the quick brown fox jumps over the lazy dog. ".repeat(5),
            &cs,
        );
        (cs, geom, stats)
    }

    #[test]
    fn every_strategy_yields_valid_permutations() {
        let (cs, geom, stats) = fixture();
        let mut rng = fastrand::Rng::with_seed(13);

        for strategy in STRATEGIES {
            for _ in 0..10 {
                let ind = strategy_individual(&cs, &geom, Some(&stats), strategy, &mut rng);
                assert!(ind.is_valid(), "{:?} produced an invalid layout", strategy);
            }
        }
    }

    #[test]
    fn strategies_work_without_a_model() {
        let (cs, geom, _) = fixture();
        let mut rng = fastrand::Rng::with_seed(17);
        for strategy in STRATEGIES {
            let ind = strategy_individual(&cs, &geom, None, strategy, &mut rng);
            assert!(ind.is_valid());
        }
    }

    #[test]
    fn diverse_population_has_requested_size_and_distinct_members() {
        let (cs, geom, stats) = fixture();
        let mut rng = fastrand::Rng::with_seed(19);
        let pop = diverse_population(60, &cs, &geom, Some(&stats), &mut rng);
        assert_eq!(pop.len(), 60);
        for ind in &pop {
            assert!(ind.is_valid());
        }
        let distinct: std::collections::HashSet<String> =
            pop.iter().map(|i| i.layout_string()).collect();
        assert!(distinct.len() > 30);
    }

    #[test]
    fn frequency_seed_places_common_letters_comfortably() {
        let (cs, geom, stats) = fixture();
        // The most frequent corpus character should sit well above the
        // comfort floor on average over seeds, jitter included.
        let mut total = 0.0;
        for seed in 0..20 {
            let mut rng = fastrand::Rng::with_seed(seed);
            let ind = strategy_individual(
                &cs,
                &geom,
                Some(&stats),
                InitStrategy::FrequencyBased,
                &mut rng,
            );
            let top_char = stats.most_frequent_chars(1)[0].0;
            let pos = ind.layout.iter().position(|&c| c == top_char).unwrap();
            total += geom.ergonomic_score(pos);
        }
        assert!(total / 20.0 > 0.6);
    }

    #[test]
    fn anti_qwerty_has_no_fixed_points() {
        let (cs, _, _) = fixture();
        let mut rng = fastrand::Rng::with_seed(23);
        for _ in 0..20 {
            let layout = anti_qwerty(&cs, &mut rng);
            let fixed = layout
                .iter()
                .enumerate()
                .filter(|(i, &c)| cs.char_at(*i) == Some(c))
                .count();
            // The neighbor swap removes fixed points; a final-slot swap can
            // at worst leave a single one behind.
            assert!(fixed <= 1);
        }
    }
}
