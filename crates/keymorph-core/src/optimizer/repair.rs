use crate::core_types::Individual;

/// Restores permutation validity after variation.
///
/// Slots holding NUL, out-of-set characters, or repeated characters are
/// rewritten with the missing characters in canonical order; a wrong-length
/// layout is first resized to N. The result is valid by construction.
pub fn repair(individual: &mut Individual) {
    let charset = individual.charset.clone();
    let n = charset.size();

    if individual.layout.len() != n {
        individual.layout.resize(n, '\0');
        individual.fitness = 0.0;
    }

    let mut seen = vec![false; n];
    let mut invalid_slots = Vec::new();

    for (i, &c) in individual.layout.iter().enumerate() {
        match charset.position_of(c) {
            Some(pos) if !seen[pos] => seen[pos] = true,
            _ => invalid_slots.push(i),
        }
    }

    if invalid_slots.is_empty() {
        return;
    }

    let mut missing = charset
        .chars()
        .iter()
        .enumerate()
        .filter(|(pos, _)| !seen[*pos])
        .map(|(_, &c)| c);

    for slot in invalid_slots {
        if let Some(c) = missing.next() {
            individual.layout[slot] = c;
        }
    }

    individual.fitness = 0.0;
}
