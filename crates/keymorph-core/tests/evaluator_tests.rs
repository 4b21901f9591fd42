use keymorph_core::charset::CharacterSet;
use keymorph_core::corpus::{CorpusStats, FrequencyModel};
use keymorph_core::fitness::FitnessEvaluator;
use keymorph_core::Individual;
use rstest::rstest;
use std::sync::Arc;

fn english_corpus(charset: &CharacterSet) -> CorpusStats {
    CorpusStats::from_text(
        &"the quick brown fox jumps over the lazy dog. ".repeat(10),
        charset,
    )
}

#[rstest]
#[case::all_nulls(all_nulls)]
#[case::partial_nulls(partial_nulls)]
#[case::duplicate(duplicate)]
#[case::truncated(truncated)]
#[case::overlong(overlong)]
#[case::foreign_glyph(foreign_glyph)]
fn corrupted_layouts_score_exactly_zero(#[case] corrupt: fn(&mut Vec<char>)) {
    let cs = CharacterSet::full_keyboard();
    let stats = english_corpus(&cs);
    let ev = FitnessEvaluator::standard(&cs);

    let mut layout = cs.chars().to_vec();
    corrupt(&mut layout);
    assert_eq!(ev.evaluate(&layout, &cs, &stats), 0.0);
}

fn all_nulls(l: &mut Vec<char>) {
    l.iter_mut().for_each(|c| *c = '\0');
}

fn partial_nulls(l: &mut Vec<char>) {
    l[0] = '\0';
    l[5] = '\0';
}

fn duplicate(l: &mut Vec<char>) {
    l[1] = l[0];
}

fn truncated(l: &mut Vec<char>) {
    l.truncate(30);
}

fn overlong(l: &mut Vec<char>) {
    l.push('a');
}

fn foreign_glyph(l: &mut Vec<char>) {
    l[10] = 'ß';
}

#[test]
fn repeated_evaluation_is_bit_identical() {
    let cs = CharacterSet::full_keyboard();
    let stats = english_corpus(&cs);
    let ev = FitnessEvaluator::standard(&cs);

    let mut rng = fastrand::Rng::with_seed(21);
    let ind = Individual::random(Arc::new(cs.clone()), &mut rng);

    let reference = ev.evaluate(&ind.layout, &cs, &stats);
    assert!(reference > 0.0);
    for _ in 0..10 {
        let again = ev.evaluate(&ind.layout, &cs, &stats);
        assert_eq!(reference.to_bits(), again.to_bits());
    }
}

#[test]
fn random_layouts_produce_diverse_positive_fitness() {
    let cs = Arc::new(CharacterSet::full_keyboard());
    let stats = english_corpus(&cs);
    let ev = FitnessEvaluator::standard(&cs);
    assert!(stats.total_chars() >= 100);

    let mut rng = fastrand::Rng::with_seed(33);
    let mut seen = std::collections::HashSet::new();

    for _ in 0..20 {
        let ind = Individual::random(cs.clone(), &mut rng);
        let fitness = ev.evaluate(&ind.layout, &cs, &stats);
        assert!(fitness > 0.0);
        seen.insert(fitness.to_bits());
    }

    assert!(
        seen.len() >= 10,
        "only {} distinct fitness values over 20 layouts",
        seen.len()
    );
}

#[test]
fn qwerty_baseline_lands_in_the_expected_band() {
    let cs = CharacterSet::full_keyboard();
    let stats = english_corpus(&cs);
    let ev = FitnessEvaluator::standard(&cs);

    let qwerty: Vec<char> = cs.chars().to_vec();
    let fitness = ev.evaluate(&qwerty, &cs, &stats);

    assert!(
        fitness > 0.2 && fitness < 0.8,
        "QWERTY fitness {fitness} out of band"
    );
}

#[test]
fn component_scores_stay_in_expected_ranges() {
    let cs = Arc::new(CharacterSet::full_keyboard());
    let stats = english_corpus(&cs);
    let ev = FitnessEvaluator::standard(&cs);

    let mut rng = fastrand::Rng::with_seed(41);
    for _ in 0..10 {
        let ind = Individual::random(cs.clone(), &mut rng);
        let s = ev.component_scores(&ind.layout, &cs, &stats);

        for (name, value) in [
            ("finger_distance", s.finger_distance),
            ("hand_alternation", s.hand_alternation),
            ("finger_balance", s.finger_balance),
            ("row_jumping", s.row_jumping),
            ("bigram_efficiency", s.bigram_efficiency),
            ("same_finger_digrams", s.same_finger_digrams),
            ("lateral_stretch", s.lateral_stretch),
            ("roll_quality", s.roll_quality),
            ("layer_penalty", s.layer_penalty),
            ("roll_ratio_target", s.roll_ratio_target),
            ("threshold_bonuses", s.threshold_bonuses),
            ("position_matching", s.position_matching),
        ] {
            assert!(
                (0.0..=1.0).contains(&value),
                "{name} escaped [0, 1]: {value}"
            );
        }
        // The home-row curve may exceed 1 for exceptional placements.
        assert!(s.home_row_bonus >= 0.0);
    }
}

#[test]
fn alphabet_instantiation_evaluates_like_the_full_path() {
    let cs = CharacterSet::alphabet();
    let stats = english_corpus(&cs);
    let ev = FitnessEvaluator::standard(&cs);

    let layout: Vec<char> = cs.chars().to_vec();
    let fitness = ev.evaluate(&layout, &cs, &stats);
    assert!(fitness > 0.0);

    let mut bad = layout.clone();
    bad[3] = '\0';
    assert_eq!(ev.evaluate(&bad, &cs, &stats), 0.0);
}

#[test]
fn a_single_swap_changes_the_composite() {
    let cs = CharacterSet::full_keyboard();
    let stats = english_corpus(&cs);
    let ev = FitnessEvaluator::standard(&cs);

    // Move 'e' (frequent, top row) onto the home-row slot 'j' occupies.
    let mut improved: Vec<char> = cs.chars().to_vec();
    let e_pos = cs.position_of('e').unwrap();
    let j_pos = cs.position_of('j').unwrap();
    improved.swap(e_pos, j_pos);

    let base = ev.evaluate(cs.chars(), &cs, &stats);
    let swapped = ev.evaluate(&improved, &cs, &stats);
    assert!(swapped.is_finite() && base.is_finite());
    assert_ne!(swapped.to_bits(), base.to_bits());
}
