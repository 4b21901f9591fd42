use crate::charset::CharacterSet;
use crate::corpus::FrequencyModel;
use crate::fitness::layers::LayerMap;
use crate::fitness::weights::FitnessWeights;
use crate::geometry::{Geometry, Row};
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};

/// Finger-pair efficiency ratings for the BigramEfficiency component.
const EFFICIENCY_SAME_FINGER: f64 = 0.1;
const EFFICIENCY_ADJACENT_SAME_HAND: f64 = 0.3;
const EFFICIENCY_CROSS_HAND: f64 = 1.0;
const EFFICIENCY_OTHER: f64 = 0.6;

/// Column span beyond which an index-finger digram counts as a lateral
/// stretch.
const LATERAL_STRETCH_SPAN: f64 = 2.0;

/// Surcharge for a digram where both glyphs hold a modifier.
const CONSECUTIVE_MODIFIER_SURCHARGE: f64 = 0.3;

/// Ergonomic target for the share of rolls among same-hand digrams.
const ROLL_RATIO_TARGET: f64 = 0.35;

/// Per-component breakdown of a composite score. Each component lands in
/// roughly [0, 1]; HomeRowBonus may exceed 1 for exceptional layouts.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ComponentScores {
    pub finger_distance: f64,
    pub hand_alternation: f64,
    pub finger_balance: f64,
    pub row_jumping: f64,
    pub bigram_efficiency: f64,
    pub same_finger_digrams: f64,
    pub lateral_stretch: f64,
    pub roll_quality: f64,
    pub layer_penalty: f64,
    pub home_row_bonus: f64,
    pub roll_ratio_target: f64,
    pub threshold_bonuses: f64,
    pub position_matching: f64,

    // Raw rates kept for reporting
    pub sfb_rate: f64,
    pub alternation_rate: f64,
    pub roll_rate: f64,
    pub home_row_usage: f64,
}

impl ComponentScores {
    pub fn weighted_total(&self, w: &FitnessWeights) -> f64 {
        w.finger_distance * self.finger_distance
            + w.hand_alternation * self.hand_alternation
            + w.finger_balance * self.finger_balance
            + w.row_jumping * self.row_jumping
            + w.bigram_efficiency * self.bigram_efficiency
            + w.same_finger_digrams * self.same_finger_digrams
            + w.lateral_stretch * self.lateral_stretch
            + w.roll_quality * self.roll_quality
            + w.layer_penalty * self.layer_penalty
            + w.home_row_bonus * self.home_row_bonus
            + w.roll_ratio_target * self.roll_ratio_target
            + w.threshold_bonuses * self.threshold_bonuses
            + w.position_matching * self.position_matching
    }
}

/// Accumulators for the single pass over the digram snapshot.
#[derive(Debug, Default)]
struct DigramTallies {
    total_mass: f64,
    distance_sum: f64,
    alternation_mass: f64,
    row_jump_mass: f64,
    efficiency_sum: f64,
    sfb_mass: f64,
    lsb_mass: f64,
    roll_mass: f64,
    same_hand_mass: f64,
    both_modifier_mass: f64,
}

/// Accumulators for the pass over single-character frequencies.
#[derive(Debug, Default)]
struct CharTallies {
    total_mass: f64,
    finger_mass: [f64; 8],
    home_mass: f64,
    position_score_sum: f64,
    modifier_cost_sum: f64,
}

/// Pure mapping from (layout, frequency model) to a composite score.
///
/// Never fails: an invalid layout scores exactly 0.0 and an empty model
/// degrades each component to its neutral value.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    geometry: Geometry,
    weights: FitnessWeights,
    layers: LayerMap,
}

impl FitnessEvaluator {
    pub fn new(geometry: Geometry, weights: FitnessWeights, layers: LayerMap) -> Self {
        Self {
            geometry,
            weights,
            layers,
        }
    }

    /// Evaluator over the standard geometry with reference weights.
    pub fn standard(charset: &CharacterSet) -> Self {
        Self::new(
            Geometry::standard(charset),
            FitnessWeights::default(),
            LayerMap::us_qwerty(),
        )
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn weights(&self) -> &FitnessWeights {
        &self.weights
    }

    pub fn set_weights(&mut self, weights: FitnessWeights) {
        self.weights = weights;
    }

    /// Composite fitness in [0, +inf). Exactly 0.0 for any layout that
    /// fails the charset validity oracle.
    pub fn evaluate(
        &self,
        layout: &[char],
        charset: &CharacterSet,
        model: &dyn FrequencyModel,
    ) -> f64 {
        self.component_scores(layout, charset, model)
            .weighted_total(&self.weights)
    }

    /// Full component breakdown; the all-zero record for invalid layouts.
    pub fn component_scores(
        &self,
        layout: &[char],
        charset: &CharacterSet,
        model: &dyn FrequencyModel,
    ) -> ComponentScores {
        if !charset.is_valid(layout) {
            return ComponentScores::default();
        }

        let char_to_pos: FnvHashMap<char, usize> = layout
            .iter()
            .enumerate()
            .map(|(pos, &c)| (c, pos))
            .collect();

        let digrams = self.tally_digrams(model, &char_to_pos);
        let chars = self.tally_chars(charset, model, &char_to_pos);

        self.compose(&digrams, &chars)
    }

    fn tally_digrams(
        &self,
        model: &dyn FrequencyModel,
        char_to_pos: &FnvHashMap<char, usize>,
    ) -> DigramTallies {
        let mut t = DigramTallies::default();

        for d in model.digrams() {
            // Digrams touching characters absent from the layout contribute
            // to neither numerator nor denominator.
            let (p1, p2) = match (char_to_pos.get(&d.first), char_to_pos.get(&d.second)) {
                (Some(&p1), Some(&p2)) => (p1, p2),
                _ => continue,
            };

            let freq = d.count as f64;
            t.total_mass += freq;

            let s1 = self.geometry.slot(p1);
            let s2 = self.geometry.slot(p2);

            t.distance_sum += self.geometry.euclidean_distance(p1, p2) * freq;

            let same_hand = s1.hand == s2.hand;
            let same_finger = s1.finger == s2.finger;
            let same_row = s1.row == s2.row;
            let adjacent = s1.finger.abs_diff(s2.finger) == 1;

            if same_hand {
                t.same_hand_mass += freq;
            } else {
                t.alternation_mass += freq;
            }

            if !same_row {
                t.row_jump_mass += freq;
            }

            let rating = if same_finger {
                EFFICIENCY_SAME_FINGER
            } else if adjacent && same_hand {
                EFFICIENCY_ADJACENT_SAME_HAND
            } else if !same_hand {
                EFFICIENCY_CROSS_HAND
            } else {
                EFFICIENCY_OTHER
            };
            t.efficiency_sum += rating * freq;

            if same_finger {
                t.sfb_mass += freq;
            }

            // Lateral stretch: both keys on one index finger, far apart
            // on the same row.
            let both_index = same_finger && (s1.finger == 3 || s1.finger == 4);
            if both_index && same_row && (s1.x - s2.x).abs() > LATERAL_STRETCH_SPAN {
                t.lsb_mass += freq;
            }

            if same_hand && adjacent && same_row {
                t.roll_mass += freq;
            }

            if self.layers.needs_modifier(d.first) && self.layers.needs_modifier(d.second) {
                t.both_modifier_mass += freq;
            }
        }

        t
    }

    fn tally_chars(
        &self,
        charset: &CharacterSet,
        model: &dyn FrequencyModel,
        char_to_pos: &FnvHashMap<char, usize>,
    ) -> CharTallies {
        let mut t = CharTallies::default();

        for &c in charset.chars() {
            let pos = match char_to_pos.get(&c) {
                Some(&pos) => pos,
                None => continue,
            };

            let freq = model.char_count(c) as f64;
            if freq == 0.0 {
                continue;
            }

            let slot = self.geometry.slot(pos);
            t.total_mass += freq;
            t.finger_mass[slot.finger as usize] += freq;
            if slot.row == Row::Home {
                t.home_mass += freq;
            }
            t.position_score_sum += self.geometry.ergonomic_score(pos) * freq;
            t.modifier_cost_sum += self.layers.modifier_cost(c) * freq;
        }

        t
    }

    fn compose(&self, d: &DigramTallies, c: &CharTallies) -> ComponentScores {
        let mut s = ComponentScores::default();

        let has_digrams = d.total_mass > 0.0;
        let has_chars = c.total_mass > 0.0;

        // 1. FingerDistance: shorter travel, higher score.
        s.finger_distance = if has_digrams {
            1.0 / (1.0 + d.distance_sum / d.total_mass)
        } else {
            0.0
        };

        // 2. HandAlternation
        s.alternation_rate = if has_digrams {
            d.alternation_mass / d.total_mass
        } else {
            0.0
        };
        s.hand_alternation = s.alternation_rate;

        // 3. FingerBalance: spread of per-finger mass.
        s.finger_balance = if has_chars {
            let mean = c.total_mass / 8.0;
            let variance = c
                .finger_mass
                .iter()
                .map(|&m| (m - mean) * (m - mean))
                .sum::<f64>()
                / 8.0;
            1.0 / (1.0 + variance.sqrt() / mean)
        } else {
            0.0
        };

        // 4. RowJumping (inverted penalty)
        s.row_jumping = if has_digrams {
            1.0 - d.row_jump_mass / d.total_mass
        } else {
            1.0
        };

        // 5. BigramEfficiency
        s.bigram_efficiency = if has_digrams {
            d.efficiency_sum / d.total_mass
        } else {
            0.0
        };

        // 6. SameFingerDigrams (inverted penalty)
        s.sfb_rate = if has_digrams {
            d.sfb_mass / d.total_mass
        } else {
            0.0
        };
        s.same_finger_digrams = if has_digrams { 1.0 - s.sfb_rate } else { 1.0 };

        // 7. LateralStretch (inverted penalty)
        s.lateral_stretch = if has_digrams {
            1.0 - d.lsb_mass / d.total_mass
        } else {
            1.0
        };

        // 8. RollQuality, thresholded.
        s.roll_rate = if has_digrams {
            d.roll_mass / d.total_mass
        } else {
            0.0
        };
        s.roll_quality = roll_score(s.roll_rate);

        // 9. LayerPenalty (inverted penalty)
        s.layer_penalty = if has_chars {
            let penalty = c.modifier_cost_sum
                + CONSECUTIVE_MODIFIER_SURCHARGE * d.both_modifier_mass;
            1.0 / (1.0 + penalty / c.total_mass)
        } else {
            1.0
        };

        // 10. HomeRowBonus, piecewise on home-row usage.
        s.home_row_usage = if has_chars {
            c.home_mass / c.total_mass
        } else {
            0.0
        };
        s.home_row_bonus = home_row_score(s.home_row_usage);

        // 11. RollRatioTarget: deviation from the ergonomic roll share.
        s.roll_ratio_target = if d.same_hand_mass > 0.0 {
            let share = d.roll_mass / d.same_hand_mass;
            (1.0 - (share - ROLL_RATIO_TARGET).abs() / ROLL_RATIO_TARGET).max(0.0)
        } else {
            0.0
        };

        // 12. ThresholdBonuses
        s.threshold_bonuses = if has_digrams {
            let mut bonus = 0.0;
            if s.alternation_rate >= 0.30 {
                bonus += 0.10;
            }
            if s.alternation_rate >= 0.45 {
                bonus += 0.15;
            }
            if s.alternation_rate >= 0.60 {
                bonus += 0.20;
            }
            if s.roll_quality >= 0.20 {
                bonus += 0.15;
            }
            if s.roll_quality >= 0.40 {
                bonus += 0.15;
            }
            if s.sfb_rate <= 0.05 {
                bonus += 0.10;
            }
            if s.sfb_rate <= 0.02 {
                bonus += 0.15;
            }
            bonus
        } else {
            0.0
        };

        // 13. PositionMatching
        s.position_matching = if has_chars {
            c.position_score_sum / c.total_mass
        } else {
            0.0
        };

        s
    }
}

fn roll_score(rate: f64) -> f64 {
    if rate >= 0.30 {
        1.0
    } else if rate >= 0.15 {
        0.7
    } else {
        rate / 0.15 * 0.4
    }
}

fn home_row_score(usage: f64) -> f64 {
    if usage > 0.40 {
        1.0 + 2.0 * (usage - 0.40)
    } else if usage > 0.30 {
        0.375 + (usage - 0.30) / 0.10 * 0.625
    } else {
        usage / 0.30 * 0.375
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::CorpusStats;

    fn english_fixture() -> (CharacterSet, CorpusStats) {
        let cs = CharacterSet::full_keyboard();
        let stats = CorpusStats::from_text(
            &"the quick brown fox jumps over the lazy dog. ".repeat(10),
            &cs,
        );
        (cs, stats)
    }

    #[test]
    fn invalid_layout_scores_exactly_zero() {
        let (cs, stats) = english_fixture();
        let ev = FitnessEvaluator::standard(&cs);

        let nulls = vec!['\0'; cs.size()];
        assert_eq!(ev.evaluate(&nulls, &cs, &stats), 0.0);

        let short = vec!['a'; 3];
        assert_eq!(ev.evaluate(&short, &cs, &stats), 0.0);
    }

    #[test]
    fn valid_layout_scores_positive() {
        let (cs, stats) = english_fixture();
        let ev = FitnessEvaluator::standard(&cs);
        let layout: Vec<char> = cs.chars().to_vec();
        assert!(ev.evaluate(&layout, &cs, &stats) > 0.0);
    }

    #[test]
    fn empty_model_uses_neutral_components() {
        let cs = CharacterSet::full_keyboard();
        let empty = CorpusStats::from_text("", &cs);
        let ev = FitnessEvaluator::standard(&cs);
        let layout: Vec<char> = cs.chars().to_vec();

        let scores = ev.component_scores(&layout, &cs, &empty);
        assert_eq!(scores.finger_distance, 0.0);
        assert_eq!(scores.hand_alternation, 0.0);
        assert_eq!(scores.row_jumping, 1.0);
        assert_eq!(scores.same_finger_digrams, 1.0);
        assert_eq!(scores.lateral_stretch, 1.0);
        assert_eq!(scores.layer_penalty, 1.0);
        assert_eq!(scores.home_row_bonus, 0.0);
        assert_eq!(scores.threshold_bonuses, 0.0);
    }

    #[test]
    fn roll_score_thresholds() {
        assert_eq!(roll_score(0.35), 1.0);
        assert_eq!(roll_score(0.30), 1.0);
        assert_eq!(roll_score(0.20), 0.7);
        assert_eq!(roll_score(0.15), 0.7);
        assert!((roll_score(0.075) - 0.2).abs() < 1e-12);
        assert_eq!(roll_score(0.0), 0.0);
    }

    #[test]
    fn home_row_curve_is_piecewise() {
        assert!((home_row_score(0.5) - 1.2).abs() < 1e-12);
        assert!((home_row_score(0.40) - 1.0).abs() < 1e-12);
        assert!((home_row_score(0.35) - 0.6875).abs() < 1e-12);
        assert!((home_row_score(0.30) - 0.375).abs() < 1e-12);
        assert!((home_row_score(0.15) - 0.1875).abs() < 1e-12);
        assert_eq!(home_row_score(0.0), 0.0);
    }

    #[test]
    fn digrams_with_absent_characters_are_skipped() {
        let cs = CharacterSet::full_keyboard();
        let small = CharacterSet::new("letters", "abcdefghij".chars());
        let stats = CorpusStats::from_text(&"abcdefghij 0123".repeat(20), &cs);

        // Layout over the small set: digrams touching digits or space are
        // absent from it and must not poison the score.
        let ev = FitnessEvaluator::standard(&small);
        let layout: Vec<char> = small.chars().to_vec();
        let fitness = ev.evaluate(&layout, &small, &stats);
        assert!(fitness.is_finite());
        assert!(fitness > 0.0);
    }
}
