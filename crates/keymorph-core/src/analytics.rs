use crate::charset::CharacterSet;
use crate::core_types::Individual;
use crate::corpus::FrequencyModel;
use crate::fitness::{ComponentScores, FitnessEvaluator, KeyLayer, LayerMap};
use crate::geometry::{Geometry, Hand, Row};
use serde::{Deserialize, Serialize};

/// Derived usage statistics for one layout against a corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutAnalytics {
    /// Share of typed-character mass per finger, left pinky first.
    pub finger_load: [f64; 8],
    /// Share of typed-character mass per row.
    pub row_load: Vec<(String, f64)>,
    /// (left, right) share of typed-character mass.
    pub hand_balance: (f64, f64),
    pub home_row_usage: f64,
    pub sfb_rate: f64,
    pub alternation_rate: f64,
    pub roll_rate: f64,
    /// Typed-character mass per modifier layer: base, shift, altgr.
    pub layer_load: (f64, f64, f64),
}

/// Aggregates per-finger, per-row, per-hand and per-layer mass for a valid
/// layout. Digram-level rates come from the evaluator's component pass.
pub fn analyze(
    individual: &Individual,
    geometry: &Geometry,
    layers: &LayerMap,
    model: &dyn FrequencyModel,
    scores: &ComponentScores,
) -> LayoutAnalytics {
    let mut finger_mass = [0.0f64; 8];
    let mut row_mass = [0.0f64; 5];
    let mut hand_mass = [0.0f64; 2];
    let mut layer_mass = [0.0f64; 3];
    let mut total = 0.0f64;

    for (pos, &c) in individual.layout.iter().enumerate() {
        let freq = model.char_count(c) as f64;
        if freq == 0.0 {
            continue;
        }

        let slot = geometry.slot(pos);
        total += freq;
        finger_mass[slot.finger as usize] += freq;
        hand_mass[match slot.hand {
            Hand::Left => 0,
            Hand::Right => 1,
        }] += freq;
        row_mass[row_index(slot.row)] += freq;
        layer_mass[match layers.layer_of(c) {
            KeyLayer::Base => 0,
            KeyLayer::Shift => 1,
            KeyLayer::AltGr => 2,
        }] += freq;
    }

    let share = |mass: f64| if total > 0.0 { mass / total } else { 0.0 };

    LayoutAnalytics {
        finger_load: finger_mass.map(share),
        row_load: Row::ALL
            .iter()
            .map(|&row| (row.label().to_string(), share(row_mass[row_index(row)])))
            .collect(),
        hand_balance: (share(hand_mass[0]), share(hand_mass[1])),
        home_row_usage: scores.home_row_usage,
        sfb_rate: scores.sfb_rate,
        alternation_rate: scores.alternation_rate,
        roll_rate: scores.roll_rate,
        layer_load: (share(layer_mass[0]), share(layer_mass[1]), share(layer_mass[2])),
    }
}

fn row_index(row: Row) -> usize {
    match row {
        Row::Number => 0,
        Row::Top => 1,
        Row::Home => 2,
        Row::Bottom => 3,
        Row::Thumb => 4,
    }
}

/// Side-by-side component scores for an optimized layout and the QWERTY
/// baseline (the identity permutation of the standard charset).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QwertyComparison {
    pub optimized: ComponentScores,
    pub qwerty: ComponentScores,
    pub optimized_fitness: f64,
    pub qwerty_fitness: f64,
    pub improvement_pct: f64,
}

pub fn compare_with_qwerty(
    individual: &Individual,
    charset: &CharacterSet,
    evaluator: &FitnessEvaluator,
    model: &dyn FrequencyModel,
) -> QwertyComparison {
    let optimized = evaluator.component_scores(&individual.layout, charset, model);
    let baseline: Vec<char> = charset.chars().to_vec();
    let qwerty = evaluator.component_scores(&baseline, charset, model);

    let optimized_fitness = optimized.weighted_total(evaluator.weights());
    let qwerty_fitness = qwerty.weighted_total(evaluator.weights());

    let improvement_pct = if qwerty_fitness > 0.0 {
        (optimized_fitness - qwerty_fitness) / qwerty_fitness * 100.0
    } else {
        0.0
    };

    QwertyComparison {
        optimized,
        qwerty,
        optimized_fitness,
        qwerty_fitness,
        improvement_pct,
    }
}
