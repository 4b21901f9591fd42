use crate::error::KmResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Relative importance of each fitness component.
///
/// The reference values sum to 1.0 so component scores in [0, 1] keep the
/// composite in roughly the same range. Loadable from JSON so profiles can
/// be swapped without recompiling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
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
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            finger_distance: 0.12,
            hand_alternation: 0.12,
            finger_balance: 0.10,
            row_jumping: 0.08,
            bigram_efficiency: 0.08,
            same_finger_digrams: 0.18,
            lateral_stretch: 0.04,
            roll_quality: 0.05,
            layer_penalty: 0.05,
            home_row_bonus: 0.08,
            roll_ratio_target: 0.03,
            threshold_bonuses: 0.03,
            position_matching: 0.04,
        }
    }
}

impl FitnessWeights {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> KmResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn sum(&self) -> f64 {
        self.finger_distance
            + self.hand_alternation
            + self.finger_balance
            + self.row_jumping
            + self.bigram_efficiency
            + self.same_finger_digrams
            + self.lateral_stretch
            + self.roll_quality
            + self.layer_penalty
            + self.home_row_bonus
            + self.roll_ratio_target
            + self.threshold_bonuses
            + self.position_matching
    }
}
