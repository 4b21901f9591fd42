use crate::charset::CharacterSet;
use crate::core_types::Individual;
use crate::error::KmResult;
use crate::fitness::LayerMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Persisted form of a winning layout.
///
/// serde_json never HTML-escapes punctuation, so the layout string and
/// position keys come out readable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedLayout {
    pub fitness: f64,
    pub age: usize,
    pub layout: String,
    pub positions: BTreeMap<String, usize>,
    pub timestamp: String,
    pub optimized_keyboard_layers: LayerDocument,
    pub layer_metadata: LayerMetadata,
}

/// Base/shift/altgr layers as position-indexed maps, plus charset
/// metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerDocument {
    pub charset_name: String,
    pub charset_size: usize,
    pub total_positions: usize,
    pub base: BTreeMap<String, String>,
    pub shift: BTreeMap<String, String>,
    pub altgr: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerMetadata {
    pub layer_costs: BTreeMap<String, f64>,
    pub description: String,
}

impl Default for LayerMetadata {
    fn default() -> Self {
        let mut layer_costs = BTreeMap::new();
        layer_costs.insert("base".to_string(), 1.0);
        layer_costs.insert("shift".to_string(), 1.5);
        layer_costs.insert("altgr".to_string(), 2.0);

        Self {
            layer_costs,
            description: "Keyboard layers show character access patterns. Base layer \
                          requires no modifiers, Shift layer requires Shift, AltGr \
                          layer requires AltGr (Right Alt)."
                .to_string(),
        }
    }
}

impl SavedLayout {
    pub fn from_individual(individual: &Individual) -> Self {
        let mut positions = BTreeMap::new();
        let mut base = BTreeMap::new();
        let mut shift = BTreeMap::new();

        for (pos, &c) in individual.layout.iter().enumerate() {
            positions.insert(c.to_string(), pos);
            base.insert(format!("pos_{pos}"), c.to_string());
            if let Some(upper) = LayerMap::shift_partner(c) {
                shift.insert(format!("pos_{pos}"), upper.to_string());
            }
        }

        Self {
            fitness: individual.fitness,
            age: individual.age,
            layout: individual.layout_string(),
            positions,
            timestamp: chrono::Utc::now().to_rfc3339(),
            optimized_keyboard_layers: LayerDocument {
                charset_name: individual.charset.name().to_string(),
                charset_size: individual.charset.size(),
                total_positions: individual.layout.len(),
                base,
                shift,
                altgr: BTreeMap::new(),
            },
            layer_metadata: LayerMetadata::default(),
        }
    }

    /// Rebuilds the individual from the position map, verifying it matches
    /// the stored layout string.
    pub fn to_individual(&self, charset: Arc<CharacterSet>) -> Individual {
        let mut layout = vec!['\0'; charset.size()];
        for (c, &pos) in &self.positions {
            if let (Some(c), true) = (c.chars().next(), pos < layout.len()) {
                layout[pos] = c;
            }
        }

        let mut individual = Individual::new(layout, charset);
        individual.fitness = self.fitness;
        individual.age = self.age;
        individual
    }
}

pub fn save_layout<P: AsRef<Path>>(individual: &Individual, path: P) -> KmResult<()> {
    let saved = SavedLayout::from_individual(individual);
    let json = serde_json::to_string_pretty(&saved)?;
    std::fs::write(&path, json)?;
    info!("saved layout to {:?}", path.as_ref());
    Ok(())
}

pub fn load_layout<P: AsRef<Path>>(path: P) -> KmResult<SavedLayout> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_individual() -> Individual {
        let cs = Arc::new(CharacterSet::full_keyboard());
        let mut rng = fastrand::Rng::with_seed(77);
        let mut ind = Individual::random(cs, &mut rng);
        ind.fitness = 0.42;
        ind.age = 9;
        ind
    }

    #[test]
    fn layout_and_positions_round_trip() {
        let ind = sample_individual();
        let saved = SavedLayout::from_individual(&ind);
        let rebuilt = saved.to_individual(ind.charset.clone());
        assert_eq!(rebuilt.layout, ind.layout);
        assert_eq!(rebuilt.fitness, ind.fitness);
        assert_eq!(rebuilt.age, ind.age);
    }

    #[test]
    fn document_carries_layers_and_metadata() {
        let ind = sample_individual();
        let saved = SavedLayout::from_individual(&ind);

        assert_eq!(saved.layout.chars().count(), 70);
        assert_eq!(saved.optimized_keyboard_layers.charset_size, 70);
        assert_eq!(saved.optimized_keyboard_layers.base.len(), 70);
        // Shift layer holds the 26 uppercase partners.
        assert_eq!(saved.optimized_keyboard_layers.shift.len(), 26);
        assert!(saved.optimized_keyboard_layers.altgr.is_empty());
        assert_eq!(saved.layer_metadata.layer_costs["shift"], 1.5);
    }

    #[test]
    fn json_does_not_escape_punctuation() {
        let ind = sample_individual();
        let saved = SavedLayout::from_individual(&ind);
        let json = serde_json::to_string(&saved).unwrap();
        assert!(json.contains('<') || json.contains('>') || json.contains('&'));
        assert!(!json.contains("\\u003c"));
        assert!(!json.contains("\\u0026"));
    }
}
