use serde::{Deserialize, Serialize};

/// Modifier layer a glyph lives on for the reference physical keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyLayer {
    Base,
    Shift,
    AltGr,
}

/// Glyphs reachable only through Shift on a US keyboard.
const SHIFT_GLYPHS: &str = "!@#$%^&*()_+{}|:\"<>?~";

/// Modifier-layer classification of charset glyphs.
///
/// Typing cost per keypress: base 1.0, shift 1.5, altgr 2.0. The scoring
/// side only needs the surcharge over the base press (0.5 and 1.0).
#[derive(Debug, Clone, Default)]
pub struct LayerMap {
    altgr_glyphs: Vec<char>,
}

impl LayerMap {
    /// The US-QWERTY layer map. No AltGr glyphs in the standard set; the
    /// slot exists for international profiles.
    pub fn us_qwerty() -> Self {
        Self {
            altgr_glyphs: Vec::new(),
        }
    }

    pub fn with_altgr(glyphs: impl IntoIterator<Item = char>) -> Self {
        Self {
            altgr_glyphs: glyphs.into_iter().collect(),
        }
    }

    pub fn layer_of(&self, c: char) -> KeyLayer {
        if self.altgr_glyphs.contains(&c) {
            KeyLayer::AltGr
        } else if SHIFT_GLYPHS.contains(c) || c.is_ascii_uppercase() {
            KeyLayer::Shift
        } else {
            KeyLayer::Base
        }
    }

    /// Surcharge over an unmodified keypress: Shift 0.5, AltGr 1.0.
    pub fn modifier_cost(&self, c: char) -> f64 {
        match self.layer_of(c) {
            KeyLayer::Base => 0.0,
            KeyLayer::Shift => 0.5,
            KeyLayer::AltGr => 1.0,
        }
    }

    pub fn needs_modifier(&self, c: char) -> bool {
        self.layer_of(c) != KeyLayer::Base
    }

    /// The glyph produced when Shift is held on a key whose base glyph is
    /// `c`. Only letters have a partner that is not itself a first-class
    /// member of the full charset.
    pub fn shift_partner(c: char) -> Option<char> {
        if c.is_ascii_lowercase() {
            Some(c.to_ascii_uppercase())
        } else {
            None
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shifted_symbols_classified() {
        let layers = LayerMap::us_qwerty();
        assert_eq!(layers.layer_of('!'), KeyLayer::Shift);
        assert_eq!(layers.layer_of('~'), KeyLayer::Shift);
        assert_eq!(layers.layer_of('a'), KeyLayer::Base);
        assert_eq!(layers.layer_of('5'), KeyLayer::Base);
        assert_eq!(layers.layer_of('-'), KeyLayer::Base);
        assert_eq!(layers.layer_of(' '), KeyLayer::Base);
    }

    #[test]
    fn modifier_costs() {
        let layers = LayerMap::with_altgr(['€']);
        assert_eq!(layers.modifier_cost('e'), 0.0);
        assert_eq!(layers.modifier_cost('@'), 0.5);
        assert_eq!(layers.modifier_cost('€'), 1.0);
    }

    #[test]
    fn letters_have_shift_partners() {
        assert_eq!(LayerMap::shift_partner('q'), Some('Q'));
        assert_eq!(LayerMap::shift_partner(';'), None);
        assert_eq!(LayerMap::shift_partner('3'), None);
    }
}
