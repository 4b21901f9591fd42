use crate::charset::CharacterSet;
use fnv::FnvHashMap;
use std::sync::Arc;

/// A permutation of the character set: element `p` is the character
/// assigned to keyboard slot `p`.
pub type Layout = Vec<char>;

/// One candidate layout in the population.
///
/// `fitness` is the last computed composite score; any mutation of the
/// permutation resets it. `age` records the generation at which this
/// permutation was first observed as the generation best.
#[derive(Debug, Clone)]
pub struct Individual {
    pub layout: Layout,
    pub charset: Arc<CharacterSet>,
    pub fitness: f64,
    pub age: usize,
}

impl Individual {
    pub fn new(layout: Layout, charset: Arc<CharacterSet>) -> Self {
        Self {
            layout,
            charset,
            fitness: 0.0,
            age: 0,
        }
    }

    /// A uniformly random permutation (Fisher-Yates).
    pub fn random(charset: Arc<CharacterSet>, rng: &mut fastrand::Rng) -> Self {
        let mut layout: Layout = charset.chars().to_vec();
        rng.shuffle(&mut layout);
        Self::new(layout, charset)
    }

    /// The identity permutation: every character on its canonical slot.
    /// For the standard geometry this is the QWERTY baseline.
    pub fn qwerty(charset: Arc<CharacterSet>) -> Self {
        let layout = charset.chars().to_vec();
        Self::new(layout, charset)
    }

    pub fn is_valid(&self) -> bool {
        self.charset.is_valid(&self.layout)
    }

    /// Character -> slot map for this permutation.
    pub fn position_map(&self) -> FnvHashMap<char, usize> {
        self.layout
            .iter()
            .enumerate()
            .map(|(pos, &c)| (c, pos))
            .collect()
    }

    /// The layout as a display string.
    pub fn layout_string(&self) -> String {
        self.layout.iter().collect()
    }
}
