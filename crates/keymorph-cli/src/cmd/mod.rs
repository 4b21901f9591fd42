pub mod analyze;
pub mod compare;
pub mod optimize;

use keymorph_core::charset::CharacterSet;
use keymorph_core::corpus::CorpusStats;
use keymorph_core::error::{KeymorphError, KmResult};
use std::path::PathBuf;

/// Loads a corpus from a file or inline text, whichever was given.
pub fn load_corpus(
    input: &Option<PathBuf>,
    text: &Option<String>,
    charset: &CharacterSet,
) -> KmResult<CorpusStats> {
    let stats = match (input, text) {
        (Some(path), _) => CorpusStats::from_file(path, charset)?,
        (None, Some(text)) => CorpusStats::from_text(text, charset),
        (None, None) => {
            return Err(KeymorphError::Config(
                "either --input or --text is required".into(),
            ))
        }
    };

    stats.validate()?;
    Ok(stats)
}

/// Parses a layout argument into a character vector, rejecting obviously
/// wrong lengths early with a readable message.
pub fn parse_layout(layout: &str, charset: &CharacterSet) -> KmResult<Vec<char>> {
    let chars: Vec<char> = layout.chars().collect();
    if chars.len() != charset.size() {
        return Err(KeymorphError::Config(format!(
            "layout has {} characters, the {} charset needs {}",
            chars.len(),
            charset.name(),
            charset.size()
        )));
    }
    Ok(chars)
}
