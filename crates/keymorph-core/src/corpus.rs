use crate::charset::CharacterSet;
use crate::error::{KeymorphError, KmResult};
use fnv::FnvHashMap;
use regex::Regex;
use std::io::BufRead;
use std::path::Path;
use std::sync::OnceLock;
use tracing::info;

/// Lines longer than this are dropped as keylogger noise.
const MAX_LINE_LENGTH: usize = 1000;

/// Input shapes the ingester understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorpusFormat {
    #[default]
    RawText,
    /// `2023-01-01 12:00:00 | typed text`
    Timestamped,
    /// Vim command streams; `<Esc>`-style markers are stripped.
    VimCommand,
    /// One JSON object per line carrying a `"text"` field.
    Json,
}

impl CorpusFormat {
    /// Guesses a format from the file name, the way keylog dumps are
    /// usually labelled: `.json` payloads, `vim` histories, else raw.
    pub fn detect(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if name.ends_with(".json") {
            CorpusFormat::Json
        } else if name.contains("vim") {
            CorpusFormat::VimCommand
        } else {
            CorpusFormat::RawText
        }
    }

    /// Extracts the typed text from one input line; `None` for lines the
    /// format cannot interpret (they are skipped, not fatal).
    fn clean_line<'a>(&self, line: &'a str) -> Option<std::borrow::Cow<'a, str>> {
        use std::borrow::Cow;

        match self {
            CorpusFormat::RawText => Some(Cow::Borrowed(line)),
            CorpusFormat::Timestamped => {
                static PATTERN: OnceLock<Regex> = OnceLock::new();
                let re = PATTERN.get_or_init(|| {
                    Regex::new(r"^\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2}\s*\|\s*(.*)$")
                        .expect("timestamp pattern")
                });
                re.captures(line)
                    .map(|c| Cow::Owned(c[1].to_string()))
            }
            CorpusFormat::VimCommand => {
                static PATTERN: OnceLock<Regex> = OnceLock::new();
                let re = PATTERN
                    .get_or_init(|| Regex::new(r"<[^>]+>").expect("vim marker pattern"));
                Some(Cow::Owned(re.replace_all(line, "").into_owned()))
            }
            CorpusFormat::Json => {
                static PATTERN: OnceLock<Regex> = OnceLock::new();
                let re = PATTERN.get_or_init(|| {
                    Regex::new(r#""text":\s*"([^"]*)""#).expect("json text pattern")
                });
                re.captures(line)
                    .map(|c| Cow::Owned(c[1].to_string()))
            }
        }
    }
}

/// One digram observation from the corpus snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigramCount {
    pub first: char,
    pub second: char,
    pub count: u64,
}

/// Read-only statistical model of a typing corpus.
///
/// Implementations must be safe for concurrent readers during a run; all
/// mutation happens before optimization begins. `digrams` returns a
/// snapshot in a deterministic order so that ordered accumulation over it
/// is reproducible.
pub trait FrequencyModel: Send + Sync {
    /// Occurrences of a single character; 0 if unseen.
    fn char_count(&self, c: char) -> u64;

    /// Occurrences of a 2- or 3-character sequence; 0 if unseen.
    fn seq_count(&self, seq: &str) -> u64;

    /// Sum of all single-character counts.
    fn total_chars(&self) -> u64;

    /// Snapshot of all digrams with nonzero count, sorted lexicographically.
    fn digrams(&self) -> &[DigramCount];
}

/// Frequency table built from sample text.
///
/// Counts monograms, digrams and trigrams over the charset-filtered
/// character stream. Characters outside the charset break the sliding
/// window, so digrams never span removed glyphs.
#[derive(Debug, Clone, Default)]
pub struct CorpusStats {
    chars: FnvHashMap<char, u64>,
    sequences: FnvHashMap<String, u64>,
    digram_snapshot: Vec<DigramCount>,
    total_chars: u64,
}

impl CorpusStats {
    pub fn from_text(text: &str, charset: &CharacterSet) -> Self {
        let mut stats = CorpusStats::default();
        stats.ingest(text, charset);
        stats.rebuild_snapshot();
        stats
    }

    /// Line-oriented ingestion for keylogger dumps. Malformed lines are
    /// skipped; digrams never span line boundaries.
    pub fn from_reader<R: BufRead>(
        reader: R,
        format: CorpusFormat,
        charset: &CharacterSet,
    ) -> KmResult<Self> {
        let mut stats = CorpusStats::default();

        for line in reader.lines() {
            let line = line?;
            if line.len() > MAX_LINE_LENGTH {
                continue;
            }
            if let Some(text) = format.clean_line(&line) {
                stats.ingest(&text, charset);
            }
        }

        stats.rebuild_snapshot();
        Ok(stats)
    }

    pub fn from_file<P: AsRef<Path>>(path: P, charset: &CharacterSet) -> KmResult<Self> {
        let format = CorpusFormat::detect(path.as_ref());
        let file = std::fs::File::open(&path)?;
        let stats = Self::from_reader(std::io::BufReader::new(file), format, charset)?;
        info!(
            "Parsed corpus from {:?} ({:?}): {} characters",
            path.as_ref(),
            format,
            stats.total_chars
        );
        Ok(stats)
    }

    fn ingest(&mut self, text: &str, charset: &CharacterSet) {
        let mut prev: Option<char> = None;
        let mut prev2: Option<char> = None;

        for raw in text.chars() {
            let c = raw.to_ascii_lowercase();
            if !charset.contains(c) {
                prev = None;
                prev2 = None;
                continue;
            }

            *self.chars.entry(c).or_default() += 1;
            self.total_chars += 1;

            if let Some(p) = prev {
                let mut digram = String::with_capacity(2);
                digram.push(p);
                digram.push(c);
                *self.sequences.entry(digram).or_default() += 1;

                if let Some(p2) = prev2 {
                    let mut trigram = String::with_capacity(3);
                    trigram.push(p2);
                    trigram.push(p);
                    trigram.push(c);
                    *self.sequences.entry(trigram).or_default() += 1;
                }
            }

            prev2 = prev;
            prev = Some(c);
        }
    }

    /// Checks the fatal minimums for a search: 100 total characters,
    /// 10 distinct characters, 20 distinct digrams.
    pub fn validate(&self) -> KmResult<()> {
        if self.total_chars < 100 {
            return Err(KeymorphError::InsufficientCorpus(format!(
                "only {} characters parsed, need at least 100",
                self.total_chars
            )));
        }

        if self.chars.len() < 10 {
            return Err(KeymorphError::InsufficientCorpus(format!(
                "only {} unique characters, need at least 10",
                self.chars.len()
            )));
        }

        if self.digram_snapshot.len() < 20 {
            return Err(KeymorphError::InsufficientCorpus(format!(
                "only {} unique digrams, need at least 20",
                self.digram_snapshot.len()
            )));
        }

        Ok(())
    }

    pub fn distinct_chars(&self) -> usize {
        self.chars.len()
    }

    /// The most frequent characters, highest first, ties by code point.
    pub fn most_frequent_chars(&self, n: usize) -> Vec<(char, u64)> {
        let mut entries: Vec<(char, u64)> = self.chars.iter().map(|(&c, &f)| (c, f)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        entries.truncate(n);
        entries
    }

    fn rebuild_snapshot(&mut self) {
        self.digram_snapshot = self
            .sequences
            .iter()
            .filter_map(|(seq, &count)| {
                let mut it = seq.chars();
                match (it.next(), it.next(), it.next()) {
                    (Some(a), Some(b), None) if count > 0 => Some(DigramCount {
                        first: a,
                        second: b,
                        count,
                    }),
                    _ => None,
                }
            })
            .collect();
        self.digram_snapshot
            .sort_by(|a, b| (a.first, a.second).cmp(&(b.first, b.second)));
    }
}

impl FrequencyModel for CorpusStats {
    fn char_count(&self, c: char) -> u64 {
        self.chars.get(&c).copied().unwrap_or(0)
    }

    fn seq_count(&self, seq: &str) -> u64 {
        self.sequences.get(seq).copied().unwrap_or(0)
    }

    fn total_chars(&self) -> u64 {
        self.total_chars
    }

    fn digrams(&self) -> &[DigramCount] {
        &self.digram_snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_sliding_windows() {
        let cs = CharacterSet::full_keyboard();
        let stats = CorpusStats::from_text("hello", &cs);

        assert_eq!(stats.total_chars(), 5);
        assert_eq!(stats.char_count('l'), 2);
        assert_eq!(stats.seq_count("he"), 1);
        assert_eq!(stats.seq_count("ll"), 1);
        assert_eq!(stats.seq_count("hel"), 1);
        assert_eq!(stats.seq_count("llo"), 1);
        assert_eq!(stats.seq_count("xy"), 0);
    }

    #[test]
    fn lowercases_and_filters_to_charset() {
        let cs = CharacterSet::alphabet();
        let stats = CorpusStats::from_text("AB9cd", &cs);

        assert_eq!(stats.char_count('a'), 1);
        assert_eq!(stats.char_count('b'), 1);
        // '9' is outside the alphabet set and breaks the window
        assert_eq!(stats.seq_count("bc"), 0);
        assert_eq!(stats.seq_count("cd"), 1);
    }

    #[test]
    fn digram_snapshot_is_sorted_and_nonzero() {
        let cs = CharacterSet::full_keyboard();
        let stats = CorpusStats::from_text("the quick brown fox jumps over the lazy dog", &cs);

        let digrams = stats.digrams();
        assert!(!digrams.is_empty());
        for pair in digrams.windows(2) {
            assert!((pair[0].first, pair[0].second) < (pair[1].first, pair[1].second));
        }
        for d in digrams {
            assert!(d.count > 0);
        }
    }

    #[test]
    fn timestamped_lines_keep_only_the_typed_text() {
        let cs = CharacterSet::full_keyboard();
        let log = "2023-01-01 12:00:00 | hello there\n\
                   xerox, not a log line\n\
                   2023-01-01 12:00:05 | general kenobi\n";

        let stats =
            CorpusStats::from_reader(log.as_bytes(), CorpusFormat::Timestamped, &cs).unwrap();

        assert_eq!(stats.seq_count("he"), 2); // hello, there
        assert_eq!(stats.char_count('k'), 1);
        // The malformed middle line is skipped entirely.
        assert_eq!(stats.char_count('x'), 0);
    }

    #[test]
    fn vim_markers_are_stripped() {
        let cs = CharacterSet::full_keyboard();
        let log = "ciw<Esc>hello<CR>world\n";

        let stats =
            CorpusStats::from_reader(log.as_bytes(), CorpusFormat::VimCommand, &cs).unwrap();

        assert_eq!(stats.seq_count("ow"), 1); // hellOWorld joins up
        assert_eq!(stats.char_count('<'), 0);
    }

    #[test]
    fn json_lines_extract_the_text_field() {
        let cs = CharacterSet::full_keyboard();
        let log = r#"{"timestamp": "2023-01-01", "text": "abc def"}
{"timestamp": "2023-01-02", "text": "ghi"}
garbage line
"#;

        let stats = CorpusStats::from_reader(log.as_bytes(), CorpusFormat::Json, &cs).unwrap();

        assert_eq!(stats.char_count('a'), 1);
        assert_eq!(stats.char_count('g'), 1); // only "ghi"; the garbage line is dropped
        assert_eq!(stats.seq_count("ab"), 1);
    }

    #[test]
    fn format_detection_by_file_name() {
        use std::path::Path;
        assert_eq!(
            CorpusFormat::detect(Path::new("dump.json")),
            CorpusFormat::Json
        );
        assert_eq!(
            CorpusFormat::detect(Path::new("vim_history.txt")),
            CorpusFormat::VimCommand
        );
        assert_eq!(
            CorpusFormat::detect(Path::new("corpus.txt")),
            CorpusFormat::RawText
        );
    }

    #[test]
    fn digrams_do_not_span_lines_in_reader_mode() {
        let cs = CharacterSet::full_keyboard();
        let stats = CorpusStats::from_reader("ab\ncd\n".as_bytes(), CorpusFormat::RawText, &cs)
            .unwrap();
        assert_eq!(stats.seq_count("ab"), 1);
        assert_eq!(stats.seq_count("bc"), 0);
    }

    #[test]
    fn validation_thresholds() {
        let cs = CharacterSet::full_keyboard();

        let tiny = CorpusStats::from_text("abc", &cs);
        assert!(tiny.validate().is_err());

        let narrow = CorpusStats::from_text(&"ab".repeat(100), &cs);
        assert!(narrow.validate().is_err());

        let rich = CorpusStats::from_text(
            &"the quick brown fox jumps over the lazy dog. ".repeat(5),
            &cs,
        );
        assert!(rich.validate().is_ok());
    }
}
