use regex::Regex;

/// A line filter built from a search string.
///
/// The query is split on whitespace; a line matches when every word occurs in
/// it, ignoring case. A query made only of whitespace has no words and matches
/// nothing.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pattern: String,
    words: Vec<Regex>,
}

impl SearchQuery {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let words = pattern
            .split_whitespace()
            .map(|word| {
                // Escape special regex characters for literal search
                let escaped = regex::escape(&word.to_lowercase());
                Regex::new(&format!("(?i){}", escaped))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            pattern: pattern.to_string(),
            words,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// True for the empty string, which shows the whole document.
    pub fn shows_everything(&self) -> bool {
        self.pattern.is_empty()
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn matches(&self, line: &str) -> bool {
        !self.words.is_empty() && self.words.iter().all(|word| word.is_match(line))
    }
}
