use ropey::Rope;
use std::fmt;
use std::io::{self, Write};

/// The ground-truth text of a document, addressed by character offsets.
///
/// Callers validate offsets before mutating. Out-of-range input panics, as it
/// does for the underlying rope.
#[derive(Clone, Default)]
pub struct RawBuffer {
    rope: Rope,
}

impl RawBuffer {
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    pub fn len(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    pub fn insert_text(&mut self, offset: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        self.rope.insert(offset, text);
    }

    /// Removes `length` characters at `offset` and returns them.
    pub fn remove_text(&mut self, offset: usize, length: usize) -> String {
        let removed = self.slice(offset, length);
        if length > 0 {
            self.rope.remove(offset..offset + length);
        }
        removed
    }

    pub fn slice(&self, offset: usize, length: usize) -> String {
        self.rope.slice(offset..offset + length).to_string()
    }

    pub fn char_at(&self, offset: usize) -> Option<char> {
        if offset < self.len() {
            Some(self.rope.char(offset))
        } else {
            None
        }
    }

    /// True when the span `[offset, offset + length)` is non-empty and its
    /// last character is a line feed.
    pub fn span_ends_with_newline(&self, offset: usize, length: usize) -> bool {
        length > 0 && self.char_at(offset + length - 1) == Some('\n')
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Iterates over lines including their terminating line feed. Only `\n`
    /// ends a line; ropey is built without its `unicode_lines` feature.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.rope
            .lines()
            .map(|line| line.to_string())
            .filter(|line| !line.is_empty())
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<usize> {
        let mut written = 0;
        for chunk in self.rope.chunks() {
            writer.write_all(chunk.as_bytes())?;
            written += chunk.len();
        }
        Ok(written)
    }
}

impl fmt::Display for RawBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rope)
    }
}

impl fmt::Debug for RawBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawBuffer")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_empty() {
        let buffer = RawBuffer::new();
        assert_eq!(buffer.len(), 0);
        assert!(buffer.is_empty());
        assert_eq!(buffer.text(), "");
    }

    #[test]
    fn test_insert_and_remove() {
        let mut buffer = RawBuffer::from_text("Hello World");
        buffer.insert_text(6, "Beautiful ");
        assert_eq!(buffer.text(), "Hello Beautiful World");

        let removed = buffer.remove_text(6, 10);
        assert_eq!(removed, "Beautiful ");
        assert_eq!(buffer.text(), "Hello World");
    }

    #[test]
    fn test_offsets_are_characters() {
        let mut buffer = RawBuffer::from_text("héllo wörld");
        assert_eq!(buffer.len(), 11);
        buffer.insert_text(5, "!");
        assert_eq!(buffer.text(), "héllo! wörld");
        assert_eq!(buffer.remove_text(8, 1), "ö");
        assert_eq!(buffer.text(), "héllo! wrld");
    }

    #[test]
    fn test_lines_keep_terminators() {
        let buffer = RawBuffer::from_text("one\ntwo\nthree");
        let lines: Vec<String> = buffer.lines().collect();
        assert_eq!(lines, vec!["one\n", "two\n", "three"]);

        let trailing = RawBuffer::from_text("one\n");
        let lines: Vec<String> = trailing.lines().collect();
        assert_eq!(lines, vec!["one\n"]);
    }

    #[test]
    fn test_lines_split_on_line_feed_only() {
        let buffer = RawBuffer::from_text("a\rb\nc\u{2028}d\u{0b}e\n");
        let lines: Vec<String> = buffer.lines().collect();
        assert_eq!(lines, vec!["a\rb\n", "c\u{2028}d\u{0b}e\n"]);
    }

    #[test]
    fn test_span_ends_with_newline() {
        let buffer = RawBuffer::from_text("ab\ncd");
        assert!(buffer.span_ends_with_newline(0, 3));
        assert!(!buffer.span_ends_with_newline(0, 2));
        assert!(!buffer.span_ends_with_newline(0, 0));
    }

    #[test]
    fn test_write_to_counts_bytes() {
        let buffer = RawBuffer::from_text("naïve\n");
        let mut out = Vec::new();
        let written = buffer.write_to(&mut out).unwrap();
        assert_eq!(written, "naïve\n".len());
        assert_eq!(String::from_utf8(out).unwrap(), "naïve\n");
    }
}
