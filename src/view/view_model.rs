//! View Model - Abstracts document data for the view layer
//! This ensures the view has no direct dependencies on Document internals

use crate::document_model::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPosition {
    pub line: usize,
    pub column: usize,
}

/// The ViewModel trait provides everything the view needs to render
/// without depending on Document internals
pub trait ViewModel {
    /// The text the user currently sees and edits
    fn visible_text(&self) -> String;

    /// Cursor position as a character offset into the visible text
    fn cursor_offset(&self) -> usize;

    /// Whether a search filter is hiding part of the document
    fn is_filtered(&self) -> bool;

    fn title(&self) -> String;

    /// Line and column (in characters) of the cursor within the visible text
    fn cursor_position(&self) -> CursorPosition {
        let text = self.visible_text();
        let mut position = CursorPosition { line: 0, column: 0 };
        for ch in text.chars().take(self.cursor_offset()) {
            if ch == '\n' {
                position.line += 1;
                position.column = 0;
            } else {
                position.column += 1;
            }
        }
        position
    }
}

/// Concrete implementation that adapts Document to ViewModel
pub struct DocumentViewModel<'a> {
    document: &'a Document,
}

impl<'a> DocumentViewModel<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }
}

impl ViewModel for DocumentViewModel<'_> {
    fn visible_text(&self) -> String {
        self.document.visible_text()
    }

    fn cursor_offset(&self) -> usize {
        self.document.current_offset()
    }

    fn is_filtered(&self) -> bool {
        !self.document.current_search().is_empty()
    }

    fn title(&self) -> String {
        let modified = if self.document.is_modified() { " [Modified]" } else { "" };
        if self.is_filtered() {
            format!(
                "{}{} /{}",
                self.document.display_name(),
                modified,
                self.document.current_search()
            )
        } else {
            format!("{}{}", self.document.display_name(), modified)
        }
    }
}
