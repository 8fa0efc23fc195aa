use super::document::Document;
use super::error::DocumentError;
use super::undo::{Transaction, UndoManager};
use std::ops::Deref;
use std::path::PathBuf;

/// A [`Document`] whose `search`, `insert` and `remove` calls each become one
/// undoable step.
///
/// Read access goes through `Deref`; every mutation must go through this type
/// so the history stays consistent with the text.
#[derive(Debug, Clone, Default)]
pub struct UndoableDocument {
    document: Document,
    history: UndoManager,
}

impl UndoableDocument {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            history: UndoManager::new(),
        }
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DocumentError> {
        Ok(Self::new(Document::open(path)?))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Swaps in another document, e.g. after opening a file; history is
    /// dropped since it describes the old text.
    pub fn replace_document(&mut self, document: Document) -> Document {
        self.clear_history();
        std::mem::replace(&mut self.document, document)
    }

    pub fn search(&mut self, query: &str) -> Result<(), DocumentError> {
        let transaction = Transaction::begin(&self.document);
        self.document.search(query)?;
        self.history.push(transaction.commit(&self.document));
        Ok(())
    }

    pub fn insert(&mut self, offset: usize, text: &str) -> Result<(), DocumentError> {
        let mut transaction = Transaction::begin(&self.document);
        self.document.insert_with(offset, text, &mut transaction)?;
        self.history.push(transaction.commit(&self.document));
        Ok(())
    }

    pub fn remove(&mut self, offset: usize, length: usize) -> Result<(), DocumentError> {
        let mut transaction = Transaction::begin(&self.document);
        self.document.remove_with(offset, length, &mut transaction)?;
        self.history.push(transaction.commit(&self.document));
        Ok(())
    }

    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo(&mut self.document);
        if undone {
            tracing::debug!(remaining = self.history.undo_depth(), "undo");
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self.history.redo(&mut self.document);
        if redone {
            tracing::debug!(remaining = self.history.redo_depth(), "redo");
        }
        redone
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn save(&mut self) -> Result<usize, DocumentError> {
        self.document.save()
    }

    pub fn save_as(&mut self, filename: impl Into<PathBuf>) -> Result<usize, DocumentError> {
        self.document.save_as(filename)
    }
}

impl Deref for UndoableDocument {
    type Target = Document;

    fn deref(&self) -> &Document {
        &self.document
    }
}

impl From<Document> for UndoableDocument {
    fn from(document: Document) -> Self {
        Self::new(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "hello today\nhere is some text\nhello there";

    fn merged_scenario() -> UndoableDocument {
        let mut doc = UndoableDocument::default();
        doc.insert(0, TEXT).unwrap();
        doc.search("hello").unwrap();
        doc.remove(10, 3).unwrap();
        doc
    }

    #[test]
    fn test_undo_restores_exact_prior_state() {
        let mut doc = merged_scenario();
        assert_eq!(doc.visible_text(), "hello todaello there");
        assert_eq!(doc.text(), "hello todaello there\nhere is some text\n");

        assert!(doc.undo());
        assert_eq!(doc.visible_text(), "hello today\nhello there");
        assert_eq!(doc.text(), TEXT);
        assert_eq!(doc.current_search(), "hello");
        assert_eq!(doc.current_offset(), 0);

        // Undo the search
        assert!(doc.undo());
        assert_eq!(doc.current_search(), "");
        assert_eq!(doc.visible_text(), TEXT);
        assert_eq!(doc.text(), TEXT);

        // Undo the initial insert
        assert!(doc.undo());
        assert_eq!(doc.visible_text(), "");
        assert_eq!(doc.text(), "");
        assert!(!doc.can_undo());
    }

    #[test]
    fn test_redo_replays_forward() {
        let mut doc = merged_scenario();
        while doc.undo() {}
        assert_eq!(doc.text(), "");

        assert!(doc.redo());
        assert!(doc.redo());
        assert!(doc.redo());
        assert!(!doc.can_redo());
        assert_eq!(doc.visible_text(), "hello todaello there");
        assert_eq!(doc.text(), "hello todaello there\nhere is some text\n");
        assert_eq!(doc.current_offset(), 10);
    }

    #[test]
    fn test_multi_region_merge_undo() {
        let mut doc = UndoableDocument::new(Document::from_text("a1\nX\na2\nY\na3\n"));
        doc.search("a").unwrap();
        doc.remove(2, 1).unwrap();
        assert_eq!(doc.text(), "a1a2\nX\nY\na3\n");

        doc.undo();
        assert_eq!(doc.text(), "a1\nX\na2\nY\na3\n");
        assert_eq!(doc.visible_text(), "a1\na2\na3");

        doc.redo();
        assert_eq!(doc.text(), "a1a2\nX\nY\na3\n");
        assert_eq!(doc.visible_text(), "a1a2\na3");
    }

    #[test]
    fn test_boundary_removal_across_three_regions_undo() {
        let original = "a1\nX\na2\nY\na3\n";
        let mut doc = UndoableDocument::new(Document::from_text(original));
        doc.search("a").unwrap();
        doc.remove(3, 4).unwrap();
        assert_eq!(doc.text(), "a1\nX\n3\nY\n\n");

        assert!(doc.undo());
        assert_eq!(doc.text(), original);
        assert_eq!(doc.visible_text(), "a1\na2\na3");

        assert!(doc.redo());
        assert_eq!(doc.visible_text(), "a1\n3");
    }

    #[test]
    fn test_noop_undo_redo_leave_state_unchanged() {
        let mut doc = UndoableDocument::new(Document::from_text(TEXT));
        assert!(!doc.can_undo());
        assert!(!doc.undo());
        assert!(!doc.can_redo());
        assert!(!doc.redo());
        assert_eq!(doc.text(), TEXT);
        assert_eq!(doc.visible_text(), TEXT);
        assert_eq!(doc.current_offset(), 0);
        assert!(!doc.is_modified());
    }

    #[test]
    fn test_failed_edit_records_nothing() {
        let mut doc = UndoableDocument::new(Document::from_text("short"));
        assert!(doc.insert(99, "x").is_err());
        assert!(doc.remove(3, 10).is_err());
        assert!(!doc.can_undo());
        assert_eq!(doc.text(), "short");
    }

    #[test]
    fn test_edit_after_undo_clears_redo() {
        let mut doc = UndoableDocument::default();
        doc.insert(0, "one").unwrap();
        doc.insert(3, " two").unwrap();
        doc.undo();
        assert!(doc.can_redo());
        doc.insert(3, " three").unwrap();
        assert!(!doc.can_redo());
        assert_eq!(doc.text(), "one three");
    }

    #[test]
    fn test_replace_document_drops_history() {
        let mut doc = UndoableDocument::default();
        doc.insert(0, "draft").unwrap();
        let old = doc.replace_document(Document::from_text("fresh"));
        assert_eq!(old.text(), "draft");
        assert!(!doc.can_undo());
        assert_eq!(doc.text(), "fresh");
    }
}
