use super::document::{Document, ViewState};
use super::edit::{EditJournal, PrimitiveEdit};

/// One top-level document call: the view before and after it plus every raw
/// edit it made, in order.
#[derive(Debug, Clone)]
pub struct UndoAction {
    pub before: ViewState,
    pub after: ViewState,
    pub edits: Vec<PrimitiveEdit>,
}

impl UndoAction {
    pub fn changes_text(&self) -> bool {
        !self.edits.is_empty()
    }

    /// Apply the reverse of this action to a document (for undo operations)
    pub fn revert(&self, document: &mut Document) {
        document.restore_view_state(&self.before);
        for edit in self.edits.iter().rev() {
            document.replay(&edit.reverse());
        }
        if self.changes_text() {
            document.set_modified(true);
        }
    }

    /// Apply this action to a document again (for redo operations)
    pub fn reapply(&self, document: &mut Document) {
        document.restore_view_state(&self.after);
        for edit in &self.edits {
            document.replay(edit);
        }
        if self.changes_text() {
            document.set_modified(true);
        }
    }
}

/// An in-flight action. Created before a document call and handed to it as
/// the edit journal; `commit` captures the resulting view.
#[derive(Debug)]
pub struct Transaction {
    before: ViewState,
    edits: Vec<PrimitiveEdit>,
}

impl Transaction {
    pub fn begin(document: &Document) -> Self {
        Self {
            before: document.view_state(),
            edits: Vec::new(),
        }
    }

    pub fn commit(self, document: &Document) -> UndoAction {
        UndoAction {
            before: self.before,
            after: document.view_state(),
            edits: self.edits,
        }
    }
}

impl EditJournal for Transaction {
    fn record(&mut self, edit: PrimitiveEdit) {
        self.edits.push(edit);
    }
}

#[derive(Debug, Clone, Default)]
pub struct UndoManager {
    undo_stack: Vec<UndoAction>,
    redo_stack: Vec<UndoAction>,
}

impl UndoManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a finished action. New actions invalidate anything undone.
    pub fn push(&mut self, action: UndoAction) {
        self.undo_stack.push(action);
        self.redo_stack.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Reverts the newest action on `document` and moves it to the redo stack.
    pub fn undo(&mut self, document: &mut Document) -> bool {
        let Some(action) = self.undo_stack.pop() else {
            return false;
        };
        action.revert(document);
        self.redo_stack.push(action);
        true
    }

    /// Reapplies the newest undone action and moves it back to the undo stack.
    pub fn redo(&mut self, document: &mut Document) -> bool {
        let Some(action) = self.redo_stack.pop() else {
            return false;
        };
        action.reapply(document);
        self.undo_stack.push(action);
        true
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
