/// Document model subsystem - Core data structures and text operations
///
/// This module contains the raw text buffer, the visible-region index that a
/// search filter produces, the document that edits through it, and the
/// transactional undo/redo log built on top.

pub mod document;
pub mod edit;
pub mod error;
pub mod raw_buffer;
pub mod regions;
pub mod search_query;
pub mod undo;
pub mod undoable;

// Re-export main types for convenience
pub use document::{Document, ViewState};
pub use edit::{EditJournal, PrimitiveEdit, Unrecorded};
pub use error::DocumentError;
pub use raw_buffer::RawBuffer;
pub use regions::{Region, VisibleRegions};
pub use search_query::SearchQuery;
pub use undo::{Transaction, UndoAction, UndoManager};
pub use undoable::UndoableDocument;
