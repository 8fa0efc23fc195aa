/// View subsystem - Rendering of the visible text
///
/// This module turns a document's visible text into terminal output, reading
/// it only through the ViewModel trait.

pub mod renderer;
pub mod view_model;

// Re-export public interface
pub use renderer::{View, display_width};
pub use view_model::{CursorPosition, DocumentViewModel, ViewModel};
