/// Controller subsystem - Handles user input and command execution
///
/// This module parses shell commands, owns the editing session, and runs the
/// line-oriented command loop on top of the document and view layers.

pub mod command;
pub mod editor;
pub mod session_controller;

// Re-export public interface
pub use command::{Command, CommandError, Setting};
pub use editor::{Editor, Flow};
pub use session_controller::{Session, SessionError};
