use super::raw_buffer::RawBuffer;

/// A single raw-buffer mutation, in raw coordinates.
///
/// The offset is the raw offset *before* the mutation and the text is exactly
/// the text inserted or removed, so the edit can be replayed or inverted
/// without consulting region bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveEdit {
    Insert { offset: usize, text: String },
    Remove { offset: usize, text: String },
}

impl PrimitiveEdit {
    pub fn apply(&self, buffer: &mut RawBuffer) {
        match self {
            PrimitiveEdit::Insert { offset, text } => buffer.insert_text(*offset, text),
            PrimitiveEdit::Remove { offset, text } => {
                buffer.remove_text(*offset, text.chars().count());
            }
        }
    }

    pub fn reverse(&self) -> PrimitiveEdit {
        match self {
            PrimitiveEdit::Insert { offset, text } => PrimitiveEdit::Remove {
                offset: *offset,
                text: text.clone(),
            },
            PrimitiveEdit::Remove { offset, text } => PrimitiveEdit::Insert {
                offset: *offset,
                text: text.clone(),
            },
        }
    }
}

/// Receives every primitive edit a document performs on its raw buffer.
pub trait EditJournal {
    fn record(&mut self, edit: PrimitiveEdit);
}

/// Journal for edits made outside any transaction.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unrecorded;

impl EditJournal for Unrecorded {
    fn record(&mut self, _edit: PrimitiveEdit) {}
}
