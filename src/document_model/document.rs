use super::edit::{EditJournal, PrimitiveEdit, Unrecorded};
use super::error::DocumentError;
use super::raw_buffer::RawBuffer;
use super::regions::{Region, VisibleRegions};
use super::search_query::SearchQuery;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// The parts of a document that undo restores wholesale rather than replays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub regions: VisibleRegions,
    pub search: String,
    pub offset: usize,
}

/// A text document viewed through a live line filter.
///
/// Offsets taken by [`Document::insert`] and [`Document::remove`] are
/// character offsets into the *visible* text; the document translates them
/// into the raw buffer so edits made in a filtered view land in the right
/// place of the full text.
#[derive(Debug, Clone)]
pub struct Document {
    buffer: RawBuffer,
    regions: VisibleRegions,
    current_search: String,
    current_offset: usize,
    modified: bool,
    filename: Option<PathBuf>,
}

impl Document {
    pub fn new() -> Self {
        Self::from_text("")
    }

    pub fn from_text(text: &str) -> Self {
        let buffer = RawBuffer::from_text(text);
        let regions = VisibleRegions::whole(buffer.len());

        Self {
            buffer,
            regions,
            current_search: String::new(),
            current_offset: 0,
            modified: false,
            filename: None,
        }
    }

    /// An empty document that will be saved to `path`.
    pub fn with_filename(path: impl Into<PathBuf>) -> Self {
        let mut document = Self::new();
        document.filename = Some(path.into());
        document
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DocumentError> {
        let path = path.into();
        let content = fs::read_to_string(&path)?;
        tracing::info!(path = %path.display(), chars = content.chars().count(), "opened document");

        let mut document = Self::from_text(&content);
        document.filename = Some(path);
        Ok(document)
    }

    pub fn save(&mut self) -> Result<usize, DocumentError> {
        match self.filename.clone() {
            Some(filename) => self.save_as(filename),
            None => Err(DocumentError::NoFilename),
        }
    }

    pub fn save_as(&mut self, filename: impl Into<PathBuf>) -> Result<usize, DocumentError> {
        let filename = filename.into();
        let bytes = self.write_file(&filename).inspect_err(|err| {
            tracing::warn!(path = %filename.display(), error = %err, "save failed");
        })?;
        tracing::info!(path = %filename.display(), bytes, "saved document");

        self.filename = Some(filename);
        self.modified = false;
        Ok(bytes)
    }

    fn write_file(&self, filename: &Path) -> std::io::Result<usize> {
        let mut writer = BufWriter::new(fs::File::create(filename)?);
        let bytes = self.buffer.write_to(&mut writer)?;
        writer.flush()?;
        Ok(bytes)
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub fn visible_text(&self) -> String {
        self.regions.visible_text(&self.buffer)
    }

    pub fn visible_len(&self) -> usize {
        self.regions.visible_len()
    }

    pub fn regions(&self) -> &[Region] {
        self.regions.as_slice()
    }

    pub fn current_search(&self) -> &str {
        &self.current_search
    }

    pub fn current_offset(&self) -> usize {
        self.current_offset
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn is_saved(&self) -> bool {
        !self.modified && self.filename.is_some()
    }

    pub fn display_name(&self) -> &str {
        self.filename
            .as_ref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("[No Name]")
    }

    pub fn search(&mut self, query: &str) -> Result<(), DocumentError> {
        let query = SearchQuery::new(query)?;
        self.regions = VisibleRegions::recompute(&self.buffer, &query);
        self.current_search = query.pattern().to_string();
        self.current_offset = 0;

        tracing::debug!(
            query = %self.current_search,
            words = query.word_count(),
            regions = self.regions.count(),
            visible_len = self.regions.visible_len(),
            "search"
        );
        Ok(())
    }

    pub fn insert(&mut self, offset: usize, text: &str) -> Result<(), DocumentError> {
        self.insert_with(offset, text, &mut Unrecorded)
    }

    pub fn remove(&mut self, offset: usize, length: usize) -> Result<(), DocumentError> {
        self.remove_with(offset, length, &mut Unrecorded)
    }

    /// Inserts `text` at a visible offset, reporting raw mutations to `journal`.
    pub fn insert_with<J: EditJournal>(
        &mut self,
        offset: usize,
        text: &str,
        journal: &mut J,
    ) -> Result<(), DocumentError> {
        let located = self
            .regions
            .locate(offset)
            .ok_or_else(|| self.invalid_offset(offset, 0))?;
        let region = self.region_at(located.index);
        let raw_offset = region.offset + (offset - located.visible_start);
        let length = text.chars().count();

        self.insert_raw(raw_offset, text, journal);
        self.regions.grow(located.index, length);

        self.current_offset = offset + length;
        self.modified = true;
        tracing::debug!(offset, raw_offset, length, "insert");
        Ok(())
    }

    /// Removes `length` visible characters starting at `offset`, which may
    /// span several regions, then rejoins regions the removal made adjacent.
    pub fn remove_with<J: EditJournal>(
        &mut self,
        offset: usize,
        length: usize,
        journal: &mut J,
    ) -> Result<(), DocumentError> {
        let visible_len = self.visible_len();
        if offset.checked_add(length).is_none_or(|end| end > visible_len) {
            return Err(self.invalid_offset(offset, length));
        }

        let mut remaining = length;
        while remaining > 0 {
            // A position on a region boundary belongs to the following region
            let located = self
                .regions
                .locate(offset + 1)
                .ok_or_else(|| self.invalid_offset(offset, remaining))?;
            let region = self.region_at(located.index);
            let into_region = offset - located.visible_start;
            let chunk = remaining.min(region.length - into_region);

            self.remove_raw(region.offset + into_region, chunk, journal);
            self.regions.shrink(located.index, chunk);
            remaining -= chunk;
        }
        self.merge_regions(journal);

        self.current_offset = offset;
        self.modified = true;
        tracing::debug!(offset, length, regions = self.regions.count(), "remove");
        Ok(())
    }

    /// Lines that a removal joined together in the visible text are joined in
    /// the raw text too, by moving the later region up behind the earlier one.
    fn merge_regions<J: EditJournal>(&mut self, journal: &mut J) {
        while let Some(index) = self.regions.first_unterminated_pair(&self.buffer) {
            let current = self.region_at(index);
            let next = self.region_at(index + 1);
            if next.offset != current.end() {
                self.move_raw(next.offset, current.end(), next.length, journal);
            }
            self.regions.absorb_next(index);
        }

        // Keep a line feed between the last region and whatever follows it,
        // so the next search still sees it as a line of its own
        let last = self.regions.last();
        if !last.is_empty()
            && !last.ends_with_newline(&self.buffer)
            && last.end() < self.buffer.len()
            && self.buffer.char_at(last.end()) != Some('\n')
        {
            self.insert_raw(last.end(), "\n", journal);
        }
    }

    fn insert_raw<J: EditJournal>(&mut self, offset: usize, text: &str, journal: &mut J) {
        if text.is_empty() {
            return;
        }
        journal.record(PrimitiveEdit::Insert {
            offset,
            text: text.to_string(),
        });
        self.buffer.insert_text(offset, text);
    }

    fn remove_raw<J: EditJournal>(&mut self, offset: usize, length: usize, journal: &mut J) -> String {
        if length == 0 {
            return String::new();
        }
        let text = self.buffer.slice(offset, length);
        journal.record(PrimitiveEdit::Remove {
            offset,
            text: text.clone(),
        });
        self.buffer.remove_text(offset, length);
        text
    }

    /// Moves raw text from `from` back to `to`; requires `to <= from`.
    fn move_raw<J: EditJournal>(&mut self, from: usize, to: usize, length: usize, journal: &mut J) {
        let text = self.remove_raw(from, length, journal);
        self.insert_raw(to, &text, journal);
    }

    fn region_at(&self, index: usize) -> Region {
        self.regions.as_slice()[index]
    }

    fn invalid_offset(&self, offset: usize, length: usize) -> DocumentError {
        DocumentError::InvalidOffset {
            offset,
            length,
            visible_len: self.visible_len(),
        }
    }

    pub fn view_state(&self) -> ViewState {
        ViewState {
            regions: self.regions.clone(),
            search: self.current_search.clone(),
            offset: self.current_offset,
        }
    }

    pub(crate) fn restore_view_state(&mut self, state: &ViewState) {
        self.regions = state.regions.clone();
        self.current_search = state.search.clone();
        self.current_offset = state.offset;
    }

    /// Applies a raw edit without touching regions; used when replaying history.
    pub(crate) fn replay(&mut self, edit: &PrimitiveEdit) {
        edit.apply(&mut self.buffer);
    }

    pub(crate) fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
