use super::raw_buffer::RawBuffer;
use super::search_query::SearchQuery;

/// A contiguous span of raw text that is currently visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub offset: usize,
    pub length: usize,
}

impl Region {
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn text(&self, buffer: &RawBuffer) -> String {
        buffer.slice(self.offset, self.length)
    }

    pub fn ends_with_newline(&self, buffer: &RawBuffer) -> bool {
        buffer.span_ends_with_newline(self.offset, self.length)
    }
}

/// Where a visible offset landed: the owning region and the visible offset at
/// which that region starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Located {
    pub index: usize,
    pub visible_start: usize,
}

/// Ordered, non-overlapping spans of the raw buffer that make up the visible
/// text. Never empty: "nothing visible" is a single `(0, 0)` region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRegions {
    regions: Vec<Region>,
}

impl VisibleRegions {
    /// One region covering the whole buffer.
    pub fn whole(len: usize) -> Self {
        Self {
            regions: vec![Region::new(0, len)],
        }
    }

    pub fn recompute(buffer: &RawBuffer, query: &SearchQuery) -> Self {
        if query.shows_everything() {
            return Self::whole(buffer.len());
        }

        let mut regions = Vec::new();
        let mut offset = 0;
        for line in buffer.lines() {
            let length = line.chars().count();
            if query.matches(&line) {
                regions.push(Region::new(offset, length));
            }
            offset += length;
        }

        match regions.last_mut() {
            None => regions.push(Region::new(0, 0)),
            // Hide the trailing line feed so the filtered view doesn't end
            // with a blank line
            Some(last) if last.ends_with_newline(buffer) => last.length -= 1,
            Some(_) => {}
        }

        Self { regions }
    }

    pub fn as_slice(&self) -> &[Region] {
        &self.regions
    }

    pub fn count(&self) -> usize {
        self.regions.len()
    }

    pub fn get(&self, index: usize) -> Option<Region> {
        self.regions.get(index).copied()
    }

    pub fn last(&self) -> Region {
        self.regions.last().copied().unwrap_or(Region::new(0, 0))
    }

    pub fn visible_len(&self) -> usize {
        self.regions.iter().map(|region| region.length).sum()
    }

    pub fn visible_text(&self, buffer: &RawBuffer) -> String {
        self.regions
            .iter()
            .map(|region| region.text(buffer))
            .collect()
    }

    /// Finds the first region whose visible span `[start, start + length]`
    /// contains `visible_offset`. A position on a boundary belongs to the
    /// earlier region.
    pub fn locate(&self, visible_offset: usize) -> Option<Located> {
        let mut visible_start = 0;
        for (index, region) in self.regions.iter().enumerate() {
            if visible_start <= visible_offset && visible_offset <= visible_start + region.length {
                return Some(Located {
                    index,
                    visible_start,
                });
            }
            visible_start += region.length;
        }
        None
    }

    /// Extends region `index` by `amount` and moves every later region forward.
    pub fn grow(&mut self, index: usize, amount: usize) {
        self.regions[index].length += amount;
        for region in &mut self.regions[index + 1..] {
            region.offset += amount;
        }
    }

    /// Shortens region `index` by `amount` and moves every later region back.
    pub fn shrink(&mut self, index: usize, amount: usize) {
        self.regions[index].length -= amount;
        for region in &mut self.regions[index + 1..] {
            region.offset -= amount;
        }
    }

    /// Drops region `index + 1` and adds its length to region `index`.
    /// The caller has already moved the raw text so the two are contiguous.
    pub fn absorb_next(&mut self, index: usize) -> Region {
        let next = self.regions.remove(index + 1);
        self.regions[index].length += next.length;
        next
    }

    /// Index of the first region that does not end with a line feed while a
    /// later region follows it.
    pub fn first_unterminated_pair(&self, buffer: &RawBuffer) -> Option<usize> {
        let pairs = self.regions.len().saturating_sub(1);
        (0..pairs).find(|&index| !self.regions[index].ends_with_newline(buffer))
    }
}

impl Default for VisibleRegions {
    fn default() -> Self {
        Self::whole(0)
    }
}
