// SPDX-License-Identifier: MIT
//
// Frame — the row grid that everything paints to.
//
// A Frame is the editor body area as it should appear on screen: `height`
// rows, each exactly `width` characters (space padded). The view layer
// paints tab-expanded document text into it, and the diff renderer
// compares it against the previously drawn frame row by row.
//
// Rows are stored as one `String` per row rather than a flat cell grid:
// plume draws unstyled ASCII text, so a row comparison is a single
// `String` equality check and a row redraw is a single byte write.
//
// Invariant: every row is always exactly `width` characters. `set_row`
// truncates or pads as needed, so the invariant holds no matter what the
// painter hands us.

// ─── Frame ──────────────────────────────────────────────────────────────────

/// A rectangular grid of characters: the target state of the editor body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u16,
    height: u16,
    rows: Vec<String>,
}

impl Frame {
    /// Create a frame filled with spaces.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let blank = " ".repeat(usize::from(width));
        Self {
            width,
            height,
            rows: vec![blank; usize::from(height)],
        }
    }

    /// Width in columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// A row's content. `None` when `y` is out of range.
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&str> {
        self.rows.get(usize::from(y)).map(String::as_str)
    }

    /// Replace a row's content, padding with spaces or truncating so the
    /// stored row is exactly `width` characters. Out-of-range `y` is a
    /// no-op.
    pub fn set_row(&mut self, y: u16, content: &str) {
        let Some(slot) = self.rows.get_mut(usize::from(y)) else {
            return;
        };
        let width = usize::from(self.width);

        slot.clear();
        slot.extend(content.chars().take(width));
        let used = slot.chars().count();
        if used < width {
            slot.extend(std::iter::repeat_n(' ', width - used));
        }
    }

    /// Reset every row to spaces.
    pub fn clear(&mut self) {
        let blank = " ".repeat(usize::from(self.width));
        for row in &mut self.rows {
            row.clone_from(&blank);
        }
    }

    /// Resize to new dimensions, refilling everything with spaces.
    ///
    /// Content is not preserved: after a resize the whole frame is
    /// repainted and redrawn anyway.
    pub fn resize(&mut self, width: u16, height: u16) {
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        let blank = " ".repeat(usize::from(width));
        self.rows.clear();
        self.rows.resize(usize::from(height), blank);
    }

    /// Copy another frame's content into this one.
    ///
    /// Reuses this frame's row allocations — zero allocation in steady
    /// state when dimensions match.
    pub fn copy_from(&mut self, other: &Self) {
        self.width = other.width;
        self.height = other.height;
        self.rows.resize(other.rows.len(), String::new());
        for (dst, src) in self.rows.iter_mut().zip(&other.rows) {
            dst.clone_from(src);
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
