// SPDX-License-Identifier: MIT
//
// Differential renderer — redraw only the rows that changed.
//
// Instead of rewriting the entire body every tick, we compare the current
// Frame against the previous one and emit output only for rows whose
// content differs. In a typical editing session one or two rows change
// per keystroke out of 20+ visible rows; diffing turns a full repaint
// into a surgical update.
//
// The pipeline per tick:
//
//   1. The view layer paints the target Frame from document + viewport.
//   2. render() compares the target against the stored previous frame.
//   3. Changed rows become a cursor-move plus the row's raw bytes,
//      accumulated in an internal buffer — zero writes to the terminal.
//   4. flush() issues a single write() syscall.
//
// A full redraw (clear screen + every row) happens on the first render,
// whenever the frame size changed, and after force_redraw() — the resize
// fallback path.
//
// Row contents are emitted with write_all, never through a formatting
// primitive. A `%` in the document reaches the terminal as a literal `%`;
// there is no directive syntax to escape.

use std::io::{self, Write};

use crate::ansi;
use crate::frame::Frame;

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// Statistics from a render pass, for tests and debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Rows that differed from the previous frame and were drawn.
    pub rows_drawn: usize,
    /// Rows that matched the previous frame and were skipped.
    pub rows_skipped: usize,
    /// Total bytes of output generated.
    pub bytes_written: usize,
}

impl RenderStats {
    /// Total rows processed (drawn + skipped).
    #[inline]
    #[must_use]
    pub const fn total_rows(&self) -> usize {
        self.rows_drawn + self.rows_skipped
    }
}

// ─── DiffRenderer ────────────────────────────────────────────────────────────

/// Row-diffing renderer for the editor body.
///
/// Maintains the previously drawn frame for comparison. All output is
/// buffered for a single `write()` syscall per tick.
///
/// # Usage
///
/// ```no_run
/// use plume_term::frame::Frame;
/// use plume_term::diff::DiffRenderer;
///
/// let mut renderer = DiffRenderer::new();
/// let mut frame = Frame::new(80, 22);
///
/// frame.set_row(0, "hello");
///
/// let stats = renderer.render(&frame);
/// renderer.flush_to(&mut std::io::stdout()).unwrap();
/// // stats.rows_drawn tells you how much work was done.
/// ```
pub struct DiffRenderer {
    output: Vec<u8>,
    previous: Option<Frame>,
    force_full: bool,
}

/// Output buffer capacity: enough for a full 200×60 redraw without
/// reallocation.
const OUTPUT_CAPACITY: usize = 16_384;

impl DiffRenderer {
    /// Create a renderer with no previous frame (first render draws
    /// everything).
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: Vec::with_capacity(OUTPUT_CAPACITY),
            previous: None,
            force_full: false,
        }
    }

    /// Diff the current frame against the previous and generate output.
    ///
    /// After calling this, use [`flush`](Self::flush) to write the output
    /// to the terminal, or [`output_bytes`](Self::output_bytes) to inspect
    /// it (for tests).
    pub fn render(&mut self, current: &Frame) -> RenderStats {
        self.output.clear();

        let height = current.height();
        let mut stats = RenderStats::default();

        // Nothing to render for zero-size frames.
        if current.width() == 0 || height == 0 {
            self.store_frame(current);
            return stats;
        }

        // Synchronized output: terminal buffers until end_sync.
        ansi::begin_sync(&mut self.output).ok();

        // Full redraw on first render, size change, or explicit request.
        let size_matches = self
            .previous
            .as_ref()
            .is_some_and(|prev| prev.width() == current.width() && prev.height() == height);
        let full_redraw = self.force_full || !size_matches;
        self.force_full = false;

        if full_redraw {
            ansi::clear_screen(&mut self.output).ok();
        }

        for y in 0..height {
            let Some(row) = current.row(y) else { break };

            let changed =
                full_redraw || self.previous.as_ref().and_then(|p| p.row(y)) != Some(row);

            if changed {
                ansi::cursor_to(&mut self.output, 0, y).ok();
                // Raw bytes — no formatting, '%' stays literal.
                self.output.extend_from_slice(row.as_bytes());
                stats.rows_drawn += 1;
            } else {
                stats.rows_skipped += 1;
            }
        }

        ansi::end_sync(&mut self.output).ok();

        stats.bytes_written = self.output.len();

        // Store current frame for next diff (zero allocation in steady
        // state).
        self.store_frame(current);

        stats
    }

    /// The raw output bytes from the last render (for testing).
    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        &self.output
    }

    /// Write accumulated output to `w` and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        w.write_all(&self.output)?;
        w.flush()?;
        self.output.clear();
        Ok(())
    }

    /// Make the next render clear the screen and draw every row.
    ///
    /// Called after a terminal resize, or anything else that may have
    /// invalidated what's actually on screen.
    pub fn force_redraw(&mut self) {
        self.force_full = true;
    }

    /// Store the current frame for next render's comparison.
    fn store_frame(&mut self, current: &Frame) {
        match &mut self.previous {
            Some(prev) => prev.copy_from(current),
            None => self.previous = Some(current.clone()),
        }
    }
}

impl Default for DiffRenderer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
