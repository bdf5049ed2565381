//! Cursor movement, viewport scrolling, and body painting.
//!
//! The cursor lives in character coordinates (column `x` within line `y`
//! of the document). The viewport origin is in screen coordinates: a line
//! offset vertically and a tab-expanded visual column horizontally. Every
//! cursor move ends with an auto-scroll that nudges the origin the
//! minimum distance needed to keep the cursor visible.

use plume_term::frame::Frame;

use crate::document::Document;
use crate::visual::{expand_tabs, visual_col, visual_len};

// ---- cursor ----

/// Position in the document, character-based.
///
/// `y` stays in `[0, line_count)`; `x` stays in `[0, line_len(y)]`, so the
/// cursor may sit one past the last character for appending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Character index within the line.
    pub x: usize,
    /// Line index.
    pub y: usize,
}

impl Cursor {
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

// ---- view ----

/// The visible window onto the document.
///
/// `origin_y` counts lines; `origin_x` counts tab-expanded visual
/// columns, so a horizontally scrolled tab shows its remaining spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct View {
    /// Leftmost visible visual column.
    pub origin_x: usize,
    /// Topmost visible line.
    pub origin_y: usize,
    /// Visible columns.
    pub width: usize,
    /// Visible body rows (terminal rows minus status and message lines).
    pub height: usize,
}

/// Rows past the end of the document are marked like this.
const PAST_END_MARKER: &str = "~";

impl View {
    #[must_use]
    pub const fn new(width: usize, height: usize) -> Self {
        Self {
            origin_x: 0,
            origin_y: 0,
            width,
            height,
        }
    }

    /// Adopt a new body size. The origin is left alone; the following
    /// [`scroll_to_fit`](Self::scroll_to_fit) pulls the cursor back into
    /// the smaller window.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    // ---- cursor movement ----

    /// Move `cursor` by (`d_col`, `d_row`), then auto-scroll.
    ///
    /// Resolution order: the row is clamped to the document first; if it
    /// changed, the column is clamped to the landing line (it may shrink,
    /// it is never remembered). A still-negative column wraps to the end
    /// of the previous line; a column past the end wraps to the start of
    /// the next line, or to column 0 when already on the last line.
    ///
    /// Callers that want arrow-key behavior (no wrapping at line edges)
    /// guard the boundary cases before calling.
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn move_cursor(&mut self, doc: &Document, cursor: &mut Cursor, d_col: isize, d_row: isize) {
        let last = doc.line_count() as isize - 1;
        let mut ny = (cursor.y as isize + d_row).clamp(0, last);
        let mut nx = cursor.x as isize + d_col;

        if ny as usize != cursor.y {
            nx = nx.clamp(0, doc.line_len(ny as usize) as isize);
        }

        if nx < 0 {
            if ny > 0 {
                ny -= 1;
                nx = doc.line_len(ny as usize) as isize;
            } else {
                nx = 0;
            }
        } else if nx > doc.line_len(ny as usize) as isize {
            nx = 0;
            if ny < last {
                ny += 1;
            }
        }

        cursor.x = nx as usize;
        cursor.y = ny as usize;
        self.scroll_to_fit(doc, *cursor);
    }

    // ---- scrolling ----

    /// Shift the origin the minimum amount needed to bring `cursor`
    /// inside the window. Axes are independent: scrolling left or up
    /// snaps exactly to the cursor, scrolling right or down advances by
    /// exactly the overflow.
    pub fn scroll_to_fit(&mut self, doc: &Document, cursor: Cursor) {
        if self.width == 0 || self.height == 0 {
            return;
        }

        // Horizontal, on visual columns.
        let vcol = doc.line(cursor.y).map_or(0, |l| visual_col(l, cursor.x));
        if vcol < self.origin_x {
            self.origin_x = vcol;
        } else if vcol >= self.origin_x + self.width {
            self.scroll_right(doc, vcol - (self.origin_x + self.width) + 1);
        }

        // Vertical.
        if cursor.y < self.origin_y {
            self.origin_y = cursor.y;
        } else if cursor.y >= self.origin_y + self.height {
            self.scroll_down(doc, cursor.y - (self.origin_y + self.height) + 1);
        }
    }

    /// Scroll down by `d`, never past the last line.
    fn scroll_down(&mut self, doc: &Document, d: usize) {
        if self.origin_y + d < doc.line_count() {
            self.origin_y += d;
        }
    }

    /// Scroll right by `d`, never past the longest currently visible
    /// line's visual length.
    fn scroll_right(&mut self, doc: &Document, d: usize) {
        let mut max_len = 0;
        for y in self.origin_y..(self.origin_y + self.height).min(doc.line_count()) {
            if let Some(line) = doc.line(y) {
                max_len = max_len.max(visual_len(line));
            }
        }
        if self.origin_x + d < max_len {
            self.origin_x += d;
        }
    }

    // ---- painting ----

    /// Paint the document body into `frame`: one frame row per visible
    /// document line, tab-expanded and sliced at the horizontal origin,
    /// with [`PAST_END_MARKER`] rows after the last line.
    pub fn render_into(&self, doc: &Document, frame: &mut Frame) {
        for row in 0..self.height {
            let y = self.origin_y + row;
            let Ok(frame_row) = u16::try_from(row) else {
                break;
            };
            match doc.line(y) {
                Some(line) => {
                    let expanded = expand_tabs(line);
                    let visible: String = expanded
                        .chars()
                        .skip(self.origin_x)
                        .take(self.width)
                        .collect();
                    frame.set_row(frame_row, &visible);
                }
                None => frame.set_row(frame_row, PAST_END_MARKER),
            }
        }
    }

    /// Build the status line: file name with a dirty marker on the left,
    /// cursor position on the right, padded to `cols`.
    #[must_use]
    pub fn status_line(doc: &Document, cursor: Cursor, cols: usize) -> String {
        let dirty = if doc.is_dirty() { "[+]" } else { "" };
        let info = format!("{}{dirty}", doc.display_name());
        let position = format!("Ln {}, Col {}", cursor.y + 1, cursor.x + 1);

        let pad = cols.saturating_sub(info.chars().count() + position.len());
        let line = format!("{info}{}{position}", " ".repeat(pad));
        line.chars().take(cols).collect()
    }

    /// Screen position of `cursor` relative to the window origin.
    ///
    /// Only meaningful after [`scroll_to_fit`](Self::scroll_to_fit); the
    /// result is then inside the window.
    #[must_use]
    pub fn screen_cursor(&self, doc: &Document, cursor: Cursor) -> (u16, u16) {
        let vcol = doc.line(cursor.y).map_or(0, |l| visual_col(l, cursor.x));
        let x = vcol.saturating_sub(self.origin_x);
        let y = cursor.y.saturating_sub(self.origin_y);
        (
            u16::try_from(x).unwrap_or(u16::MAX),
            u16::try_from(y).unwrap_or(u16::MAX),
        )
    }
}

// ---- tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc_with(lines: &[&str]) -> Document {
        let mut doc = Document::new();
        for (i, line) in lines.iter().enumerate() {
            doc.insert_line(i, (*line).to_string());
        }
        doc.delete_line(lines.len());
        doc
    }

    fn wide_view() -> View {
        View::new(80, 22)
    }

    // ── movement ──

    #[test]
    fn step_right_within_line() {
        let doc = doc_with(&["hello"]);
        let mut view = wide_view();
        let mut c = Cursor::new(0, 0);
        view.move_cursor(&doc, &mut c, 1, 0);
        assert_eq!(c, Cursor::new(1, 0));
    }

    #[test]
    fn right_past_end_wraps_to_next_line() {
        let doc = doc_with(&["ab", "cd"]);
        let mut view = wide_view();
        let mut c = Cursor::new(2, 0);
        view.move_cursor(&doc, &mut c, 1, 0);
        assert_eq!(c, Cursor::new(0, 1));
    }

    #[test]
    fn right_past_end_of_last_line_goes_to_column_0() {
        let doc = doc_with(&["ab"]);
        let mut view = wide_view();
        let mut c = Cursor::new(2, 0);
        view.move_cursor(&doc, &mut c, 1, 0);
        assert_eq!(c, Cursor::new(0, 0));
    }

    #[test]
    fn left_at_start_wraps_to_previous_line_end() {
        let doc = doc_with(&["abc", "de"]);
        let mut view = wide_view();
        let mut c = Cursor::new(0, 1);
        view.move_cursor(&doc, &mut c, -1, 0);
        assert_eq!(c, Cursor::new(3, 0));
    }

    #[test]
    fn left_at_document_start_stays_put() {
        let doc = doc_with(&["abc"]);
        let mut view = wide_view();
        let mut c = Cursor::new(0, 0);
        view.move_cursor(&doc, &mut c, -1, 0);
        assert_eq!(c, Cursor::new(0, 0));
    }

    #[test]
    fn row_change_clamps_column_to_shorter_line() {
        let doc = doc_with(&["a long line", "ab"]);
        let mut view = wide_view();
        let mut c = Cursor::new(8, 0);
        view.move_cursor(&doc, &mut c, 0, 1);
        assert_eq!(c, Cursor::new(2, 1));
    }

    #[test]
    fn large_row_deltas_clamp_to_document() {
        let doc = doc_with(&["one", "two", "three"]);
        let mut view = wide_view();
        let mut c = Cursor::new(1, 1);
        view.move_cursor(&doc, &mut c, 0, -5);
        assert_eq!(c.y, 0);
        view.move_cursor(&doc, &mut c, 0, 9);
        assert_eq!(c.y, 2);
    }

    #[test]
    fn cursor_stays_in_bounds_after_any_move() {
        let doc = doc_with(&["hello", "", "a\tb", "wide line here"]);
        let mut view = View::new(6, 2);
        let mut c = Cursor::new(0, 0);
        let deltas: &[(isize, isize)] =
            &[(1, 0), (-3, 0), (0, 5), (9, -1), (-1, -1), (4, 2), (-9, 9)];
        for &(dx, dy) in deltas {
            view.move_cursor(&doc, &mut c, dx, dy);
            assert!(c.y < doc.line_count());
            assert!(c.x <= doc.line_len(c.y), "({dx},{dy}) left x={}", c.x);
        }
    }

    // ── scrolling ──

    #[test]
    fn cursor_inside_window_does_not_scroll() {
        let doc = doc_with(&["aaaa"; 10]);
        let mut view = View::new(10, 5);
        view.scroll_to_fit(&doc, Cursor::new(2, 3));
        assert_eq!((view.origin_x, view.origin_y), (0, 0));
    }

    #[test]
    fn cursor_below_window_scrolls_down_by_overflow() {
        let doc = doc_with(&["x"; 20]);
        let mut view = View::new(10, 5);
        view.scroll_to_fit(&doc, Cursor::new(0, 9));
        // Row 9 visible with a 5-row window means origin 5.
        assert_eq!(view.origin_y, 5);
    }

    #[test]
    fn cursor_above_window_snaps_origin_to_cursor() {
        let doc = doc_with(&["x"; 20]);
        let mut view = View::new(10, 5);
        view.origin_y = 10;
        view.scroll_to_fit(&doc, Cursor::new(0, 3));
        assert_eq!(view.origin_y, 3);
    }

    #[test]
    fn cursor_right_of_window_scrolls_right_by_overflow() {
        let doc = doc_with(&["abcdefghijklmnop"]);
        let mut view = View::new(8, 5);
        view.scroll_to_fit(&doc, Cursor::new(12, 0));
        // Visual col 12 visible in an 8-wide window means origin 5.
        assert_eq!(view.origin_x, 5);
    }

    #[test]
    fn cursor_left_of_window_snaps_origin_to_cursor() {
        let doc = doc_with(&["abcdefghijklmnop"]);
        let mut view = View::new(8, 5);
        view.origin_x = 10;
        view.scroll_to_fit(&doc, Cursor::new(2, 0));
        assert_eq!(view.origin_x, 2);
    }

    #[test]
    fn horizontal_scroll_uses_visual_columns() {
        // Cursor after char 7 of "\tabcdefghij" is at visual col 10.
        let doc = doc_with(&["\tabcdefghij"]);
        let mut view = View::new(6, 5);
        view.scroll_to_fit(&doc, Cursor::new(7, 0));
        assert_eq!(view.origin_x, 5);
    }

    #[test]
    fn rightward_scroll_stops_at_longest_visible_line() {
        let doc = doc_with(&["abcd"]);
        let mut view = View::new(4, 5);
        // Appending at the end of the only line: visual col 4 overflows
        // by 1, and origin 1 is still short of the line's length.
        view.scroll_to_fit(&doc, Cursor::new(4, 0));
        assert_eq!(view.origin_x, 1);
    }

    #[test]
    fn shrinking_window_pulls_cursor_back_in() {
        let doc = doc_with(&["x"; 30]);
        let mut view = View::new(20, 10);
        view.scroll_to_fit(&doc, Cursor::new(0, 15));
        view.resize(20, 4);
        view.scroll_to_fit(&doc, Cursor::new(0, 15));
        assert!(view.origin_y <= 15 && 15 < view.origin_y + view.height);
    }

    #[test]
    fn move_cursor_keeps_cursor_inside_window() {
        let doc = doc_with(&["0123456789abcdef"; 30]);
        let mut view = View::new(8, 4);
        let mut c = Cursor::new(0, 0);
        for _ in 0..20 {
            view.move_cursor(&doc, &mut c, 1, 1);
            let vcol = visual_col(doc.line(c.y).unwrap_or(""), c.x);
            assert!(view.origin_y <= c.y && c.y < view.origin_y + view.height);
            assert!(view.origin_x <= vcol && vcol < view.origin_x + view.width);
        }
    }

    // ── painting ──

    #[test]
    fn renders_visible_lines() {
        let doc = doc_with(&["one", "two", "three"]);
        let view = View::new(10, 5);
        let mut frame = Frame::new(10, 5);
        view.render_into(&doc, &mut frame);
        assert_eq!(frame.row(0), Some("one       "));
        assert_eq!(frame.row(1), Some("two       "));
        assert_eq!(frame.row(2), Some("three     "));
    }

    #[test]
    fn rows_past_document_end_get_marker() {
        let doc = doc_with(&["only"]);
        let view = View::new(10, 3);
        let mut frame = Frame::new(10, 3);
        view.render_into(&doc, &mut frame);
        assert_eq!(frame.row(1), Some("~         "));
        assert_eq!(frame.row(2), Some("~         "));
    }

    #[test]
    fn renders_from_vertical_origin() {
        let doc = doc_with(&["a", "b", "c", "d"]);
        let mut view = View::new(5, 2);
        view.origin_y = 2;
        let mut frame = Frame::new(5, 2);
        view.render_into(&doc, &mut frame);
        assert_eq!(frame.row(0), Some("c    "));
        assert_eq!(frame.row(1), Some("d    "));
    }

    #[test]
    fn renders_from_horizontal_origin() {
        let doc = doc_with(&["abcdefgh"]);
        let mut view = View::new(4, 1);
        view.origin_x = 3;
        let mut frame = Frame::new(4, 1);
        view.render_into(&doc, &mut frame);
        assert_eq!(frame.row(0), Some("defg"));
    }

    #[test]
    fn tabs_render_expanded() {
        let doc = doc_with(&["\tx"]);
        let view = View::new(8, 1);
        let mut frame = Frame::new(8, 1);
        view.render_into(&doc, &mut frame);
        assert_eq!(frame.row(0), Some("    x   "));
    }

    #[test]
    fn long_line_truncates_at_window_width() {
        let doc = doc_with(&["abcdefghij"]);
        let view = View::new(4, 1);
        let mut frame = Frame::new(4, 1);
        view.render_into(&doc, &mut frame);
        assert_eq!(frame.row(0), Some("abcd"));
    }

    // ── status line ──

    #[test]
    fn status_line_shows_name_and_position() {
        let doc = Document::new();
        let line = View::status_line(&doc, Cursor::new(4, 0), 60);
        assert_eq!(line.len(), 60);
        assert!(line.starts_with("[NEW FILE]"));
        assert!(line.ends_with("Ln 1, Col 5"));
    }

    #[test]
    fn status_line_marks_dirty() {
        let mut doc = doc_with(&["x"]);
        doc.insert_char(0, 0, 'y');
        let line = View::status_line(&doc, Cursor::new(0, 0), 60);
        assert!(line.contains("[+]"));
    }

    #[test]
    fn status_line_omits_marker_when_clean() {
        let doc = Document::new();
        let line = View::status_line(&doc, Cursor::new(0, 0), 60);
        assert!(!line.contains("[+]"));
    }

    #[test]
    fn status_line_is_exactly_cols_wide() {
        let doc = doc_with(&["x"]);
        for cols in [40, 41, 80, 120] {
            let line = View::status_line(&doc, Cursor::new(0, 0), cols);
            assert_eq!(line.len(), cols);
        }
    }

    #[test]
    fn status_line_pads_multibyte_names_by_character() {
        let name = format!("{}.txt", "文".repeat(20));
        let doc = Document::open(&name).unwrap();
        for cols in [40, 80] {
            let line = View::status_line(&doc, Cursor::new(0, 0), cols);
            assert_eq!(line.chars().count(), cols);
            assert!(line.ends_with("Ln 1, Col 1"));
        }
    }

    // ── screen cursor ──

    #[test]
    fn screen_cursor_relative_to_origin() {
        let doc = doc_with(&["aaaaaaaaaa", "bbbbbbbbbb", "cccccccccc"]);
        let mut view = View::new(5, 2);
        view.origin_x = 3;
        view.origin_y = 1;
        assert_eq!(view.screen_cursor(&doc, Cursor::new(5, 2)), (2, 1));
    }

    #[test]
    fn screen_cursor_accounts_for_tabs() {
        let doc = doc_with(&["\tab"]);
        let view = View::new(10, 2);
        assert_eq!(view.screen_cursor(&doc, Cursor::new(1, 0)), (4, 0));
    }
}
