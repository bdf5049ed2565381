//! Tab expansion and visual-column arithmetic.
//!
//! The document stores tabs as `\t`; on screen a tab advances to the next
//! multiple of [`TAB_WIDTH`]. Everything that maps between character
//! columns and screen columns goes through here, so the cursor, the
//! horizontal scroll, and the painted rows all agree on where a tab ends.

/// Screen columns per tab stop.
pub const TAB_WIDTH: usize = 4;

/// Expand tabs in `line` to spaces, padding each to the next tab stop.
#[must_use]
pub fn expand_tabs(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut col = 0;
    for ch in line.chars() {
        if ch == '\t' {
            let pad = TAB_WIDTH - (col % TAB_WIDTH);
            for _ in 0..pad {
                out.push(' ');
            }
            col += pad;
        } else {
            out.push(ch);
            col += 1;
        }
    }
    out
}

/// Screen width of `line` after tab expansion.
#[must_use]
pub fn visual_len(line: &str) -> usize {
    let mut col = 0;
    for ch in line.chars() {
        if ch == '\t' {
            col += TAB_WIDTH - (col % TAB_WIDTH);
        } else {
            col += 1;
        }
    }
    col
}

/// Screen column of character index `x` in `line`.
///
/// An `x` past the end of the line maps to the column past the last
/// character, which is where the cursor sits when appending.
#[must_use]
pub fn visual_col(line: &str, x: usize) -> usize {
    let mut col = 0;
    for ch in line.chars().take(x) {
        if ch == '\t' {
            col += TAB_WIDTH - (col % TAB_WIDTH);
        } else {
            col += 1;
        }
    }
    col
}
