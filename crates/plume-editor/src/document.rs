//! Line buffer with file binding and dirty tracking.
//!
//! A [`Document`] is a vector of line strings (no terminators stored) plus
//! the name of the file it is bound to, if any. The buffer is never empty:
//! a fresh document holds one empty line, and the last line cannot be
//! deleted.
//!
//! All editing primitives are bounds-checked no-ops: an out-of-range
//! coordinate leaves the buffer untouched rather than panicking. Callers
//! keep the cursor inside the buffer, but the buffer does not rely on it.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};

// ---- file state ----

/// Relationship between the buffer and the file it is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    /// Bound to a name that does not exist on disk yet, or not bound
    /// at all. Nothing to lose on quit.
    New,
    /// Buffer matches what was last read from or written to disk.
    Saved,
    /// Buffer has unsaved edits.
    Modified,
}

// ---- document ----

/// The text being edited: lines, file binding, and save state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    lines: Vec<String>,
    name: Option<String>,
    state: FileState,
}

/// A file name longer than this is shortened for the status line.
const DISPLAY_NAME_MAX: usize = 23;

/// Kept prefix of a shortened file name.
const DISPLAY_NAME_KEEP: usize = 20;

impl Document {
    /// An empty, unbound document: one empty line, no file name.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            name: None,
            state: FileState::New,
        }
    }

    /// Build a document from in-memory lines, unbound and clean. An
    /// empty vector yields the single empty line.
    #[must_use]
    pub fn from_lines(lines: Vec<String>) -> Self {
        let lines = if lines.is_empty() {
            vec![String::new()]
        } else {
            lines
        };
        Self {
            lines,
            name: None,
            state: FileState::New,
        }
    }

    /// Open `name`, reading its contents if the file exists.
    ///
    /// A nonexistent file yields an empty document bound to `name` in the
    /// [`FileState::New`] state, so the first save creates it.
    ///
    /// # Errors
    ///
    /// Returns any I/O error other than "not found".
    pub fn open(name: &str) -> io::Result<Self> {
        let file = match File::open(name) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let mut doc = Self::new();
                doc.name = Some(name.to_string());
                return Ok(doc);
            }
            Err(e) => return Err(e),
        };

        let mut lines = Vec::new();
        for line in BufReader::new(file).lines() {
            lines.push(line?);
        }
        if lines.is_empty() {
            lines.push(String::new());
        }

        Ok(Self {
            lines,
            name: Some(name.to_string()),
            state: FileState::Saved,
        })
    }

    // ---- accessors ----

    /// Number of lines. Always at least 1.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// The line at `y`, or `None` if out of range.
    #[inline]
    #[must_use]
    pub fn line(&self, y: usize) -> Option<&str> {
        self.lines.get(y).map(String::as_str)
    }

    /// Character count of the line at `y`, 0 if out of range.
    #[inline]
    #[must_use]
    pub fn line_len(&self, y: usize) -> usize {
        self.lines.get(y).map_or(0, |l| l.chars().count())
    }

    /// The bound file name, if any.
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Current save state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> FileState {
        self.state
    }

    /// Whether there are edits that would be lost on quit.
    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.state == FileState::Modified
    }

    /// Name for the status line: the bound file name, shortened to a
    /// 20-character prefix plus `...` when 23 characters or longer, or
    /// `[NEW FILE]` for an unbound document.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if name.chars().count() >= DISPLAY_NAME_MAX => {
                let kept: String = name.chars().take(DISPLAY_NAME_KEEP).collect();
                format!("{kept}...")
            }
            Some(name) => name.clone(),
            None => "[NEW FILE]".to_string(),
        }
    }

    // ---- editing primitives ----

    /// Insert `ch` before column `x` of line `y`. No-op if out of range.
    pub fn insert_char(&mut self, y: usize, x: usize, ch: char) {
        let Some(line) = self.lines.get_mut(y) else {
            return;
        };
        let Some(at) = byte_offset(line, x) else {
            return;
        };
        line.insert(at, ch);
        self.state = FileState::Modified;
    }

    /// Remove the character at column `x` of line `y`. No-op if out of
    /// range.
    pub fn delete_char(&mut self, y: usize, x: usize) {
        let Some(line) = self.lines.get_mut(y) else {
            return;
        };
        let Some(at) = byte_offset(line, x) else {
            return;
        };
        if at == line.len() {
            return;
        }
        line.remove(at);
        self.state = FileState::Modified;
    }

    /// Insert `text` as a new line at index `y`, pushing later lines down.
    /// No-op if `y` is past the end.
    pub fn insert_line(&mut self, y: usize, text: String) {
        if y > self.lines.len() {
            return;
        }
        self.lines.insert(y, text);
        self.state = FileState::Modified;
    }

    /// Delete the line at `y`. Returns `false` without modifying the
    /// buffer when `y` is out of range or only one line remains.
    pub fn delete_line(&mut self, y: usize) -> bool {
        if self.lines.len() == 1 || y >= self.lines.len() {
            return false;
        }
        self.lines.remove(y);
        self.state = FileState::Modified;
        true
    }

    /// Split line `y` at column `x`: the tail becomes a new line at
    /// `y + 1`. No-op if out of range.
    pub fn split_line(&mut self, y: usize, x: usize) {
        let Some(line) = self.lines.get_mut(y) else {
            return;
        };
        let Some(at) = byte_offset(line, x) else {
            return;
        };
        let tail = line.split_off(at);
        self.lines.insert(y + 1, tail);
        self.state = FileState::Modified;
    }

    /// Append line `y + 1` onto line `y`, removing it. Returns the column
    /// of the join point (the old length of line `y`), or `None` if there
    /// is no line below `y`.
    pub fn join_below(&mut self, y: usize) -> Option<usize> {
        if y + 1 >= self.lines.len() {
            return None;
        }
        let below = self.lines.remove(y + 1);
        let line = &mut self.lines[y];
        let join_at = line.chars().count();
        line.push_str(&below);
        self.state = FileState::Modified;
        Some(join_at)
    }

    // ---- saving ----

    /// Write the buffer to the bound file, LF-terminating every line.
    ///
    /// # Errors
    ///
    /// Returns [`io::ErrorKind::InvalidInput`] if the document is unbound,
    /// or the underlying I/O error on write failure. The save state is
    /// only updated on success.
    pub fn save(&mut self) -> io::Result<()> {
        let Some(name) = &self.name else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "no file name bound",
            ));
        };
        write_lines(&self.lines, name)?;
        self.state = FileState::Saved;
        Ok(())
    }

    /// Save to `name`, binding the document to it on success. A failed
    /// write leaves both the binding and the save state untouched.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error on write failure.
    pub fn save_as(&mut self, name: &str) -> io::Result<()> {
        write_lines(&self.lines, name)?;
        self.name = Some(name.to_string());
        self.state = FileState::Saved;
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte offset of character index `x` in `line`. `x` equal to the
/// character count maps to the end of the line; past that is `None`.
fn byte_offset(line: &str, x: usize) -> Option<usize> {
    if x == 0 {
        return Some(0);
    }
    line.char_indices()
        .nth(x - 1)
        .map(|(at, ch)| at + ch.len_utf8())
}

fn write_lines(lines: &[String], name: &str) -> io::Result<()> {
    let file = File::create(name)?;
    let mut w = BufWriter::new(file);
    for line in lines {
        w.write_all(line.as_bytes())?;
        w.write_all(b"\n")?;
    }
    w.flush()
}

// ---- filename validation ----

/// Names Windows reserves regardless of extension.
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Characters that are not portable in file names.
const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Whether `name` is acceptable as a file name on common platforms.
///
/// Rejects the empty string, names over 255 bytes, names with control or
/// reserved characters, names with leading or trailing spaces or a
/// trailing dot, and Windows device names (`CON`, `NUL`, `COM1`..., with
/// or without an extension).
#[must_use]
pub fn valid_filename(name: &str) -> bool {
    if name.is_empty() || name.len() > 255 {
        return false;
    }
    if name.starts_with(' ') || name.ends_with(' ') || name.ends_with('.') {
        return false;
    }
    if name
        .chars()
        .any(|c| c.is_control() || INVALID_CHARS.contains(&c))
    {
        return false;
    }

    // Device names are reserved even with an extension: "CON.txt" is
    // still CON.
    let stem = name.split('.').next().unwrap_or(name);
    let upper = stem.to_ascii_uppercase();
    !RESERVED_NAMES.contains(&upper.as_str())
}

// ---- tests ----
