// SPDX-License-Identifier: MIT
//
// plume — a small modal terminal text editor.
//
// This is the main binary that wires together the two crates:
//
//   plume-term   → terminal control, input parsing, row-diff rendering
//   plume-editor → text buffer, cursor, viewport, modes
//
// The Editor struct holds all editing state; the Session owns the
// terminal and drives the loop. Each tick flows through:
//
//   update → paint body frame → diff render → draw status + message
//   → block on one key → mode dispatch → buffer/cursor mutation
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ text area                    │  ← rows - 2 (diffed row by row)
//   ├──────────────────────────────┤
//   │ status line (inverse video)  │  ← 1 row (redrawn every tick)
//   ├──────────────────────────────┤
//   │ message / prompt line        │  ← 1 row (redrawn every tick)
//   └──────────────────────────────┘
//
// Escape toggles between edit mode (keys type) and command mode (keys
// accumulate into a command string, run on Enter). Commands are single
// characters: s save, w save-as (prompted), q quit, Q force quit,
// d delete line, . repeat the last command string.

use std::env;
use std::fmt;
use std::io::{self, Write};
use std::iter::repeat_n;
use std::process;

use plume_editor::document::{self, Document};
use plume_editor::mode::Mode;
use plume_editor::view::{Cursor, View};

use plume_term::ansi;
use plume_term::diff::DiffRenderer;
use plume_term::frame::Frame;
use plume_term::input::{Key, KeyEvent, KeyReader};
use plume_term::terminal::{Size, Terminal};

// ─── Limits ──────────────────────────────────────────────────────────────────

/// Smallest usable terminal width, in columns.
const MIN_COLS: usize = 40;

/// Smallest usable body height (terminal rows minus the two UI lines).
const MIN_BODY_ROWS: usize = 12;

/// Recursion limit for the `.` repeat command. A stored command that
/// contains `.` would otherwise recurse forever.
const MAX_REPEAT_DEPTH: usize = 16;

/// Label drawn on the message line by the save-as prompt. Typed text
/// echoes right after it.
const PROMPT_LABEL: &str = "Write file: ";

/// Column where prompt input echoes (the label's width).
const PROMPT_COL: u16 = 12;

// ─── Fatal errors ────────────────────────────────────────────────────────────

/// Errors that abort the process. Everything else is surfaced on the
/// message line and editing continues.
#[derive(Debug)]
enum FatalError {
    /// The terminal could not be set up or written to.
    Terminal(io::Error),
    /// The terminal is under 40 columns or 12 body rows.
    TooSmall,
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terminal(e) => write!(f, "terminal error: {e}"),
            Self::TooSmall => write!(f, "Terminal size too small!"),
        }
    }
}

impl std::error::Error for FatalError {}

impl From<io::Error> for FatalError {
    fn from(e: io::Error) -> Self {
        Self::Terminal(e)
    }
}

// ─── Filename prompt ─────────────────────────────────────────────────────────

/// Source of a filename for the save-as command.
///
/// The real implementation runs a nested blocking read loop on the
/// message line; tests substitute canned answers.
trait FilenamePrompt {
    /// Collect a filename. `Ok(None)` means the user abandoned the
    /// prompt (Escape or end of input).
    fn read_filename(&mut self) -> io::Result<Option<String>>;
}

/// Interactive prompt: takes over the message line and the key reader
/// until Enter or Escape.
struct TerminalPrompt<'a> {
    reader: &'a mut KeyReader,
    /// Terminal row of the message line.
    row: u16,
    /// Terminal width, bounding the echo area.
    cols: usize,
}

impl FilenamePrompt for TerminalPrompt<'_> {
    fn read_filename(&mut self) -> io::Result<Option<String>> {
        let stdout = io::stdout();
        let mut out = stdout.lock();

        let mut label = String::from(PROMPT_LABEL);
        label.truncate(self.cols);
        let pad = self.cols - label.len();
        label.extend(repeat_n(' ', pad));
        ansi::cursor_to(&mut out, 0, self.row)?;
        out.write_all(label.as_bytes())?;
        ansi::cursor_to(&mut out, PROMPT_COL, self.row)?;
        out.flush()?;

        let mut name = String::new();
        loop {
            let Some(event) = self.reader.read_key()? else {
                return Ok(None);
            };
            match event.key {
                Key::Enter => return Ok(Some(name)),
                Key::Escape => return Ok(None),
                Key::Backspace => {
                    if name.pop().is_some() {
                        let col = PROMPT_COL + u16::try_from(name.len()).unwrap_or(u16::MAX);
                        ansi::cursor_to(&mut out, col, self.row)?;
                        out.write_all(b" ")?;
                        ansi::cursor_to(&mut out, col, self.row)?;
                        out.flush()?;
                    }
                }
                Key::Char(ch) if event.is_plain() && (' '..='~').contains(&ch) => {
                    if usize::from(PROMPT_COL) + name.len() < self.cols {
                        name.push(ch);
                        out.write_all(&[ch as u8])?;
                        out.flush()?;
                    }
                }
                _ => {}
            }
        }
    }
}

// ─── Editor ──────────────────────────────────────────────────────────────────

/// All editing state: the document, where the cursor is, what is
/// visible, which mode is active, and the transient UI strings.
struct Editor {
    doc: Document,
    cursor: Cursor,
    view: View,
    mode: Mode,
    /// Command-mode keystrokes, run on Enter.
    pending: String,
    /// The last confirmed command string, for `.` repeat.
    last_cmd: String,
    /// Transient message shown until something replaces it.
    message: String,
    running: bool,
}

impl Editor {
    fn new(doc: Document, message: String) -> Self {
        Self {
            doc,
            cursor: Cursor::default(),
            view: View::new(0, 0),
            mode: Mode::Edit,
            pending: String::new(),
            last_cmd: String::new(),
            message,
            running: true,
        }
    }

    /// Dispatch one keypress according to the active mode.
    fn handle_key(&mut self, event: KeyEvent, prompt: &mut dyn FilenamePrompt) -> io::Result<()> {
        match event.key {
            Key::Up if self.mode == Mode::Edit => {
                if self.cursor.y == 0 {
                    self.move_cursor(-to_isize(self.cursor.x), 0);
                } else {
                    self.move_cursor(0, -1);
                }
            }
            Key::Down if self.mode == Mode::Edit => {
                let len = self.doc.line_len(self.cursor.y);
                if self.cursor.y == self.doc.line_count() - 1 {
                    self.move_cursor(to_isize(len) - to_isize(self.cursor.x), 0);
                } else {
                    self.move_cursor(0, 1);
                }
            }
            Key::Left if self.mode == Mode::Edit => {
                if self.cursor.x > 0 {
                    self.move_cursor(-1, 0);
                }
            }
            Key::Right if self.mode == Mode::Edit => {
                if self.cursor.x < self.doc.line_len(self.cursor.y) {
                    self.move_cursor(1, 0);
                }
            }
            Key::Backspace if self.mode == Mode::Edit => self.backspace(),
            Key::Enter => match self.mode {
                Mode::Edit => {
                    self.doc.split_line(self.cursor.y, self.cursor.x);
                    self.move_cursor(-to_isize(self.cursor.x), 1);
                }
                Mode::Command => {
                    let cmd = std::mem::take(&mut self.pending);
                    self.run_command(&cmd, 0, prompt)?;
                    self.mode = Mode::Edit;
                }
            },
            Key::Tab if self.mode == Mode::Edit => {
                for _ in 0..4 {
                    self.doc.insert_char(self.cursor.y, self.cursor.x, ' ');
                }
                self.move_cursor(4, 0);
            }
            Key::Escape => {
                self.mode = self.mode.toggled();
                self.pending.clear();
            }
            Key::Char(ch) if event.is_plain() && (' '..='~').contains(&ch) => match self.mode {
                Mode::Edit => {
                    self.doc.insert_char(self.cursor.y, self.cursor.x, ch);
                    self.move_cursor(1, 0);
                }
                Mode::Command => self.pending.push(ch),
            },
            _ => {}
        }
        Ok(())
    }

    fn move_cursor(&mut self, d_col: isize, d_row: isize) {
        self.view
            .move_cursor(&self.doc, &mut self.cursor, d_col, d_row);
    }

    /// Backspace: delete the character before the cursor, or join with
    /// the previous line when at column 0.
    fn backspace(&mut self) {
        if self.cursor.x == 0 && self.cursor.y > 0 {
            if let Some(join_at) = self.doc.join_below(self.cursor.y - 1) {
                self.cursor.y -= 1;
                self.cursor.x = join_at;
                self.view.scroll_to_fit(&self.doc, self.cursor);
            }
        } else if self.cursor.x > 0 {
            self.doc.delete_char(self.cursor.y, self.cursor.x - 1);
            self.move_cursor(-1, 0);
        }
    }

    // ── Command interpreter ──────────────────────────────────────────

    /// Run a confirmed command string: each character is one command,
    /// in sequence. An unknown character aborts the rest. The string is
    /// stored for `.` repeat regardless of how execution went.
    fn run_command(
        &mut self,
        cmd: &str,
        depth: usize,
        prompt: &mut dyn FilenamePrompt,
    ) -> io::Result<()> {
        if cmd.is_empty() {
            return Ok(());
        }

        for ch in cmd.chars() {
            match ch {
                '.' => {
                    if depth < MAX_REPEAT_DEPTH {
                        let last = self.last_cmd.clone();
                        self.run_command(&last, depth + 1, prompt)?;
                    }
                }
                's' => self.save_bound(),
                'w' => self.save_prompted(prompt)?,
                'q' => {
                    if self.doc.is_dirty() {
                        self.message =
                            "No write since last change (use Q to override)!".to_string();
                    } else {
                        self.running = false;
                    }
                }
                'Q' => self.running = false,
                'd' => self.delete_current_line(),
                other => {
                    self.message = format!("Unknown command: {other}");
                    break;
                }
            }
        }

        if depth == 0 {
            self.last_cmd = cmd.to_string();
        }
        Ok(())
    }

    /// `s`: save to the bound filename.
    fn save_bound(&mut self) {
        let Some(name) = self.doc.name().map(ToString::to_string) else {
            self.message = "Empty filename!".to_string();
            return;
        };
        match self.doc.save() {
            Ok(()) => self.message = format!("Successfully written to {name}"),
            Err(_) => self.message = format!("Failed to open {name} for writing!"),
        }
    }

    /// `w`: prompt for a filename, validate it, save and bind.
    fn save_prompted(&mut self, prompt: &mut dyn FilenamePrompt) -> io::Result<()> {
        self.message = PROMPT_LABEL.to_string();
        let Some(name) = prompt.read_filename()? else {
            return Ok(());
        };
        if name.is_empty() {
            self.message = "Empty filename!".to_string();
        } else if !document::valid_filename(&name) {
            self.message = "Invalid filename!".to_string();
        } else {
            match self.doc.save_as(&name) {
                Ok(()) => self.message = format!("Successfully written to {name}"),
                Err(_) => self.message = format!("Failed to open {name} for writing!"),
            }
        }
        Ok(())
    }

    /// `d`: delete the cursor's line and step up one row.
    fn delete_current_line(&mut self) {
        if self.doc.delete_line(self.cursor.y) {
            self.move_cursor(0, -1);
        } else {
            self.message = "Only one line left!".to_string();
        }
    }
}

#[allow(clippy::cast_possible_wrap)]
const fn to_isize(n: usize) -> isize {
    n as isize
}

/// Whether a terminal size leaves room for the minimum editing area:
/// [`MIN_COLS`] columns and [`MIN_BODY_ROWS`] rows besides the status
/// and message lines.
fn size_usable(size: Size) -> bool {
    usize::from(size.cols) >= MIN_COLS && usize::from(size.rows).saturating_sub(2) >= MIN_BODY_ROWS
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// Owns the terminal and drives the update → render → input loop.
struct Session {
    terminal: Terminal,
    reader: KeyReader,
    renderer: DiffRenderer,
    frame: Frame,
    editor: Editor,
}

impl Session {
    fn new(editor: Editor) -> Result<Self, FatalError> {
        let mut terminal = Terminal::new()?;
        terminal.enter()?;
        let size = terminal.size();

        let mut session = Self {
            terminal,
            reader: KeyReader::new(),
            renderer: DiffRenderer::new(),
            frame: Frame::new(0, 0),
            editor,
        };
        session.apply_size(size)?;
        Ok(session)
    }

    /// Adopt a terminal size, or bail out if it is unusably small.
    fn apply_size(&mut self, size: Size) -> Result<(), FatalError> {
        if !size_usable(size) {
            return Err(FatalError::TooSmall);
        }
        let cols = usize::from(size.cols);
        let body = usize::from(size.rows).saturating_sub(2);
        self.editor.view.resize(cols, body);
        self.frame
            .resize(size.cols, u16::try_from(body).unwrap_or(u16::MAX));
        self.renderer.force_redraw();
        Ok(())
    }

    fn run(&mut self) -> Result<(), FatalError> {
        while self.editor.running {
            self.update()?;
            self.render()?;

            let Some(event) = self.reader.read_key().map_err(FatalError::Terminal)? else {
                // stdin closed; nothing more will ever arrive.
                break;
            };

            let Self {
                editor,
                reader,
                terminal,
                ..
            } = self;
            let size = terminal.size();
            let mut prompt = TerminalPrompt {
                reader,
                row: size.rows - 1,
                cols: usize::from(size.cols),
            };
            editor
                .handle_key(event, &mut prompt)
                .map_err(FatalError::Terminal)?;
        }

        self.terminal.leave()?;
        Ok(())
    }

    /// Poll for a resize, then rebuild the target frame from the
    /// document and viewport.
    fn update(&mut self) -> Result<(), FatalError> {
        let size = self.terminal.refresh_size();
        let body = usize::from(size.rows).saturating_sub(2);
        if usize::from(size.cols) != self.editor.view.width || body != self.editor.view.height {
            self.apply_size(size)?;
        }

        let ed = &mut self.editor;
        ed.view.scroll_to_fit(&ed.doc, ed.cursor);
        ed.view.render_into(&ed.doc, &mut self.frame);
        Ok(())
    }

    /// Draw the tick: diffed body rows, then the status bar in inverse
    /// video, the padded message line, and finally the cursor.
    fn render(&mut self) -> Result<(), FatalError> {
        self.renderer.render(&self.frame);

        let stdout = io::stdout();
        let mut out = stdout.lock();
        ansi::cursor_hide(&mut out)?;
        self.renderer.flush_to(&mut out)?;

        let size = self.terminal.size();
        let cols = usize::from(size.cols);
        let ed = &self.editor;

        let status = View::status_line(&ed.doc, ed.cursor, cols);
        ansi::cursor_to(&mut out, 0, size.rows - 2)?;
        ansi::inverse_on(&mut out)?;
        out.write_all(status.as_bytes())?;
        ansi::inverse_off(&mut out)?;

        let mut message: String = ed.message.chars().take(cols).collect();
        let pad = cols.saturating_sub(message.chars().count());
        message.extend(repeat_n(' ', pad));
        ansi::cursor_to(&mut out, 0, size.rows - 1)?;
        out.write_all(message.as_bytes())?;

        let (cx, cy) = ed.view.screen_cursor(&ed.doc, ed.cursor);
        ansi::cursor_to(&mut out, cx, cy)?;
        ansi::cursor_show(&mut out)?;
        out.flush().map_err(FatalError::Terminal)
    }
}

// ─── Entry point ─────────────────────────────────────────────────────────────

/// Build the startup document from the optional filename argument.
/// Problems fall back to an empty unbound buffer plus a message.
fn startup_document() -> (Document, String) {
    let Some(name) = env::args().nth(1).filter(|n| !n.is_empty()) else {
        return (Document::new(), String::new());
    };
    if !document::valid_filename(&name) {
        return (Document::new(), "Invalid filename!".to_string());
    }
    match Document::open(&name) {
        Ok(doc) => (doc, String::new()),
        Err(_) => (
            Document::new(),
            format!("Failed to open {name} for reading!"),
        ),
    }
}

fn main() {
    let (doc, message) = startup_document();
    let editor = Editor::new(doc, message);

    let result = Session::new(editor).and_then(|mut session| session.run());
    if let Err(e) = result {
        eprintln!("plume: {e}");
        process::exit(1);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use plume_editor::document::FileState;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;

    // ── Helpers ──────────────────────────────────────────────────────

    /// Prompt that replays canned answers; an exhausted queue abandons.
    struct QueuedPrompt {
        responses: VecDeque<Option<String>>,
    }

    impl QueuedPrompt {
        fn empty() -> Self {
            Self {
                responses: VecDeque::new(),
            }
        }

        fn with(answer: Option<&str>) -> Self {
            Self {
                responses: VecDeque::from([answer.map(ToString::to_string)]),
            }
        }
    }

    impl FilenamePrompt for QueuedPrompt {
        fn read_filename(&mut self) -> io::Result<Option<String>> {
            Ok(self.responses.pop_front().unwrap_or(None))
        }
    }

    /// Editor over a clean, unbound document with the given lines.
    fn editor_with(lines: &[&str]) -> Editor {
        let doc = Document::from_lines(lines.iter().map(ToString::to_string).collect());
        let mut e = Editor::new(doc, String::new());
        e.view.resize(80, 22);
        e
    }

    fn feed(e: &mut Editor, keys: &[Key]) {
        let mut prompt = QueuedPrompt::empty();
        for &key in keys {
            e.handle_key(KeyEvent::plain(key), &mut prompt).unwrap();
        }
    }

    /// Type a string in edit mode.
    fn type_str(e: &mut Editor, s: &str) {
        let keys: Vec<Key> = s.chars().map(Key::Char).collect();
        feed(e, &keys);
    }

    /// Enter command mode, type `cmd`, confirm with Enter.
    fn command(e: &mut Editor, cmd: &str) {
        command_with(e, cmd, &mut QueuedPrompt::empty());
    }

    fn command_with(e: &mut Editor, cmd: &str, prompt: &mut dyn FilenamePrompt) {
        e.handle_key(KeyEvent::plain(Key::Escape), prompt).unwrap();
        for ch in cmd.chars() {
            e.handle_key(KeyEvent::plain(Key::Char(ch)), prompt)
                .unwrap();
        }
        e.handle_key(KeyEvent::plain(Key::Enter), prompt).unwrap();
    }

    fn lines(e: &Editor) -> Vec<&str> {
        (0..e.doc.line_count()).map(|y| e.doc.line(y).unwrap()).collect()
    }

    // ── Typing ───────────────────────────────────────────────────────

    #[test]
    fn typing_inserts_and_advances() {
        let mut e = editor_with(&[""]);
        type_str(&mut e, "hi");
        assert_eq!(lines(&e), ["hi"]);
        assert_eq!((e.cursor.x, e.cursor.y), (2, 0));
        assert!(e.doc.is_dirty());
    }

    #[test]
    fn hello_enter_world() {
        let mut e = editor_with(&[""]);
        type_str(&mut e, "hello");
        feed(&mut e, &[Key::Enter]);
        type_str(&mut e, "world");
        assert_eq!(lines(&e), ["hello", "world"]);
        assert_eq!((e.cursor.x, e.cursor.y), (5, 1));
    }

    #[test]
    fn enter_splits_mid_line() {
        let mut e = editor_with(&["hello world"]);
        e.cursor = Cursor::new(5, 0);
        feed(&mut e, &[Key::Enter]);
        assert_eq!(lines(&e), ["hello", " world"]);
        assert_eq!((e.cursor.x, e.cursor.y), (0, 1));
    }

    #[test]
    fn tab_inserts_four_spaces() {
        let mut e = editor_with(&["ab"]);
        e.cursor = Cursor::new(1, 0);
        feed(&mut e, &[Key::Tab]);
        assert_eq!(lines(&e), ["a    b"]);
        assert_eq!(e.cursor.x, 5);
    }

    // ── Backspace ────────────────────────────────────────────────────

    #[test]
    fn backspace_deletes_before_cursor() {
        let mut e = editor_with(&["abc"]);
        e.cursor = Cursor::new(2, 0);
        feed(&mut e, &[Key::Backspace]);
        assert_eq!(lines(&e), ["ac"]);
        assert_eq!(e.cursor.x, 1);
    }

    #[test]
    fn backspace_at_document_start_is_noop() {
        let mut e = editor_with(&["abc"]);
        feed(&mut e, &[Key::Backspace]);
        assert_eq!(lines(&e), ["abc"]);
        assert_eq!((e.cursor.x, e.cursor.y), (0, 0));
        assert!(!e.doc.is_dirty());
    }

    #[test]
    fn backspace_at_column_0_joins_lines() {
        let mut e = editor_with(&["abc", "def"]);
        e.cursor = Cursor::new(0, 1);
        feed(&mut e, &[Key::Backspace]);
        assert_eq!(lines(&e), ["abcdef"]);
        assert_eq!((e.cursor.x, e.cursor.y), (3, 0));
    }

    // ── Arrow keys ───────────────────────────────────────────────────

    #[test]
    fn up_at_first_row_goes_to_column_0() {
        let mut e = editor_with(&["hello"]);
        e.cursor = Cursor::new(3, 0);
        feed(&mut e, &[Key::Up]);
        assert_eq!((e.cursor.x, e.cursor.y), (0, 0));
    }

    #[test]
    fn down_at_last_row_goes_to_line_end() {
        let mut e = editor_with(&["hello"]);
        e.cursor = Cursor::new(2, 0);
        feed(&mut e, &[Key::Down]);
        assert_eq!((e.cursor.x, e.cursor.y), (5, 0));
    }

    #[test]
    fn left_blocked_at_line_start() {
        let mut e = editor_with(&["ab", "cd"]);
        e.cursor = Cursor::new(0, 1);
        feed(&mut e, &[Key::Left]);
        // No wrap to the previous line via arrows.
        assert_eq!((e.cursor.x, e.cursor.y), (0, 1));
    }

    #[test]
    fn right_blocked_at_line_end() {
        let mut e = editor_with(&["ab", "cd"]);
        e.cursor = Cursor::new(2, 0);
        feed(&mut e, &[Key::Right]);
        assert_eq!((e.cursor.x, e.cursor.y), (2, 0));
    }

    #[test]
    fn down_clamps_column_to_shorter_line() {
        let mut e = editor_with(&["longer line", "ab", "x"]);
        e.cursor = Cursor::new(7, 0);
        feed(&mut e, &[Key::Down]);
        assert_eq!((e.cursor.x, e.cursor.y), (2, 1));
    }

    // ── Modes ────────────────────────────────────────────────────────

    #[test]
    fn escape_toggles_mode() {
        let mut e = editor_with(&[""]);
        assert_eq!(e.mode, Mode::Edit);
        feed(&mut e, &[Key::Escape]);
        assert_eq!(e.mode, Mode::Command);
        feed(&mut e, &[Key::Escape]);
        assert_eq!(e.mode, Mode::Edit);
    }

    #[test]
    fn command_mode_accumulates_instead_of_inserting() {
        let mut e = editor_with(&[""]);
        feed(&mut e, &[Key::Escape]);
        type_str(&mut e, "qd");
        assert_eq!(lines(&e), [""]);
        assert_eq!(e.pending, "qd");
    }

    #[test]
    fn escape_discards_pending_command() {
        let mut e = editor_with(&["a", "b"]);
        feed(&mut e, &[Key::Escape]);
        type_str(&mut e, "d");
        feed(&mut e, &[Key::Escape]);
        assert_eq!(e.pending, "");
        assert_eq!(e.doc.line_count(), 2);
        assert_eq!(e.mode, Mode::Edit);
    }

    #[test]
    fn enter_runs_pending_and_returns_to_edit() {
        let mut e = editor_with(&["a", "b"]);
        command(&mut e, "d");
        assert_eq!(e.doc.line_count(), 1);
        assert_eq!(e.mode, Mode::Edit);
        assert_eq!(e.pending, "");
    }

    // ── Commands: d ──────────────────────────────────────────────────

    #[test]
    fn delete_line_moves_cursor_up() {
        let mut e = editor_with(&["one", "two", "three"]);
        e.cursor = Cursor::new(1, 1);
        command(&mut e, "d");
        assert_eq!(lines(&e), ["one", "three"]);
        assert_eq!(e.cursor.y, 0);
    }

    #[test]
    fn ddd_on_four_lines_leaves_one() {
        let mut e = editor_with(&["a", "b", "c", "d"]);
        command(&mut e, "ddd");
        assert_eq!(e.doc.line_count(), 1);
        assert_eq!(e.message, "");
    }

    #[test]
    fn delete_sole_line_refused_with_message() {
        let mut e = editor_with(&["only"]);
        command(&mut e, "d");
        assert_eq!(lines(&e), ["only"]);
        assert_eq!(e.message, "Only one line left!");
    }

    #[test]
    fn dddd_on_four_lines_never_goes_below_one() {
        let mut e = editor_with(&["a", "b", "c", "d"]);
        command(&mut e, "dddd");
        assert_eq!(e.doc.line_count(), 1);
        assert_eq!(e.message, "Only one line left!");
    }

    // ── Commands: q / Q ──────────────────────────────────────────────

    #[test]
    fn quit_on_clean_document() {
        let mut e = editor_with(&["x"]);
        command(&mut e, "q");
        assert!(!e.running);
    }

    #[test]
    fn quit_refused_when_dirty() {
        let mut e = editor_with(&[""]);
        type_str(&mut e, "x");
        command(&mut e, "q");
        assert!(e.running);
        assert_eq!(e.message, "No write since last change (use Q to override)!");
    }

    #[test]
    fn force_quit_ignores_dirty() {
        let mut e = editor_with(&[""]);
        type_str(&mut e, "x");
        command(&mut e, "Q");
        assert!(!e.running);
    }

    // ── Commands: s ──────────────────────────────────────────────────

    #[test]
    fn save_unbound_reports_empty_filename() {
        let mut e = editor_with(&["x"]);
        command(&mut e, "s");
        assert_eq!(e.message, "Empty filename!");
    }

    #[test]
    fn save_bound_writes_and_cleans() {
        let path = std::env::temp_dir().join("plume_main_save.txt");
        std::fs::remove_file(&path).ok();
        let name = path.to_str().unwrap();

        let doc = Document::open(name).unwrap();
        let mut e = Editor::new(doc, String::new());
        e.view.resize(80, 22);
        type_str(&mut e, "saved text");
        assert!(e.doc.is_dirty());

        command(&mut e, "s");
        assert_eq!(e.message, format!("Successfully written to {name}"));
        assert_eq!(e.doc.state(), FileState::Saved);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "saved text\n");

        std::fs::remove_file(&path).ok();
    }

    // ── Commands: w ──────────────────────────────────────────────────

    #[test]
    fn save_as_binds_and_writes() {
        let path = std::env::temp_dir().join("plume_main_save_as.txt");
        std::fs::remove_file(&path).ok();
        let name = path.to_str().unwrap();

        let mut e = editor_with(&["content"]);
        let mut prompt = QueuedPrompt::with(Some(name));
        command_with(&mut e, "w", &mut prompt);

        assert_eq!(e.doc.name(), Some(name));
        assert_eq!(e.message, format!("Successfully written to {name}"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "content\n");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn save_as_empty_name_reports() {
        let mut e = editor_with(&["x"]);
        let mut prompt = QueuedPrompt::with(Some(""));
        command_with(&mut e, "w", &mut prompt);
        assert_eq!(e.message, "Empty filename!");
        assert_eq!(e.doc.name(), None);
    }

    #[test]
    fn save_as_reserved_name_rejected() {
        let mut e = editor_with(&["x"]);
        let mut prompt = QueuedPrompt::with(Some("CON.txt"));
        command_with(&mut e, "w", &mut prompt);
        assert_eq!(e.message, "Invalid filename!");
        assert_eq!(e.doc.name(), None);
    }

    #[test]
    fn save_as_abandoned_changes_nothing() {
        let mut e = editor_with(&["x"]);
        let mut prompt = QueuedPrompt::with(None);
        command_with(&mut e, "w", &mut prompt);
        assert_eq!(e.doc.name(), None);
        // The prompt label is left on the message line.
        assert_eq!(e.message, PROMPT_LABEL);
    }

    // ── Commands: repeat and unknown ─────────────────────────────────

    #[test]
    fn unknown_command_reports_and_aborts_rest() {
        let mut e = editor_with(&["a", "b", "c"]);
        command(&mut e, "zd");
        assert_eq!(e.message, "Unknown command: z");
        // The d after the unknown z never ran.
        assert_eq!(e.doc.line_count(), 3);
    }

    #[test]
    fn dot_repeats_last_command() {
        let mut e = editor_with(&["a", "b", "c"]);
        command(&mut e, "d");
        command(&mut e, ".");
        assert_eq!(e.doc.line_count(), 1);
    }

    #[test]
    fn dot_with_no_history_does_nothing() {
        let mut e = editor_with(&["a", "b"]);
        command(&mut e, ".");
        assert_eq!(e.doc.line_count(), 2);
        assert_eq!(e.message, "");
    }

    #[test]
    fn self_referential_dot_terminates() {
        let mut e = editor_with(&["a", "b"]);
        command(&mut e, ".");
        // last_cmd is now ".", so this recurses until the depth cap.
        command(&mut e, ".");
        assert_eq!(e.doc.line_count(), 2);
    }

    #[test]
    fn failed_command_still_stored_for_repeat() {
        let mut e = editor_with(&[""]);
        type_str(&mut e, "x");
        command(&mut e, "q");
        assert!(e.running);
        e.message.clear();
        command(&mut e, ".");
        assert_eq!(e.message, "No write since last change (use Q to override)!");
        assert!(e.running);
    }

    // ── Viewport coupling ────────────────────────────────────────────

    #[test]
    fn typing_past_right_edge_scrolls() {
        let mut e = editor_with(&[""]);
        e.view.resize(10, 12);
        type_str(&mut e, "abcdefghijklmno");
        assert!(e.view.origin_x > 0);
        let (cx, cy) = e.view.screen_cursor(&e.doc, e.cursor);
        assert!(usize::from(cx) < e.view.width);
        assert_eq!(cy, 0);
    }

    #[test]
    fn entering_lines_past_bottom_scrolls() {
        let mut e = editor_with(&[""]);
        e.view.resize(40, 12);
        for _ in 0..20 {
            feed(&mut e, &[Key::Enter]);
        }
        assert!(e.view.origin_y > 0);
        assert!(e.cursor.y < e.view.origin_y + e.view.height);
        assert!(e.cursor.y >= e.view.origin_y);
    }

    // ── Terminal size limits ─────────────────────────────────────────

    #[test]
    fn minimum_usable_size_accepted() {
        assert!(size_usable(Size { cols: 40, rows: 14 }));
        assert!(size_usable(Size { cols: 80, rows: 24 }));
    }

    #[test]
    fn undersized_terminal_rejected() {
        assert!(!size_usable(Size { cols: 39, rows: 14 }));
        assert!(!size_usable(Size { cols: 40, rows: 13 }));
        assert!(!size_usable(Size { cols: 40, rows: 1 }));
    }
}
