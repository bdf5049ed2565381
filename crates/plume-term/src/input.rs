// SPDX-License-Identifier: MIT
//
// Terminal input — raw stdin bytes to structured key events.
//
// Two layers:
//
// - [`Parser`] is pure: feed it bytes, get key events back. It handles
//   legacy CSI sequences (arrows, editing keys), SS3 sequences (Home/End
//   from some terminals), Alt+key (ESC followed by a printable), and
//   UTF-8 multi-byte characters. Escape sequences can span multiple
//   `read()` calls, so the parser buffers incomplete sequences.
//
// - [`KeyReader`] is the blocking front end. The editor's event loop has
//   exactly one blocking point — "wait for the next key" — and this is
//   it. A lone ESC byte is ambiguous (Escape key or start of a sequence);
//   the reader resolves it by polling stdin briefly and flushing the
//   pending ESC as a real Escape keypress when nothing follows.
//
// Number parsing is done directly on `&[u8]` — no intermediate `String`
// allocation for CSI parameter decoding.
#![allow(unsafe_code)]

use std::io;

use bitflags::bitflags;

// ─── Event Types ────────────────────────────────────────────────────────────

/// Identity of a key.
///
/// Named keys have dedicated variants; printable characters use
/// [`Char`](Key::Char).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A Unicode character (printable).
    Char(char),
    // ── Named keys ──────────────────────────────────────────────
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

bitflags! {
    /// Keyboard modifier flags.
    ///
    /// Matches the xterm CSI modifier encoding (`param = 1 + bitmask`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
    }
}

/// A keyboard event: key identity plus active modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Which key was pressed.
    pub key: Key,
    /// Active modifier keys.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// An unmodified keypress.
    #[inline]
    #[must_use]
    pub const fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::empty(),
        }
    }

    /// True when no modifiers are held.
    #[inline]
    #[must_use]
    pub const fn is_plain(self) -> bool {
        self.modifiers.is_empty()
    }
}

/// Shorthand: unmodified keypress.
const fn press(key: Key) -> KeyEvent {
    KeyEvent::plain(key)
}

/// Shorthand: Ctrl+character keypress.
const fn ctrl(ch: char) -> KeyEvent {
    KeyEvent {
        key: Key::Char(ch),
        modifiers: Modifiers::CTRL,
    }
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Terminal input parser.
///
/// Feed raw bytes via [`advance`](Parser::advance) and collect structured
/// [`KeyEvent`]s. The parser buffers incomplete sequences internally and
/// resumes parsing when more bytes arrive.
///
/// # Escape vs escape-sequence ambiguity
///
/// A bare `ESC` byte (0x1B) could be either a standalone Escape keypress
/// or the start of a multi-byte escape sequence. The parser keeps it
/// pending. The caller should wait a short timeout and then call
/// [`flush`](Parser::flush) to emit the pending ESC as a real Escape key.
pub struct Parser {
    /// Accumulated raw bytes waiting to be parsed.
    buf: Vec<u8>,
}

impl Parser {
    /// Create a new parser with an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(64),
        }
    }

    /// Feed raw bytes from stdin and return all events that can be parsed.
    ///
    /// Bytes that form an incomplete sequence are kept in the internal
    /// buffer and will be combined with future `advance` calls.
    pub fn advance(&mut self, data: &[u8]) -> Vec<KeyEvent> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match try_parse(&self.buf[pos..]) {
                Parsed::Event(event, consumed) => {
                    events.push(event);
                    pos += consumed;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(n) => pos += n,
            }
        }

        // Compact: remove consumed bytes, keep unconsumed remainder.
        if pos > 0 {
            self.buf.drain(..pos);
        }

        events
    }

    /// Are there unconsumed bytes that might complete with more data?
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Flush pending bytes as literal key events.
    ///
    /// Called after a timeout to resolve the ESC ambiguity: a lone ESC
    /// byte becomes an Escape key event, and any other leftover bytes
    /// become their literal events.
    pub fn flush(&mut self) -> Vec<KeyEvent> {
        let mut events = Vec::new();
        for &byte in &self.buf {
            let event = match byte {
                0x1B => press(Key::Escape),
                0x09 => press(Key::Tab),
                0x0A | 0x0D => press(Key::Enter),
                0x08 | 0x7F => press(Key::Backspace),
                b @ 0x01..=0x1A => ctrl((b + b'a' - 1) as char),
                b @ 0x20..=0x7E => press(Key::Char(b as char)),
                _ => continue,
            };
            events.push(event);
        }
        self.buf.clear();
        events
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Stateless Parsing Functions ────────────────────────────────────────────
//
// All parse functions are pure — they read from the head of a byte slice
// and return what they found plus how many bytes to consume.

/// Result of trying to parse one event from the buffer.
enum Parsed {
    /// Successfully parsed an event, consuming `usize` bytes.
    Event(KeyEvent, usize),
    /// Sequence is incomplete — need more bytes.
    Incomplete,
    /// Unrecognized byte(s), skip `usize` bytes.
    Skip(usize),
}

/// Try to parse a single event from the head of `buf`.
fn try_parse(buf: &[u8]) -> Parsed {
    let Some(&first) = buf.first() else {
        return Parsed::Skip(0);
    };

    match first {
        // ESC — could be escape sequence or standalone Escape key.
        0x1B => parse_escape(buf),
        // Named control characters.
        0x08 | 0x7F => Parsed::Event(press(Key::Backspace), 1),
        0x09 => Parsed::Event(press(Key::Tab), 1),
        0x0A | 0x0D => Parsed::Event(press(Key::Enter), 1),
        // Remaining control characters: Ctrl+letter.
        b @ 0x01..=0x1A => Parsed::Event(ctrl((b + b'a' - 1) as char), 1),
        // ASCII printable.
        b @ 0x20..=0x7E => Parsed::Event(press(Key::Char(b as char)), 1),
        // UTF-8 multi-byte.
        0xC0..=0xFF => parse_utf8(buf),
        // NUL and bare continuation bytes — skip.
        _ => Parsed::Skip(1),
    }
}

// ── Escape sequences ────────────────────────────────────────────────────────

fn parse_escape(buf: &[u8]) -> Parsed {
    debug_assert_eq!(buf[0], 0x1B);

    if buf.len() < 2 {
        return Parsed::Incomplete;
    }

    match buf[1] {
        // CSI: ESC [
        b'[' => parse_csi(buf),
        // SS3: ESC O
        b'O' => parse_ss3(buf),
        // Alt+ESC.
        0x1B => Parsed::Event(
            KeyEvent {
                key: Key::Escape,
                modifiers: Modifiers::ALT,
            },
            2,
        ),
        // Alt+printable character.
        b @ 0x20..=0x7E => Parsed::Event(
            KeyEvent {
                key: Key::Char(b as char),
                modifiers: Modifiers::ALT,
            },
            2,
        ),
        // ESC + anything else: emit Escape, reprocess the next byte alone.
        _ => Parsed::Event(press(Key::Escape), 1),
    }
}

/// Parse a CSI sequence: `ESC [ params final`.
///
/// Params are decimal numbers separated by `;`. The final byte is in
/// `0x40..=0x7E`. Handles the plain forms (`ESC [ A`), the modifier forms
/// (`ESC [ 1 ; 5 C` = Ctrl+Right), and the tilde forms (`ESC [ 3 ~` =
/// Delete, with an optional modifier param).
fn parse_csi(buf: &[u8]) -> Parsed {
    debug_assert!(buf.len() >= 2 && buf[0] == 0x1B && buf[1] == b'[');

    // Find the final byte.
    let mut end = 2;
    while end < buf.len() {
        let b = buf[end];
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        end += 1;
    }
    if end >= buf.len() {
        return Parsed::Incomplete;
    }

    let final_byte = buf[end];
    let consumed = end + 1;
    let params = parse_params(&buf[2..end]);

    // xterm encodes modifiers as `1 + bitmask` in the second parameter.
    let modifiers = params
        .get(1)
        .map_or(Modifiers::empty(), |&p| decode_modifiers(p));

    let key = match final_byte {
        b'A' => Key::Up,
        b'B' => Key::Down,
        b'C' => Key::Right,
        b'D' => Key::Left,
        b'H' => Key::Home,
        b'F' => Key::End,
        b'~' => match params.first().copied() {
            Some(1 | 7) => Key::Home,
            Some(3) => Key::Delete,
            Some(4 | 8) => Key::End,
            Some(5) => Key::PageUp,
            Some(6) => Key::PageDown,
            _ => return Parsed::Skip(consumed),
        },
        _ => return Parsed::Skip(consumed),
    };

    Parsed::Event(KeyEvent { key, modifiers }, consumed)
}

/// Parse an SS3 sequence: `ESC O final`. Some terminals send Home/End
/// and the arrow keys this way in application cursor mode.
fn parse_ss3(buf: &[u8]) -> Parsed {
    debug_assert!(buf.len() >= 2 && buf[0] == 0x1B && buf[1] == b'O');

    if buf.len() < 3 {
        return Parsed::Incomplete;
    }

    let key = match buf[2] {
        b'A' => Key::Up,
        b'B' => Key::Down,
        b'C' => Key::Right,
        b'D' => Key::Left,
        b'H' => Key::Home,
        b'F' => Key::End,
        _ => return Parsed::Skip(3),
    };

    Parsed::Event(press(key), 3)
}

/// Parse semicolon-separated decimal parameters from CSI bytes.
fn parse_params(bytes: &[u8]) -> Vec<u16> {
    let mut params = Vec::with_capacity(2);
    let mut current: u16 = 0;
    let mut seen_digit = false;

    for &b in bytes {
        match b {
            b'0'..=b'9' => {
                current = current
                    .saturating_mul(10)
                    .saturating_add(u16::from(b - b'0'));
                seen_digit = true;
            }
            b';' => {
                params.push(if seen_digit { current } else { 0 });
                current = 0;
                seen_digit = false;
            }
            // Private markers and intermediate bytes — ignore.
            _ => {}
        }
    }
    if seen_digit {
        params.push(current);
    }

    params
}

/// Decode an xterm modifier parameter (`1 + bitmask`).
fn decode_modifiers(param: u16) -> Modifiers {
    if param < 2 {
        return Modifiers::empty();
    }
    #[allow(clippy::cast_possible_truncation)]
    Modifiers::from_bits_truncate((param - 1) as u8)
}

// ── UTF-8 ───────────────────────────────────────────────────────────────────

/// Parse a UTF-8 multi-byte character.
///
/// The editor itself only inserts printable ASCII, but the parser must
/// still consume multi-byte input correctly so a stray `é` doesn't
/// desynchronize the byte stream.
fn parse_utf8(buf: &[u8]) -> Parsed {
    let len = match buf[0] {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => return Parsed::Skip(1),
    };

    if buf.len() < len {
        return Parsed::Incomplete;
    }

    match std::str::from_utf8(&buf[..len]) {
        Ok(s) => match s.chars().next() {
            Some(ch) => Parsed::Event(press(Key::Char(ch)), len),
            None => Parsed::Skip(len),
        },
        Err(_) => Parsed::Skip(1),
    }
}

// ─── KeyReader ──────────────────────────────────────────────────────────────

/// How long to wait after a lone ESC before treating it as the Escape key
/// (milliseconds). Real escape sequences arrive within a millisecond or
/// two; 25ms is imperceptible to the user.
const ESC_TIMEOUT_MS: i32 = 25;

/// Read buffer size. A keypress is 1-6 bytes; 512 covers a burst of
/// autorepeated keys in one syscall.
const READ_BUF_SIZE: usize = 512;

/// Blocking key reader — the editor's single blocking point.
///
/// Wraps a [`Parser`] around blocking reads of stdin. [`read_key`]
/// (Self::read_key) returns one key event at a time, resolving the
/// lone-ESC ambiguity with a short poll.
pub struct KeyReader {
    parser: Parser,
    /// Parsed events not yet handed out.
    queue: std::collections::VecDeque<KeyEvent>,
    /// Set when stdin reaches EOF.
    eof: bool,
}

impl KeyReader {
    /// Create a reader with an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
            queue: std::collections::VecDeque::new(),
            eof: false,
        }
    }

    /// Block until a key event is available and return it.
    ///
    /// Returns `Ok(None)` when stdin reaches end of file (the terminal
    /// went away) — callers should treat that as a quit.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from stdin fails.
    pub fn read_key(&mut self) -> io::Result<Option<KeyEvent>> {
        loop {
            if let Some(event) = self.queue.pop_front() {
                return Ok(Some(event));
            }
            if self.eof {
                return Ok(None);
            }

            // A pending partial sequence (usually a lone ESC): give the
            // terminal a moment to send the rest, then flush as literal.
            if self.parser.has_pending() && !poll_stdin(ESC_TIMEOUT_MS)? {
                self.queue.extend(self.parser.flush());
                continue;
            }

            let mut buf = [0u8; READ_BUF_SIZE];
            let n = read_stdin(&mut buf)?;
            if n == 0 {
                self.eof = true;
                self.queue.extend(self.parser.flush());
                continue;
            }
            self.queue.extend(self.parser.advance(&buf[..n]));
        }
    }
}

impl Default for KeyReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait up to `timeout_ms` for stdin to become readable.
#[cfg(unix)]
fn poll_stdin(timeout_ms: i32) -> io::Result<bool> {
    let mut pfd = libc::pollfd {
        fd: libc::STDIN_FILENO,
        events: libc::POLLIN,
        revents: 0,
    };
    let ready = unsafe { libc::poll(&raw mut pfd, 1, timeout_ms) };
    if ready < 0 {
        let err = io::Error::last_os_error();
        // Interrupted poll is not an error — just report "nothing yet".
        if err.kind() == io::ErrorKind::Interrupted {
            return Ok(false);
        }
        return Err(err);
    }
    Ok(ready > 0)
}

#[cfg(not(unix))]
fn poll_stdin(_timeout_ms: i32) -> io::Result<bool> {
    // No poll available — pretend data is coming so we fall through to
    // the blocking read.
    Ok(true)
}

/// One blocking read from stdin. Returns the number of bytes read
/// (0 on EOF).
#[cfg(unix)]
fn read_stdin(buf: &mut [u8]) -> io::Result<usize> {
    loop {
        let n = unsafe { libc::read(libc::STDIN_FILENO, buf.as_mut_ptr().cast(), buf.len()) };
        if n >= 0 {
            #[allow(clippy::cast_sign_loss)]
            return Ok(n as usize);
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

#[cfg(not(unix))]
fn read_stdin(buf: &mut [u8]) -> io::Result<usize> {
    use std::io::Read;
    io::stdin().lock().read(buf)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
