// SPDX-License-Identifier: MIT
//
// plume-term — Terminal backend for plume.
//
// Direct terminal control via ANSI escape sequences and raw termios,
// with a row-granular differential renderer: each frame is a grid of
// plain characters, and only rows that changed since the last frame
// are rewritten. No TUI framework, no per-cell styling machinery —
// plume draws ASCII text plus one inverse-video status bar, and this
// crate provides exactly that.

pub mod ansi;
pub mod diff;
pub mod frame;
pub mod input;
pub mod terminal;
