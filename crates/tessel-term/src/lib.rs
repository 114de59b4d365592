// SPDX-License-Identifier: MIT
//
// tessel-term — cell-grid rendering for POSIX terminals.
//
// The crate owns the controlling terminal, keeps an off-screen grid of
// styled glyphs that the application paints into, and publishes that grid
// as a minimal stream of SGR/CUP control sequences. On the way in, raw
// terminal bytes (including fragmented multi-byte escape sequences) are
// decoded into a single stream of semantic events.
//
// This crate intentionally avoids external TUI frameworks in favor of
// direct terminal control via ANSI escape sequences and raw termios.
// Every byte sent to the terminal is accounted for; every escape
// sequence received is either recognised or surfaced as plain Escape.
//
// Event delivery plugs into tessel-loop: the terminal registers its tty
// descriptor for read readiness and a SIGWINCH handler for redraws, and
// the application provides a two-method `App` implementation.

pub mod buffer;
pub mod cell;
pub mod color;
pub mod escape;
pub mod event;
pub mod format;
pub mod input;
pub mod output;
pub mod terminal;
pub mod tty;
