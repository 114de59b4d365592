// SPDX-License-Identifier: MIT
//
// One error type for the whole workspace.
//
// Two failure families exist here: a system call said no (carry which call
// and the errno text), or user code misused the loop (duplicate fd
// registration and friends). No finer categorisation — the caller either
// prints the message and exits, or had a bug.

use std::io;

use thiserror::Error;

/// Errors surfaced by the loop and the terminal layers built on top of it.
#[derive(Debug, Error)]
pub enum Error {
    /// A system call failed. `call` names the syscall (and, where useful,
    /// its target, e.g. `"open /dev/tty"`); `source` carries the errno.
    #[error("{call} error: {source}")]
    Sys {
        call: &'static str,
        source: io::Error,
    },

    /// The loop was driven into an invalid state from user code.
    #[error("{0}")]
    Invariant(String),
}

impl Error {
    /// Capture `errno` for a failed system call.
    #[must_use]
    pub fn sys(call: &'static str) -> Self {
        Self::Sys {
            call,
            source: io::Error::last_os_error(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

// ─── Tests ───────────────────────────────────────────────────────────────────
