// SPDX-License-Identifier: MIT
//
// tessel-loop — the event-loop core under the tessel terminal UI.
//
// A level-triggered epoll multiplexer for single-threaded cooperative
// applications. Three pieces compose into one blocking wait primitive:
//
//   poll      → dynamic fd registry with per-fd callbacks
//   signalfd  → POSIX signals delivered as readable fd data, so signal
//               handling runs on the loop thread, never in handler context
//   eventfd   → a wakeup counter any thread may poke to request shutdown
//
// Everything runs on the loop thread and must not block; the only
// cross-thread operation is `Terminator::request_termination`, which is an
// atomic test-and-set plus one eventfd write.
//
// Linux only: epoll, signalfd and eventfd have no portable equivalent,
// and emulating them would defeat the point of the design.

pub mod error;
pub mod fd;
pub mod main_loop;
pub mod poll;

pub use error::{Error, Result};
pub use main_loop::{MainLoop, SignalCallback, Terminator};
pub use poll::{Poll, PollCallback, EVENT_ERR, EVENT_IN, EVENT_OUT};
