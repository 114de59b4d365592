// SPDX-License-Identifier: MIT
//
// MainLoop — the loop an application actually runs.
//
// Wraps the poll registry with the two descriptors every cooperative
// application needs:
//
//   wakeup eventfd  → any thread bumps the counter to break the wait;
//                     this is how `request_termination` interrupts a loop
//                     blocked forever in epoll_wait
//   signalfd        → the configured signals are blocked at the thread
//                     level and delivered as readable records, so per-signal
//                     callbacks run on the loop thread with no global state
//                     and no async-signal-safety constraints
//
// A signal with no registered callback terminates the loop with the signal
// number as exit status. An EPOLLERR on either internal descriptor aborts
// the process: the loop's invariants are gone and nothing can be restored.

use std::cell::RefCell;
use std::collections::HashMap;
use std::os::fd::{AsRawFd, OwnedFd, RawFd};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::fd;
use crate::poll::{Poll, PollCallback, EVENT_ERR, EVENT_IN};

/// Callback invoked on the loop thread when a registered signal arrives.
pub type SignalCallback = Box<dyn FnMut(i32) -> Result<()>>;

/// How many ready descriptors one wait processes at most.
const MAX_BATCH: usize = 8;

// ─── Shutdown state ──────────────────────────────────────────────────────────

/// Cross-thread termination state: the exit flag, the captured status and
/// the wakeup descriptor. Shared between the loop and every `Terminator`.
struct Shutdown {
    requested: AtomicBool,
    status: AtomicI32,
    wake: OwnedFd,
}

impl Shutdown {
    /// Set the exit flag (first caller's status wins) and wake the loop.
    fn request(&self, status: i32) {
        if !self.requested.swap(true, Ordering::SeqCst) {
            self.status.store(status, Ordering::SeqCst);
        }
        fd::eventfd_write(self.wake.as_raw_fd(), 1);
    }
}

/// Handle for requesting loop termination from any thread.
///
/// Cloneable and cheap; the underlying operation is an atomic test-and-set
/// plus one eventfd write, both safe from arbitrary threads.
#[derive(Clone)]
pub struct Terminator {
    shutdown: Arc<Shutdown>,
}

impl Terminator {
    /// Ask the loop to return from [`MainLoop::run_forever`] with `status`.
    ///
    /// The first status requested wins; later calls only re-wake the loop.
    pub fn request_termination(&self, status: i32) {
        self.shutdown.request(status);
    }
}

// ─── MainLoop ────────────────────────────────────────────────────────────────

/// The application main loop: poll registry + signal bridge + wakeup.
pub struct MainLoop {
    poll: Poll,
    shutdown: Arc<Shutdown>,
    signal_fd: Option<OwnedFd>,
    signal_callbacks: Rc<RefCell<HashMap<i32, Rc<RefCell<SignalCallback>>>>>,
}

impl MainLoop {
    /// Create the loop and register its wakeup descriptor.
    pub fn new() -> Result<Self> {
        let shutdown = Arc::new(Shutdown {
            requested: AtomicBool::new(false),
            status: AtomicI32::new(0),
            wake: fd::eventfd()?,
        });

        let mut poll = Poll::new()?;
        poll.add(
            shutdown.wake.as_raw_fd(),
            EVENT_IN,
            Box::new(move |_, fd, events| {
                if events & EVENT_ERR != 0 {
                    std::process::abort();
                }
                // The counter value is irrelevant; the wake already happened.
                fd::eventfd_drain(fd)
            }),
        )?;

        Ok(Self {
            poll,
            shutdown,
            signal_fd: None,
            signal_callbacks: Rc::new(RefCell::new(HashMap::new())),
        })
    }

    // ── Poll registry forwarding ─────────────────────────────────────

    /// Register `fd` with the loop. See [`Poll::add`].
    pub fn add(&mut self, fd: RawFd, events: u32, callback: PollCallback) -> Result<()> {
        self.poll.add(fd, events, callback)
    }

    /// Deregister `fd`. See [`Poll::remove`].
    pub fn remove(&mut self, fd: RawFd) -> Result<()> {
        self.poll.remove(fd)
    }

    /// One blocking wait plus dispatch round. See [`Poll::wait_and_dispatch`].
    pub fn wait_and_dispatch(&mut self, timeout_ms: i32, max_events: usize) -> Result<()> {
        self.poll.wait_and_dispatch(timeout_ms, max_events)
    }

    // ── Signals ──────────────────────────────────────────────────────

    /// Route the given signals through the loop. Call once.
    ///
    /// The signals are blocked for the calling thread and delivered through
    /// a signalfd. When one arrives, the matching callback registered via
    /// [`register_signal_handler`](Self::register_signal_handler) runs on
    /// the loop thread; a signal with no callback requests termination with
    /// the signal number as exit status.
    pub fn set_signals(&mut self, signals: &[i32]) -> Result<()> {
        if self.signal_fd.is_some() {
            return Err(Error::Invariant(
                "main loop: signals already configured".into(),
            ));
        }

        let mut set = fd::SignalSet::new()?;
        for &signo in signals {
            set.add(signo)?;
        }
        let signal_fd = fd::signal_fd(&set)?;

        let callbacks = Rc::clone(&self.signal_callbacks);
        let shutdown = Arc::clone(&self.shutdown);
        self.poll.add(
            signal_fd.as_raw_fd(),
            EVENT_IN,
            Box::new(move |_, fd, events| {
                if events & EVENT_ERR != 0 {
                    std::process::abort();
                }
                let Some(info) = fd::read_siginfo(fd)? else {
                    return Ok(());
                };
                let signo = info.ssi_signo as i32;
                if shutdown.requested.load(Ordering::SeqCst) {
                    // Already shutting down: no further user callbacks.
                    return Ok(());
                }
                let callback = callbacks.borrow().get(&signo).map(Rc::clone);
                match callback {
                    Some(cb) => (cb.borrow_mut())(signo),
                    None => {
                        shutdown.request(signo);
                        Ok(())
                    }
                }
            }),
        )?;

        self.signal_fd = Some(signal_fd);
        Ok(())
    }

    /// Install (or replace) the callback for one signal.
    pub fn register_signal_handler(&mut self, signo: i32, callback: SignalCallback) {
        self.signal_callbacks
            .borrow_mut()
            .insert(signo, Rc::new(RefCell::new(callback)));
    }

    // ── Termination ──────────────────────────────────────────────────

    /// A cloneable handle for terminating the loop from any thread.
    #[must_use]
    pub fn terminator(&self) -> Terminator {
        Terminator {
            shutdown: Arc::clone(&self.shutdown),
        }
    }

    /// Request termination from the loop thread itself.
    pub fn request_termination(&self, status: i32) {
        self.shutdown.request(status);
    }

    /// Whether termination has been requested.
    #[must_use]
    pub fn exit_requested(&self) -> bool {
        self.shutdown.requested.load(Ordering::SeqCst)
    }

    /// Run until termination is requested; returns the captured status.
    ///
    /// The flag is checked before every wait, so after a termination
    /// request no further round of user callbacks begins.
    pub fn run_forever(&mut self) -> Result<i32> {
        loop {
            if self.exit_requested() {
                return Ok(self.shutdown.status.load(Ordering::SeqCst));
            }
            self.poll.wait_and_dispatch(-1, MAX_BATCH)?;
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
