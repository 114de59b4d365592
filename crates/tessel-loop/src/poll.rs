// SPDX-License-Identifier: MIT
//
// Poll — the epoll registry.
//
// A dynamic set of monitored file descriptors, each with a callback invoked
// when the kernel reports readiness. Level-triggered throughout: a callback
// that does not fully drain its fd simply runs again on the next wait.
//
// Callbacks receive `&mut Poll` so they can add or remove descriptors from
// inside a dispatch — including removing themselves. That is made safe by
// cloning the callback handle out of the registry before the call; the
// registry itself is never borrowed across user code.
//
// Safety: `unsafe` is confined to the epoll system calls themselves.
#![allow(unsafe_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::rc::Rc;

use crate::error::{Error, Result};

/// Readiness mask: data available to read.
pub const EVENT_IN: u32 = libc::EPOLLIN as u32;
/// Readiness mask: writable without blocking.
pub const EVENT_OUT: u32 = libc::EPOLLOUT as u32;
/// Readiness mask: error condition on the descriptor.
pub const EVENT_ERR: u32 = libc::EPOLLERR as u32;

/// Callback invoked for a ready descriptor: `(poll, fd, readiness mask)`.
pub type PollCallback = Box<dyn FnMut(&mut Poll, RawFd, u32) -> Result<()>>;

/// Level-triggered epoll wrapper with per-fd callbacks.
pub struct Poll {
    epoll: OwnedFd,
    monitored: HashMap<RawFd, Rc<RefCell<PollCallback>>>,
}

impl Poll {
    /// Create an empty registry backed by a fresh epoll instance.
    pub fn new() -> Result<Self> {
        let fd = unsafe { libc::epoll_create1(libc::EPOLL_CLOEXEC) };
        if fd < 0 {
            return Err(Error::sys("epoll_create1"));
        }
        Ok(Self {
            epoll: unsafe { OwnedFd::from_raw_fd(fd) },
            monitored: HashMap::new(),
        })
    }

    /// Number of descriptors currently monitored.
    #[must_use]
    pub fn monitored_count(&self) -> usize {
        self.monitored.len()
    }

    /// Register `fd` for the readiness events in `events`.
    ///
    /// Registering the same descriptor twice is an error. If the kernel
    /// rejects the registration, the internal entry is rolled back so the
    /// registry and the epoll set never disagree.
    pub fn add(&mut self, fd: RawFd, events: u32, callback: PollCallback) -> Result<()> {
        if fd < 0 {
            return Err(Error::Invariant("poll: trying to add invalid fd".into()));
        }
        if self.monitored.contains_key(&fd) {
            return Err(Error::Invariant(format!(
                "poll: conflict when adding fd #{fd}"
            )));
        }

        self.monitored
            .insert(fd, Rc::new(RefCell::new(callback)));

        let mut ev = libc::epoll_event {
            events,
            u64: fd as u64,
        };
        if unsafe { libc::epoll_ctl(self.epoll.as_raw_fd(), libc::EPOLL_CTL_ADD, fd, &mut ev) } < 0
        {
            self.monitored.remove(&fd);
            return Err(Error::sys("epoll_ctl(EPOLL_CTL_ADD)"));
        }
        Ok(())
    }

    /// Deregister `fd` and drop its callback.
    pub fn remove(&mut self, fd: RawFd) -> Result<()> {
        if fd < 0 {
            return Err(Error::Invariant("poll: trying to remove invalid fd".into()));
        }
        self.monitored.remove(&fd);
        if unsafe {
            libc::epoll_ctl(
                self.epoll.as_raw_fd(),
                libc::EPOLL_CTL_DEL,
                fd,
                std::ptr::null_mut(),
            )
        } < 0
        {
            return Err(Error::sys("epoll_ctl(EPOLL_CTL_DEL)"));
        }
        Ok(())
    }

    /// Block up to `timeout_ms` (−1 = forever) for at most `max_events`
    /// ready descriptors and invoke their callbacks.
    ///
    /// An interrupted wait (`EINTR`) is absorbed: zero events dispatched.
    /// A descriptor removed between the wait and its dispatch slot is
    /// silently skipped.
    pub fn wait_and_dispatch(&mut self, timeout_ms: i32, max_events: usize) -> Result<()> {
        let mut ready = vec![libc::epoll_event { events: 0, u64: 0 }; max_events.max(1)];

        let n = unsafe {
            libc::epoll_wait(
                self.epoll.as_raw_fd(),
                ready.as_mut_ptr(),
                ready.len() as i32,
                timeout_ms,
            )
        };
        if n < 0 {
            if std::io::Error::last_os_error().raw_os_error() == Some(libc::EINTR) {
                return Ok(());
            }
            return Err(Error::sys("epoll_wait"));
        }

        for ev in &ready[..n as usize] {
            let fd = ev.u64 as RawFd;
            let events = ev.events;
            let Some(callback) = self.monitored.get(&fd).map(Rc::clone) else {
                continue;
            };
            (callback.borrow_mut())(self, fd, events)?;
        }
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
