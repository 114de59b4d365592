// SPDX-License-Identifier: MIT
//
// Descriptor plumbing — eventfd, signal masks, signalfd.
//
// Safety: this module necessarily uses `unsafe` for the raw system calls
// (eventfd, signalfd, pthread_sigmask, read, write). These are the standard
// Linux interfaces for loop wakeup and signal-as-fd delivery; there is no
// safe alternative. Each unsafe block is minimal and checked.
#![allow(unsafe_code)]

use std::mem;
use std::os::fd::{FromRawFd, OwnedFd, RawFd};

use crate::error::{Error, Result};

// ─── eventfd ─────────────────────────────────────────────────────────────────

/// Create a semaphore-style counter fd used purely as a cross-thread wakeup.
///
/// Non-blocking so a spurious poll wake never stalls the loop, close-on-exec
/// so child processes do not inherit loop internals.
pub fn eventfd() -> Result<OwnedFd> {
    let fd = unsafe { libc::eventfd(0, libc::EFD_CLOEXEC | libc::EFD_NONBLOCK) };
    if fd < 0 {
        return Err(Error::sys("eventfd"));
    }
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

/// Bump the eventfd counter, waking any poll blocked on it.
///
/// Failure is ignored: the only realistic error is counter overflow, and an
/// overflowed counter is still readable, so the wakeup has already happened.
pub fn eventfd_write(fd: RawFd, value: u64) {
    let bytes = value.to_ne_bytes();
    unsafe {
        let _ = libc::write(fd, bytes.as_ptr().cast(), bytes.len());
    }
}

/// Drain the eventfd counter. The value itself carries no meaning.
pub fn eventfd_drain(fd: RawFd) -> Result<()> {
    let mut bytes = [0_u8; 8];
    let n = unsafe { libc::read(fd, bytes.as_mut_ptr().cast(), bytes.len()) };
    if n < 0 {
        let errno = std::io::Error::last_os_error().raw_os_error();
        if errno == Some(libc::EINTR) || errno == Some(libc::EAGAIN) {
            return Ok(());
        }
        return Err(Error::sys("eventfd read"));
    }
    Ok(())
}

// ─── Signal mask ─────────────────────────────────────────────────────────────

/// A set of POSIX signal numbers, built up one signal at a time.
pub struct SignalSet {
    mask: libc::sigset_t,
}

impl SignalSet {
    /// An empty signal set.
    pub fn new() -> Result<Self> {
        let mut mask: libc::sigset_t = unsafe { mem::zeroed() };
        if unsafe { libc::sigemptyset(&mut mask) } < 0 {
            return Err(Error::sys("sigemptyset"));
        }
        Ok(Self { mask })
    }

    /// Add one signal to the set.
    pub fn add(&mut self, signo: i32) -> Result<()> {
        if unsafe { libc::sigaddset(&mut self.mask, signo) } < 0 {
            return Err(Error::sys("sigaddset"));
        }
        Ok(())
    }
}

// ─── signalfd ────────────────────────────────────────────────────────────────

/// Block the given signals for the calling thread and open a signalfd that
/// delivers them as readable data.
///
/// Blocking happens first: a signal arriving between the two calls stays
/// pending and is picked up by the fd.
pub fn signal_fd(set: &SignalSet) -> Result<OwnedFd> {
    // pthread_sigmask reports its error in the return value, not errno.
    let rc = unsafe { libc::pthread_sigmask(libc::SIG_BLOCK, &set.mask, std::ptr::null_mut()) };
    if rc != 0 {
        return Err(Error::Sys {
            call: "pthread_sigmask",
            source: std::io::Error::from_raw_os_error(rc),
        });
    }
    let fd = unsafe { libc::signalfd(-1, &set.mask, libc::SFD_NONBLOCK | libc::SFD_CLOEXEC) };
    if fd < 0 {
        return Err(Error::sys("signalfd"));
    }
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

/// Read one pending signal record from a signalfd.
///
/// Returns `Ok(None)` when the read would block or was interrupted. A short
/// read is an invariant break inside the kernel interface and aborts the
/// process.
pub fn read_siginfo(fd: RawFd) -> Result<Option<libc::signalfd_siginfo>> {
    let mut info: libc::signalfd_siginfo = unsafe { mem::zeroed() };
    let want = mem::size_of::<libc::signalfd_siginfo>();
    let n = unsafe { libc::read(fd, std::ptr::addr_of_mut!(info).cast(), want) };
    if n < 0 {
        let errno = std::io::Error::last_os_error().raw_os_error();
        if errno == Some(libc::EINTR) || errno == Some(libc::EAGAIN) {
            return Ok(None);
        }
        return Err(Error::sys("signalfd read"));
    }
    if n as usize != want {
        // A torn siginfo record cannot be resynchronised.
        std::process::abort();
    }
    Ok(Some(info))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
