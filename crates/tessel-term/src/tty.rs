// SPDX-License-Identifier: MIT
//
// TtyChannel — the controlling terminal, owned raw.
//
// Opens /dev/tty read/write, saves the termios state and applies a raw
// profile: no canonical mode, no echo, no signal generation, 8-bit clean,
// and VMIN=0 VTIME=0 so reads never block. Dropping the channel restores
// the saved termios.
//
// Only one holder may put the tty in raw mode; in practice the channel is
// a process singleton owned by the Terminal.
//
// Safety: this module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr, cfmakeraw), ioctl(TIOCGWINSZ) and raw fd reads/writes. These
// are the standard POSIX interfaces for terminal control — there is no
// safe alternative. Each unsafe block is minimal and checked.
#![allow(unsafe_code)]

use std::mem;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};

use tessel_loop::{Error, Result};

use crate::input::InputBuffer;
use crate::output::TxBuffer;

/// Buffered, raw-mode handle on the controlling terminal.
pub struct TtyChannel {
    fd: OwnedFd,
    original_termios: libc::termios,
    width: usize,
    height: usize,
    rx: InputBuffer,
    tx: TxBuffer,
}

impl TtyChannel {
    /// Open `/dev/tty`, enter raw mode and record the window size.
    pub fn new() -> Result<Self> {
        let raw = unsafe {
            libc::open(
                b"/dev/tty\0".as_ptr().cast(),
                libc::O_RDWR | libc::O_CLOEXEC,
            )
        };
        if raw < 0 {
            return Err(Error::sys("open /dev/tty"));
        }
        let fd = unsafe { OwnedFd::from_raw_fd(raw) };

        let mut original_termios: libc::termios = unsafe { mem::zeroed() };
        if unsafe { libc::tcgetattr(raw, &mut original_termios) } < 0 {
            return Err(Error::sys("tcgetattr"));
        }

        let mut raw_termios = original_termios;
        unsafe { libc::cfmakeraw(&mut raw_termios) };
        // Non-blocking reads: a read returns whatever is pending, or
        // nothing at all.
        raw_termios.c_cc[libc::VMIN] = 0;
        raw_termios.c_cc[libc::VTIME] = 0;
        if unsafe { libc::tcsetattr(raw, libc::TCSAFLUSH, &raw_termios) } < 0 {
            return Err(Error::sys("tcsetattr"));
        }

        let (width, height) = query_size(raw)?;

        Ok(Self {
            fd,
            original_termios,
            width,
            height,
            rx: InputBuffer::new(),
            tx: TxBuffer::new(),
        })
    }

    /// Last queried terminal width in columns.
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Last queried terminal height in rows.
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The underlying descriptor, for poll registration.
    #[inline]
    #[must_use]
    pub fn raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }

    /// Re-query the window size. Call after SIGWINCH.
    pub fn refresh_size(&mut self) -> Result<(usize, usize)> {
        let (width, height) = query_size(self.fd.as_raw_fd())?;
        self.width = width;
        self.height = height;
        Ok((width, height))
    }

    // ── Receive side ─────────────────────────────────────────────────

    /// Non-blocking read appending into the input buffer; returns how
    /// many bytes arrived. Interrupted and would-block reads count as
    /// zero.
    pub fn rx_fill(&mut self) -> Result<usize> {
        let spare = self.rx.spare_mut();
        if spare.is_empty() {
            return Ok(0);
        }
        let n = unsafe {
            libc::read(
                self.fd.as_raw_fd(),
                spare.as_mut_ptr().cast(),
                spare.len(),
            )
        };
        if n < 0 {
            let errno = std::io::Error::last_os_error().raw_os_error();
            if errno == Some(libc::EINTR) || errno == Some(libc::EAGAIN) {
                return Ok(0);
            }
            return Err(Error::sys("tty read"));
        }
        #[allow(clippy::cast_sign_loss)]
        let n = n as usize;
        self.rx.advance(n);
        Ok(n)
    }

    /// Decode one event from the buffered input, if a complete one is
    /// available.
    pub fn next_event(&mut self) -> Option<crate::event::Event> {
        self.rx.next_event()
    }

    /// Drop the first `n` bytes of buffered input.
    pub fn rx_consume(&mut self, n: usize) {
        self.rx.consume(n);
    }

    /// The receive buffer, for inspection.
    #[must_use]
    pub fn rx(&self) -> &InputBuffer {
        &self.rx
    }

    // ── Transmit side ────────────────────────────────────────────────

    /// The write buffer; everything pushed here reaches the terminal on
    /// the next [`tx_flush`](Self::tx_flush).
    #[inline]
    pub fn tx(&mut self) -> &mut TxBuffer {
        &mut self.tx
    }

    /// Write the whole tx buffer to the terminal, then clear it.
    ///
    /// Interrupted and would-block writes are retried until everything is
    /// out; only unrecoverable write errors surface.
    pub fn tx_flush(&mut self) -> Result<()> {
        let bytes = self.tx.as_bytes();
        let mut sent = 0;
        while sent < bytes.len() {
            let n = unsafe {
                libc::write(
                    self.fd.as_raw_fd(),
                    bytes[sent..].as_ptr().cast(),
                    bytes.len() - sent,
                )
            };
            if n < 0 {
                let errno = std::io::Error::last_os_error().raw_os_error();
                if errno == Some(libc::EINTR) || errno == Some(libc::EAGAIN) {
                    continue;
                }
                return Err(Error::sys("tty write"));
            }
            #[allow(clippy::cast_sign_loss)]
            {
                sent += n as usize;
            }
        }
        self.tx.clear();
        Ok(())
    }
}

impl Drop for TtyChannel {
    fn drop(&mut self) {
        // Best effort: nothing sane to do about a failing restore.
        unsafe {
            let _ = libc::tcsetattr(
                self.fd.as_raw_fd(),
                libc::TCSAFLUSH,
                &self.original_termios,
            );
        }
    }
}

/// Window size via `ioctl(TIOCGWINSZ)`.
fn query_size(fd: RawFd) -> Result<(usize, usize)> {
    let mut size: libc::winsize = unsafe { mem::zeroed() };
    if unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size) } < 0 {
        return Err(Error::sys("ioctl(TIOCGWINSZ)"));
    }
    Ok((usize::from(size.ws_col), usize::from(size.ws_row)))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
