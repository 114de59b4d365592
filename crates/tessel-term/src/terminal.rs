// SPDX-License-Identifier: MIT
//
// Terminal — the single object an application talks to.
//
// Owns the tty channel and the frame buffer, and wires both into the
// main loop: tty readability drives the input decoder and the app's
// event handler, SIGWINCH drives a reset plus the app's draw handler.
//
// The application side is deliberately flat: implement `App` with a draw
// method and an event method, hand it to `attach`, and paint through the
// painter methods below. The terminal never needs to know the concrete
// application type, and the application holds the terminal only through
// the shared handle `attach` returns.
//
// Construction puts the terminal into alternate screen / keypad / hidden
// cursor state; dropping the Terminal emits the reverse sequences and
// then the tty channel restores the original termios. Killing the
// process with an uncaught signal skips this restoration — accepted.

use std::cell::RefCell;
use std::rc::Rc;

use tessel_loop::{MainLoop, Result, EVENT_IN};

use crate::buffer::{Alignment, FrameBuffer};
use crate::cell::{Effect, RenderCtx};
use crate::color::Color;
use crate::event::Event;
use crate::output::{control, render_frame};
use crate::tty::TtyChannel;

// ─── App ─────────────────────────────────────────────────────────────────────

/// The two operations an application exposes to the terminal.
pub trait App {
    /// Repaint everything. Called once at attach time and after every
    /// terminal resize; paint into `term` and finish with
    /// [`Terminal::publish`].
    fn on_draw(&mut self, term: &mut Terminal) -> Result<()>;

    /// Handle one input event.
    fn on_event(&mut self, term: &mut Terminal, event: Event) -> Result<()>;
}

// ─── Terminal ────────────────────────────────────────────────────────────────

/// Full-screen terminal with an off-screen cell grid.
///
/// Only one instance may be active at a time: the constructor puts the
/// controlling terminal into raw mode.
pub struct Terminal {
    tty: TtyChannel,
    frame: FrameBuffer,
}

impl Terminal {
    /// Take over the controlling terminal: raw mode, alternate screen,
    /// keypad application mode, hidden cursor, cleared grid.
    pub fn new() -> Result<Self> {
        let tty = TtyChannel::new()?;
        let frame = FrameBuffer::new(tty.width(), tty.height());
        let mut term = Self { tty, frame };

        let tx = term.tty.tx();
        tx.push_bytes(control::ENTER_ALT_SCREEN);
        tx.push_bytes(control::KEYPAD_APP);
        tx.push_bytes(control::CURSOR_HIDE);
        tx.push_bytes(control::CLEAR);
        term.reset()?;
        term.publish()?;
        Ok(term)
    }

    /// Register with the loop and hand events to `app`.
    ///
    /// Readable tty → decoded events → `app.on_event`, one call per
    /// event. SIGWINCH → grid reset → `app.on_draw`. The caller must
    /// include `SIGWINCH` in [`MainLoop::set_signals`] for resize
    /// delivery to work. Runs one initial `on_draw` before returning.
    pub fn attach(
        self,
        main_loop: &mut MainLoop,
        app: Rc<RefCell<dyn App>>,
    ) -> Result<Rc<RefCell<Self>>> {
        let term = Rc::new(RefCell::new(self));
        let tty_fd = term.borrow().tty.raw_fd();

        {
            let term = Rc::clone(&term);
            let app = Rc::clone(&app);
            main_loop.add(
                tty_fd,
                EVENT_IN,
                Box::new(move |_, _, _| {
                    let mut pending = Vec::new();
                    term.borrow_mut().drain_events(&mut pending)?;
                    for event in pending {
                        app.borrow_mut().on_event(&mut term.borrow_mut(), event)?;
                    }
                    Ok(())
                }),
            )?;
        }

        {
            let term = Rc::clone(&term);
            let app = Rc::clone(&app);
            main_loop.register_signal_handler(
                libc::SIGWINCH,
                Box::new(move |_| {
                    term.borrow_mut().reset()?;
                    app.borrow_mut().on_draw(&mut term.borrow_mut())
                }),
            );
        }

        app.borrow_mut().on_draw(&mut term.borrow_mut())?;
        Ok(term)
    }

    // ── Size ─────────────────────────────────────────────────────────

    /// Current terminal width (columns).
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.tty.width()
    }

    /// Current terminal height (rows).
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.tty.height()
    }

    // ── Frame lifecycle ──────────────────────────────────────────────

    /// Re-query the terminal size and reset the grid to blanks in the
    /// default colors. Does not publish.
    pub fn reset(&mut self) -> Result<()> {
        let (width, height) = self.tty.refresh_size()?;
        self.frame.reset(width, height);
        Ok(())
    }

    /// Emit the grid to the screen. A no-op unless something was painted
    /// since the last publish.
    pub fn publish(&mut self) -> Result<()> {
        if !self.frame.take_dirty() {
            return Ok(());
        }
        render_frame(&self.frame, self.tty.tx());
        self.tty.tx_flush()
    }

    /// Set the default colors; takes effect on the next [`reset`](Self::reset).
    pub fn set_default_colors(&mut self, fg: Color, bg: Color) {
        self.frame.set_default_colors(fg, bg);
    }

    /// The underlying grid, for painters not mirrored here and for
    /// inspection in tests.
    #[inline]
    pub fn frame(&mut self) -> &mut FrameBuffer {
        &mut self.frame
    }

    // ── Painters (delegated to the frame buffer) ─────────────────────

    pub fn add_glyph(&mut self, y: i32, x: i32, glyph: char, fg: Color, bg: Color, effect: Effect) {
        self.frame.add_glyph(y, x, glyph, fg, bg, effect);
    }

    pub fn add_glyph_ctx(&mut self, y: i32, x: i32, glyph: char, ctx: &RenderCtx) {
        self.frame.add_glyph_ctx(y, x, glyph, ctx);
    }

    pub fn add_string(&mut self, y: i32, x: i32, text: &str, fg: Color, bg: Color, effect: Effect) {
        self.frame.add_string(y, x, text, fg, bg, effect);
    }

    pub fn add_string_ctx(&mut self, y: i32, x: i32, text: &str, ctx: &RenderCtx) {
        self.frame.add_string_ctx(y, x, text, ctx);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_string_n(
        &mut self,
        y: i32,
        x: i32,
        text: &str,
        width: usize,
        alignment: Alignment,
        fg: Color,
        bg: Color,
        effect: Effect,
    ) {
        self.frame
            .add_string_n(y, x, text, width, alignment, fg, bg, effect);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_string_n_ctx(
        &mut self,
        y: i32,
        x: i32,
        text: &str,
        width: usize,
        alignment: Alignment,
        ctx: &RenderCtx,
    ) {
        self.frame.add_string_n_ctx(y, x, text, width, alignment, ctx);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_strings_n(
        &mut self,
        y: i32,
        x: i32,
        left: &str,
        middle: &str,
        right: &str,
        width: usize,
        fg: Color,
        bg: Color,
        effect: Effect,
    ) {
        self.frame
            .add_strings_n(y, x, left, middle, right, width, fg, bg, effect);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_strings_n_ctx(
        &mut self,
        y: i32,
        x: i32,
        left: &str,
        middle: &str,
        right: &str,
        width: usize,
        ctx: &RenderCtx,
    ) {
        self.frame
            .add_strings_n_ctx(y, x, left, middle, right, width, ctx);
    }

    pub fn add_formatted_string(&mut self, y: i32, x: i32, formatted: &[u32], width: usize) {
        self.frame.add_formatted_string(y, x, formatted, width);
    }

    pub fn add_markdown(&mut self, y: i32, x: i32, text: &str, width: usize) {
        self.frame.add_markdown(y, x, text, width);
    }

    pub fn set_colors(&mut self, y: i32, x: i32, width: usize, fg: Color, bg: Color) {
        self.frame.set_colors(y, x, width, fg, bg);
    }

    // ── Input ────────────────────────────────────────────────────────

    /// Drain everything the tty has: fill the read buffer, decode events
    /// into `events`, repeat until neither new bytes nor new events
    /// appear. Never blocks.
    pub fn drain_events(&mut self, events: &mut Vec<Event>) -> Result<()> {
        loop {
            let added = self.tty.rx_fill()?;
            let mut decoded = false;
            while let Some(event) = self.tty.next_event() {
                events.push(event);
                decoded = true;
            }
            if added == 0 && !decoded {
                return Ok(());
            }
        }
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        // Reverse of construction; then TtyChannel's own drop restores
        // the saved termios.
        let tx = self.tty.tx();
        tx.push_bytes(control::CLEAR);
        tx.push_bytes(control::CURSOR_SHOW);
        tx.push_bytes(control::KEYPAD_OFF);
        tx.push_bytes(control::EXIT_ALT_SCREEN);
        let _ = self.tty.tx_flush();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // Terminal construction needs a real controlling terminal; these
    // return early where the test runner has none.

    #[test]
    fn construct_paint_publish_teardown() {
        let Ok(mut term) = Terminal::new() else {
            return;
        };
        assert!(term.width() > 0);
        assert!(term.height() > 0);
        term.add_string(
            0,
            0,
            "test",
            Color::DEFAULT_FG,
            Color::DEFAULT_BG,
            Effect::empty(),
        );
        term.publish().unwrap();
        // Publishing again with no changes writes nothing.
        term.publish().unwrap();
        drop(term); // restore sequences + termios
    }

    #[test]
    fn reset_tracks_tty_size() {
        let Ok(mut term) = Terminal::new() else {
            return;
        };
        term.reset().unwrap();
        let cells = term.width() * term.height();
        assert_eq!(term.frame().cells().len(), cells);
    }

    #[test]
    fn drain_events_on_idle_tty_returns_nothing() {
        let Ok(mut term) = Terminal::new() else {
            return;
        };
        let mut events = Vec::new();
        term.drain_events(&mut events).unwrap();
        assert!(events.is_empty());
    }
}
