// SPDX-License-Identifier: MIT
//
// Output — byte accumulation and frame publishing.
//
// Two pieces keep terminal writes cheap:
//
//   TxBuffer     — accumulates all control bytes and glyphs in memory so a
//                  whole frame goes out in one write() burst.
//   GraphicState — tracks the SGR state the terminal is currently in and
//                  emits only the deltas. Runs of identically styled cells
//                  cost one escape sequence total.
//
// The publisher makes no attempt at cell-level diffing against the
// previous frame: every publish repaints the full grid, and callers must
// not rely on anything less.

use crate::buffer::FrameBuffer;
use crate::cell::Effect;
use crate::color::Color;

// ─── Control sequences ───────────────────────────────────────────────────────

/// The fixed control sequences the terminal must support.
pub mod control {
    /// Enter alternate screen, pushing the window title.
    pub const ENTER_ALT_SCREEN: &[u8] = b"\x1b[?1049h\x1b[22;0;0t";
    /// Leave alternate screen, popping the window title.
    pub const EXIT_ALT_SCREEN: &[u8] = b"\x1b[?1049l\x1b[23;0;0t";
    /// Cursor home + erase display.
    pub const CLEAR: &[u8] = b"\x1b[H\x1b[2J";
    /// Keypad application mode on.
    pub const KEYPAD_APP: &[u8] = b"\x1b[?1h\x1b=";
    /// Keypad application mode off.
    pub const KEYPAD_OFF: &[u8] = b"\x1b[?1l\x1b>";
    /// Hide the cursor.
    pub const CURSOR_HIDE: &[u8] = b"\x1b[?25l";
    /// Restore the cursor to its normal visible state.
    pub const CURSOR_SHOW: &[u8] = b"\x1b[?12l\x1b[?25h";
    /// Reset all SGR attributes.
    pub const SGR_RESET: &[u8] = b"\x1b[0m";
}

// ─── TxBuffer ────────────────────────────────────────────────────────────────

/// Write buffer sitting between the renderer and the tty descriptor.
#[derive(Debug, Default)]
pub struct TxBuffer {
    buf: Vec<u8>,
}

impl TxBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(4096),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Clear for reuse, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Append raw bytes.
    #[inline]
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append a string as UTF-8 bytes.
    #[inline]
    pub fn push_str(&mut self, text: &str) {
        self.buf.extend_from_slice(text.as_bytes());
    }

    /// Append one glyph, UTF-8 encoded.
    pub fn push_glyph(&mut self, glyph: char) {
        let mut encoded = [0_u8; 4];
        self.buf
            .extend_from_slice(glyph.encode_utf8(&mut encoded).as_bytes());
    }

    /// Append a number in ASCII decimal (`42` becomes `"42"`).
    pub fn push_dec(&mut self, mut value: u32) {
        let mut digits = [0_u8; 10];
        let mut at = digits.len();
        loop {
            at -= 1;
            digits[at] = b'0' + (value % 10) as u8;
            value /= 10;
            if value == 0 {
                break;
            }
        }
        self.buf.extend_from_slice(&digits[at..]);
    }
}

// ─── GraphicState ────────────────────────────────────────────────────────────

/// Tracked terminal SGR state; `None` means unknown, forcing emission.
#[derive(Debug, Default)]
pub struct GraphicState {
    effect: Option<Effect>,
    fg: Option<Color>,
    bg: Option<Color>,
}

impl GraphicState {
    /// Fresh state: everything unknown, so the first cell emits a full
    /// SGR update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit the escape sequence that moves the terminal from the tracked
    /// state to the wanted one. Emits nothing when they already agree.
    ///
    /// An effect change resets all attributes (`0`) before enabling the
    /// wanted bits, which clears the colors too — both are then re-emitted
    /// regardless of whether they changed.
    pub fn apply(&mut self, out: &mut TxBuffer, effect: Effect, fg: Color, bg: Color) {
        let effect_changed = self.effect != Some(effect);
        let fg_changed = self.fg != Some(fg);
        let bg_changed = self.bg != Some(bg);
        if !effect_changed && !fg_changed && !bg_changed {
            return;
        }

        out.push_bytes(b"\x1b[");
        let mut separate = false;
        let mut force_colors = false;

        if effect_changed {
            out.push_bytes(b"0");
            force_colors = true;
            for bit in Effect::FIRST_BIT..=Effect::LAST_BIT {
                if u32::from(effect.bits()) & (1 << bit) != 0 {
                    out.push_bytes(b";");
                    out.push_dec(bit);
                }
            }
            self.effect = Some(effect);
            separate = true;
        }

        if force_colors || fg_changed {
            if separate {
                out.push_bytes(b";");
            }
            color_params(out, fg, true);
            self.fg = Some(fg);
            separate = true;
        }

        if force_colors || bg_changed {
            if separate {
                out.push_bytes(b";");
            }
            color_params(out, bg, false);
            self.bg = Some(bg);
        }

        out.push_bytes(b"m");
    }
}

/// SGR parameters for one color: compact codes for the first 8 palette
/// entries, the 256-color form above, the truecolor form for RGB.
fn color_params(out: &mut TxBuffer, color: Color, is_fg: bool) {
    match color {
        Color::Palette(index) if index < 8 => {
            out.push_dec(if is_fg { 30 } else { 40 } + u32::from(index));
        }
        Color::Palette(index) => {
            out.push_bytes(if is_fg { b"38;5;" } else { b"48;5;" });
            out.push_dec(u32::from(index));
        }
        Color::Rgb(r, g, b) => {
            out.push_bytes(if is_fg { b"38;2;" } else { b"48;2;" });
            out.push_dec(u32::from(r));
            out.push_bytes(b";");
            out.push_dec(u32::from(g));
            out.push_bytes(b";");
            out.push_dec(u32::from(b));
        }
    }
}

// ─── Frame publishing ────────────────────────────────────────────────────────

/// Render the whole frame into `out` as one stream of control sequences.
///
/// Clear + home first, then every cell in row-major order with minimal
/// SGR deltas, a CUP to the start of each following row (so end-of-line
/// ambiguity cannot accumulate across resizes), and a final SGR reset.
pub fn render_frame(frame: &FrameBuffer, out: &mut TxBuffer) {
    out.push_bytes(control::CLEAR);

    let mut state = GraphicState::new();
    let width = frame.width();
    let mut column = 0;
    let mut row = 0_u32;

    for cell in frame.cells() {
        state.apply(out, cell.effect, cell.fg, cell.bg);
        out.push_glyph(cell.glyph);

        column += 1;
        if column >= width {
            // Re-anchor the cursor for the next row.
            row += 1;
            out.push_bytes(b"\x1b[");
            out.push_dec(row + 1);
            out.push_bytes(b"H");
            column = 0;
        }
    }

    out.push_bytes(control::SGR_RESET);
}

// ─── Tests ───────────────────────────────────────────────────────────────────
