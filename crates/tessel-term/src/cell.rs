// SPDX-License-Identifier: MIT
//
// Cell — one glyph position on screen, plus its styling.
//
// The whole rendering pipeline exists to produce and publish a grid of
// these. A cell is 12 bytes and Copy; a 200×50 terminal is 10,000 cells,
// small enough to rebuild every frame without a second thought.

use crate::color::Color;

// ─── Effect ──────────────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Text effects stored as a compact bitfield.
    ///
    /// Bit positions equal the SGR parameter numbers, so enabling effect
    /// bit `k` emits `\x1b[…;k…m` with no translation table:
    ///
    /// ```
    /// use tessel_term::cell::Effect;
    ///
    /// let style = Effect::BOLD | Effect::UNDERLINE;
    /// assert!(style.contains(Effect::BOLD));
    /// assert!(!style.contains(Effect::BLINK));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Effect: u16 {
        /// SGR 1 — increased intensity.
        const BOLD          = 1 << 1;
        /// SGR 3 — italic or oblique.
        const ITALIC        = 1 << 3;
        /// SGR 4 — underline.
        const UNDERLINE     = 1 << 4;
        /// SGR 5 — blink.
        const BLINK         = 1 << 5;
        /// SGR 7 — swap foreground and background.
        const REVERSE_VIDEO = 1 << 7;
        /// SGR 8 — concealed text.
        const CONCEAL       = 1 << 8;
        /// SGR 9 — crossed-out text.
        const CROSSED_OUT   = 1 << 9;
    }
}

impl Effect {
    /// Lowest SGR parameter bit used by any effect.
    pub const FIRST_BIT: u32 = 1;
    /// Highest SGR parameter bit used by any effect.
    pub const LAST_BIT: u32 = 9;
}

// ─── RenderCtx ───────────────────────────────────────────────────────────────

/// Bundled rendering style: colors plus effect, passed to the `*_ctx`
/// painter variants when several calls share one look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderCtx {
    pub fg: Color,
    pub bg: Color,
    pub effect: Effect,
}

// ─── Cell ────────────────────────────────────────────────────────────────────

/// One screen cell: a Unicode glyph with its effect and colors.
///
/// One codepoint occupies exactly one cell; wide and combining characters
/// receive no special treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// The character to draw.
    pub glyph: char,
    /// Text effect bits.
    pub effect: Effect,
    /// Foreground color.
    pub fg: Color,
    /// Background color.
    pub bg: Color,
}

impl Cell {
    /// The reset state for the given default colors: a plain space.
    #[inline]
    #[must_use]
    pub const fn blank(fg: Color, bg: Color) -> Self {
        Self {
            glyph: ' ',
            effect: Effect::empty(),
            fg,
            bg,
        }
    }

    /// Reset this cell in place to [`blank`](Self::blank).
    #[inline]
    pub fn reset(&mut self, fg: Color, bg: Color) {
        *self = Self::blank(fg, bg);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
