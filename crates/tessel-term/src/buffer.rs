// SPDX-License-Identifier: MIT
//
// FrameBuffer — the off-screen cell grid and its painters.
//
// A flat row-major `Vec<Cell>`; index = y * width + x, `(y, x)` order
// throughout to match how terminals address the screen. The application
// paints here, then `publish` walks the grid once and emits it.
//
// Clipping policy: every public painter silently ignores writes that land
// outside the grid. Coordinates are signed so content scrolled above or
// left of the screen clips naturally instead of wrapping.

use crate::cell::{Cell, Effect, RenderCtx};
use crate::color::Color;
use crate::format;

// ─── Alignment ───────────────────────────────────────────────────────────────

/// Horizontal placement of a string inside a fixed width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignMode {
    Left,
    Right,
    Centered,
}

/// Which end of an overlong string the ellipsis replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipSide {
    /// Keep the prefix: `"too long t…"`.
    End,
    /// Keep the suffix: `"…ong text"`.
    Start,
}

/// Alignment plus clipping behavior for fixed-width string painting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alignment {
    pub mode: AlignMode,
    pub clip: ClipSide,
}

impl Alignment {
    pub const LEFT: Self = Self {
        mode: AlignMode::Left,
        clip: ClipSide::End,
    };
    pub const RIGHT: Self = Self {
        mode: AlignMode::Right,
        clip: ClipSide::End,
    };
    pub const CENTERED: Self = Self {
        mode: AlignMode::Centered,
        clip: ClipSide::End,
    };

    /// Same alignment, clipping at the start instead of the end.
    #[must_use]
    pub const fn clip_start(self) -> Self {
        Self {
            mode: self.mode,
            clip: ClipSide::Start,
        }
    }
}

/// The single-cell ellipsis used wherever a string is clipped.
const ELLIPSIS: char = '…';

// ─── FrameBuffer ─────────────────────────────────────────────────────────────

/// The in-memory grid of styled cells mirroring what the screen should
/// display.
pub struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    default_fg: Color,
    default_bg: Color,
    dirty: bool,
}

impl FrameBuffer {
    /// A grid of blank cells with the standard default colors.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        let default_fg = Color::DEFAULT_FG;
        let default_bg = Color::DEFAULT_BG;
        Self {
            width,
            height,
            cells: vec![Cell::blank(default_fg, default_bg); width * height],
            default_fg,
            default_bg,
            dirty: true,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    #[must_use]
    pub fn default_fg(&self) -> Color {
        self.default_fg
    }

    #[inline]
    #[must_use]
    pub fn default_bg(&self) -> Color {
        self.default_bg
    }

    /// The default style as a [`RenderCtx`] with no effect.
    #[must_use]
    pub fn default_ctx(&self) -> RenderCtx {
        RenderCtx {
            fg: self.default_fg,
            bg: self.default_bg,
            effect: Effect::empty(),
        }
    }

    /// The raw cell slice, row-major (the publisher's hot path).
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// One cell, or `None` outside the grid.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn cell(&self, y: i32, x: i32) -> Option<&Cell> {
        if self.in_bounds(y, x) {
            Some(&self.cells[y as usize * self.width + x as usize])
        } else {
            None
        }
    }

    /// Whether unpublished modifications exist.
    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear and return the dirty flag; the publisher calls this.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    #[inline]
    #[allow(clippy::cast_possible_wrap)]
    fn in_bounds(&self, y: i32, x: i32) -> bool {
        y >= 0 && x >= 0 && (y as i64) < self.height as i64 && (x as i64) < self.width as i64
    }

    #[inline]
    #[allow(clippy::cast_sign_loss)]
    fn index(&self, y: i32, x: i32) -> usize {
        y as usize * self.width + x as usize
    }

    // ── Reset and bulk styling ───────────────────────────────────────

    /// Set the default colors used by `reset` and as the base style of
    /// formatted strings. Takes effect on the next `reset`.
    pub fn set_default_colors(&mut self, fg: Color, bg: Color) {
        self.default_fg = fg;
        self.default_bg = bg;
    }

    /// Resize to `width × height` and reset every cell to a blank with
    /// the default colors.
    pub fn reset(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        let blank = Cell::blank(self.default_fg, self.default_bg);
        self.cells.clear();
        self.cells.resize(width * height, blank);
        self.dirty = true;
    }

    /// Recolor `width` cells starting at `(y, x)` without touching their
    /// glyphs or effects.
    pub fn set_colors(&mut self, y: i32, x: i32, width: usize, fg: Color, bg: Color) {
        if !self.in_bounds(y, x) {
            return;
        }
        #[allow(clippy::cast_sign_loss)]
        let span = width.min(self.width - x as usize);
        let start = self.index(y, x);
        for cell in &mut self.cells[start..start + span] {
            cell.fg = fg;
            cell.bg = bg;
        }
        self.dirty = true;
    }

    // ── Glyph and string painters ────────────────────────────────────

    /// Paint one glyph; out-of-grid positions are ignored.
    pub fn add_glyph(&mut self, y: i32, x: i32, glyph: char, fg: Color, bg: Color, effect: Effect) {
        if !self.in_bounds(y, x) {
            return;
        }
        let index = self.index(y, x);
        self.cells[index] = Cell {
            glyph,
            effect,
            fg,
            bg,
        };
        self.dirty = true;
    }

    /// [`add_glyph`](Self::add_glyph) with a bundled style.
    pub fn add_glyph_ctx(&mut self, y: i32, x: i32, glyph: char, ctx: &RenderCtx) {
        self.add_glyph(y, x, glyph, ctx.fg, ctx.bg, ctx.effect);
    }

    /// Paint a string's codepoints into consecutive cells starting at
    /// `(y, x)`; each cell clips independently.
    pub fn add_string(&mut self, y: i32, x: i32, text: &str, fg: Color, bg: Color, effect: Effect) {
        self.place_glyphs(y, x, text.chars(), fg, bg, effect);
    }

    /// [`add_string`](Self::add_string) with a bundled style.
    pub fn add_string_ctx(&mut self, y: i32, x: i32, text: &str, ctx: &RenderCtx) {
        self.add_string(y, x, text, ctx.fg, ctx.bg, ctx.effect);
    }

    fn place_glyphs<I>(&mut self, y: i32, x: i32, glyphs: I, fg: Color, bg: Color, effect: Effect)
    where
        I: IntoIterator<Item = char>,
    {
        for (offset, glyph) in glyphs.into_iter().enumerate() {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            self.add_glyph(y, x + offset as i32, glyph, fg, bg, effect);
        }
    }

    // ── Fixed-width string painter ───────────────────────────────────

    /// Paint `text` into exactly `width` cells.
    ///
    /// Too long: clipped with a one-cell ellipsis on the side the
    /// alignment requests (`width == 0` erases everything). Too short:
    /// padded with spaces per the alignment mode; a centered string gets
    /// `⌊(width − len) / 2⌋` cells of left padding.
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
        let mut glyphs: Vec<char> = text.chars().collect();

        if glyphs.len() > width {
            clip_glyphs(&mut glyphs, width, alignment.clip == ClipSide::Start);
        } else if glyphs.len() < width {
            let missing = width - glyphs.len();
            match alignment.mode {
                AlignMode::Left => glyphs.resize(width, ' '),
                AlignMode::Right => {
                    let mut padded = vec![' '; missing];
                    padded.append(&mut glyphs);
                    glyphs = padded;
                }
                AlignMode::Centered => {
                    let mut padded = vec![' '; missing / 2];
                    padded.append(&mut glyphs);
                    padded.resize(width, ' ');
                    glyphs = padded;
                }
            }
        }

        self.place_glyphs(y, x, glyphs, fg, bg, effect);
    }

    /// [`add_string_n`](Self::add_string_n) with a bundled style.
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
        self.add_string_n(y, x, text, width, alignment, ctx.fg, ctx.bg, ctx.effect);
    }

    // ── Three-zone painter ───────────────────────────────────────────

    /// Paint up to three strings across `width` cells: left-anchored,
    /// centered, right-anchored. Empty strings disable their field.
    ///
    /// When fields would collide, the boundaries fall back to thirds of
    /// the width (then halves for left against right), and any string
    /// squeezed below its length is clipped with an ellipsis at its end.
    #[allow(clippy::too_many_arguments, clippy::cast_possible_wrap)]
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
        let mut left: Vec<char> = left.chars().collect();
        let mut middle: Vec<char> = middle.chars().collect();
        let mut right: Vec<char> = right.chars().collect();
        let w = width as i32;

        // Resolve overlaps: left vs middle at w/3, middle vs right at
        // 2w/3, finally left vs right at w/2.
        let mut end_left = left.len() as i32;
        let mut start_middle = if middle.is_empty() {
            w
        } else {
            w / 2 - (middle.len() as i32 + 1) / 2
        };
        if end_left >= start_middle - 1 {
            end_left = end_left.min(w / 3 - 1);
            start_middle = start_middle.max(w / 3 + 1);
        }
        let mut end_middle = if middle.is_empty() {
            0
        } else {
            start_middle + middle.len() as i32
        };
        let mut start_right = w - right.len() as i32;
        if end_middle >= start_right - 1 {
            end_middle = end_middle.min(2 * w / 3 - 1);
            start_right = start_right.max(2 * w / 3 + 1);
        }
        if end_left >= start_right - 1 {
            end_left = end_left.min(w / 2 - 1);
            start_right = start_right.max(w / 2 + 1);
        }

        // Clip whatever no longer fits its slot.
        if end_left >= 0 && left.len() as i32 > end_left {
            clip_glyphs(&mut left, end_left as usize, false);
        }
        let middle_span = end_middle - start_middle;
        if middle_span >= 0 && middle.len() as i32 > middle_span {
            clip_glyphs(&mut middle, middle_span as usize, false);
        }
        let right_span = w - start_right;
        if right_span >= 0 && right.len() as i32 > right_span {
            clip_glyphs(&mut right, right_span as usize, false);
        }

        // Assemble the row: left, pad, middle, pad, right.
        let mut row = left;
        if !middle.is_empty() {
            resize_glyphs(&mut row, start_middle.max(0) as usize);
            row.extend(middle);
        }
        resize_glyphs(&mut row, start_right.max(0) as usize);
        row.extend(right);

        self.place_glyphs(y, x, row, fg, bg, effect);
    }

    /// [`add_strings_n`](Self::add_strings_n) with a bundled style.
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
        self.add_strings_n(y, x, left, middle, right, width, ctx.fg, ctx.bg, ctx.effect);
    }

    // ── Formatted and markdown painters ──────────────────────────────

    /// Paint a formatted UTF-32 string: format tokens update the running
    /// style without occupying a cell, codepoints fill consecutive cells.
    ///
    /// `width` is capped at the distance to the right edge; whatever the
    /// string leaves unused is filled with spaces in the running style.
    /// A row outside the grid makes the whole call a no-op.
    pub fn add_formatted_string(&mut self, y: i32, x: i32, formatted: &[u32], width: usize) {
        if !self.in_bounds(y, x) {
            return;
        }
        #[allow(clippy::cast_sign_loss)]
        let mut remaining = width.min(self.width - x as usize);

        let mut fg = self.default_fg;
        let mut bg = self.default_bg;
        let mut effect = Effect::empty();
        let mut index = self.index(y, x);

        for &value in formatted {
            if remaining == 0 {
                break;
            }
            if format::is_token(value) {
                if format::is_effect_token(value) {
                    effect = format::token_effect(value);
                } else if format::is_fg_token(value) {
                    fg = format::token_color(value);
                } else if format::is_bg_token(value) {
                    bg = format::token_color(value);
                }
            } else {
                let glyph = char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER);
                self.cells[index] = Cell {
                    glyph,
                    effect,
                    fg,
                    bg,
                };
                index += 1;
                remaining -= 1;
            }
        }

        while remaining > 0 {
            self.cells[index] = Cell {
                glyph: ' ',
                effect,
                fg,
                bg,
            };
            index += 1;
            remaining -= 1;
        }
        self.dirty = true;
    }

    /// Paint markdown text: split on `\n`, expand each line's inline
    /// markup, and paint one formatted row per line.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn add_markdown(&mut self, y: i32, x: i32, text: &str, width: usize) {
        for (line_no, line) in text.split('\n').enumerate() {
            let mut formatted = format::str_to_u32(line);
            format::expand_markdown(&mut formatted);
            self.add_formatted_string(y + line_no as i32, x, &formatted, width);
        }
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FrameBuffer({}x{})", self.width, self.height)
    }
}

// ─── Glyph vector helpers ────────────────────────────────────────────────────

/// Shorten `glyphs` to `wanted` cells, replacing the clipped end with an
/// ellipsis (`wanted == 0` clears).
fn clip_glyphs(glyphs: &mut Vec<char>, wanted: usize, clip_start: bool) {
    if glyphs.len() <= wanted {
        return;
    }
    if wanted == 0 {
        glyphs.clear();
    } else if clip_start {
        let keep = glyphs.split_off(glyphs.len() - (wanted - 1));
        glyphs.clear();
        glyphs.push(ELLIPSIS);
        glyphs.extend(keep);
    } else {
        glyphs.truncate(wanted - 1);
        glyphs.push(ELLIPSIS);
    }
}

/// Truncate or space-pad to exactly `len` glyphs.
fn resize_glyphs(glyphs: &mut Vec<char>, len: usize) {
    glyphs.resize(len, ' ');
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const FG: Color = Color::DEFAULT_FG;
    const BG: Color = Color::DEFAULT_BG;
    const NONE: Effect = Effect::empty();

    /// Row `y` as a string, for painter assertions.
    fn row_text(frame: &FrameBuffer, y: i32) -> String {
        (0..frame.width())
            .map(|x| frame.cell(y, x as i32).unwrap().glyph)
            .collect()
    }

    // ── Construction and reset ──────────────────────────────────────────

    #[test]
    fn new_buffer_is_all_blanks() {
        let frame = FrameBuffer::new(10, 4);
        assert_eq!(frame.cells().len(), 40);
        for cell in frame.cells() {
            assert_eq!(*cell, Cell::blank(FG, BG));
        }
    }

    #[test]
    fn reset_resizes_and_blanks() {
        let mut frame = FrameBuffer::new(4, 2);
        frame.add_glyph(0, 0, 'X', FG, BG, Effect::BOLD);
        frame.reset(3, 5);
        assert_eq!(frame.width(), 3);
        assert_eq!(frame.height(), 5);
        assert_eq!(frame.cells().len(), 15);
        for cell in frame.cells() {
            assert_eq!(*cell, Cell::blank(FG, BG));
        }
    }

    #[test]
    fn reset_applies_pending_default_colors() {
        let mut frame = FrameBuffer::new(2, 1);
        frame.set_default_colors(Color::Palette(3), Color::Rgb(9, 9, 9));
        frame.reset(2, 1);
        let cell = frame.cell(0, 0).unwrap();
        assert_eq!(cell.fg, Color::Palette(3));
        assert_eq!(cell.bg, Color::Rgb(9, 9, 9));
    }

    #[test]
    fn zero_sized_buffer_is_harmless() {
        let mut frame = FrameBuffer::new(0, 0);
        frame.add_glyph(0, 0, 'X', FG, BG, NONE);
        frame.add_string(0, 0, "hi", FG, BG, NONE);
        frame.add_formatted_string(0, 0, &[65], 5);
        assert!(frame.cells().is_empty());
    }

    // ── Dirty tracking ──────────────────────────────────────────────────

    #[test]
    fn painters_mark_dirty_and_take_clears() {
        let mut frame = FrameBuffer::new(4, 1);
        assert!(frame.take_dirty());
        assert!(!frame.is_dirty());
        frame.add_glyph(0, 0, 'a', FG, BG, NONE);
        assert!(frame.take_dirty());
        // An out-of-bounds write is a no-op and leaves the frame clean.
        frame.add_glyph(5, 0, 'a', FG, BG, NONE);
        assert!(!frame.is_dirty());
    }

    // ── add_glyph ───────────────────────────────────────────────────────

    #[test]
    fn add_glyph_writes_exactly_one_cell() {
        let mut frame = FrameBuffer::new(3, 2);
        frame.add_glyph(1, 2, 'Z', Color::Palette(1), Color::Palette(2), Effect::BOLD);
        let cell = frame.cell(1, 2).unwrap();
        assert_eq!(cell.glyph, 'Z');
        assert_eq!(cell.effect, Effect::BOLD);
        assert_eq!(cell.fg, Color::Palette(1));
        assert_eq!(cell.bg, Color::Palette(2));
        // Every other cell untouched.
        let untouched = frame
            .cells()
            .iter()
            .filter(|c| **c == Cell::blank(FG, BG))
            .count();
        assert_eq!(untouched, 5);
    }

    #[test]
    fn add_glyph_out_of_bounds_is_ignored() {
        let mut frame = FrameBuffer::new(3, 2);
        let before: Vec<Cell> = frame.cells().to_vec();
        frame.add_glyph(-1, 0, 'X', FG, BG, NONE);
        frame.add_glyph(0, -1, 'X', FG, BG, NONE);
        frame.add_glyph(2, 0, 'X', FG, BG, NONE);
        frame.add_glyph(0, 3, 'X', FG, BG, NONE);
        assert_eq!(frame.cells(), &before[..]);
    }

    #[test]
    fn add_glyph_ctx_uses_bundled_style() {
        let mut frame = FrameBuffer::new(2, 1);
        let ctx = RenderCtx {
            fg: Color::Rgb(1, 2, 3),
            bg: Color::Palette(5),
            effect: Effect::ITALIC,
        };
        frame.add_glyph_ctx(0, 0, 'q', &ctx);
        let cell = frame.cell(0, 0).unwrap();
        assert_eq!(cell.fg, ctx.fg);
        assert_eq!(cell.bg, ctx.bg);
        assert_eq!(cell.effect, ctx.effect);
    }

    // ── add_string ──────────────────────────────────────────────────────

    #[test]
    fn add_string_places_consecutive_glyphs() {
        let mut frame = FrameBuffer::new(6, 1);
        frame.add_string(0, 1, "abc", FG, BG, NONE);
        assert_eq!(row_text(&frame, 0), " abc  ");
    }

    #[test]
    fn add_string_clips_per_cell_at_the_edge() {
        let mut frame = FrameBuffer::new(4, 1);
        frame.add_string(0, 2, "abcdef", FG, BG, NONE);
        assert_eq!(row_text(&frame, 0), "  ab");
    }

    #[test]
    fn add_string_off_row_is_a_noop() {
        let mut frame = FrameBuffer::new(4, 1);
        frame.add_string(1, 0, "abc", FG, BG, NONE);
        frame.add_string(-1, 0, "abc", FG, BG, NONE);
        assert_eq!(row_text(&frame, 0), "    ");
    }

    // ── add_string_n ────────────────────────────────────────────────────

    #[test]
    fn string_n_exact_fit_is_verbatim() {
        let mut frame = FrameBuffer::new(10, 1);
        frame.add_string_n(0, 0, "abcdefghij", 10, Alignment::CENTERED, FG, BG, NONE);
        assert_eq!(row_text(&frame, 0), "abcdefghij");
    }

    #[test]
    fn string_n_clips_end_with_ellipsis() {
        let mut frame = FrameBuffer::new(10, 1);
        frame.add_string_n(0, 0, "abcdefghijk", 10, Alignment::CENTERED, FG, BG, NONE);
        assert_eq!(row_text(&frame, 0), "abcdefghi…");
    }

    #[test]
    fn string_n_clips_start_with_ellipsis() {
        let mut frame = FrameBuffer::new(10, 1);
        frame.add_string_n(
            0,
            0,
            "abcdefghijk",
            10,
            Alignment::CENTERED.clip_start(),
            FG,
            BG,
            NONE,
        );
        assert_eq!(row_text(&frame, 0), "…cdefghijk");
    }

    #[test]
    fn string_n_zero_width_erases_nothing_but_writes_nothing() {
        let mut frame = FrameBuffer::new(4, 1);
        frame.add_string(0, 0, "abcd", FG, BG, NONE);
        frame.add_string_n(0, 0, "xyz", 0, Alignment::LEFT, FG, BG, NONE);
        assert_eq!(row_text(&frame, 0), "abcd");
    }

    #[test]
    fn string_n_left_pads_right() {
        let mut frame = FrameBuffer::new(8, 1);
        frame.add_string_n(0, 0, "ab", 6, Alignment::LEFT, FG, BG, NONE);
        assert_eq!(row_text(&frame, 0), "ab      ");
        // Exactly `width` cells written: columns 6..8 untouched spaces
        // from the blank fill, columns 2..6 explicit padding.
        frame.add_glyph(0, 6, '#', FG, BG, NONE);
        frame.add_string_n(0, 0, "cd", 6, Alignment::LEFT, FG, BG, NONE);
        assert_eq!(row_text(&frame, 0), "cd    # ");
    }

    #[test]
    fn string_n_right_pads_left() {
        let mut frame = FrameBuffer::new(6, 1);
        frame.add_string_n(0, 0, "ab", 6, Alignment::RIGHT, FG, BG, NONE);
        assert_eq!(row_text(&frame, 0), "    ab");
    }

    #[test]
    fn string_n_centered_floors_left_padding() {
        let mut frame = FrameBuffer::new(7, 1);
        frame.add_string_n(0, 0, "ab", 7, Alignment::CENTERED, FG, BG, NONE);
        // (7-2)/2 = 2 left spaces, 3 right.
        assert_eq!(row_text(&frame, 0), "  ab   ");
    }

    #[test]
    fn string_n_writes_exactly_width_cells_when_clipping() {
        let mut frame = FrameBuffer::new(8, 1);
        frame.add_string(0, 0, "########", FG, BG, NONE);
        frame.add_string_n(0, 1, "abcdefgh", 5, Alignment::LEFT, FG, BG, NONE);
        assert_eq!(row_text(&frame, 0), "#abcd…##");
    }

    #[test]
    fn string_n_unicode_counts_codepoints() {
        let mut frame = FrameBuffer::new(5, 1);
        frame.add_string_n(0, 0, "héllo!", 5, Alignment::LEFT, FG, BG, NONE);
        assert_eq!(row_text(&frame, 0), "héll…");
    }

    // ── add_strings_n ───────────────────────────────────────────────────

    #[test]
    fn three_zone_basic_layout() {
        let mut frame = FrameBuffer::new(20, 1);
        frame.add_strings_n(0, 0, "L", "MID", "R", 20, FG, BG, NONE);
        // Middle starts at 20/2 - (3+1)/2 = 8; right at 19.
        assert_eq!(row_text(&frame, 0), "L       MID        R");
    }

    #[test]
    fn three_zone_long_left_falls_back_to_third() {
        let mut frame = FrameBuffer::new(20, 1);
        frame.add_strings_n(0, 0, "xxxxxxxxxx", "MID", "R", 20, FG, BG, NONE);
        // Left capped at 20/3 - 1 = 5 cells → four glyphs + ellipsis.
        let row = row_text(&frame, 0);
        assert!(row.starts_with("xxxx…"));
        assert_eq!(&row[..], "xxxx…   MID        R");
    }

    #[test]
    fn three_zone_empty_middle_leaves_gap() {
        let mut frame = FrameBuffer::new(12, 1);
        frame.add_strings_n(0, 0, "ab", "", "cd", 12, FG, BG, NONE);
        assert_eq!(row_text(&frame, 0), "ab        cd");
    }

    #[test]
    fn three_zone_only_middle() {
        let mut frame = FrameBuffer::new(11, 1);
        frame.add_strings_n(0, 0, "", "mid", "", 11, FG, BG, NONE);
        // Middle starts at 11/2 - 2 = 3.
        assert_eq!(row_text(&frame, 0), "   mid     ");
    }

    #[test]
    fn three_zone_all_empty_blanks_the_span() {
        // Even with every field empty the painter owns its span: the
        // padding fill runs to the right anchor.
        let mut frame = FrameBuffer::new(6, 1);
        frame.add_string(0, 0, "......", FG, BG, NONE);
        frame.add_strings_n(0, 0, "", "", "", 6, FG, BG, NONE);
        assert_eq!(row_text(&frame, 0), "      ");
    }

    #[test]
    fn three_zone_long_right_is_clipped() {
        let mut frame = FrameBuffer::new(18, 1);
        frame.add_strings_n(0, 0, "L", "M", "rrrrrrrrrrrrrr", 18, FG, BG, NONE);
        let row = row_text(&frame, 0);
        // Right squeezed against the 2/3 boundary: starts at 13, 5 cells.
        assert!(row.ends_with("rrrr…"));
        assert!(row.starts_with('L'));
    }

    #[test]
    fn three_zone_offset_paints_from_x() {
        let mut frame = FrameBuffer::new(14, 1);
        frame.add_strings_n(0, 2, "a", "b", "c", 10, FG, BG, NONE);
        let row = row_text(&frame, 0);
        assert_eq!(&row[0..2], "  ");
        assert_eq!(row.chars().nth(2), Some('a'));
        assert_eq!(row.chars().nth(11), Some('c'));
    }

    // ── add_formatted_string ────────────────────────────────────────────

    #[test]
    fn formatted_string_applies_running_style() {
        let mut frame = FrameBuffer::new(5, 1);
        let formatted = vec![
            format::fg_token(Color::Palette(1)),
            u32::from('A'),
            format::effect_token(Effect::BOLD),
            u32::from('B'),
        ];
        frame.add_formatted_string(0, 0, &formatted, 3);

        let a = frame.cell(0, 0).unwrap();
        assert_eq!(a.glyph, 'A');
        assert_eq!(a.effect, NONE);
        assert_eq!(a.fg, Color::Palette(1));
        assert_eq!(a.bg, BG);

        let b = frame.cell(0, 1).unwrap();
        assert_eq!(b.glyph, 'B');
        assert_eq!(b.effect, Effect::BOLD);
        assert_eq!(b.fg, Color::Palette(1));

        // Remainder filled with spaces in the running style.
        let fill = frame.cell(0, 2).unwrap();
        assert_eq!(fill.glyph, ' ');
        assert_eq!(fill.effect, Effect::BOLD);
        assert_eq!(fill.fg, Color::Palette(1));
        assert_eq!(fill.bg, BG);

        // Width capped at 3: cell 3 untouched.
        assert_eq!(*frame.cell(0, 3).unwrap(), Cell::blank(FG, BG));
    }

    #[test]
    fn formatted_string_stops_at_width() {
        let mut frame = FrameBuffer::new(6, 1);
        let formatted = format::str_to_u32("abcdef");
        frame.add_formatted_string(0, 1, &formatted, 3);
        assert_eq!(row_text(&frame, 0), " abc  ");
    }

    #[test]
    fn formatted_string_width_capped_by_right_edge() {
        let mut frame = FrameBuffer::new(4, 1);
        let formatted = format::str_to_u32("abcdef");
        frame.add_formatted_string(0, 2, &formatted, 10);
        assert_eq!(row_text(&frame, 0), "  ab");
    }

    #[test]
    fn formatted_string_outside_grid_is_a_noop() {
        let mut frame = FrameBuffer::new(4, 2);
        let before: Vec<Cell> = frame.cells().to_vec();
        frame.add_formatted_string(2, 0, &format::str_to_u32("x"), 4);
        frame.add_formatted_string(-1, 0, &format::str_to_u32("x"), 4);
        frame.add_formatted_string(0, 9, &format::str_to_u32("x"), 4);
        assert_eq!(frame.cells(), &before[..]);
    }

    #[test]
    fn formatted_string_bg_token() {
        let mut frame = FrameBuffer::new(3, 1);
        let formatted = vec![format::bg_token(Color::Rgb(10, 20, 30)), u32::from('x')];
        frame.add_formatted_string(0, 0, &formatted, 1);
        assert_eq!(frame.cell(0, 0).unwrap().bg, Color::Rgb(10, 20, 30));
    }

    // ── add_markdown ────────────────────────────────────────────────────

    #[test]
    fn markdown_styles_between_delimiters() {
        let mut frame = FrameBuffer::new(20, 1);
        frame.add_markdown(0, 0, "**bold** and //it//", 20);
        assert_eq!(&row_text(&frame, 0)[..13], "bold and it  ");

        // "bold" cells carry BOLD, " and " cells none, "it" italic.
        assert_eq!(frame.cell(0, 0).unwrap().effect, Effect::BOLD);
        assert_eq!(frame.cell(0, 3).unwrap().effect, Effect::BOLD);
        assert_eq!(frame.cell(0, 4).unwrap().effect, NONE);
        assert_eq!(frame.cell(0, 8).unwrap().effect, NONE);
        assert_eq!(frame.cell(0, 9).unwrap().effect, Effect::ITALIC);
        assert_eq!(frame.cell(0, 10).unwrap().effect, Effect::ITALIC);
        // Trailing fill returns to no effect (balanced pairs).
        assert_eq!(frame.cell(0, 12).unwrap().effect, NONE);
    }

    #[test]
    fn markdown_paints_one_row_per_line() {
        let mut frame = FrameBuffer::new(6, 3);
        frame.add_markdown(0, 0, "one\ntwo", 6);
        assert_eq!(row_text(&frame, 0), "one   ");
        assert_eq!(row_text(&frame, 1), "two   ");
        assert_eq!(row_text(&frame, 2), "      ");
    }

    #[test]
    fn markdown_lines_past_the_bottom_are_dropped() {
        let mut frame = FrameBuffer::new(4, 1);
        frame.add_markdown(0, 0, "a\nb\nc", 4);
        assert_eq!(row_text(&frame, 0), "a   ");
    }

    // ── set_colors ──────────────────────────────────────────────────────

    #[test]
    fn set_colors_recolors_without_touching_glyphs() {
        let mut frame = FrameBuffer::new(6, 1);
        frame.add_string(0, 0, "abcdef", FG, BG, Effect::BOLD);
        frame.set_colors(0, 1, 3, Color::Palette(2), Color::Palette(3));
        assert_eq!(row_text(&frame, 0), "abcdef");
        assert_eq!(frame.cell(0, 0).unwrap().fg, FG);
        for x in 1..4 {
            let cell = frame.cell(0, x).unwrap();
            assert_eq!(cell.fg, Color::Palette(2));
            assert_eq!(cell.bg, Color::Palette(3));
            assert_eq!(cell.effect, Effect::BOLD);
        }
        assert_eq!(frame.cell(0, 4).unwrap().fg, FG);
    }

    #[test]
    fn set_colors_clips_to_row_end() {
        let mut frame = FrameBuffer::new(4, 2);
        frame.set_colors(0, 2, 10, Color::Palette(5), Color::Palette(6));
        assert_eq!(frame.cell(0, 3).unwrap().fg, Color::Palette(5));
        // Next row untouched: the span clips, it does not wrap.
        assert_eq!(frame.cell(1, 0).unwrap().fg, FG);
    }

    #[test]
    fn set_colors_out_of_bounds_is_ignored() {
        let mut frame = FrameBuffer::new(4, 1);
        frame.set_colors(1, 0, 2, Color::Palette(5), Color::Palette(6));
        frame.set_colors(0, -1, 2, Color::Palette(5), Color::Palette(6));
        assert_eq!(frame.cell(0, 0).unwrap().fg, FG);
    }

    // ── Glyph helpers ───────────────────────────────────────────────────

    #[test]
    fn clip_end_keeps_prefix() {
        let mut v: Vec<char> = "abcdef".chars().collect();
        clip_glyphs(&mut v, 4, false);
        assert_eq!(v.iter().collect::<String>(), "abc…");
    }

    #[test]
    fn clip_start_keeps_suffix() {
        let mut v: Vec<char> = "abcdef".chars().collect();
        clip_glyphs(&mut v, 4, true);
        assert_eq!(v.iter().collect::<String>(), "…def");
    }

    #[test]
    fn clip_to_zero_clears() {
        let mut v: Vec<char> = "abc".chars().collect();
        clip_glyphs(&mut v, 0, false);
        assert!(v.is_empty());
    }

    #[test]
    fn clip_when_already_short_is_a_noop() {
        let mut v: Vec<char> = "ab".chars().collect();
        clip_glyphs(&mut v, 2, false);
        assert_eq!(v.iter().collect::<String>(), "ab");
    }
}
