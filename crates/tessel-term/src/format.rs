// SPDX-License-Identifier: MIT
//
// Inline formatting — style changes carried inside a UTF-32 string.
//
// A formatted string is a `Vec<u32>` mixing plain codepoints with tokens
// that sit above the 21-bit Unicode range. A token switches the painter's
// running effect or color instead of occupying a cell, so one string can
// describe a whole styled line.
//
// Token layout: bit 30 = set effect, bit 29 = set foreground, bit 28 = set
// background; the payload sits below bit 26. Effects use their SGR bit
// positions; colors use the 25-bit `Color::raw` form, so RGB values pass
// through tokens unclipped.

use crate::cell::Effect;
use crate::color::Color;

/// Token tag: replace the running effect with the payload.
pub const EFFECT_MASK: u32 = 1 << 30;
/// Token tag: replace the running foreground color.
pub const FG_MASK: u32 = 1 << 29;
/// Token tag: replace the running background color.
pub const BG_MASK: u32 = 1 << 28;

/// Unicode fits in 21 bits; anything above is a token.
const UNICODE_MASK: u32 = 0x001F_FFFF;
/// Color payloads use the 25-bit wire form (RGB flag + three channels).
const COLOR_MASK: u32 = 0x01FF_FFFF;

// ─── Token building ──────────────────────────────────────────────────────────

/// Token that sets the running effect (replacing, not merging).
#[inline]
#[must_use]
pub const fn effect_token(effect: Effect) -> u32 {
    effect.bits() as u32 | EFFECT_MASK
}

/// Token that sets the running foreground color.
#[inline]
#[must_use]
pub const fn fg_token(color: Color) -> u32 {
    color.raw() | FG_MASK
}

/// Token that sets the running background color.
#[inline]
#[must_use]
pub const fn bg_token(color: Color) -> u32 {
    color.raw() | BG_MASK
}

// ─── Token inspection ────────────────────────────────────────────────────────

/// Whether `value` is a formatting token rather than a codepoint.
#[inline]
#[must_use]
pub const fn is_token(value: u32) -> bool {
    value & !UNICODE_MASK != 0
}

#[inline]
#[must_use]
pub const fn is_effect_token(value: u32) -> bool {
    value & EFFECT_MASK != 0
}

#[inline]
#[must_use]
pub const fn is_fg_token(value: u32) -> bool {
    value & FG_MASK != 0
}

#[inline]
#[must_use]
pub const fn is_bg_token(value: u32) -> bool {
    value & BG_MASK != 0
}

/// Extract the effect carried by an effect token.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn token_effect(value: u32) -> Effect {
    Effect::from_bits_truncate((value & UNICODE_MASK) as u16)
}

/// Extract the color carried by a fg/bg token.
#[inline]
#[must_use]
pub const fn token_color(value: u32) -> Color {
    Color::from_raw(value & COLOR_MASK)
}

// ─── UTF-32 helpers ──────────────────────────────────────────────────────────

/// Convert a UTF-8 string to the codepoint form the painters consume.
#[must_use]
pub fn str_to_u32(text: &str) -> Vec<u32> {
    text.chars().map(u32::from).collect()
}

/// Append a UTF-8 string's codepoints to a formatted string under
/// construction.
pub fn push_str(out: &mut Vec<u32>, text: &str) {
    out.extend(text.chars().map(u32::from));
}

// ─── Markdown expansion ──────────────────────────────────────────────────────

/// The effect toggled by a doubled delimiter character, if any.
fn delimiter_effect(value: u32) -> Option<Effect> {
    match char::from_u32(value)? {
        '*' => Some(Effect::BOLD),
        '/' => Some(Effect::ITALIC),
        '_' => Some(Effect::UNDERLINE),
        '-' => Some(Effect::CROSSED_OUT),
        _ => None,
    }
}

/// Expand lightweight markdown into effect tokens, in place.
///
/// Every pair of identical delimiters (`**`, `//`, `__`, `--`) XOR-toggles
/// the corresponding effect bit and collapses into a single effect token;
/// everything else is copied through. The string only ever shrinks.
///
/// Balanced pairs return every toggled bit to zero by the end of the
/// string; a lone delimiter character stays literal.
pub fn expand_markdown(text: &mut Vec<u32>) {
    let mut effect = Effect::empty();
    let mut write = 0;
    let mut read = 0;

    while read < text.len() {
        let value = text[read];
        if read + 1 < text.len() && text[read + 1] == value {
            if let Some(toggled) = delimiter_effect(value) {
                effect ^= toggled;
                text[write] = effect_token(effect);
                write += 1;
                read += 2;
                continue;
            }
        }
        text[write] = value;
        write += 1;
        read += 1;
    }

    text.truncate(write);
}

// ─── Tests ───────────────────────────────────────────────────────────────────
