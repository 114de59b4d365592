// SPDX-License-Identifier: MIT
//
// Escape-sequence identification.
//
// A pure function over the bytes that follow an initial ESC. The caller
// (the input decoder) has already consumed nothing: on `Match` it drops
// the ESC plus `consumed` bytes, on `NeedMore` it leaves the buffer
// untouched and waits for the next read, on `NotMatched` it surfaces a
// bare Escape event.
//
// The recognised set is a fixed trie: `O` (SS3) and `[` (CSI) branch
// heads, with the CSI side branching up to three levels deep on parameter
// digit and modifier. Walking the bytes once keeps the decoder strict:
// every proper prefix of a recognised sequence reports `NeedMore`, every
// divergence reports `NotMatched` immediately.

use crate::event::Event;

/// Longest recognised sequence after the ESC byte (`[1;5D` and friends).
pub const MAX_SEQUENCE_LEN: usize = 5;

/// Result of matching the bytes after an ESC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identify {
    /// A full sequence: the event and how many bytes it used.
    Match(Event, usize),
    /// The buffer is a proper prefix of a recognised sequence.
    NeedMore,
    /// No recognised sequence starts with these bytes.
    NotMatched,
}

/// Identify one escape sequence at the start of `buf` (ESC already
/// stripped).
#[must_use]
pub fn identify(buf: &[u8]) -> Identify {
    match buf.first() {
        None => Identify::NeedMore,
        Some(b'O') => ss3(buf),
        Some(b'[') => csi(buf),
        Some(_) => Identify::NotMatched,
    }
}

// ─── SS3: ESC O <letter> ─────────────────────────────────────────────────────

fn ss3(buf: &[u8]) -> Identify {
    let Some(&letter) = buf.get(1) else {
        return Identify::NeedMore;
    };
    let event = match letter {
        b'A' => Event::ARROW_UP,
        b'B' => Event::ARROW_DOWN,
        b'C' => Event::ARROW_RIGHT,
        b'D' => Event::ARROW_LEFT,
        b'F' => Event::END,
        b'H' => Event::HOME,
        b'M' => Event::SHIFT_ENTER,
        b'P' => Event::F1,
        b'Q' => Event::F2,
        b'R' => Event::F3,
        b'S' => Event::F4,
        _ => return Identify::NotMatched,
    };
    Identify::Match(event, 2)
}

// ─── CSI: ESC [ … ────────────────────────────────────────────────────────────

fn csi(buf: &[u8]) -> Identify {
    let Some(&head) = buf.get(1) else {
        return Identify::NeedMore;
    };
    match head {
        b'E' => Identify::Match(Event::KEYPAD_CENTER, 2),
        b'Z' => Identify::Match(Event::SHIFT_TAB, 2),
        b'1' => csi_one(buf),
        b'2' => csi_two(buf),
        b'3' => csi_tilde(buf, Event::DELETE, ShiftAllowed::Yes),
        b'5' => csi_tilde(buf, Event::PAGE_UP, ShiftAllowed::No),
        b'6' => csi_tilde(buf, Event::PAGE_DOWN, ShiftAllowed::No),
        _ => Identify::NotMatched,
    }
}

/// `ESC [ 1 …` — F5..F8 (`15~` .. `19~`) or modified navigation
/// (`1;<mod><letter>`).
fn csi_one(buf: &[u8]) -> Identify {
    let Some(&second) = buf.get(2) else {
        return Identify::NeedMore;
    };
    match second {
        b'5' | b'7' | b'8' | b'9' => {
            let Some(&fin) = buf.get(3) else {
                return Identify::NeedMore;
            };
            if fin != b'~' {
                return Identify::NotMatched;
            }
            let event = match second {
                b'5' => Event::F5,
                b'7' => Event::F6,
                b'8' => Event::F7,
                _ => Event::F8,
            };
            Identify::Match(event, 4)
        }
        b';' => {
            let Some(&digit) = buf.get(3) else {
                return Identify::NeedMore;
            };
            let Some(modify) = modifier(digit) else {
                return Identify::NotMatched;
            };
            let Some(&letter) = buf.get(4) else {
                return Identify::NeedMore;
            };
            let base = match letter {
                b'A' => Event::ARROW_UP,
                b'B' => Event::ARROW_DOWN,
                b'C' => Event::ARROW_RIGHT,
                b'D' => Event::ARROW_LEFT,
                b'F' => Event::END,
                b'H' => Event::HOME,
                _ => return Identify::NotMatched,
            };
            Identify::Match(modify(base), 5)
        }
        _ => Identify::NotMatched,
    }
}

/// `ESC [ 2 …` — Insert (`2~`), F9..F12 (`20~` .. `24~`), or modified
/// Insert (`2;<mod>~`).
fn csi_two(buf: &[u8]) -> Identify {
    let Some(&second) = buf.get(2) else {
        return Identify::NeedMore;
    };
    match second {
        b'~' => Identify::Match(Event::INSERT, 3),
        b'0' | b'1' | b'3' | b'4' => {
            let Some(&fin) = buf.get(3) else {
                return Identify::NeedMore;
            };
            if fin != b'~' {
                return Identify::NotMatched;
            }
            let event = match second {
                b'0' => Event::F9,
                b'1' => Event::F10,
                b'3' => Event::F11,
                _ => Event::F12,
            };
            Identify::Match(event, 4)
        }
        b';' => modified_tilde(buf, Event::INSERT, ShiftAllowed::Yes),
        _ => Identify::NotMatched,
    }
}

/// Whether the Shift modifier participates in a tilde family. Terminals
/// keep Shift+PageUp/PageDown for their own scrollback, so the paging
/// families only accept Alt and Ctrl.
#[derive(Clone, Copy, PartialEq, Eq)]
enum ShiftAllowed {
    Yes,
    No,
}

/// `ESC [ <digit> …` where the plain form is `<digit>~` and the modified
/// form is `<digit>;<mod>~`.
fn csi_tilde(buf: &[u8], base: Event, shift: ShiftAllowed) -> Identify {
    let Some(&second) = buf.get(2) else {
        return Identify::NeedMore;
    };
    match second {
        b'~' => Identify::Match(base, 3),
        b';' => modified_tilde(buf, base, shift),
        _ => Identify::NotMatched,
    }
}

/// The `…;<mod>~` tail shared by the tilde families; `buf[2]` is the `;`.
fn modified_tilde(buf: &[u8], base: Event, shift: ShiftAllowed) -> Identify {
    let Some(&digit) = buf.get(3) else {
        return Identify::NeedMore;
    };
    if digit == b'2' && shift == ShiftAllowed::No {
        return Identify::NotMatched;
    }
    let Some(modify) = modifier(digit) else {
        return Identify::NotMatched;
    };
    let Some(&fin) = buf.get(4) else {
        return Identify::NeedMore;
    };
    if fin != b'~' {
        return Identify::NotMatched;
    }
    Identify::Match(modify(base), 5)
}

/// Map an xterm modifier digit to the event transformation it encodes.
fn modifier(digit: u8) -> Option<fn(Event) -> Event> {
    match digit {
        b'1' => Some(Event::with_alt),
        b'2' => Some(Event::with_shift),
        b'5' => Some(Event::with_ctrl),
        _ => None,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
