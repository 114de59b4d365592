// SPDX-License-Identifier: MIT
//
// Input decoding — raw tty bytes to events.
//
// The terminal hands us an arbitrary byte stream: plain ASCII, control
// bytes, multi-byte UTF-8, and escape sequences that may arrive split
// across reads. A small rolling buffer absorbs the fragmentation; the
// decoder takes whatever is at the head and produces at most one event
// per call, consuming exactly the bytes that event used.
//
// A lone ESC is ambiguous: it may be the Escape key or the start of a
// sequence still in flight. While the buffered bytes form a valid
// sequence prefix the decoder waits; once they diverge, the ESC is
// surfaced alone and the tail decodes as ordinary input. There is no
// timeout — an Escape pressed right before an arrow key can fuse with
// it, which is accepted.

use crate::escape::{self, Identify};
use crate::event::Event;

/// Rolling buffer capacity — must hold ESC plus the longest escape
/// sequence.
pub const RX_CAPACITY: usize = 8;

const ESC: u8 = 0x1B;

/// The small byte buffer between the tty and the event decoder.
#[derive(Debug, Default)]
pub struct InputBuffer {
    buf: [u8; RX_CAPACITY],
    filled: usize,
}

impl InputBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes currently buffered.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.filled
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// The buffered bytes, oldest first.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.filled]
    }

    /// Unfilled tail for an fd read to write into; commit with
    /// [`advance`](Self::advance).
    #[inline]
    pub fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.filled..]
    }

    /// Commit `n` bytes previously written into
    /// [`spare_mut`](Self::spare_mut).
    #[inline]
    pub fn advance(&mut self, n: usize) {
        debug_assert!(self.filled + n <= RX_CAPACITY);
        self.filled += n;
    }

    /// Copy in as many of `bytes` as fit; returns how many were taken.
    pub fn feed(&mut self, bytes: &[u8]) -> usize {
        let take = bytes.len().min(RX_CAPACITY - self.filled);
        self.buf[self.filled..self.filled + take].copy_from_slice(&bytes[..take]);
        self.filled += take;
        take
    }

    /// Drop the first `n` buffered bytes.
    pub fn consume(&mut self, n: usize) {
        if n < self.filled {
            self.buf.copy_within(n..self.filled, 0);
            self.filled -= n;
        } else {
            self.filled = 0;
        }
    }

    /// Decode one event from the head of the buffer.
    ///
    /// Returns `None` when the buffer is empty or holds only an
    /// incomplete multi-byte sequence (UTF-8 tail or escape-sequence
    /// prefix). Invalid bytes are dropped one at a time to resynchronise.
    pub fn next_event(&mut self) -> Option<Event> {
        loop {
            if self.filled == 0 {
                return None;
            }
            let head = self.buf[0];

            // ESC introduces a sequence — or stands alone.
            if head == ESC {
                match escape::identify(&self.buf[1..self.filled]) {
                    Identify::Match(event, used) => {
                        self.consume(1 + used);
                        return Some(event);
                    }
                    Identify::NeedMore => return None,
                    Identify::NotMatched => {
                        self.consume(1);
                        return Some(Event::ESCAPE);
                    }
                }
            }

            // Ctrl+letter arrives as 1..=26 (this covers Tab and Enter).
            if (1..=26).contains(&head) {
                self.consume(1);
                return Some(Event::from_ctrl_letter(u32::from(head)));
            }

            // NUL carries no key identity; drop it.
            if head == 0 {
                self.consume(1);
                continue;
            }

            // Plain ASCII.
            if head < 0x80 {
                self.consume(1);
                return Some(Event::from_char(char::from(head)));
            }

            // UTF-8 multi-byte.
            let need = utf8_len(head);
            if need == 0 {
                // Continuation byte or invalid lead: drop one byte.
                self.consume(1);
                continue;
            }
            if self.filled < need {
                // Incomplete sequence: wait for the rest.
                return None;
            }
            match std::str::from_utf8(&self.buf[..need]) {
                Ok(s) => {
                    let ch = s.chars().next()?;
                    self.consume(need);
                    return Some(Event::from_char(ch));
                }
                Err(_) => {
                    self.consume(1);
                    continue;
                }
            }
        }
    }
}

/// Total byte length of a UTF-8 character from its lead byte; 0 for
/// continuation bytes and invalid leads.
const fn utf8_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Feed bytes and collect every decodable event.
    fn decode_all(bytes: &[u8]) -> Vec<Event> {
        let mut input = InputBuffer::new();
        let mut events = Vec::new();
        let mut offset = 0;
        while offset < bytes.len() {
            offset += input.feed(&bytes[offset..]);
            while let Some(event) = input.next_event() {
                events.push(event);
            }
        }
        while let Some(event) = input.next_event() {
            events.push(event);
        }
        events
    }

    // ── Buffer mechanics ────────────────────────────────────────────────

    #[test]
    fn feed_respects_capacity() {
        let mut input = InputBuffer::new();
        let taken = input.feed(&[b'a'; 20]);
        assert_eq!(taken, RX_CAPACITY);
        assert_eq!(input.len(), RX_CAPACITY);
        assert_eq!(input.feed(b"x"), 0);
    }

    #[test]
    fn consume_shifts_remaining_bytes() {
        let mut input = InputBuffer::new();
        input.feed(b"abcd");
        input.consume(2);
        assert_eq!(input.as_bytes(), b"cd");
        input.consume(10);
        assert!(input.is_empty());
    }

    #[test]
    fn spare_and_advance_append() {
        let mut input = InputBuffer::new();
        input.feed(b"ab");
        let spare = input.spare_mut();
        spare[0] = b'c';
        input.advance(1);
        assert_eq!(input.as_bytes(), b"abc");
    }

    // ── Plain input ─────────────────────────────────────────────────────

    #[test]
    fn ascii_characters() {
        assert_eq!(
            decode_all(b"ab"),
            vec![Event::from_char('a'), Event::from_char('b')]
        );
    }

    #[test]
    fn control_letters() {
        assert_eq!(decode_all(&[0x01]), vec![Event::from_char('A').with_ctrl()]);
        assert_eq!(decode_all(&[0x03]), vec![Event::CTRL_C]);
        assert_eq!(decode_all(&[0x09]), vec![Event::TAB]);
        assert_eq!(decode_all(&[0x0D]), vec![Event::ENTER]);
        assert_eq!(decode_all(&[0x1A]), vec![Event::from_char('Z').with_ctrl()]);
    }

    #[test]
    fn backspace_is_a_plain_codepoint() {
        assert_eq!(decode_all(&[0x7F]), vec![Event::BACKSPACE]);
    }

    #[test]
    fn nul_byte_produces_nothing() {
        assert!(decode_all(&[0x00]).is_empty());
        assert_eq!(decode_all(&[0x00, b'a']), vec![Event::from_char('a')]);
    }

    // ── UTF-8 ───────────────────────────────────────────────────────────

    #[test]
    fn two_byte_utf8() {
        assert_eq!(decode_all("é".as_bytes()), vec![Event::from_char('é')]);
    }

    #[test]
    fn three_byte_utf8() {
        assert_eq!(decode_all("中".as_bytes()), vec![Event::from_char('中')]);
    }

    #[test]
    fn four_byte_utf8() {
        assert_eq!(decode_all("🦀".as_bytes()), vec![Event::from_char('🦀')]);
    }

    #[test]
    fn utf8_split_across_feeds() {
        let bytes = "中".as_bytes();
        let mut input = InputBuffer::new();
        input.feed(&bytes[..1]);
        assert_eq!(input.next_event(), None);
        assert_eq!(input.len(), 1, "incomplete sequence must stay buffered");
        input.feed(&bytes[1..]);
        assert_eq!(input.next_event(), Some(Event::from_char('中')));
        assert!(input.is_empty());
    }

    #[test]
    fn stray_continuation_byte_resynchronises() {
        assert_eq!(decode_all(&[0x80, b'a']), vec![Event::from_char('a')]);
    }

    #[test]
    fn invalid_lead_resynchronises() {
        assert_eq!(decode_all(&[0xFF, b'x']), vec![Event::from_char('x')]);
    }

    #[test]
    fn truncated_sequence_followed_by_ascii_drops_bad_bytes() {
        // 0xE4 expects two continuations; 'a' breaks the sequence. The
        // decoder drops 0xE4, then the orphan continuation, then sees 'a'.
        assert_eq!(decode_all(&[0xE4, 0xB8, b'a']), vec![Event::from_char('a')]);
    }

    // ── Escape sequences ────────────────────────────────────────────────

    #[test]
    fn complete_csi_sequence_is_one_event() {
        let events = decode_all(b"\x1b[1;5D");
        assert_eq!(events, vec![Event::ARROW_LEFT.with_ctrl()]);
    }

    #[test]
    fn complete_ss3_sequence_is_one_event() {
        assert_eq!(decode_all(b"\x1bOA"), vec![Event::ARROW_UP]);
    }

    #[test]
    fn partial_sequence_stays_buffered() {
        let mut input = InputBuffer::new();
        input.feed(b"\x1b[1");
        assert_eq!(input.next_event(), None);
        assert_eq!(input.as_bytes(), b"\x1b[1");
    }

    #[test]
    fn partial_sequence_completes_on_next_feed() {
        let mut input = InputBuffer::new();
        input.feed(b"\x1b[1");
        assert_eq!(input.next_event(), None);
        input.feed(b";5D");
        assert_eq!(input.next_event(), Some(Event::ARROW_LEFT.with_ctrl()));
        assert!(input.is_empty());
    }

    #[test]
    fn byte_at_a_time_arrow() {
        let mut input = InputBuffer::new();
        let mut events = Vec::new();
        for &byte in b"\x1b[1;2A" {
            input.feed(&[byte]);
            while let Some(event) = input.next_event() {
                events.push(event);
            }
        }
        assert_eq!(events, vec![Event::ARROW_UP.with_shift()]);
    }

    #[test]
    fn unmatched_escape_surfaces_alone_and_tail_decodes() {
        let events = decode_all(b"\x1bx");
        assert_eq!(events, vec![Event::ESCAPE, Event::from_char('x')]);
    }

    #[test]
    fn lone_escape_waits_for_more_input() {
        let mut input = InputBuffer::new();
        input.feed(b"\x1b");
        assert_eq!(input.next_event(), None);
        assert_eq!(input.len(), 1);
    }

    #[test]
    fn double_escape_yields_escape_then_waits() {
        let mut input = InputBuffer::new();
        input.feed(b"\x1b\x1b");
        // ESC ESC is not a sequence prefix: first ESC surfaces, the
        // second waits for more data.
        assert_eq!(input.next_event(), Some(Event::ESCAPE));
        assert_eq!(input.next_event(), None);
        assert_eq!(input.as_bytes(), b"\x1b");
    }

    #[test]
    fn sequence_followed_by_text() {
        let events = decode_all(b"\x1b[3~ok");
        assert_eq!(
            events,
            vec![
                Event::DELETE,
                Event::from_char('o'),
                Event::from_char('k')
            ]
        );
    }

    #[test]
    fn back_to_back_sequences() {
        let events = decode_all(b"\x1bOA\x1bOB");
        assert_eq!(events, vec![Event::ARROW_UP, Event::ARROW_DOWN]);
    }

    #[test]
    fn capacity_holds_the_longest_sequence() {
        assert!(RX_CAPACITY > escape::MAX_SEQUENCE_LEN + 1);
    }
}
