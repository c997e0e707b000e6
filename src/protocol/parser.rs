// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Byte-at-a-time frame parser for the inter-board link.
//!
//! The parser never blocks and never allocates. Feed it every byte pulled off the UART; it hands
//! back a [`RawFrame`] view once a checksum-valid frame completes. Corrupt frames are dropped and
//! the parser resynchronizes on the next magic byte.

use heapless::Vec;

use crate::protocol::frame::{MAGIC, MAX_PAYLOAD};

enum State {
    Magic,
    Type,
    Length,
    Payload,
    Checksum,
}

/// A checksum-valid frame, not yet semantically validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFrame<'a> {
    pub frame_type: u8,
    pub payload: &'a [u8],
}

/// Running counters, useful when diagnosing a noisy link.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParserStats {
    pub frames: u32,
    pub checksum_errors: u32,
    pub length_errors: u32,
}

pub struct Parser {
    state: State,
    frame_type: u8,
    length: usize,
    checksum: u8,
    payload: Vec<u8, MAX_PAYLOAD>,
    stats: ParserStats,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            state: State::Magic,
            frame_type: 0,
            length: 0,
            checksum: 0,
            payload: Vec::new(),
            stats: ParserStats::default(),
        }
    }

    /// Drop any partial frame and wait for the next magic byte.
    pub fn reset(&mut self) {
        self.state = State::Magic;
        self.frame_type = 0;
        self.length = 0;
        self.checksum = 0;
        self.payload.clear();
    }

    #[inline]
    pub fn stats(&self) -> ParserStats {
        self.stats
    }

    /// Process a single incoming byte. Returns `Some(RawFrame)` if a complete, checksum-valid frame
    /// was received.
    pub fn push(&mut self, byte: u8) -> Option<RawFrame<'_>> {
        match self.state {
            State::Magic => {
                if byte == MAGIC {
                    self.reset();
                    self.state = State::Type;
                }
            }
            State::Type => {
                self.frame_type = byte;
                self.state = State::Length;
            }
            State::Length => {
                let length = byte as usize;
                if length > MAX_PAYLOAD {
                    self.stats.length_errors = self.stats.length_errors.wrapping_add(1);
                    #[cfg(feature = "defmt")]
                    defmt::trace!("link: declared length {} exceeds capacity", length);
                    self.reset();
                    return None;
                }

                self.length = length;
                self.checksum = self.frame_type ^ byte;
                self.state = if length == 0 {
                    State::Checksum
                } else {
                    State::Payload
                };
            }
            State::Payload => {
                // Capacity was checked against the declared length, so this cannot overflow.
                if self.payload.push(byte).is_err() {
                    self.stats.length_errors = self.stats.length_errors.wrapping_add(1);
                    self.reset();
                    return None;
                }
                self.checksum ^= byte;
                if self.payload.len() == self.length {
                    self.state = State::Checksum;
                }
            }
            State::Checksum => {
                self.state = State::Magic;

                if byte != self.checksum {
                    self.stats.checksum_errors = self.stats.checksum_errors.wrapping_add(1);
                    #[cfg(feature = "defmt")]
                    defmt::trace!(
                        "link: checksum mismatch (got {:#x}, want {:#x})",
                        byte,
                        self.checksum
                    );
                    return None;
                }

                self.stats.frames = self.stats.frames.wrapping_add(1);
                return Some(RawFrame {
                    frame_type: self.frame_type,
                    payload: self.payload.as_slice(),
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::frame::{encode, MAX_FRAME_LEN};

    fn frame(frame_type: u8, payload: &[u8]) -> std::vec::Vec<u8> {
        let mut out = [0u8; MAX_FRAME_LEN];
        let n = encode(frame_type, payload, &mut out).unwrap();
        out[..n].to_vec()
    }

    /// Feed bytes and collect every dispatched frame as owned data.
    fn feed(parser: &mut Parser, bytes: &[u8]) -> std::vec::Vec<(u8, std::vec::Vec<u8>)> {
        let mut out = std::vec::Vec::new();
        for &b in bytes {
            if let Some(raw) = parser.push(b) {
                out.push((raw.frame_type, raw.payload.to_vec()));
            }
        }
        out
    }

    #[test]
    fn round_trips_assorted_frames() {
        let long: std::vec::Vec<u8> = (0..MAX_PAYLOAD as u8).collect();
        let cases: [(u8, &[u8]); 5] = [
            (0x01, long.as_slice()),
            (0x02, &[0xA5, 0xA5, 0x00]),
            (0x81, &[1, 2, 3, 4]),
            (0x7F, &[]),
            (0xA5, &[0xFF]),
        ];

        for (frame_type, payload) in cases {
            let mut parser = Parser::new();
            let got = feed(&mut parser, &frame(frame_type, payload));
            assert_eq!(got, vec![(frame_type, payload.to_vec())]);
        }
    }

    #[test]
    fn discards_noise_before_magic() {
        let mut parser = Parser::new();
        let mut bytes = vec![0x00, 0x13, 0x37, 0xFF];
        bytes.extend(frame(0x81, &[9, 8, 7, 6]));

        assert_eq!(feed(&mut parser, &bytes), vec![(0x81, vec![9, 8, 7, 6])]);
    }

    #[test]
    fn every_single_bit_flip_is_dropped() {
        let good = frame(0x02, &[0x11, 0x22, 0x33, 0x44, 0x55]);

        for byte_idx in 1..good.len() {
            for bit in 0..8 {
                let mut bad = good.clone();
                bad[byte_idx] ^= 1 << bit;

                let mut parser = Parser::new();
                let got = feed(&mut parser, &bad);
                assert!(
                    got.is_empty(),
                    "flip of byte {} bit {} produced {:?}",
                    byte_idx,
                    bit,
                    got
                );
            }
        }
    }

    #[test]
    fn resynchronizes_after_corrupt_frame() {
        let mut corrupt = frame(0x02, &[1, 2, 3]);
        let last = corrupt.len() - 1;
        corrupt[last] ^= 0x40;

        let mut bytes = corrupt;
        bytes.extend(frame(0x81, &[4, 3, 2, 1]));

        let mut parser = Parser::new();
        assert_eq!(feed(&mut parser, &bytes), vec![(0x81, vec![4, 3, 2, 1])]);
        assert_eq!(parser.stats().checksum_errors, 1);
        assert_eq!(parser.stats().frames, 1);
    }

    #[test]
    fn oversized_length_aborts_immediately() {
        let mut parser = Parser::new();
        let mut bytes = vec![MAGIC, 0x01, (MAX_PAYLOAD + 1) as u8];
        bytes.extend(frame(0x02, &[0xAB]));

        assert_eq!(feed(&mut parser, &bytes), vec![(0x02, vec![0xAB])]);
        assert_eq!(parser.stats().length_errors, 1);
    }

    #[test]
    fn truncated_frame_followed_by_valid_frame() {
        // A frame cut short mid-payload swallows the start of the next one; the one after that
        // must still come through.
        let mut bytes = frame(0x02, &[1, 2, 3, 4, 5, 6, 7, 8]);
        bytes.truncate(5);
        bytes.extend(frame(0x81, &[0, 0, 0x30, 0x41]));
        bytes.extend(frame(0x81, &[0, 0, 0x40, 0x41]));

        let mut parser = Parser::new();
        let got = feed(&mut parser, &bytes);
        assert_eq!(got.last(), Some(&(0x81, vec![0, 0, 0x40, 0x41])));
    }
}
