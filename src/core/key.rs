//! Keyboard input decoding.
//!
//! Raw-mode reads deliver bytes one at a time, with a ~100 ms timeout
//! when nothing arrives. Multi-byte escape sequences therefore trickle
//! in across several reads, and a lone ESC press is indistinguishable
//! from the start of a sequence until the follow-up byte times out.
//! The decoder is an explicit state machine so that rule — incomplete
//! sequence degrades to a bare ESC — holds mechanically.

use std::io;

const ESC: u8 = 0x1b;
const DEL: u8 = 0x7f;

/// The closed set of logical key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A plain printable or control byte.
    Byte(u8),
    Esc,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Backspace,
}

/// One byte per call, `Ok(None)` on read timeout.
pub trait ByteSource {
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    SawEsc,
    SawBracket,
    SawDigit(u8),
    SawO,
}

/// Incremental escape-sequence decoder.
#[derive(Debug)]
pub struct KeyDecoder {
    state: State,
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self { state: State::Idle }
    }

    /// Feed one byte; returns a key once a full event is recognized.
    ///
    /// Bytes consumed by a sequence that turns out to be unrecognized
    /// are dropped and the whole sequence collapses to `Key::Esc`.
    pub fn feed(&mut self, byte: u8) -> Option<Key> {
        match self.state {
            State::Idle => match byte {
                ESC => {
                    self.state = State::SawEsc;
                    None
                }
                DEL => Some(Key::Backspace),
                _ => Some(Key::Byte(byte)),
            },
            State::SawEsc => match byte {
                b'[' => {
                    self.state = State::SawBracket;
                    None
                }
                b'O' => {
                    self.state = State::SawO;
                    None
                }
                _ => self.reset(Key::Esc),
            },
            State::SawBracket => match byte {
                b'0'..=b'9' => {
                    self.state = State::SawDigit(byte);
                    None
                }
                b'A' => self.reset(Key::ArrowUp),
                b'B' => self.reset(Key::ArrowDown),
                b'C' => self.reset(Key::ArrowRight),
                b'D' => self.reset(Key::ArrowLeft),
                b'H' => self.reset(Key::Home),
                b'F' => self.reset(Key::End),
                _ => self.reset(Key::Esc),
            },
            State::SawDigit(digit) => {
                let key = if byte == b'~' {
                    match digit {
                        b'1' | b'7' => Key::Home,
                        b'3' => Key::Delete,
                        b'4' | b'8' => Key::End,
                        b'5' => Key::PageUp,
                        b'6' => Key::PageDown,
                        _ => Key::Esc,
                    }
                } else {
                    Key::Esc
                };
                self.reset(key)
            }
            State::SawO => match byte {
                b'H' => self.reset(Key::Home),
                b'F' => self.reset(Key::End),
                _ => self.reset(Key::Esc),
            },
        }
    }

    /// A read timeout mid-sequence degrades to a bare ESC.
    pub fn on_timeout(&mut self) -> Option<Key> {
        if self.state == State::Idle {
            None
        } else {
            self.reset(Key::Esc)
        }
    }

    fn reset(&mut self, key: Key) -> Option<Key> {
        self.state = State::Idle;
        Some(key)
    }
}

impl Default for KeyDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Block (modulo the source's read timeout) until one logical key event
/// is available.
pub fn read_key<S: ByteSource>(source: &mut S, decoder: &mut KeyDecoder) -> io::Result<Key> {
    loop {
        match source.read_byte()? {
            Some(byte) => {
                if let Some(key) = decoder.feed(byte) {
                    return Ok(key);
                }
            }
            None => {
                if let Some(key) = decoder.on_timeout() {
                    return Ok(key);
                }
            }
        }
    }
}
