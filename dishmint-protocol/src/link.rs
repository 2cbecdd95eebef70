//! Framing for the controller ↔ gateway UART link.
//!
//! ```text
//! ┌───────┬────────┬──────┬─────────────┬──────────┐
//! │ 0xAA  │ LENGTH │ TYPE │ PAYLOAD     │ CHECKSUM │
//! │ 1B    │ 1B     │ 1B   │ 0–48B       │ 1B       │
//! └───────┴────────┴──────┴─────────────┴──────────┘
//! ```
//!
//! CHECKSUM is the XOR of LENGTH, TYPE and every payload byte.

use heapless::Vec;

/// Synchronisation byte
pub const LINK_START: u8 = 0xAA;

/// Largest payload carried by a link frame
pub const MAX_LINK_PAYLOAD: usize = 48;

/// START + LENGTH + TYPE + payload + CHECKSUM
pub const MAX_LINK_FRAME: usize = MAX_LINK_PAYLOAD + 4;

/// Link framing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Payload longer than [`MAX_LINK_PAYLOAD`]
    PayloadTooLarge,
    /// LENGTH byte announces an impossible payload
    BadLength,
    /// XOR checksum mismatch
    Checksum,
    /// Frame type or payload does not match any known message
    UnknownMessage,
}

/// One link frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFrame {
    pub kind: u8,
    pub payload: Vec<u8, MAX_LINK_PAYLOAD>,
}

fn xor_checksum(kind: u8, payload: &[u8]) -> u8 {
    payload
        .iter()
        .fold(payload.len() as u8 ^ kind, |acc, &b| acc ^ b)
}

impl LinkFrame {
    pub fn new(kind: u8, payload: &[u8]) -> Result<Self, LinkError> {
        let payload = Vec::from_slice(payload).map_err(|_| LinkError::PayloadTooLarge)?;
        Ok(Self { kind, payload })
    }

    pub fn empty(kind: u8) -> Self {
        Self {
            kind,
            payload: Vec::new(),
        }
    }

    /// Serialise to wire bytes
    pub fn encode(&self) -> Vec<u8, MAX_LINK_FRAME> {
        let mut out = Vec::new();
        // Capacity is sized for the largest payload, pushes cannot fail
        let _ = out.push(LINK_START);
        let _ = out.push(self.payload.len() as u8);
        let _ = out.push(self.kind);
        let _ = out.extend_from_slice(&self.payload);
        let _ = out.push(xor_checksum(self.kind, &self.payload));
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Start,
    Length,
    Kind,
    Payload,
    Checksum,
}

/// Streaming link parser
#[derive(Debug, Clone)]
pub struct LinkParser {
    expect: Expect,
    length: usize,
    kind: u8,
    payload: Vec<u8, MAX_LINK_PAYLOAD>,
}

impl Default for LinkParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkParser {
    pub const fn new() -> Self {
        Self {
            expect: Expect::Start,
            length: 0,
            kind: 0,
            payload: Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        self.expect = Expect::Start;
        self.length = 0;
        self.payload.clear();
    }

    /// Feed one byte; yields a frame when its checksum byte arrives
    pub fn push(&mut self, byte: u8) -> Result<Option<LinkFrame>, LinkError> {
        match self.expect {
            Expect::Start => {
                if byte == LINK_START {
                    self.expect = Expect::Length;
                }
            }
            Expect::Length => {
                if byte as usize > MAX_LINK_PAYLOAD {
                    self.reset();
                    return Err(LinkError::BadLength);
                }
                self.length = byte as usize;
                self.expect = Expect::Kind;
            }
            Expect::Kind => {
                self.kind = byte;
                self.payload.clear();
                self.expect = if self.length == 0 {
                    Expect::Checksum
                } else {
                    Expect::Payload
                };
            }
            Expect::Payload => {
                let _ = self.payload.push(byte);
                if self.payload.len() == self.length {
                    self.expect = Expect::Checksum;
                }
            }
            Expect::Checksum => {
                let ok = byte == xor_checksum(self.kind, &self.payload);
                let frame = LinkFrame {
                    kind: self.kind,
                    payload: self.payload.clone(),
                };
                self.reset();
                return if ok {
                    Ok(Some(frame))
                } else {
                    Err(LinkError::Checksum)
                };
            }
        }
        Ok(None)
    }
}
