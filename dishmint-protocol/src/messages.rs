//! Messages exchanged with the gateway
//!
//! - Controller → Gateway: mint and balance requests, screen drawing, heartbeat replies
//! - Gateway → Controller: transaction progress, balances, heartbeat requests
//!
//! Every message names the player slot it concerns; a slot never has more than
//! one request outstanding, so the slot doubles as the correlation id.

use crate::link::{LinkError, LinkFrame, MAX_LINK_PAYLOAD};
use heapless::Vec;

// Gateway → Controller
pub const MSG_SUBMITTED: u8 = 0x01;
pub const MSG_CONFIRMED: u8 = 0x02;
pub const MSG_REJECTED: u8 = 0x03;
pub const MSG_BALANCE: u8 = 0x04;
pub const MSG_PING: u8 = 0x05;

// Controller → Gateway
pub const MSG_MINT: u8 = 0x10;
pub const MSG_BALANCE_REQUEST: u8 = 0x11;
pub const MSG_CLEAR: u8 = 0x20;
pub const MSG_TEXT: u8 = 0x21;
pub const MSG_PONG: u8 = 0x24;

/// Raw public key length
pub const WALLET_LEN: usize = 32;

/// Longest text run in one `Text` message
pub const MAX_TEXT_LEN: usize = 40;

/// Handle carried by a rejection that happened before a transaction existed
pub const NO_HANDLE: u32 = 0;

/// Rejection codes carried by [`GatewayEvent::Rejected`]
pub mod reject {
    /// Chain RPC unreachable
    pub const NETWORK: u8 = 0x01;
    /// Transaction failed or was dropped
    pub const TRANSACTION_FAILED: u8 = 0x02;
    /// Confirmation not observed in time on the gateway side
    pub const NOT_CONFIRMED: u8 = 0x03;
    /// Gateway has no mint authority loaded
    pub const NO_AUTHORITY: u8 = 0x04;
}

/// Requests sent by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GatewayRequest<'a> {
    /// Mint `amount` base units to `wallet`
    Mint {
        slot: u8,
        wallet: [u8; WALLET_LEN],
        amount: u64,
    },
    /// Read the token balance of `wallet`
    Balance { slot: u8, wallet: [u8; WALLET_LEN] },
    /// Clear the scoreboard
    Clear,
    /// Draw text at a character position
    Text { row: u8, col: u8, text: &'a str },
    /// Heartbeat reply
    Pong,
}

impl GatewayRequest<'_> {
    pub fn to_frame(&self) -> Result<LinkFrame, LinkError> {
        let mut payload = Vec::<u8, MAX_LINK_PAYLOAD>::new();
        let kind = match self {
            GatewayRequest::Mint {
                slot,
                wallet,
                amount,
            } => {
                push_all(&mut payload, &[*slot])?;
                push_all(&mut payload, wallet)?;
                push_all(&mut payload, &amount.to_be_bytes())?;
                MSG_MINT
            }
            GatewayRequest::Balance { slot, wallet } => {
                push_all(&mut payload, &[*slot])?;
                push_all(&mut payload, wallet)?;
                MSG_BALANCE_REQUEST
            }
            GatewayRequest::Clear => MSG_CLEAR,
            GatewayRequest::Text { row, col, text } => {
                let bytes = text.as_bytes();
                let len = bytes.len().min(MAX_TEXT_LEN);
                push_all(&mut payload, &[*row, *col, len as u8])?;
                push_all(&mut payload, &bytes[..len])?;
                MSG_TEXT
            }
            GatewayRequest::Pong => MSG_PONG,
        };
        Ok(LinkFrame { kind, payload })
    }
}

fn push_all(payload: &mut Vec<u8, MAX_LINK_PAYLOAD>, bytes: &[u8]) -> Result<(), LinkError> {
    payload
        .extend_from_slice(bytes)
        .map_err(|_| LinkError::PayloadTooLarge)
}

/// Events received from the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GatewayEvent {
    /// Mint transaction accepted by the RPC node
    Submitted { slot: u8, handle: u32 },
    /// Transaction reached the configured commitment
    Confirmed { slot: u8, handle: u32 },
    /// Request failed, see [`reject`]
    ///
    /// `handle` names the failed transaction, or is [`NO_HANDLE`] when a
    /// mint or balance request was refused outright.
    Rejected { slot: u8, handle: u32, code: u8 },
    /// Balance in base units
    Balance { slot: u8, amount: u64 },
    /// Heartbeat request
    Ping,
}

impl GatewayEvent {
    pub fn from_frame(frame: &LinkFrame) -> Result<Self, LinkError> {
        let p = &frame.payload[..];
        match (frame.kind, p.len()) {
            (MSG_SUBMITTED, 5) => Ok(GatewayEvent::Submitted {
                slot: p[0],
                handle: read_u32(&p[1..5]),
            }),
            (MSG_CONFIRMED, 5) => Ok(GatewayEvent::Confirmed {
                slot: p[0],
                handle: read_u32(&p[1..5]),
            }),
            (MSG_REJECTED, 6) => Ok(GatewayEvent::Rejected {
                slot: p[0],
                handle: read_u32(&p[1..5]),
                code: p[5],
            }),
            (MSG_BALANCE, 9) => {
                let mut amount = [0u8; 8];
                amount.copy_from_slice(&p[1..9]);
                Ok(GatewayEvent::Balance {
                    slot: p[0],
                    amount: u64::from_be_bytes(amount),
                })
            }
            (MSG_PING, 0) => Ok(GatewayEvent::Ping),
            _ => Err(LinkError::UnknownMessage),
        }
    }

    /// Encode (gateway side, also used by tests)
    pub fn to_frame(&self) -> Result<LinkFrame, LinkError> {
        match *self {
            GatewayEvent::Submitted { slot, handle } => {
                let h = handle.to_be_bytes();
                LinkFrame::new(MSG_SUBMITTED, &[slot, h[0], h[1], h[2], h[3]])
            }
            GatewayEvent::Confirmed { slot, handle } => {
                let h = handle.to_be_bytes();
                LinkFrame::new(MSG_CONFIRMED, &[slot, h[0], h[1], h[2], h[3]])
            }
            GatewayEvent::Rejected { slot, handle, code } => {
                let h = handle.to_be_bytes();
                LinkFrame::new(MSG_REJECTED, &[slot, h[0], h[1], h[2], h[3], code])
            }
            GatewayEvent::Balance { slot, amount } => {
                let mut payload = [0u8; 9];
                payload[0] = slot;
                payload[1..].copy_from_slice(&amount.to_be_bytes());
                LinkFrame::new(MSG_BALANCE, &payload)
            }
            GatewayEvent::Ping => Ok(LinkFrame::empty(MSG_PING)),
        }
    }

    /// Player slot this event concerns
    pub fn slot(&self) -> Option<u8> {
        match *self {
            GatewayEvent::Submitted { slot, .. }
            | GatewayEvent::Confirmed { slot, .. }
            | GatewayEvent::Rejected { slot, .. }
            | GatewayEvent::Balance { slot, .. } => Some(slot),
            GatewayEvent::Ping => None,
        }
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_be_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_request_layout() {
        let wallet = [0x11; WALLET_LEN];
        let frame = GatewayRequest::Mint {
            slot: 2,
            wallet,
            amount: 1_000_000_000,
        }
        .to_frame()
        .unwrap();

        assert_eq!(frame.kind, MSG_MINT);
        assert_eq!(frame.payload.len(), 1 + WALLET_LEN + 8);
        assert_eq!(frame.payload[0], 2);
        assert_eq!(&frame.payload[1..33], &wallet);
        assert_eq!(&frame.payload[33..], &1_000_000_000u64.to_be_bytes());
    }

    #[test]
    fn test_text_request_truncates() {
        let long = "0123456789012345678901234567890123456789ABCDEF";
        let frame = GatewayRequest::Text {
            row: 3,
            col: 0,
            text: long,
        }
        .to_frame()
        .unwrap();
        assert_eq!(frame.kind, MSG_TEXT);
        assert_eq!(frame.payload[2] as usize, MAX_TEXT_LEN);
        assert_eq!(frame.payload.len(), 3 + MAX_TEXT_LEN);
    }

    #[test]
    fn test_gateway_events_decode() {
        let events = [
            GatewayEvent::Submitted { slot: 1, handle: 0xCAFE_0001 },
            GatewayEvent::Confirmed { slot: 1, handle: 0xCAFE_0001 },
            GatewayEvent::Rejected { slot: 2, handle: NO_HANDLE, code: reject::NETWORK },
            GatewayEvent::Rejected { slot: 1, handle: 0xCAFE_0001, code: reject::NOT_CONFIRMED },
            GatewayEvent::Balance { slot: 2, amount: 7_000_000_000 },
            GatewayEvent::Ping,
        ];
        for event in events {
            let frame = event.to_frame().unwrap();
            assert_eq!(GatewayEvent::from_frame(&frame), Ok(event));
        }
    }

    #[test]
    fn test_rejection_carries_handle() {
        let frame = GatewayEvent::Rejected { slot: 3, handle: 0x0102_0304, code: reject::TRANSACTION_FAILED }
            .to_frame()
            .unwrap();
        assert_eq!(frame.kind, MSG_REJECTED);
        assert_eq!(&frame.payload[..], &[3, 1, 2, 3, 4, reject::TRANSACTION_FAILED]);

        // The two-byte form without a handle is no longer accepted
        let short = LinkFrame::new(MSG_REJECTED, &[3, reject::NETWORK]).unwrap();
        assert_eq!(GatewayEvent::from_frame(&short), Err(LinkError::UnknownMessage));
    }

    #[test]
    fn test_wrong_payload_length_rejected() {
        let frame = LinkFrame::new(MSG_SUBMITTED, &[1, 2, 3]).unwrap();
        assert_eq!(GatewayEvent::from_frame(&frame), Err(LinkError::UnknownMessage));

        let frame = LinkFrame::empty(0x7F);
        assert_eq!(GatewayEvent::from_frame(&frame), Err(LinkError::UnknownMessage));
    }

    #[test]
    fn test_slot_accessor() {
        let rejected = GatewayEvent::Rejected { slot: 4, handle: NO_HANDLE, code: 1 };
        assert_eq!(rejected.slot(), Some(4));
        assert_eq!(GatewayEvent::Ping.slot(), None);
    }
}
