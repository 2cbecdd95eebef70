use core::cell::RefCell;

use dishmint_core::config::{slot_index, DeviceConfig, PlayerId, WalletAddress, MAX_PLAYERS};
use dishmint_core::traits::{Confirmed, MintError, MintService, TxHandle};
use dishmint_protocol::messages::reject;
use dishmint_protocol::{GatewayEvent, GatewayRequest, LinkFrame, NO_HANDLE};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use embassy_time::{with_timeout, Duration, Instant};
use heapless::Vec;

/// Replies buffered per slot
///
/// A submission and its confirmation can arrive in one UART read, before
/// the waiting pipeline runs again; both must survive.
pub const REPLY_DEPTH: usize = 4;

/// Per-slot queue of gateway replies
pub type ReplyQueue<M> = Channel<M, GatewayEvent, REPLY_DEPTH>;

/// How long the gateway gets to answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayTimeouts {
    /// Until the mint request is accepted
    pub submit: Duration,
    /// Until a balance arrives
    pub balance: Duration,
}

impl Default for GatewayTimeouts {
    fn default() -> Self {
        Self {
            submit: Duration::from_secs(10),
            balance: Duration::from_secs(5),
        }
    }
}

/// Why a received event could not be delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RouteError {
    /// Event names a slot outside the player table
    UnknownSlot(u8),
    /// Reply or TX queue is full; the event was dropped
    QueueFull,
}

/// Map a gateway rejection code to the mint error it stands for
pub fn reject_to_error(code: u8) -> MintError {
    match code {
        reject::NETWORK => MintError::Network,
        reject::NOT_CONFIRMED => MintError::Timeout,
        reject::NO_AUTHORITY => MintError::Unavailable,
        other => MintError::Rejected(other),
    }
}

/// Mint service backed by the gateway link
///
/// Requests are correlated by player slot; each slot has at most one
/// pipeline in flight. Transactions are tracked by the handle the gateway
/// hands out, so replies for an earlier transaction are skipped.
pub struct GatewayClient<'a, M: RawMutex, const TX: usize> {
    config: &'a DeviceConfig,
    tx: &'a Channel<M, LinkFrame, TX>,
    replies: &'a [ReplyQueue<M>; MAX_PLAYERS],
    timeouts: GatewayTimeouts,
    /// Outstanding transaction handle per slot
    handles: Mutex<M, RefCell<Vec<(u32, PlayerId), MAX_PLAYERS>>>,
}

impl<'a, M: RawMutex, const TX: usize> GatewayClient<'a, M, TX> {
    pub fn new(
        config: &'a DeviceConfig,
        tx: &'a Channel<M, LinkFrame, TX>,
        replies: &'a [ReplyQueue<M>; MAX_PLAYERS],
        timeouts: GatewayTimeouts,
    ) -> Self {
        Self {
            config,
            tx,
            replies,
            timeouts,
            handles: Mutex::new(RefCell::new(Vec::new())),
        }
    }

    /// Deliver an event received from the gateway
    ///
    /// Heartbeats are answered here; everything else goes to the queue of
    /// the slot it names.
    pub fn route(&self, event: GatewayEvent) -> Result<(), RouteError> {
        let Some(slot) = event.slot() else {
            let pong = GatewayRequest::Pong
                .to_frame()
                .map_err(|_| RouteError::QueueFull)?;
            return self.tx.try_send(pong).map_err(|_| RouteError::QueueFull);
        };

        let index = slot_index(slot).ok_or(RouteError::UnknownSlot(slot))?;
        self.replies[index]
            .try_send(event)
            .map_err(|_| RouteError::QueueFull)
    }

    fn slot_for(&self, wallet: &WalletAddress) -> Result<PlayerId, MintError> {
        self.config
            .players
            .iter()
            .find(|p| &p.wallet == wallet)
            .map(|p| p.slot)
            .ok_or(MintError::Unavailable)
    }

    fn queue(&self, slot: PlayerId) -> Result<&ReplyQueue<M>, MintError> {
        slot_index(slot)
            .map(|index| &self.replies[index])
            .ok_or(MintError::Unavailable)
    }

    fn remember(&self, handle: u32, slot: PlayerId) {
        self.handles.lock(|handles| {
            let mut handles = handles.borrow_mut();
            handles.retain(|(_, s)| *s != slot);
            let _ = handles.push((handle, slot));
        });
    }

    fn slot_of_handle(&self, handle: u32) -> Option<PlayerId> {
        self.handles.lock(|handles| {
            handles
                .borrow()
                .iter()
                .find(|(h, _)| *h == handle)
                .map(|(_, s)| *s)
        })
    }

    /// Send a request for `slot` and wait for the first reply `accept` takes
    async fn request(
        &self,
        slot: PlayerId,
        request: GatewayRequest<'_>,
        timeout: Duration,
        on_timeout: MintError,
        mut accept: impl FnMut(GatewayEvent) -> Option<Result<u64, MintError>>,
    ) -> Result<u64, MintError> {
        let queue = self.queue(slot)?;
        let frame = request.to_frame().map_err(|_| MintError::Unavailable)?;

        // Anything still queued answers an earlier request
        while queue.try_receive().is_ok() {}
        self.tx.send(frame).await;

        await_reply(queue, timeout, on_timeout, &mut accept).await
    }
}

async fn await_reply<M: RawMutex>(
    queue: &ReplyQueue<M>,
    timeout: Duration,
    on_timeout: MintError,
    accept: &mut impl FnMut(GatewayEvent) -> Option<Result<u64, MintError>>,
) -> Result<u64, MintError> {
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let event = with_timeout(remaining, queue.receive())
            .await
            .map_err(|_| on_timeout)?;
        if let Some(result) = accept(event) {
            return result;
        }
        #[cfg(feature = "defmt")]
        defmt::trace!("stale gateway reply {:?}", event);
    }
}

impl<M: RawMutex, const TX: usize> MintService for GatewayClient<'_, M, TX> {
    async fn submit(&self, wallet: &WalletAddress, amount: u64) -> Result<TxHandle, MintError> {
        let slot = self.slot_for(wallet)?;
        let request = GatewayRequest::Mint {
            slot,
            wallet: *wallet.key(),
            amount,
        };

        // No acceptance from the gateway at all is a link problem
        let handle = self
            .request(slot, request, self.timeouts.submit, MintError::Network, |event| {
                match event {
                    GatewayEvent::Submitted { handle, .. } => Some(Ok(handle as u64)),
                    GatewayEvent::Rejected {
                        handle: NO_HANDLE,
                        code,
                        ..
                    } => Some(Err(reject_to_error(code))),
                    _ => None,
                }
            })
            .await? as u32;

        self.remember(handle, slot);
        Ok(TxHandle(handle))
    }

    async fn confirm(&self, handle: TxHandle, timeout: Duration) -> Result<Confirmed, MintError> {
        let slot = self.slot_of_handle(handle.0).ok_or(MintError::Unavailable)?;
        let queue = self.queue(slot)?;

        await_reply(queue, timeout, MintError::Timeout, &mut |event| match event {
            GatewayEvent::Confirmed { handle: h, .. } if h == handle.0 => Some(Ok(0)),
            GatewayEvent::Rejected { handle: h, code, .. } if h == handle.0 => {
                Some(Err(reject_to_error(code)))
            }
            _ => None,
        })
        .await?;

        Ok(Confirmed { handle })
    }

    async fn balance(&self, wallet: &WalletAddress) -> Result<u64, MintError> {
        let slot = self.slot_for(wallet)?;
        let request = GatewayRequest::Balance {
            slot,
            wallet: *wallet.key(),
        };

        self.request(slot, request, self.timeouts.balance, MintError::Timeout, |event| {
            match event {
                GatewayEvent::Balance { amount, .. } => Some(Ok(amount)),
                GatewayEvent::Rejected {
                    handle: NO_HANDLE,
                    code,
                    ..
                } => Some(Err(reject_to_error(code))),
                _ => None,
            }
        })
        .await
    }
}
