use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{with_timeout, Instant, Timer};
use heapless::Vec;

use crate::config::{ConfigError, DeviceConfig, PlayerConfig, PlayerId, MAX_PLAYERS};
use crate::input::PressEvent;
use crate::state::{Outcome, PipelineEvent, Stage};
use crate::traits::{AudioOutput, MintError, MintService, PlayerUpdate, RewardObserver, Status};

/// One in-flight reward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RewardRequest {
    pub player: PlayerId,
    /// Base units to mint
    pub amount: u64,
    pub created_at: Instant,
    pub stage: Stage,
    pub last_error: Option<MintError>,
}

#[derive(Debug)]
struct PlayerSlot {
    player: PlayerId,
    /// Confirmed whole tokens
    count: u64,
    request: Option<RewardRequest>,
    last_error: Option<MintError>,
}

impl PlayerSlot {
    fn stage(&self) -> Stage {
        self.request.map(|r| r.stage).unwrap_or(Stage::Idle)
    }
}

/// Per-player reward pipelines
///
/// The slot table sits behind a blocking mutex that is only taken for short
/// synchronous updates, never across an `.await`. Pipelines of different
/// players share nothing else, so one player's slow confirmation never
/// holds up another.
pub struct RewardOrchestrator<'a, M: RawMutex> {
    config: &'a DeviceConfig,
    base_units: u64,
    slots: Mutex<M, RefCell<Vec<PlayerSlot, MAX_PLAYERS>>>,
}

impl<'a, M: RawMutex> RewardOrchestrator<'a, M> {
    pub fn new(config: &'a DeviceConfig) -> Result<Self, ConfigError> {
        let base_units = config.reward.base_units().ok_or(ConfigError::AmountOverflow)?;
        let slots = config
            .players
            .iter()
            .map(|p| PlayerSlot {
                player: p.slot,
                count: 0,
                request: None,
                last_error: None,
            })
            .collect();

        Ok(Self {
            config,
            base_units,
            slots: Mutex::new(RefCell::new(slots)),
        })
    }

    fn with_slot<R>(&self, player: PlayerId, f: impl FnOnce(&mut PlayerSlot) -> R) -> Option<R> {
        self.slots.lock(|slots| {
            let mut slots = slots.borrow_mut();
            slots.iter_mut().find(|s| s.player == player).map(f)
        })
    }

    /// Apply `event` to the player's pipeline and return the new stage
    fn advance(&self, player: PlayerId, event: PipelineEvent) -> Stage {
        self.with_slot(player, |slot| {
            let Some(request) = slot.request.as_mut() else {
                return Stage::Idle;
            };
            let next = request.stage.transition(event);
            request.stage = next;
            if let PipelineEvent::Failed(err) = event {
                request.last_error = Some(err);
                slot.last_error = Some(err);
            }
            if next.is_idle() {
                slot.request = None;
            }
            next
        })
        .unwrap_or(Stage::Idle)
    }

    fn notify<O: RewardObserver>(&self, observer: &O, player: PlayerId, status: Option<Status>) {
        let count = self.count(player).unwrap_or(0);
        observer.on_update(PlayerUpdate {
            player,
            count,
            status,
        });
    }

    /// Start a pipeline for `player` if it is idle
    ///
    /// Returns `None` for unknown players and for players that already have
    /// a request outstanding; such presses are dropped, not queued.
    pub fn try_trigger(&self, player: PlayerId, now: Instant) -> Option<RewardRequest> {
        let amount = self.base_units;
        let started = self.with_slot(player, |slot| {
            if slot.stage().is_busy() {
                return None;
            }
            let request = RewardRequest {
                player,
                amount,
                created_at: now,
                stage: Stage::Idle.transition(PipelineEvent::Press),
                last_error: None,
            };
            slot.request = Some(request);
            Some(request)
        });

        match started {
            None => {
                warn!("press from unknown player {}", player);
                None
            }
            Some(None) => {
                debug!("player {} busy, press ignored", player);
                None
            }
            Some(request) => request,
        }
    }

    /// Run a triggered pipeline to completion, including the settle hold
    ///
    /// Returns `None` if `player` has no triggered request.
    pub async fn run<A, S, O>(
        &self,
        player: PlayerId,
        audio: &A,
        mint: &S,
        observer: &O,
    ) -> Option<Outcome>
    where
        A: AudioOutput,
        S: MintService,
        O: RewardObserver,
    {
        let cfg = self.player_config(player)?;
        if self.stage(player) != Stage::Triggered {
            return None;
        }
        self.notify(observer, player, Some(Status::Minting));

        // Sound is best effort
        self.advance(player, PipelineEvent::SoundIssued);
        if let Err(e) = audio.play_track(cfg.folder, cfg.track).await {
            warn!("player {} jingle failed: {}", player, e);
        }

        self.advance(player, PipelineEvent::MintRequested);
        self.notify(observer, player, Some(Status::Sending));
        let outcome = match mint.submit(&cfg.wallet, self.base_units).await {
            Ok(handle) => {
                debug!("player {} submitted as {}", player, handle);
                self.advance(player, PipelineEvent::HandleReceived);
                self.notify(observer, player, Some(Status::Confirming));

                let timeout = self.config.reward.confirm_timeout();
                match with_timeout(timeout, mint.confirm(handle, timeout)).await {
                    Ok(Ok(_)) => Outcome::Success,
                    Ok(Err(e)) => Outcome::Failure(e),
                    Err(_) => Outcome::Failure(MintError::Timeout),
                }
            }
            Err(e) => Outcome::Failure(e),
        };

        self.settle(player, outcome, observer);

        let hold = self.config.reward.settle_hold();
        if hold.as_ticks() > 0 {
            Timer::after(hold).await;
        }
        self.advance(player, PipelineEvent::Rearm);
        self.notify(observer, player, None);

        Some(outcome)
    }

    fn settle<O: RewardObserver>(&self, player: PlayerId, outcome: Outcome, observer: &O) {
        match outcome {
            Outcome::Success => {
                let amount = self.config.reward.amount;
                self.with_slot(player, |slot| {
                    slot.count = slot.count.saturating_add(amount);
                    slot.last_error = None;
                });
                self.advance(player, PipelineEvent::Confirmed);
                info!("player {} rewarded, total {}", player, self.count(player).unwrap_or(0));
                self.notify(observer, player, Some(Status::Success));
            }
            Outcome::Failure(err) => {
                self.advance(player, PipelineEvent::Failed(err));
                warn!("player {} reward failed: {}", player, err);
                self.notify(observer, player, Some(Status::Failed(err)));
            }
        }
    }

    /// Trigger and run in one step
    pub async fn handle_press<A, S, O>(
        &self,
        press: PressEvent,
        audio: &A,
        mint: &S,
        observer: &O,
    ) -> Option<Outcome>
    where
        A: AudioOutput,
        S: MintService,
        O: RewardObserver,
    {
        self.try_trigger(press.player, press.at)?;
        self.run(press.player, audio, mint, observer).await
    }

    /// Seed counts from on-chain balances and publish the initial scoreboard
    ///
    /// Call before any pipeline starts. Players whose balance cannot be read
    /// keep a count of zero.
    pub async fn sync_balances<S, O>(&self, mint: &S, observer: &O)
    where
        S: MintService,
        O: RewardObserver,
    {
        for cfg in &self.config.players {
            if self.config.reward.sync_balances {
                match mint.balance(&cfg.wallet).await {
                    Ok(base) => {
                        let tokens = self.config.reward.whole_tokens(base);
                        self.with_slot(cfg.slot, |slot| slot.count = tokens);
                        info!("player {} starts at {}", cfg.slot, tokens);
                    }
                    Err(e) => warn!("player {} balance unavailable: {}", cfg.slot, e),
                }
            }
            self.notify(observer, cfg.slot, None);
        }
    }

    fn player_config(&self, player: PlayerId) -> Option<&'a PlayerConfig> {
        self.config.player(player)
    }

    pub fn stage(&self, player: PlayerId) -> Stage {
        self.with_slot(player, |slot| slot.stage())
            .unwrap_or(Stage::Idle)
    }

    pub fn count(&self, player: PlayerId) -> Option<u64> {
        self.with_slot(player, |slot| slot.count)
    }

    /// Error from the player's most recent failed pipeline
    pub fn last_error(&self, player: PlayerId) -> Option<MintError> {
        self.with_slot(player, |slot| slot.last_error).flatten()
    }

    pub fn request(&self, player: PlayerId) -> Option<RewardRequest> {
        self.with_slot(player, |slot| slot.request).flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{two_players, WALLETS};
    use crate::traits::{ChannelError, Confirmed, TxHandle};
    use crate::config::WalletAddress;
    use core::cell::Cell;
    use embassy_futures::{block_on, join::join};
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embassy_time::Duration;
    use std::vec::Vec as StdVec;

    struct MockAudio {
        result: Result<(), ChannelError>,
        calls: RefCell<StdVec<(u8, u16)>>,
    }

    impl MockAudio {
        fn ok() -> Self {
            Self::with(Ok(()))
        }

        fn with(result: Result<(), ChannelError>) -> Self {
            Self {
                result,
                calls: RefCell::new(StdVec::new()),
            }
        }
    }

    impl AudioOutput for MockAudio {
        async fn play_track(&self, folder: u8, track: u16) -> Result<(), ChannelError> {
            self.calls.borrow_mut().push((folder, track));
            self.result
        }
    }

    /// Audio output that notes player 1's stage while it plays
    struct StageDuringPlayback<'o, 'c> {
        orch: &'o RewardOrchestrator<'c, NoopRawMutex>,
        seen: Cell<Option<Stage>>,
    }

    impl AudioOutput for StageDuringPlayback<'_, '_> {
        async fn play_track(&self, _folder: u8, _track: u16) -> Result<(), ChannelError> {
            self.seen.set(Some(self.orch.stage(1)));
            Ok(())
        }
    }

    #[derive(Clone, Copy)]
    enum Confirm {
        Ok,
        Reject(u8),
        Never,
        After(u64),
    }

    /// Mint service keyed by wallet: the first wallet behaves as `first`,
    /// every other wallet as `other`.
    struct MockMint {
        first: Confirm,
        other: Confirm,
        submit_error: Option<MintError>,
        submits: RefCell<StdVec<(u8, u64)>>,
        balance: Result<u64, MintError>,
        next_handle: Cell<u32>,
    }

    impl MockMint {
        fn new(confirm: Confirm) -> Self {
            Self {
                first: confirm,
                other: confirm,
                submit_error: None,
                submits: RefCell::new(StdVec::new()),
                balance: Ok(0),
                next_handle: Cell::new(1),
            }
        }

        fn slot_of(wallet: &WalletAddress) -> u8 {
            if wallet.as_str() == WALLETS[0] {
                1
            } else {
                2
            }
        }
    }

    impl MintService for MockMint {
        async fn submit(&self, wallet: &WalletAddress, amount: u64) -> Result<TxHandle, MintError> {
            let slot = Self::slot_of(wallet);
            self.submits.borrow_mut().push((slot, amount));
            if let Some(e) = self.submit_error {
                return Err(e);
            }
            // Handle encodes the slot so confirm knows whose it is
            let seq = self.next_handle.get();
            self.next_handle.set(seq + 1);
            Ok(TxHandle((slot as u32) << 16 | seq))
        }

        async fn confirm(&self, handle: TxHandle, _timeout: Duration) -> Result<Confirmed, MintError> {
            let behaviour = if handle.0 >> 16 == 1 { self.first } else { self.other };
            match behaviour {
                Confirm::Ok => Ok(Confirmed { handle }),
                Confirm::Reject(code) => Err(MintError::Rejected(code)),
                Confirm::Never => core::future::pending().await,
                Confirm::After(ms) => {
                    Timer::after_millis(ms).await;
                    Ok(Confirmed { handle })
                }
            }
        }

        async fn balance(&self, _wallet: &WalletAddress) -> Result<u64, MintError> {
            self.balance
        }
    }

    #[derive(Default)]
    struct Recorder {
        updates: RefCell<StdVec<PlayerUpdate>>,
    }

    impl RewardObserver for Recorder {
        fn on_update(&self, update: PlayerUpdate) {
            self.updates.borrow_mut().push(update);
        }
    }

    impl Recorder {
        fn statuses(&self, player: PlayerId) -> StdVec<Option<Status>> {
            self.updates
                .borrow()
                .iter()
                .filter(|u| u.player == player)
                .map(|u| u.status)
                .collect()
        }
    }

    fn press(player: PlayerId) -> PressEvent {
        PressEvent {
            player,
            at: Instant::now(),
        }
    }

    #[test]
    fn test_happy_path() {
        let config = two_players();
        let orch = RewardOrchestrator::<NoopRawMutex>::new(&config).unwrap();
        let audio = MockAudio::ok();
        let mint = MockMint::new(Confirm::Ok);
        let screen = Recorder::default();

        let outcome = block_on(orch.handle_press(press(1), &audio, &mint, &screen));

        assert_eq!(outcome, Some(Outcome::Success));
        assert_eq!(*audio.calls.borrow(), [(0, 3)]);
        assert_eq!(*mint.submits.borrow(), [(1, 1_000_000_000)]);
        assert_eq!(orch.count(1), Some(1));
        assert_eq!(orch.stage(1), Stage::Idle);
        assert_eq!(
            screen.statuses(1),
            [
                Some(Status::Minting),
                Some(Status::Sending),
                Some(Status::Confirming),
                Some(Status::Success),
                None,
            ]
        );
        let last = *screen.updates.borrow().last().unwrap();
        assert_eq!(last.count, 1);
    }

    #[test]
    fn test_sound_playing_while_track_plays() {
        let config = two_players();
        let orch = RewardOrchestrator::<NoopRawMutex>::new(&config).unwrap();
        let audio = StageDuringPlayback {
            orch: &orch,
            seen: Cell::new(None),
        };
        let mint = MockMint::new(Confirm::Ok);

        let outcome = block_on(orch.handle_press(press(1), &audio, &mint, &Recorder::default()));

        assert_eq!(outcome, Some(Outcome::Success));
        assert_eq!(audio.seen.get(), Some(Stage::SoundPlaying));
    }

    #[test]
    fn test_confirmation_timeout_settles_as_failure() {
        let config = two_players();
        let orch = RewardOrchestrator::<NoopRawMutex>::new(&config).unwrap();
        let audio = MockAudio::ok();
        let mint = MockMint::new(Confirm::Never);
        let screen = Recorder::default();

        let outcome = block_on(orch.handle_press(press(1), &audio, &mint, &screen));

        assert_eq!(outcome, Some(Outcome::Failure(MintError::Timeout)));
        assert_eq!(orch.count(1), Some(0));
        assert_eq!(orch.last_error(1), Some(MintError::Timeout));
        assert!(screen
            .statuses(1)
            .contains(&Some(Status::Failed(MintError::Timeout))));
        assert_eq!(orch.stage(1), Stage::Idle);
    }

    #[test]
    fn test_audio_timeout_still_mints() {
        let config = two_players();
        let orch = RewardOrchestrator::<NoopRawMutex>::new(&config).unwrap();
        let audio = MockAudio::with(Err(ChannelError::Timeout));
        let mint = MockMint::new(Confirm::Ok);
        let screen = Recorder::default();

        let outcome = block_on(orch.handle_press(press(2), &audio, &mint, &screen));

        assert_eq!(outcome, Some(Outcome::Success));
        assert_eq!(mint.submits.borrow().len(), 1);
        assert_eq!(orch.count(2), Some(1));
    }

    #[test]
    fn test_submit_failure_leaves_count() {
        let config = two_players();
        let orch = RewardOrchestrator::<NoopRawMutex>::new(&config).unwrap();
        let audio = MockAudio::ok();
        let mut mint = MockMint::new(Confirm::Ok);
        mint.submit_error = Some(MintError::Network);
        let screen = Recorder::default();

        let outcome = block_on(orch.handle_press(press(1), &audio, &mint, &screen));

        assert_eq!(outcome, Some(Outcome::Failure(MintError::Network)));
        assert_eq!(orch.count(1), Some(0));
        assert!(!screen.statuses(1).contains(&Some(Status::Confirming)));
    }

    #[test]
    fn test_second_press_while_pending_is_dropped() {
        let config = two_players();
        let orch = RewardOrchestrator::<NoopRawMutex>::new(&config).unwrap();
        let audio = MockAudio::ok();
        let mint = MockMint::new(Confirm::After(30));
        let screen = Recorder::default();

        assert!(orch.try_trigger(1, Instant::now()).is_some());
        assert!(orch.try_trigger(1, Instant::now()).is_none());

        let (first, second) = block_on(join(orch.run(1, &audio, &mint, &screen), async {
            Timer::after_millis(5).await;
            assert_eq!(orch.stage(1), Stage::Confirming);
            orch.handle_press(press(1), &audio, &mint, &screen).await
        }));

        assert_eq!(first, Some(Outcome::Success));
        assert_eq!(second, None);
        assert_eq!(mint.submits.borrow().len(), 1);
        assert_eq!(orch.count(1), Some(1));
    }

    #[test]
    fn test_players_are_isolated() {
        let config = two_players();
        let orch = RewardOrchestrator::<NoopRawMutex>::new(&config).unwrap();
        let audio = MockAudio::ok();
        let mut mint = MockMint::new(Confirm::Never);
        mint.other = Confirm::Ok;
        let screen = Recorder::default();

        let (a, b) = block_on(join(
            orch.handle_press(press(1), &audio, &mint, &screen),
            orch.handle_press(press(2), &audio, &mint, &screen),
        ));

        assert_eq!(a, Some(Outcome::Failure(MintError::Timeout)));
        assert_eq!(b, Some(Outcome::Success));
        assert_eq!(orch.count(1), Some(0));
        assert_eq!(orch.count(2), Some(1));

        // B settled while A was still waiting for its confirmation
        let updates = screen.updates.borrow();
        let b_done = updates
            .iter()
            .position(|u| u.player == 2 && u.status == Some(Status::Success))
            .unwrap();
        let a_done = updates
            .iter()
            .position(|u| u.player == 1 && matches!(u.status, Some(Status::Failed(_))))
            .unwrap();
        assert!(b_done < a_done);
    }

    #[test]
    fn test_rejection_reported() {
        let config = two_players();
        let orch = RewardOrchestrator::<NoopRawMutex>::new(&config).unwrap();
        let audio = MockAudio::ok();
        let mint = MockMint::new(Confirm::Reject(2));
        let screen = Recorder::default();

        let outcome = block_on(orch.handle_press(press(2), &audio, &mint, &screen));
        assert_eq!(outcome, Some(Outcome::Failure(MintError::Rejected(2))));
        assert_eq!(orch.last_error(2), Some(MintError::Rejected(2)));

        // Re-armed: the next press is a fresh attempt
        let retry = MockMint::new(Confirm::Ok);
        let outcome = block_on(orch.handle_press(press(2), &audio, &retry, &screen));
        assert_eq!(outcome, Some(Outcome::Success));
        assert_eq!(orch.last_error(2), None);
    }

    #[test]
    fn test_settle_hold_keeps_player_busy() {
        let mut config = two_players();
        config.reward.settle_hold_ms = 40;
        let orch = RewardOrchestrator::<NoopRawMutex>::new(&config).unwrap();
        let audio = MockAudio::ok();
        let mint = MockMint::new(Confirm::Ok);
        let screen = Recorder::default();

        let (outcome, _) = block_on(join(
            orch.handle_press(press(1), &audio, &mint, &screen),
            async {
                Timer::after_millis(10).await;
                assert_eq!(orch.stage(1), Stage::Settled(Outcome::Success));
                assert!(orch.try_trigger(1, Instant::now()).is_none());
            },
        ));
        assert_eq!(outcome, Some(Outcome::Success));
        assert_eq!(orch.stage(1), Stage::Idle);
    }

    #[test]
    fn test_unknown_player_ignored() {
        let config = two_players();
        let orch = RewardOrchestrator::<NoopRawMutex>::new(&config).unwrap();
        assert!(orch.try_trigger(9, Instant::now()).is_none());
        assert_eq!(orch.count(9), None);
    }

    #[test]
    fn test_balance_sync() {
        let config = two_players();
        let orch = RewardOrchestrator::<NoopRawMutex>::new(&config).unwrap();
        let mut mint = MockMint::new(Confirm::Ok);
        mint.balance = Ok(12_500_000_000);
        let screen = Recorder::default();

        block_on(orch.sync_balances(&mint, &screen));

        assert_eq!(orch.count(1), Some(12));
        assert_eq!(orch.count(2), Some(12));
        assert_eq!(screen.updates.borrow().len(), 2);
    }

    #[test]
    fn test_balance_sync_failure_keeps_zero() {
        let config = two_players();
        let orch = RewardOrchestrator::<NoopRawMutex>::new(&config).unwrap();
        let mut mint = MockMint::new(Confirm::Ok);
        mint.balance = Err(MintError::Unavailable);
        let screen = Recorder::default();

        block_on(orch.sync_balances(&mint, &screen));

        assert_eq!(orch.count(1), Some(0));
        assert_eq!(screen.updates.borrow()[0].count, 0);
    }
}
