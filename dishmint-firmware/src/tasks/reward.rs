//! Reward pipeline tasks
//!
//! One task per player slot runs that player's pipeline whenever the
//! dispatcher triggers it. Pipelines of different players run concurrently;
//! they only meet at the audio bus mutex and the gateway TX queue.

use defmt::*;
use embassy_rp::uart::BufferedUart;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use dishmint_core::config::{slot_index, PlayerId};
use dishmint_core::reward::RewardOrchestrator;
use dishmint_core::state::Outcome;
use dishmint_display::Presenter;
use dishmint_drivers::audio::SerialCommandChannel;
use dishmint_drivers::gateway::GatewayClient;

use crate::channels::{LINK_TX_SIZE, TRIGGERED};

pub type Orchestrator = RewardOrchestrator<'static, CriticalSectionRawMutex>;
pub type Audio = SerialCommandChannel<CriticalSectionRawMutex, BufferedUart>;
pub type Gateway = GatewayClient<'static, CriticalSectionRawMutex, LINK_TX_SIZE>;
pub type Scoreboard = Presenter<CriticalSectionRawMutex>;

#[embassy_executor::task(pool_size = 4)]
pub async fn reward_task(
    player: PlayerId,
    orchestrator: &'static Orchestrator,
    audio: &'static Audio,
    mint: &'static Gateway,
    scoreboard: &'static Scoreboard,
) {
    let Some(index) = slot_index(player) else {
        error!("Reward task for invalid slot {}", player);
        return;
    };
    info!("Reward task started for player {}", player);

    loop {
        TRIGGERED[index].wait().await;

        if let Some(request) = orchestrator.request(player) {
            debug!(
                "player {} pipeline starts {} ms after press",
                player,
                request.created_at.elapsed().as_millis()
            );
        }

        match orchestrator.run(player, audio, mint, scoreboard).await {
            Some(Outcome::Success) => info!("Player {} reward confirmed", player),
            Some(Outcome::Failure(e)) => warn!("Player {} reward failed: {}", player, e),
            None => warn!("Player {} triggered without a request", player),
        }
    }
}
