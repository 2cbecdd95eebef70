//! Scoreboard task
//!
//! Repaints the gateway's screen whenever the presenter reports a change.

use defmt::*;
use embassy_time::Timer;

use dishmint_drivers::gateway::GatewayDisplay;

use crate::channels::LINK_TX;
use crate::tasks::reward::Scoreboard;

/// Delay before retrying a paint that did not fit in the TX queue
const RETRY_MS: u64 = 50;

#[embassy_executor::task]
pub async fn display_task(scoreboard: &'static Scoreboard) {
    info!("Display task started");

    let mut backend = GatewayDisplay::new(&LINK_TX);
    loop {
        scoreboard.wait_changed().await;

        while let Err(e) = scoreboard.render_to(&mut backend) {
            warn!("Screen update failed: {:?}", e);
            Timer::after_millis(RETRY_MS).await;
        }
        trace!("Screen update sent");
    }
}
