//! Gateway UART transmit task
//!
//! Drains the link TX queue: mint and balance requests, screen frames and
//! heartbeat replies.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use crate::channels::LINK_TX;

#[embassy_executor::task]
pub async fn link_tx_task(mut tx: BufferedUartTx) {
    info!("Gateway TX task started");

    loop {
        let frame = LINK_TX.receive().await;
        let bytes = frame.encode();
        if let Err(e) = tx.write_all(&bytes).await {
            warn!("Failed to send gateway frame: {:?}", e);
        }
    }
}
