//! Gateway UART receive task
//!
//! Parses frames from the gateway and hands each event to the client,
//! which queues it for the slot it concerns and answers heartbeats.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use dishmint_protocol::{GatewayEvent, LinkParser};

use crate::tasks::reward::Gateway;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

#[embassy_executor::task]
pub async fn link_rx_task(mut rx: BufferedUartRx, gateway: &'static Gateway) {
    info!("Gateway RX task started");

    let mut parser = LinkParser::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                for &byte in &buf[..n] {
                    match parser.push(byte) {
                        Ok(Some(frame)) => match GatewayEvent::from_frame(&frame) {
                            Ok(event) => {
                                if let Err(e) = gateway.route(event) {
                                    warn!("Gateway event {:?} dropped: {:?}", event, e);
                                }
                            }
                            Err(e) => warn!("Unknown gateway message {=u8:x}: {:?}", frame.kind, e),
                        },
                        Ok(None) => {
                            // Need more bytes
                        }
                        Err(e) => warn!("Gateway frame error: {:?}", e),
                    }
                }
            }
            Ok(_) => {}
            Err(e) => warn!("UART read error: {:?}", e),
        }
    }
}
