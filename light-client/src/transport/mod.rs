mod mock;
mod udp;

use async_trait::async_trait;

use crate::MilightError;

pub use mock::{MockTransport, SentFrame};
pub use udp::UdpTransport;

/// Fire-and-forget delivery of raw frames to the controller.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, frame: &[u8]) -> Result<(), MilightError>;
}
