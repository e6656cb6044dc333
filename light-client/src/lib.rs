mod config;
mod controller;
mod dispatcher;
pub mod protocol;
pub mod transport;
mod zone;

use std::future::Future;

use log::error;
use tokio::task::JoinHandle;

pub use config::{ControllerConfig, DEFAULT_HOST, DEFAULT_MIN_DELAY_MS, DEFAULT_PORT};
pub use controller::Controller;
pub use dispatcher::{Dispatcher, Exclusive};
pub use lightfx::{Color, ColorLiteral, Hsv, InvalidColorExpression};
pub use transport::{MockTransport, Transport, UdpTransport};
pub use zone::{Zone, ZoneHandle, ZoneSet};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MilightError {
    #[error("invalid zone: {reason}")]
    InvalidZone { reason: String },

    #[error(transparent)]
    InvalidColorExpression(#[from] InvalidColorExpression),

    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("failed to send to controller: {reason}")]
    Transport { reason: String },
}

/// Runs a lighting operation in the background. Nobody waits for the
/// result, so a failure is logged instead.
pub fn detach<F>(operation: F) -> JoinHandle<()>
where
    F: Future<Output = Result<(), MilightError>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = operation.await {
            error!("Lighting operation failed: {}", e);
        }
    })
}
