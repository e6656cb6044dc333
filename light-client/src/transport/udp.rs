use async_trait::async_trait;
use futures_util::TryFutureExt;
use log::{debug, info};
use tokio::{net::UdpSocket, sync::Mutex};

use super::Transport;
use crate::{ControllerConfig, MilightError};

/// Sends frames as UDP datagrams. The socket is bound on first use and kept
/// for the lifetime of the transport.
pub struct UdpTransport {
    address: String,
    broadcast: bool,
    socket: Mutex<Option<UdpSocket>>,
}

impl UdpTransport {
    pub fn new(host: &str, port: u16, broadcast: bool) -> Self {
        Self {
            address: format!("{host}:{port}"),
            broadcast,
            socket: Mutex::new(None),
        }
    }

    pub fn from_config(config: &ControllerConfig) -> Self {
        Self::new(&config.host, config.port, config.broadcast_enabled())
    }

    async fn bind(&self) -> Result<UdpSocket, MilightError> {
        debug!("Binding UDP socket for {}", self.address);
        let bind = UdpSocket::bind("0.0.0.0:0").and_then(|s| async {
            if self.broadcast {
                s.set_broadcast(true)?;
            }
            Ok(s)
        });

        match bind.await {
            Ok(socket) => {
                info!(
                    "Sending to {}{}",
                    self.address,
                    if self.broadcast { " (broadcast)" } else { "" }
                );
                Ok(socket)
            }
            Err(e) => Err(MilightError::Transport {
                reason: e.to_string(),
            }),
        }
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn send(&self, frame: &[u8]) -> Result<(), MilightError> {
        let mut socket = self.socket.lock().await;
        let socket = match socket.as_ref() {
            Some(socket) => socket,
            None => socket.insert(self.bind().await?),
        };

        socket
            .send_to(frame, self.address.as_str())
            .await
            .map(|_| ())
            .map_err(|e| MilightError::Transport {
                reason: e.to_string(),
            })
    }
}
