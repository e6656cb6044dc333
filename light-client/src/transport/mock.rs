use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use tokio::time::Instant;

use super::Transport;
use crate::MilightError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentFrame {
    pub bytes: Vec<u8>,
    pub at: Instant,
}

#[derive(Default)]
struct MockState {
    sent: Vec<SentFrame>,
    attempts: usize,
    failing: HashSet<usize>,
}

/// Records frames instead of sending them. Clones share the same record.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the transmit attempt with the given zero-based number fail.
    pub fn failing_at(self, attempt: usize) -> Self {
        self.state().failing.insert(attempt);
        self
    }

    /// Frames that were sent successfully, with the time they went out.
    pub fn sent(&self) -> Vec<SentFrame> {
        self.state().sent.clone()
    }

    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.state()
            .sent
            .iter()
            .map(|frame| frame.bytes.clone())
            .collect()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, frame: &[u8]) -> Result<(), MilightError> {
        let mut state = self.state();
        let attempt = state.attempts;
        state.attempts += 1;

        if state.failing.contains(&attempt) {
            return Err(MilightError::Transport {
                reason: format!("simulated failure of attempt {attempt}"),
            });
        }

        state.sent.push(SentFrame {
            bytes: frame.to_vec(),
            at: Instant::now(),
        });
        Ok(())
    }
}
