use std::time::Duration;

use log::{debug, warn};
use tokio::{
    sync::{Mutex, MutexGuard},
    time::Instant,
};

use crate::{protocol::Frame, transport::Transport, MilightError, Zone};

#[derive(Default)]
struct DispatcherState {
    current_zone: Option<Zone>,
    last_send: Option<Instant>,
}

/// Owns the way to the controller and serializes everything sent on it.
///
/// Operations run one at a time, in the order they asked for the dispatcher,
/// and frames are spaced at least `min_delay` apart.
pub struct Dispatcher {
    transport: Box<dyn Transport>,
    min_delay: Duration,
    state: Mutex<DispatcherState>,
}

impl Dispatcher {
    pub fn new(transport: impl Transport + 'static, min_delay: Duration) -> Self {
        Self {
            transport: Box::new(transport),
            min_delay,
            state: Mutex::new(DispatcherState::default()),
        }
    }

    /// Waits until no other operation holds the dispatcher and takes it.
    /// Waiters are admitted first come, first served. The next one gets in
    /// when the returned guard is dropped.
    pub async fn exclusive(&self) -> Exclusive<'_> {
        Exclusive {
            transport: self.transport.as_ref(),
            min_delay: self.min_delay,
            state: self.state.lock().await,
        }
    }

    /// Sends a single frame as an operation of its own.
    pub async fn send_frame(&self, frame: &[u8]) -> Result<(), MilightError> {
        self.exclusive().await.send_frame(frame).await
    }
}

/// Exclusive access to a [`Dispatcher`] for the length of one operation.
pub struct Exclusive<'a> {
    transport: &'a dyn Transport,
    min_delay: Duration,
    state: MutexGuard<'a, DispatcherState>,
}

impl Exclusive<'_> {
    /// The zone that hue and brightness frames currently apply to, if known.
    pub fn current_zone(&self) -> Option<Zone> {
        self.state.current_zone
    }

    pub async fn send_frame(&mut self, frame: &[u8]) -> Result<(), MilightError> {
        if let Some(last_send) = self.state.last_send {
            let ready_at = last_send + self.min_delay;
            let now = Instant::now();
            if now < ready_at {
                debug!("Holding frame for {:?}", ready_at - now);
                tokio::time::sleep_until(ready_at).await;
            }
        }

        debug!("Sending frame {:02x?}", frame);
        let result = self.transport.send(frame).await;
        self.state.last_send = Some(Instant::now());

        if let Err(ref e) = result {
            warn!("Failed to send frame {:02x?}: {}", frame, e);
        }
        result
    }

    /// Makes `zone` the target of following frames. Nothing is sent if the
    /// zone is already selected, unless `force` is set.
    pub async fn select_zone(&mut self, zone: Zone, force: bool) -> Result<(), MilightError> {
        if !force && self.state.current_zone == Some(zone) {
            debug!("{zone} already selected");
            return Ok(());
        }
        self.send_frame(Frame::on(zone).as_bytes()).await?;
        self.state.current_zone = Some(zone);
        Ok(())
    }

    /// Switches `zone` off. Afterwards no zone counts as selected.
    pub async fn deselect_zone(&mut self, zone: Zone) -> Result<(), MilightError> {
        self.send_frame(Frame::off(zone).as_bytes()).await?;
        self.state.current_zone = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::MockTransport;

    fn dispatcher(min_delay_ms: u64) -> (Arc<Dispatcher>, MockTransport) {
        let transport = MockTransport::new();
        let dispatcher = Dispatcher::new(transport.clone(), Duration::from_millis(min_delay_ms));
        (Arc::new(dispatcher), transport)
    }

    fn zone(index: u8) -> Zone {
        Zone::new(index).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_selection_is_elided() {
        let (dispatcher, transport) = dispatcher(100);
        for index in 0..5 {
            let mut session = dispatcher.exclusive().await;
            session.select_zone(zone(index), false).await.unwrap();
            session.select_zone(zone(index), false).await.unwrap();
            assert_eq!(session.current_zone(), Some(zone(index)));
        }
        assert_eq!(transport.frames().len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn forced_selection_is_sent() {
        let (dispatcher, transport) = dispatcher(100);
        let mut session = dispatcher.exclusive().await;
        session.select_zone(zone(1), false).await.unwrap();
        session.select_zone(zone(1), true).await.unwrap();
        assert_eq!(transport.frames(), vec![vec![0x45, 0x00, 0x55]; 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn deselect_clears_any_selection() {
        let (dispatcher, transport) = dispatcher(100);
        let mut session = dispatcher.exclusive().await;
        session.select_zone(zone(1), false).await.unwrap();
        session.deselect_zone(zone(3)).await.unwrap();
        assert_eq!(session.current_zone(), None);
        session.select_zone(zone(1), false).await.unwrap();
        assert_eq!(
            transport.frames(),
            vec![
                vec![0x45, 0x00, 0x55],
                vec![0x4A, 0x00, 0x55],
                vec![0x45, 0x00, 0x55],
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_selection_is_not_remembered() {
        let transport = MockTransport::new().failing_at(0);
        let dispatcher = Dispatcher::new(transport.clone(), Duration::from_millis(100));
        let mut session = dispatcher.exclusive().await;

        let result = session.select_zone(zone(2), false).await;
        assert!(matches!(result, Err(MilightError::Transport { .. })));
        assert_eq!(session.current_zone(), None);

        session.select_zone(zone(2), false).await.unwrap();
        assert_eq!(transport.frames(), vec![vec![0x47, 0x00, 0x55]]);
    }

    #[tokio::test(start_paused = true)]
    async fn frames_are_paced() {
        let (dispatcher, transport) = dispatcher(100);
        let start = Instant::now();
        for _ in 0..3 {
            dispatcher.send_frame(&[0x01, 0x00, 0x55]).await.unwrap();
        }

        let times: Vec<_> = transport.sent().into_iter().map(|s| s.at).collect();
        assert_eq!(times[0], start, "first frame goes out at once");
        for pair in times.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(100));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn pacing_counts_failed_attempts() {
        let transport = MockTransport::new().failing_at(0);
        let dispatcher = Dispatcher::new(transport.clone(), Duration::from_millis(100));
        let start = Instant::now();

        assert!(dispatcher.send_frame(&[0x01]).await.is_err());
        dispatcher.send_frame(&[0x02]).await.unwrap();

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].at - start >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn idle_time_counts_towards_delay() {
        let (dispatcher, transport) = dispatcher(100);
        dispatcher.send_frame(&[0x01]).await.unwrap();
        tokio::time::sleep(Duration::from_millis(250)).await;
        let before = Instant::now();
        dispatcher.send_frame(&[0x02]).await.unwrap();
        assert_eq!(transport.sent()[1].at, before);
    }

    #[tokio::test(start_paused = true)]
    async fn operations_do_not_interleave() {
        let (dispatcher, transport) = dispatcher(10);

        let first = {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                let mut session = dispatcher.exclusive().await;
                for byte in [0x10, 0x11, 0x12] {
                    session.send_frame(&[byte]).await.unwrap();
                }
            })
        };
        tokio::task::yield_now().await;
        let second = {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                let mut session = dispatcher.exclusive().await;
                for byte in [0x20, 0x21] {
                    session.send_frame(&[byte]).await.unwrap();
                }
            })
        };
        first.await.unwrap();
        second.await.unwrap();

        assert_eq!(
            transport.frames(),
            vec![vec![0x10], vec![0x11], vec![0x12], vec![0x20], vec![0x21]]
        );
    }
}
