use std::{ops::Deref, sync::Arc};

use log::info;

use crate::{
    transport::{Transport, UdpTransport},
    ControllerConfig, Dispatcher, MilightError, ZoneHandle, ZoneSet,
};

/// Entry point to one controller. Acts on all zones itself and hands out
/// handles for single zones or groups of zones, all sharing one dispatcher.
pub struct Controller {
    dispatcher: Arc<Dispatcher>,
    all_zones: ZoneHandle,
}

impl Controller {
    pub fn new(config: ControllerConfig) -> Self {
        let transport = UdpTransport::from_config(&config);
        Self::with_transport(config, transport)
    }

    pub fn with_transport(config: ControllerConfig, transport: impl Transport + 'static) -> Self {
        info!(
            "Using controller at {}:{} with {} ms between frames",
            config.host, config.port, config.min_delay_ms
        );
        let dispatcher = Arc::new(Dispatcher::new(transport, config.min_delay()));
        let all_zones = ZoneHandle::new(dispatcher.clone(), ZoneSet::all());
        Self {
            dispatcher,
            all_zones,
        }
    }

    pub fn zone(&self, index: u8) -> Result<ZoneHandle, MilightError> {
        self.zones([index])
    }

    pub fn zones(&self, indices: impl IntoIterator<Item = u8>) -> Result<ZoneHandle, MilightError> {
        Ok(ZoneHandle::new(
            self.dispatcher.clone(),
            ZoneSet::new(indices)?,
        ))
    }

    pub fn all_zones(&self) -> ZoneHandle {
        self.all_zones.clone()
    }
}

impl Deref for Controller {
    type Target = ZoneHandle;

    fn deref(&self) -> &Self::Target {
        &self.all_zones
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::*;
    use crate::{
        protocol::{BRIGHTNESS_CODES, BRIGHTNESS_OPCODE, HUE_OPCODE},
        MockTransport,
    };

    fn controller() -> (Controller, MockTransport) {
        let transport = MockTransport::new();
        let config = ControllerConfig::new("192.168.0.255")
            .with_broadcast(true)
            .with_min_delay(Duration::from_millis(100));
        (
            Controller::with_transport(config, transport.clone()),
            transport,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn zone_on_then_color() {
        let (controller, transport) = controller();
        let start = Instant::now();

        controller.zone(1).unwrap().on().await.unwrap();
        controller
            .zone(1)
            .unwrap()
            .set_hsv(Some(60.0), None, Some(50.0))
            .await
            .unwrap();

        let sent = transport.sent();
        assert_eq!(
            sent.iter().map(|s| s.bytes.clone()).collect::<Vec<_>>(),
            vec![
                vec![0x45, 0x00, 0x55],
                vec![HUE_OPCODE, 42, 0x55],
                vec![BRIGHTNESS_OPCODE, BRIGHTNESS_CODES[13], 0x55],
            ]
        );
        assert_eq!(sent[0].at, start);
        assert!(sent[1].at - sent[0].at >= Duration::from_millis(100));
        assert!(sent[2].at - sent[1].at >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn controller_addresses_all_zones() {
        let (controller, transport) = controller();
        controller.on().await.unwrap();
        controller.off().await.unwrap();
        controller.all_zones().set_night_mode().await.unwrap();
        assert_eq!(
            transport.frames(),
            vec![
                vec![0x42, 0x00, 0x55],
                vec![0x41, 0x00, 0x55],
                vec![0xB9, 0x00, 0x55],
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn every_zone_collapses_to_broadcast() {
        let (controller, transport) = controller();
        let zones = controller.zones([1, 2, 3, 4]).unwrap();
        assert!(zones.zones().is_all());
        zones.on().await.unwrap();
        assert_eq!(transport.frames(), vec![vec![0x42, 0x00, 0x55]]);
    }

    #[test]
    fn invalid_zones_are_rejected_up_front() {
        let (controller, transport) = controller();
        assert!(matches!(
            controller.zone(5),
            Err(MilightError::InvalidZone { .. })
        ));
        assert!(controller.zones(Vec::<u8>::new()).is_err());
        assert!(transport.frames().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_operations_keep_arrival_order() {
        let (controller, transport) = controller();
        let first = controller.zone(1).unwrap();
        let second = controller.zone(2).unwrap();

        let (a, b) = tokio::join!(
            first.set_hsv(Some(0.0), None, Some(100.0)),
            second.set_white(None),
        );
        a.unwrap();
        b.unwrap();

        assert_eq!(
            transport.frames(),
            vec![
                vec![0x45, 0x00, 0x55],
                vec![HUE_OPCODE, 0, 0x55],
                vec![BRIGHTNESS_OPCODE, 0x20, 0x55],
                vec![0x47, 0x00, 0x55],
                vec![0xC7, 0x00, 0x55],
                vec![BRIGHTNESS_OPCODE, 0x20, 0x55],
            ]
        );
        let sent = transport.sent();
        for pair in sent.windows(2) {
            assert!(pair[1].at - pair[0].at >= Duration::from_millis(100));
        }
    }
}
