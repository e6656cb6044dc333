use std::{fmt, sync::Arc};

use itertools::Itertools;
use lightfx::{normalize, parse_color_literal, rgb_to_hsv, Color, Hsv};
use log::debug;

use crate::{dispatcher::Dispatcher, protocol::Frame, protocol::ZONE_COUNT, MilightError};

/// A validated address in the controller's key tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Zone(u8);

impl Zone {
    /// The broadcast address, reaching every zone at once.
    pub const ALL: Zone = Zone(0);

    pub fn new(index: u8) -> Result<Self, MilightError> {
        if (index as usize) < ZONE_COUNT {
            Ok(Self(index))
        } else {
            Err(MilightError::InvalidZone {
                reason: format!("index {index} is outside 0..{ZONE_COUNT}"),
            })
        }
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn is_all(self) -> bool {
        self == Self::ALL
    }

    pub(crate) fn slot(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for Zone {
    type Error = MilightError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::new(index)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_all() {
            write!(f, "all zones")
        } else {
            write!(f, "zone {}", self.0)
        }
    }
}

/// Zones addressed together, in the order they were given, without repeats.
///
/// A set that names the broadcast address, or that covers every physical
/// zone, is replaced by the broadcast address alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZoneSet(Vec<Zone>);

impl ZoneSet {
    pub fn new(indices: impl IntoIterator<Item = u8>) -> Result<Self, MilightError> {
        let zones: Vec<Zone> = indices
            .into_iter()
            .map(Zone::new)
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .unique()
            .collect();

        if zones.is_empty() {
            return Err(MilightError::InvalidZone {
                reason: "no zones given".into(),
            });
        }

        if zones.contains(&Zone::ALL) || zones.len() >= ZONE_COUNT - 1 {
            Ok(Self::all())
        } else {
            Ok(Self(zones))
        }
    }

    pub fn all() -> Self {
        Self(vec![Zone::ALL])
    }

    pub fn is_all(&self) -> bool {
        self.0 == [Zone::ALL]
    }

    pub fn iter(&self) -> impl Iterator<Item = Zone> + '_ {
        self.0.iter().copied()
    }
}

/// Lighting operations on a group of zones.
///
/// Every operation holds the dispatcher for its whole duration and handles
/// one zone completely before moving on to the next. The first failure stops
/// the operation and is returned.
#[derive(Clone)]
pub struct ZoneHandle {
    dispatcher: Arc<Dispatcher>,
    zones: ZoneSet,
}

impl ZoneHandle {
    pub(crate) fn new(dispatcher: Arc<Dispatcher>, zones: ZoneSet) -> Self {
        Self { dispatcher, zones }
    }

    pub fn zones(&self) -> &ZoneSet {
        &self.zones
    }

    pub async fn on(&self) -> Result<(), MilightError> {
        let mut session = self.dispatcher.exclusive().await;
        for zone in self.zones.iter() {
            debug!("Switching on {zone}");
            session.select_zone(zone, true).await?;
        }
        Ok(())
    }

    pub async fn off(&self) -> Result<(), MilightError> {
        let mut session = self.dispatcher.exclusive().await;
        for zone in self.zones.iter() {
            debug!("Switching off {zone}");
            session.deselect_zone(zone).await?;
        }
        Ok(())
    }

    /// Sets a color given as text, see [`lightfx::parse_color_literal`] for
    /// the accepted forms. Nothing is sent if the text does not parse.
    pub async fn set_color(&self, expression: &str) -> Result<(), MilightError> {
        let hsv = parse_color_literal(expression)?.to_hsv();
        self.set_hsv_color(hsv).await
    }

    /// Sets a color packed as `0xRRGGBB`.
    pub async fn set_rgb_packed(&self, packed: u32) -> Result<(), MilightError> {
        self.set_hsv_color(Color::from_packed(packed).to_hsv()).await
    }

    /// Channels from 0 to 255.
    pub async fn set_rgb255(&self, r: u8, g: u8, b: u8) -> Result<(), MilightError> {
        self.set_hsv_color(Color::rgb(r, g, b).to_hsv()).await
    }

    /// Channels from 0 to 100. Values outside that range are clamped.
    pub async fn set_rgb100(&self, r: f64, g: f64, b: f64) -> Result<(), MilightError> {
        let channel = |c| normalize(c, 100) as f64;
        self.set_hsv_color(rgb_to_hsv(channel(r), channel(g), channel(b)))
            .await
    }

    /// Selects each zone, then sends the hue and the brightness when given.
    ///
    /// Saturation is accepted for symmetry but the hardware cannot apply it.
    pub async fn set_hsv(
        &self,
        hue: Option<f64>,
        _saturation: Option<f64>,
        value: Option<f64>,
    ) -> Result<(), MilightError> {
        let mut session = self.dispatcher.exclusive().await;
        for zone in self.zones.iter() {
            session.select_zone(zone, false).await?;
            if let Some(hue) = hue {
                session.send_frame(Frame::hue(hue).as_bytes()).await?;
            }
            if let Some(value) = value {
                session.send_frame(Frame::brightness(value).as_bytes()).await?;
            }
        }
        Ok(())
    }

    pub async fn brightness(&self, value: f64) -> Result<(), MilightError> {
        self.set_hsv(None, None, Some(value)).await
    }

    /// Switches to white light. Brightness defaults to 100, also when NaN.
    pub async fn set_white(&self, brightness: Option<f64>) -> Result<(), MilightError> {
        let brightness = brightness.filter(|b| !b.is_nan()).unwrap_or(100.0);
        let mut session = self.dispatcher.exclusive().await;
        for zone in self.zones.iter() {
            session.select_zone(zone, false).await?;
            session.send_frame(Frame::white(zone).as_bytes()).await?;
            session
                .send_frame(Frame::brightness(brightness).as_bytes())
                .await?;
        }
        Ok(())
    }

    /// Night mode has its own key per zone and needs no prior selection.
    pub async fn set_night_mode(&self) -> Result<(), MilightError> {
        let mut session = self.dispatcher.exclusive().await;
        for zone in self.zones.iter() {
            session.send_frame(Frame::night(zone).as_bytes()).await?;
        }
        Ok(())
    }

    /// Sends `frame` as is, once per zone.
    pub async fn send_custom(&self, frame: &[u8]) -> Result<(), MilightError> {
        if frame.is_empty() {
            return Err(MilightError::InvalidArgument {
                reason: "custom frame is empty".into(),
            });
        }
        let mut session = self.dispatcher.exclusive().await;
        for _ in self.zones.iter() {
            session.send_frame(frame).await?;
        }
        Ok(())
    }

    async fn set_hsv_color(&self, hsv: Hsv) -> Result<(), MilightError> {
        self.set_hsv(Some(hsv.h), Some(hsv.s), Some(hsv.v)).await
    }
}
