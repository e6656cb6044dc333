//! Command frames understood by the controller.
//!
//! Every command is three bytes: an opcode, an operand and a fixed terminator.
//! Zone specific commands pick their opcode from per-zone key tables, where
//! index 0 addresses all zones at once.

use lightfx::normalize;

use crate::Zone;

/// Number of addresses in the key tables, including the all-zones address.
pub const ZONE_COUNT: usize = 5;

pub const HUE_OPCODE: u8 = 0x40;
pub const BRIGHTNESS_OPCODE: u8 = 0x4E;
pub const SELECT_OPERAND: u8 = 0x00;
pub const TERMINATOR: u8 = 0x55;

const ON_KEYS: [u8; ZONE_COUNT] = [0x42, 0x45, 0x47, 0x49, 0x4B];
const OFF_KEYS: [u8; ZONE_COUNT] = [0x41, 0x46, 0x48, 0x4A, 0x4C];
const WHITE_KEYS: [u8; ZONE_COUNT] = [0xC2, 0xC5, 0xC7, 0xC9, 0xCB];
const NIGHT_KEYS: [u8; ZONE_COUNT] = [0xB9, 0x3B, 0x33, 0x3A, 0x36];

/// Brightness operands the bulbs react to, dimmest first. Other byte values
/// are ignored by the hardware, so brightness is always picked from here.
pub const BRIGHTNESS_CODES: [u8; 27] = [
    0x02, 0x03, 0x04, 0x05, 0x08, 0x09, 0x0A, 0x0B, 0x0D, 0x0E, 0x0F, 0x10, 0x11, 0x12, 0x13,
    0x14, 0x15, 0x17, 0x18, 0x19, 0x1A, 0x1B, 0x1C, 0x1D, 0x1E, 0x1F, 0x20,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Frame([u8; 3]);

impl Frame {
    pub fn new(opcode: u8, operand: u8) -> Self {
        Self([opcode, operand, TERMINATOR])
    }

    /// Switches the zone on. Also makes it the target of hue and brightness
    /// frames that follow.
    pub fn on(zone: Zone) -> Self {
        Self::new(ON_KEYS[zone.slot()], SELECT_OPERAND)
    }

    pub fn off(zone: Zone) -> Self {
        Self::new(OFF_KEYS[zone.slot()], SELECT_OPERAND)
    }

    pub fn white(zone: Zone) -> Self {
        Self::new(WHITE_KEYS[zone.slot()], SELECT_OPERAND)
    }

    pub fn night(zone: Zone) -> Self {
        Self::new(NIGHT_KEYS[zone.slot()], SELECT_OPERAND)
    }

    /// Hue in degrees, scaled onto a single byte.
    pub fn hue(degrees: f64) -> Self {
        Self::new(HUE_OPCODE, normalize(degrees * 255.0 / 360.0, 255))
    }

    /// Brightness in percent, snapped to the nearest lower entry of
    /// [`BRIGHTNESS_CODES`].
    pub fn brightness(percent: f64) -> Self {
        let last = (BRIGHTNESS_CODES.len() - 1) as u8;
        let index = normalize(percent / 100.0 * last as f64, last);
        Self::new(BRIGHTNESS_OPCODE, BRIGHTNESS_CODES[index as usize])
    }

    pub fn opcode(&self) -> u8 {
        self.0[0]
    }

    pub fn operand(&self) -> u8 {
        self.0[1]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}
