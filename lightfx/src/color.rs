use serde::{Deserialize, Serialize};

use crate::hsv::{rgb_to_hsv, Hsv};

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Produces a color with given RGB values. The values range from 0 to 255.
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    /// Unpacks a color stored as `0xRRGGBB`. Bits above the lowest 24 are ignored.
    pub fn from_packed(packed: u32) -> Self {
        Self {
            r: ((packed & 0xFF0000) >> 16) as u8,
            g: ((packed & 0x00FF00) >> 8) as u8,
            b: (packed & 0x0000FF) as u8,
        }
    }

    pub fn packed(&self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Produces an instance of Color from a hex color code. The code can start
    /// with a hash symbol. Both 3-digit and 6-digit codes are accepted.
    ///
    /// In case of an invalid hex code, the function will return `None`.
    pub fn from_hex_str(code: &str) -> Option<Self> {
        let code = code.strip_prefix('#').unwrap_or(code);
        if !code.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let (r, g, b) = match code.len() {
            6 => {
                let x = u32::from_str_radix(code, 16).ok()?;
                ((x & 0xFF0000) >> 16, (x & 0x00FF00) >> 8, x & 0x0000FF)
            }
            3 => {
                let x = u32::from_str_radix(code, 16).ok()?;
                (
                    ((x & 0xF00) >> 8) * 0x11,
                    ((x & 0x0F0) >> 4) * 0x11,
                    (x & 0x00F) * 0x11,
                )
            }
            _ => return None,
        };

        Some(Self {
            r: r as u8,
            g: g as u8,
            b: b as u8,
        })
    }

    /// Scales every channel down to the 0 to 100 range the controller works in.
    /// Fractions are dropped, so only full 255 maps to 100.
    pub fn to_percent(&self) -> [f64; 3] {
        let scale = |c: u8| (c as f64 / 255.0 * 100.0).floor();
        [scale(self.r), scale(self.g), scale(self.b)]
    }

    pub fn to_hsv(&self) -> Hsv {
        let [r, g, b] = self.to_percent();
        rgb_to_hsv(r, g, b)
    }
}

impl From<u32> for Color {
    fn from(packed: u32) -> Self {
        Self::from_packed(packed)
    }
}
