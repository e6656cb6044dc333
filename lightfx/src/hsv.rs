use serde::{Deserialize, Serialize};

use crate::Color;

/// A color in the form the controller consumes it.
///
/// Hue is in degrees, from 0 up to but excluding 360. Saturation and value are
/// percentages from 0 to 100. Saturation is carried along for completeness,
/// but the hardware has no way to set it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

impl Hsv {
    pub fn new(h: f64, s: f64, v: f64) -> Self {
        Self { h, s, v }
    }

    /// Reconstructs an 8-bit RGB color, undoing the red/blue exchange applied
    /// by [`rgb_to_hsv`].
    pub fn to_color(&self) -> Color {
        let h = (self.h / 360.0).rem_euclid(1.0);
        let s = (self.s / 100.0).clamp(0.0, 1.0);
        let v = (self.v / 100.0).clamp(0.0, 1.0);

        let c = v * s;
        let x = c * (1.0 - ((h * 6.0) % 2.0 - 1.0).abs());
        let m = v - c;
        let (r1, g1, b1) = match (h * 6.0).trunc() as i32 {
            0 => (c, x, 0f64),
            1 => (x, c, 0f64),
            2 => (0f64, c, x),
            3 => (0f64, x, c),
            4 => (x, 0f64, c),
            _ => (c, 0f64, x),
        };

        let to_byte = |c: f64| ((c + m) * 255.0).round() as u8;
        Color::rgb(to_byte(b1), to_byte(g1), to_byte(r1))
    }
}

/// Clamps `v` into `0..=max` and drops the fraction. NaN becomes 0.
pub fn normalize(v: f64, max: u8) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.floor().clamp(0.0, max as f64) as u8
}

/// Converts red, green and blue percentages (0 to 100) into [`Hsv`].
///
/// The controller's hue wheel is mirrored with respect to the usual one, so
/// the red and blue channels trade places before the conversion: pure red
/// comes out at 240 degrees and pure blue at 0.
///
/// A gray input, where all channels are equal, yields all zeroes.
pub fn rgb_to_hsv(r: f64, g: f64, b: f64) -> Hsv {
    let (r, g, b) = (b / 100.0, g / 100.0, r / 100.0);

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let chroma = max - min;
    if chroma == 0.0 {
        return Hsv::default();
    }

    let sector = if max == r {
        ((g - b) / chroma).rem_euclid(6.0)
    } else if max == g {
        (b - r) / chroma + 2.0
    } else {
        (r - g) / chroma + 4.0
    };

    Hsv {
        h: (sector * 60.0).round() % 360.0,
        s: (chroma / max * 100.0).round(),
        v: (max * 100.0).round(),
    }
}
