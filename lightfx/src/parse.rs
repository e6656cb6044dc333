use std::str::FromStr;

use serde::Deserialize;

use crate::{normalize, Color, Hsv};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color expression: {0}")]
pub struct InvalidColorExpression(pub String);

/// A color as written by a user, before it is turned into controller units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorLiteral {
    Rgb(Color),
    Hsv(Hsv),
}

impl ColorLiteral {
    pub fn to_hsv(self) -> Hsv {
        match self {
            ColorLiteral::Rgb(color) => color.to_hsv(),
            ColorLiteral::Hsv(hsv) => hsv,
        }
    }
}

impl From<u32> for ColorLiteral {
    fn from(packed: u32) -> Self {
        ColorLiteral::Rgb(Color::from_packed(packed))
    }
}

impl From<Color> for ColorLiteral {
    fn from(color: Color) -> Self {
        ColorLiteral::Rgb(color)
    }
}

impl FromStr for ColorLiteral {
    type Err = InvalidColorExpression;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_color_literal(s)
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RgbFields {
    r: Option<f64>,
    red: Option<f64>,
    g: Option<f64>,
    green: Option<f64>,
    b: Option<f64>,
    blue: Option<f64>,
}

impl RgbFields {
    /// Short names win over long ones. Channels are clamped to 0..=255 and
    /// fractions dropped.
    fn to_color(&self) -> Color {
        let channel = |short: Option<f64>, long: Option<f64>| {
            short.or(long).map_or(0, |c| normalize(c, u8::MAX))
        };
        Color::rgb(
            channel(self.r, self.red),
            channel(self.g, self.green),
            channel(self.b, self.blue),
        )
    }
}

/// Parses a color literal. Accepted forms, tried in this order:
///
/// * a packed `0xRRGGBB` integer, in decimal or with a `0x` prefix,
/// * `#RGB` and `#RRGGBB` hex codes,
/// * `rgb(r, g, b)` (or the older `rvb(...)`), channels from 0 to 255 or as
///   percentages of 255,
/// * `hsv(h, s, v)`, hue from 0 to 360 and the rest from 0 to 100, each also
///   accepted as a percentage of its range,
/// * a JSON object with numeric `r`/`red`, `g`/`green` and `b`/`blue` fields,
///   where missing fields are 0 and values outside 0..=255 are clamped.
pub fn parse_color_literal(text: &str) -> Result<ColorLiteral, InvalidColorExpression> {
    let literal = text.trim();
    let parsed = if let Some(packed) = parse_packed(literal) {
        Some(ColorLiteral::from(packed))
    } else if literal.starts_with('#') {
        Color::from_hex_str(literal).map(ColorLiteral::Rgb)
    } else if let Some(args) = function_args(literal, &["rgb", "rvb"]) {
        parse_rgb_args(&args).map(ColorLiteral::Rgb)
    } else if let Some(args) = function_args(literal, &["hsv"]) {
        parse_hsv_args(&args).map(ColorLiteral::Hsv)
    } else if literal.starts_with('{') {
        serde_json::from_str::<RgbFields>(literal)
            .ok()
            .map(|fields| ColorLiteral::Rgb(fields.to_color()))
    } else {
        None
    };

    parsed.ok_or_else(|| InvalidColorExpression(text.to_owned()))
}

/// Reads either `NN%`, taken as a fraction of `max`, or a bare integer.
/// Anything outside `0..=max` yields `None`.
pub fn percent_or_absolute(text: &str, max: f64) -> Option<f64> {
    let text = text.trim();
    let value = match text.strip_suffix('%') {
        Some(percent) => percent.trim().parse::<f64>().ok()? / 100.0 * max,
        None => text.parse::<u32>().ok()? as f64,
    };
    (0.0..=max).contains(&value).then_some(value)
}

fn parse_packed(literal: &str) -> Option<u32> {
    let packed = match literal.strip_prefix("0x").or_else(|| literal.strip_prefix("0X")) {
        Some(hex) if !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()) => {
            u32::from_str_radix(hex, 16).ok()?
        }
        Some(_) => return None,
        None if !literal.is_empty() && literal.chars().all(|c| c.is_ascii_digit()) => {
            literal.parse().ok()?
        }
        None => return None,
    };
    (packed <= 0xFFFFFF).then_some(packed)
}

fn function_args<'a>(literal: &'a str, names: &[&str]) -> Option<Vec<&'a str>> {
    let (name, rest) = literal.split_once('(')?;
    let name = name.trim().to_ascii_lowercase();
    if !names.contains(&name.as_str()) {
        return None;
    }
    let args: Vec<_> = rest.strip_suffix(')')?.split(',').map(str::trim).collect();
    (args.len() == 3).then_some(args)
}

fn parse_rgb_args(args: &[&str]) -> Option<Color> {
    let channel = |text| percent_or_absolute(text, 255.0).map(|c| c.floor() as u8);
    Some(Color::rgb(
        channel(args[0])?,
        channel(args[1])?,
        channel(args[2])?,
    ))
}

fn parse_hsv_args(args: &[&str]) -> Option<Hsv> {
    Some(Hsv::new(
        percent_or_absolute(args[0], 360.0)?,
        percent_or_absolute(args[1], 100.0)?,
        percent_or_absolute(args[2], 100.0)?,
    ))
}
