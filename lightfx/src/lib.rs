mod color;
mod hsv;
mod parse;

pub use color::Color;
pub use hsv::{normalize, rgb_to_hsv, Hsv};
pub use parse::{parse_color_literal, percent_or_absolute, ColorLiteral, InvalidColorExpression};
