//! Named sequential palettes, the quantile color scale and a small color model.

use crate::scale::QuantileScale;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

const YLGNBU: &[&str] = &[
    "#ffffd9", "#edf8b1", "#c7e9b4", "#7fcdbb", "#41b6c4", "#1d91c0", "#225ea8", "#253494",
    "#081d58", "#040e29",
];
const ORRD: &[&str] = &[
    "#edf8b1", "#fff7ec", "#fee8c8", "#fdd49e", "#fdbb84", "#fc8d59", "#ef6548", "#d7301f",
    "#b30000", "#7f0000", "#4c0000",
];
const GNBU: &[&str] = &[
    "#fffffe", "#f7fcf0", "#e0f3db", "#ccebc5", "#a8ddb5", "#7bccc4", "#4eb3d3", "#2b8cbe",
    "#0868ac", "#084081", "#052851",
];
const RDPU: &[&str] = &[
    "#fff7f3", "#fde0dd", "#fcc5c0", "#fa9fb5", "#f768a1", "#dd3497", "#ae017e", "#7a0177",
    "#49006a",
];
const REDS: &[&str] = &[
    "#FFE4DE", "#FFC6BA", "#F7866E", "#d9745e", "#D25C43", "#b6442c", "#9b3a25", "#712a1c",
    "#562015", "#2d110b",
];
const PURPLES: &[&str] = &[
    "#fcfbfd", "#efedf5", "#dadaeb", "#bcbddc", "#9e9ac8", "#807dba", "#6a51a3", "#54278f",
    "#3f007d",
];
const REDS2: &[&str] = &[
    "#f0f0f0", "#fff5f0", "#fee0d2", "#fcbba1", "#fc9272", "#fb6a4a", "#ef3b2c", "#cb181d",
    "#a50f15", "#67000d",
];
const BLUES: &[&str] = &[
    "#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6", "#4292c6", "#2171b5", "#08519c",
    "#08306b", "#03142c",
];

pub const DEFAULT_COLOR_SCHEME: &str = "YlGnBu";

pub const PALETTE_NAMES: &[&str] = &[
    "ylgnbu", "orrd", "gnbu", "rdpu", "reds", "purples", "reds2", "blues",
];

/// Looks up a palette by case-insensitive name.
pub fn color_scheme(name: &str) -> Result<&'static [&'static str]> {
    let palette = match name.to_ascii_lowercase().as_str() {
        "ylgnbu" => YLGNBU,
        "orrd" => ORRD,
        "gnbu" => GNBU,
        "rdpu" => RDPU,
        "reds" => REDS,
        "purples" => PURPLES,
        "reds2" => REDS2,
        "blues" => BLUES,
        _ => {
            return Err(Error::UnknownColorScheme {
                name: name.to_string(),
            });
        }
    };
    Ok(palette)
}

/// `[0, round(max)]`; the lower bound is pinned at zero whatever the data holds.
pub fn color_domain(values: impl IntoIterator<Item = f64>) -> [f64; 2] {
    let max = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return [0.0, 0.0];
    }
    [0.0, max.round()]
}

pub fn color_scale(
    values: impl IntoIterator<Item = f64>,
    palette: &[&str],
) -> QuantileScale<String> {
    let domain = color_domain(values);
    QuantileScale::new(domain, palette.iter().map(|c| c.to_string()).collect())
}

/// Formats like JavaScript's `Number#toPrecision`.
pub fn to_precision(value: f64, precision: usize) -> String {
    let precision = precision.clamp(1, 100);
    if !value.is_finite() {
        return if value.is_nan() {
            "NaN".to_string()
        } else if value > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        };
    }

    let sci = format!("{:.*e}", precision - 1, value.abs());
    let Some((mantissa, exponent)) = sci.split_once('e') else {
        return sci;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let sign = if value < 0.0 { "-" } else { "" };

    if exponent < -6 || exponent >= precision as i32 {
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        return format!("{sign}{mantissa}e{exp_sign}{}", exponent.abs());
    }

    let body = if exponent < 0 {
        format!("0.{}{}", "0".repeat((-exponent - 1) as usize), digits)
    } else {
        let int_len = exponent as usize + 1;
        if int_len >= digits.len() {
            format!("{digits}{}", "0".repeat(int_len - digits.len()))
        } else {
            format!("{}.{}", &digits[..int_len], &digits[int_len..])
        }
    };
    format!("{sign}{body}")
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    /// Degrees.
    pub h: f64,
    /// 0..=1
    pub s: f64,
    /// 0..=1
    pub l: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "space", rename_all = "lowercase")]
pub enum Color {
    Rgb(Rgb),
    Hsl(Hsl),
}

impl Color {
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self::Rgb(Rgb { r, g, b })
    }

    pub fn hsl(h: f64, s: f64, l: f64) -> Self {
        Self::Hsl(Hsl { h, s, l })
    }

    /// Parses `#rgb`, `#rrggbb`, `rgb(r, g, b)` and `hsl(h, s%, l%)`.
    pub fn parse(text: &str) -> Option<Self> {
        let t = text.trim().to_ascii_lowercase();
        if let Some(hex) = t.strip_prefix('#') {
            return parse_hex(hex);
        }
        if let Some(args) = t.strip_prefix("rgb(").and_then(|s| s.strip_suffix(')')) {
            let parts = split_args(args)?;
            return Some(Self::rgb(parts[0], parts[1], parts[2]));
        }
        if let Some(args) = t.strip_prefix("hsl(").and_then(|s| s.strip_suffix(')')) {
            let parts = split_args(args)?;
            return Some(Self::hsl(parts[0], parts[1] / 100.0, parts[2] / 100.0));
        }
        None
    }

    pub fn to_rgb(self) -> Rgb {
        match self {
            Self::Rgb(rgb) => rgb,
            Self::Hsl(Hsl { h, s, l }) => {
                let h = h.rem_euclid(360.0);
                let m2 = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
                let m1 = 2.0 * l - m2;
                Rgb {
                    r: hsl_channel(if h >= 240.0 { h - 240.0 } else { h + 120.0 }, m1, m2),
                    g: hsl_channel(h, m1, m2),
                    b: hsl_channel(if h < 120.0 { h + 240.0 } else { h - 120.0 }, m1, m2),
                }
            }
        }
    }

    pub fn to_hex(self) -> String {
        let Rgb { r, g, b } = self.to_rgb();
        let c = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        format!("#{:02x}{:02x}{:02x}", c(r), c(g), c(b))
    }

    /// RGB-space interpolation, `t` clamped to `0..=1`.
    pub fn interpolate(self, other: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let a = self.to_rgb();
        let b = other.to_rgb();
        Color::rgb(
            a.r + (b.r - a.r) * t,
            a.g + (b.g - a.g) * t,
            a.b + (b.b - a.b) * t,
        )
    }
}

fn hsl_channel(h: f64, m1: f64, m2: f64) -> f64 {
    let v = if h < 60.0 {
        m1 + (m2 - m1) * h / 60.0
    } else if h < 180.0 {
        m2
    } else if h < 240.0 {
        m1 + (m2 - m1) * (240.0 - h) / 60.0
    } else {
        m1
    };
    v * 255.0
}

fn parse_hex(hex: &str) -> Option<Color> {
    let nibble = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 => {
            let (r, g, b) = (nibble(0)?, nibble(1)?, nibble(2)?);
            Some(Color::rgb(
                f64::from(r * 17),
                f64::from(g * 17),
                f64::from(b * 17),
            ))
        }
        6 => Some(Color::rgb(
            f64::from(byte(0)?),
            f64::from(byte(2)?),
            f64::from(byte(4)?),
        )),
        _ => None,
    }
}

fn split_args(args: &str) -> Option<[f64; 3]> {
    let mut out = [0.0; 3];
    let mut parts = args.split(',');
    for slot in &mut out {
        *slot = parts.next()?.trim().trim_end_matches('%').parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}
