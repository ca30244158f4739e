//! Render options for QR output.
//!
//! [`RenderRequest`] carries whatever the caller asked for; resolving it
//! against defaults yields [`RenderOptions`] with width and margin clamped
//! into their safe ranges.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::color::Color;

pub const MIN_WIDTH: u32 = 128;
pub const MAX_WIDTH: u32 = 1024;
pub const MAX_MARGIN: u32 = 10;

/// QR error-correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ErrorCorrection {
    L,
    M,
    Q,
    #[default]
    H,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid error-correction level {0:?} (expected L, M, Q or H)")]
pub struct ErrorCorrectionParseError(pub String);

impl ErrorCorrection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::L => "L",
            Self::M => "M",
            Self::Q => "Q",
            Self::H => "H",
        }
    }

    pub(crate) fn ec_level(self) -> qrcode::EcLevel {
        match self {
            Self::L => qrcode::EcLevel::L,
            Self::M => qrcode::EcLevel::M,
            Self::Q => qrcode::EcLevel::Q,
            Self::H => qrcode::EcLevel::H,
        }
    }
}

impl FromStr for ErrorCorrection {
    type Err = ErrorCorrectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l" | "low" => Ok(Self::L),
            "m" | "medium" => Ok(Self::M),
            "q" | "quartile" => Ok(Self::Q),
            "h" | "high" => Ok(Self::H),
            _ => Err(ErrorCorrectionParseError(s.to_string())),
        }
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for ErrorCorrection {
    type Error = ErrorCorrectionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ErrorCorrection> for String {
    fn from(level: ErrorCorrection) -> Self {
        level.as_str().to_string()
    }
}

/// Module and background colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub dark: Color,
    pub light: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            dark: Color::FOREST,
            light: Color::WHITE,
        }
    }
}

/// Options handed to the encoder. Width and margin are always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    #[serde(rename = "errorCorrectionLevel")]
    pub error_correction: ErrorCorrection,
    pub width: u32,
    pub margin: u32,
    pub color: Palette,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            error_correction: ErrorCorrection::H,
            width: 256,
            margin: 4,
            color: Palette::default(),
        }
    }
}

impl RenderOptions {
    /// Re-clamp width and margin, e.g. after loading defaults from config.
    pub fn clamped(self) -> Self {
        Self {
            width: clamp_width(i64::from(self.width)),
            margin: clamp_margin(i64::from(self.margin)),
            ..self
        }
    }
}

/// Caller-supplied options; every field falls back to a default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    #[serde(default, alias = "errorCorrectionLevel", alias = "error")]
    pub error_correction: Option<ErrorCorrection>,
    #[serde(default, deserialize_with = "deserialize_dimension")]
    pub width: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_dimension")]
    pub margin: Option<i64>,
    #[serde(default, alias = "fg", alias = "foreground")]
    pub dark: Option<Color>,
    #[serde(default, alias = "bg", alias = "background")]
    pub light: Option<Color>,
}

impl RenderRequest {
    /// Fill unset fields from `defaults` and clamp width and margin.
    pub fn resolve(&self, defaults: &RenderOptions) -> RenderOptions {
        RenderOptions {
            error_correction: self.error_correction.unwrap_or(defaults.error_correction),
            width: clamp_width(self.width.unwrap_or(i64::from(defaults.width))),
            margin: clamp_margin(self.margin.unwrap_or(i64::from(defaults.margin))),
            color: Palette {
                dark: self.dark.unwrap_or(defaults.color.dark),
                light: self.light.unwrap_or(defaults.color.light),
            },
        }
    }

    /// Overlay the fields set in `newer` onto `self`.
    pub fn merge(&self, newer: &RenderRequest) -> RenderRequest {
        RenderRequest {
            error_correction: newer.error_correction.or(self.error_correction),
            width: newer.width.or(self.width),
            margin: newer.margin.or(self.margin),
            dark: newer.dark.or(self.dark),
            light: newer.light.or(self.light),
        }
    }
}

/// Parse a width or margin given as text.
///
/// Fractions truncate toward zero and values beyond `i64` saturate, so any
/// decimal number reaches clamping. Anything else is `None`.
pub fn parse_dimension(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<i64>() {
        return Some(value);
    }
    let numeric = raw.chars().any(|c| c.is_ascii_digit())
        && raw
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !numeric {
        return None;
    }
    raw.parse::<f64>().ok().map(|value| value as i64)
}

/// Accept a JSON integer, float or numeric string for a width or margin.
fn deserialize_dimension<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct DimensionVisitor;

    impl<'de> Visitor<'de> for DimensionVisitor {
        type Value = Option<i64>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number or numeric string")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(i64::try_from(v).unwrap_or(i64::MAX)))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            if v.is_nan() {
                return Err(E::invalid_value(Unexpected::Float(v), &self));
            }
            Ok(Some(v as i64))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            if v.trim().is_empty() {
                return Ok(None);
            }
            parse_dimension(v)
                .map(Some)
                .ok_or_else(|| E::invalid_value(Unexpected::Str(v), &self))
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> Result<Self::Value, D2::Error> {
            d.deserialize_any(self)
        }
    }

    deserializer.deserialize_any(DimensionVisitor)
}

pub fn clamp_width(width: i64) -> u32 {
    width.clamp(i64::from(MIN_WIDTH), i64::from(MAX_WIDTH)) as u32
}

pub fn clamp_margin(margin: i64) -> u32 {
    margin.clamp(0, i64::from(MAX_MARGIN)) as u32
}
