use crate::foundation::error::{AnimatorError, AnimatorResult};

pub use kurbo::{Point, Rect, Vec2};

/// Index of an output frame. Timeline frames start at 1; index 0 is the pre-roll state.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> AnimatorResult<Self> {
        if den == 0 {
            return Err(AnimatorError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(AnimatorError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    pub fn frame_duration_ms(self) -> f64 {
        1000.0 * f64::from(self.den) / f64::from(self.num)
    }

    /// Number of frames needed to show `ms` milliseconds, rounded to the nearest frame.
    pub fn ms_to_frames_round(self, ms: u64) -> u64 {
        (ms as f64 / 1000.0 * self.as_f64()).round().max(0.0) as u64
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

impl std::str::FromStr for Fps {
    type Err = AnimatorError;

    /// Accepts `30` or a rational `30000/1001`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |v: &str| {
            v.trim()
                .parse::<u32>()
                .map_err(|_| AnimatorError::validation(format!("invalid fps '{s}'")))
        };
        match s.split_once('/') {
            Some((num, den)) => Fps::new(parse(num)?, parse(den)?),
            None => Fps::new(parse(s)?, 1),
        }
    }
}

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const WHITE: Rgba8 = Rgba8::new(255, 255, 255, 255);
    pub const BLACK: Rgba8 = Rgba8::new(0, 0, 0, 255);
    pub const TRANSPARENT: Rgba8 = Rgba8::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Scale the alpha channel by `factor` in `[0, 1]`.
    pub fn fade(self, factor: f64) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        self.with_alpha((f64::from(self.a) * factor).round() as u8)
    }

    /// Linear blend where `ratio = 1` yields `self` and `ratio = 0` yields `other`.
    ///
    /// Alpha is the maximum of both inputs so that a transparent tail color never hides the
    /// newest part of a trail.
    pub fn blend(self, other: Rgba8, ratio: f64) -> Self {
        let ratio = ratio.clamp(0.0, 1.0);
        let inv = 1.0 - ratio;
        let mix = |a: u8, b: u8| (f64::from(a) * ratio + f64::from(b) * inv) as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: self.a.max(other.a),
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl std::str::FromStr for Rgba8 {
    type Err = AnimatorError;

    /// Parses `#rrggbb` or `#rrggbbaa` (the leading `#` is optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || AnimatorError::validation(format!("invalid color '{s}'"));
        if hex.len() != 6 && hex.len() != 8 {
            return Err(invalid());
        }
        let byte = |i: usize| {
            hex.get(i..i + 2)
                .and_then(|b| u8::from_str_radix(b, 16).ok())
                .ok_or_else(invalid)
        };
        let a = if hex.len() == 8 { byte(6)? } else { 255 };
        Ok(Self::new(byte(0)?, byte(2)?, byte(4)?, a))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
