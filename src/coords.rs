//! Conversions between decimal degrees and sexagesimal representations.

use crate::error::{CatalogError, Result};
use crate::utils::{format_float, round_to};
use serde::{Deserialize, Serialize};

/// An angle split into degrees, minutes and seconds.
///
/// The sign lives in its own field (`-1`, `0` or `1`) rather than being
/// folded into `deg`, so `-0° 30' 0"` survives the round trip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sexagesimal {
    pub sign: i8,
    pub deg: u32,
    pub min: u32,
    pub sec: f64,
}

impl Sexagesimal {
    /// Convert back to decimal degrees using the explicit sign field.
    pub fn to_degrees(&self) -> f64 {
        self.sign as f64 * (self.deg as f64 + self.min as f64 / 60.0 + self.sec / 3600.0)
    }

    /// Render as `{deg}°  {min}'  {sec}"`, seconds rounded half away from
    /// zero to `precision` decimal places. The sign is shown on the degrees
    /// field (lost when `deg` is zero, matching the viewer's display).
    pub fn format(&self, precision: u32) -> String {
        let sec = round_to(self.sec, precision);
        let deg = self.sign as i64 * self.deg as i64;
        format!("{}\u{b0}  {}'  {}\"", deg, self.min, format_float(sec))
    }
}

/// Split decimal degrees into sign, integer degrees, integer minutes and
/// fractional seconds. Total over finite floats; a non-finite input taints
/// the seconds field with NaN.
pub fn degrees_to_sexagesimal(x: f64) -> Sexagesimal {
    let y = x.abs();
    let sign = if x == 0.0 {
        0
    } else if x < 0.0 {
        -1
    } else {
        1
    };
    let deg = y.floor();
    let min = ((y - deg) * 60.0).floor();
    let sec = (y - deg - min / 60.0) * 3600.0;
    Sexagesimal {
        sign,
        deg: deg as u32,
        min: min as u32,
        sec,
    }
}

/// A validated world-coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldCoord {
    pub ra: f64,
    pub dec: f64,
}

impl WorldCoord {
    /// Both inputs must be finite numbers.
    pub fn new(ra: f64, dec: f64) -> Result<Self> {
        if !ra.is_finite() {
            return Err(CatalogError::InvalidCoordinate {
                value: format!("ra={}", ra),
            });
        }
        if !dec.is_finite() {
            return Err(CatalogError::InvalidCoordinate {
                value: format!("dec={}", dec),
            });
        }
        Ok(WorldCoord { ra, dec })
    }

    /// Right ascension in hours/minutes/seconds (`"5h 34m 31.94s"`).
    /// Degrees are divided by 15 before the sexagesimal split.
    pub fn format_ra(&self, precision: u32) -> String {
        let sex = degrees_to_sexagesimal(self.ra / 15.0);
        let sec = round_to(sex.sec, precision);
        let hours = sex.sign as i64 * sex.deg as i64;
        format!("{}h {}m {}s", hours, sex.min, format_float(sec))
    }

    /// Declination as signed sexagesimal degrees.
    pub fn format_dec(&self, precision: u32) -> String {
        degrees_to_sexagesimal(self.dec).format(precision)
    }
}
