//! Numeric region values and their units.
//!
//! Every number in a region description carries a unit, either spelled
//! as a one-character suffix (`"` arcsec, `'` arcmin, `d` degree, `r`
//! radian, `p`/`i` pixel) or left bare, in which case the active
//! coordinate system decides what it means.

use crate::coords::{self, parse_sexagesimal, CoordSys, SexError};

/// Unit attached to a single numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionUnit {
    ArcSec,
    ArcMin,
    Degree,
    Radian,
    ImagePixel,
    ScreenPixel,
    /// Placeholder for a bare number; resolved against the active
    /// coordinate system before it ever reaches a caller.
    Context,
}

impl RegionUnit {
    /// Map a trailing unit character to its unit, if recognized.
    pub fn from_suffix(c: char) -> Option<RegionUnit> {
        match c {
            '"' => Some(RegionUnit::ArcSec),
            '\'' => Some(RegionUnit::ArcMin),
            'd' | 'D' => Some(RegionUnit::Degree),
            'r' | 'R' => Some(RegionUnit::Radian),
            'p' | 'P' | 'i' | 'I' => Some(RegionUnit::ImagePixel),
            _ => None,
        }
    }

    pub fn is_angular(&self) -> bool {
        matches!(
            self,
            RegionUnit::ArcSec | RegionUnit::ArcMin | RegionUnit::Degree | RegionUnit::Radian
        )
    }

    pub fn is_pixel(&self) -> bool {
        matches!(self, RegionUnit::ImagePixel | RegionUnit::ScreenPixel)
    }
}

/// A number plus the unit it was written in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionValue {
    pub value: f64,
    pub unit: RegionUnit,
}

impl RegionValue {
    pub fn new(value: f64, unit: RegionUnit) -> RegionValue {
        RegionValue { value, unit }
    }

    /// The value in decimal degrees, or `None` for pixel units.
    pub fn to_degrees(&self) -> Option<f64> {
        match self.unit {
            RegionUnit::Degree => Some(self.value),
            RegionUnit::ArcMin => Some(self.value / 60.0),
            RegionUnit::ArcSec => Some(self.value / 3600.0),
            RegionUnit::Radian => Some(self.value.to_degrees()),
            RegionUnit::ImagePixel | RegionUnit::ScreenPixel | RegionUnit::Context => None,
        }
    }
}

/// Convert between angular units. Pixel and context units have no fixed
/// angular size and give `None`.
pub fn convert_angle(value: f64, from: RegionUnit, to: RegionUnit) -> Option<f64> {
    let degrees = RegionValue::new(value, from).to_degrees()?;
    match to {
        RegionUnit::Degree => Some(degrees),
        RegionUnit::ArcMin => Some(degrees * 60.0),
        RegionUnit::ArcSec => Some(degrees * 3600.0),
        RegionUnit::Radian => Some(degrees.to_radians()),
        RegionUnit::ImagePixel | RegionUnit::ScreenPixel | RegionUnit::Context => None,
    }
}

/// Width/height pair of a box or ellipse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionDimension {
    pub width: RegionValue,
    pub height: RegionValue,
}

/// What role a token plays in its statement; coordinates may be
/// sexagesimal, plain sizes may not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueHint {
    Longitude,
    Latitude,
    Scalar,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("not a number: `{0}`")]
    NotANumber(String),
    #[error(transparent)]
    Sexagesimal(#[from] SexError),
    #[error("mixed angular and pixel units in one position")]
    MixedUnits,
}

/// Read one numeric token into a value with a resolved unit.
///
/// Bare numbers take their unit from `sys`: pixel frames give image
/// pixels (with the physical frame run through its linear transform),
/// anything else gives degrees. Tokens that fail to parse as a float
/// fall back to sexagesimal, but only when the hint marks them as a
/// coordinate component.
pub fn convert_value(
    token: &str,
    sys: Option<CoordSys>,
    hint: ValueHint,
) -> Result<RegionValue, ValueError> {
    let token = token.trim();
    let (number_text, unit) = match token.chars().last().and_then(RegionUnit::from_suffix) {
        Some(unit) => (&token[..token.len() - 1], unit),
        None => (token, RegionUnit::Context),
    };

    if let Ok(value) = number_text.parse::<f64>() {
        let resolved = match unit {
            RegionUnit::Context => match sys {
                Some(CoordSys::Physical) => {
                    RegionValue::new(coords::physical_to_image(value), RegionUnit::ImagePixel)
                }
                Some(s) if s.is_pixel() => RegionValue::new(value, RegionUnit::ImagePixel),
                _ => RegionValue::new(value, RegionUnit::Degree),
            },
            u => RegionValue::new(value, u),
        };
        // Angular coordinate components obey the same range rules as
        // sexagesimal input; sizes and pixel values are unchecked.
        if hint != ValueHint::Scalar {
            if let Some(degrees) = resolved.to_degrees() {
                coords::check_coordinate_range(degrees, hint == ValueHint::Latitude)?;
            }
        }
        return Ok(resolved);
    }

    // Sexagesimal is only admissible for coordinate components.
    let is_latitude = match hint {
        ValueHint::Latitude => true,
        ValueHint::Longitude => false,
        ValueHint::Scalar => return Err(ValueError::NotANumber(token.to_string())),
    };
    let is_equatorial = sys.map_or(true, |s| s.is_equatorial());
    let degrees = parse_sexagesimal(token, is_latitude, is_equatorial)?;
    Ok(RegionValue::new(degrees, RegionUnit::Degree))
}
