//! # Coordinate Systems and Sexagesimal Algebra
//!
//! The coordinate-system enumeration shared by the whole crate, plus the
//! sexagesimal<->decimal conversion pair. The conversion accepts 1-3
//! numeric parts joined by one consistent separator style (`h/m/s`,
//! `d/m/s`, `d/'/"`, `:`, or whitespace) and enforces the classic
//! astronomical range rules: minutes/seconds below 60, latitude within
//! [-90, +90], longitude within [0, 360) degrees or [0, 24) hours.
//!
//! `parse_sexagesimal` and `format_sexagesimal` are exact inverses at a
//! given precision; the formatter carries seconds into minutes and
//! minutes into hours/degrees, wrapping at 24h/360d.

use thiserror::Error;

/// A named celestial or pixel reference frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordSys {
    Fk4,
    B1950,
    Fk5,
    J2000,
    Icrs,
    Ecliptic,
    Galactic,
    Image,
    Physical,
    Linear,
    Amplifier,
    Detector,
}

impl CoordSys {
    /// Canonical (case-insensitive) parse of a coordinate-system name.
    pub fn parse(s: &str) -> Option<CoordSys> {
        match s.to_ascii_uppercase().as_str() {
            "FK4" => Some(CoordSys::Fk4),
            "B1950" => Some(CoordSys::B1950),
            "FK5" => Some(CoordSys::Fk5),
            "J2000" => Some(CoordSys::J2000),
            "ICRS" => Some(CoordSys::Icrs),
            "ECLIPTIC" => Some(CoordSys::Ecliptic),
            "GALACTIC" => Some(CoordSys::Galactic),
            "IMAGE" => Some(CoordSys::Image),
            "PHYSICAL" => Some(CoordSys::Physical),
            "LINEAR" => Some(CoordSys::Linear),
            "AMPLIFIER" => Some(CoordSys::Amplifier),
            "DETECTOR" => Some(CoordSys::Detector),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CoordSys::Fk4 => "FK4",
            CoordSys::B1950 => "B1950",
            CoordSys::Fk5 => "FK5",
            CoordSys::J2000 => "J2000",
            CoordSys::Icrs => "ICRS",
            CoordSys::Ecliptic => "ECLIPTIC",
            CoordSys::Galactic => "GALACTIC",
            CoordSys::Image => "IMAGE",
            CoordSys::Physical => "PHYSICAL",
            CoordSys::Linear => "LINEAR",
            CoordSys::Amplifier => "AMPLIFIER",
            CoordSys::Detector => "DETECTOR",
        }
    }

    /// Equatorial frames admit hour-form longitudes.
    pub fn is_equatorial(&self) -> bool {
        matches!(
            self,
            CoordSys::Fk4 | CoordSys::B1950 | CoordSys::Fk5 | CoordSys::J2000 | CoordSys::Icrs
        )
    }

    /// Pixel-like frames: positions in them are not on the sky.
    pub fn is_pixel(&self) -> bool {
        matches!(
            self,
            CoordSys::Image
                | CoordSys::Physical
                | CoordSys::Linear
                | CoordSys::Amplifier
                | CoordSys::Detector
        )
    }
}

impl std::fmt::Display for CoordSys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Physical -> image pixel transform coefficients (FITS LTM1_1/LTV1, identity
// when the file does not say otherwise).
pub const PHYSICAL_LTM: f64 = 1.0;
pub const PHYSICAL_LTV: f64 = 0.0;

/// Linear physical->image pixel transform.
pub fn physical_to_image(v: f64) -> f64 {
    v * PHYSICAL_LTM + PHYSICAL_LTV
}

/// Everything that can go wrong while reading a sexagesimal coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SexError {
    #[error("empty coordinate string")]
    Empty,
    #[error("invalid input")]
    Invalid,
    #[error("invalid separator")]
    Separator,
    #[error("greater than 60 minutes or seconds")]
    MinSecTooBig,
    #[error("latitude is out of range [-90.0, +90.0]")]
    LatOutOfRange,
    #[error("longitude is too big (>=360.0)")]
    LonTooBig,
    #[error("RA is too big (>=24 hours)")]
    RaTooBig,
    #[error("longitude can not be negative")]
    LonNegative,
    #[error("HMS notation not valid for latitude")]
    HmsForLatitude,
    #[error("sexagesimal for non-equatorial coordinate")]
    SexForNonEquatorial,
}

/// Range rules for a coordinate already in its display unit: latitudes
/// within [-90, +90], degree-form longitudes within [0, 360).
pub(crate) fn check_coordinate_range(value: f64, is_latitude: bool) -> Result<(), SexError> {
    if is_latitude {
        if !(-90.0..=90.0).contains(&value) {
            return Err(SexError::LatOutOfRange);
        }
    } else {
        if value >= 360.0 {
            return Err(SexError::LonTooBig);
        }
        if value < 0.0 {
            return Err(SexError::LonNegative);
        }
    }
    Ok(())
}

/// Separator classification; `None` means "not a separator here".
fn classify_separator(c: char) -> Option<char> {
    match c {
        'h' | 'H' => Some('h'),
        'd' | 'D' => Some('d'),
        'm' | 'M' => Some('m'),
        's' | 'S' => Some('s'),
        ':' => Some(':'),
        '\'' | '"' => Some(c),
        _ => None,
    }
}

/// One numeric part: digits with at most one decimal point.
/// Returns (value, had_point, rest).
fn scan_part(input: &str) -> Result<(f64, bool, &str), SexError> {
    let mut end = 0;
    let mut point_seen = false;
    let mut digits = 0;
    for (i, c) in input.char_indices() {
        if c == '.' {
            if point_seen {
                return Err(SexError::Invalid);
            }
            point_seen = true;
        } else if c.is_ascii_digit() {
            digits += 1;
        } else {
            break;
        }
        end = i + c.len_utf8();
    }
    if digits == 0 {
        return Err(SexError::Invalid);
    }
    let value: f64 = input[..end].parse().map_err(|_| SexError::Invalid)?;
    Ok((value, point_seen, &input[end..]))
}

/// Parse a sexagesimal (or decimal-with-suffix) coordinate string into
/// decimal degrees.
///
/// `is_latitude` selects the [-90, +90] range check and outlaws hour
/// notation; `is_equatorial` decides whether hour form and bare
/// colon/whitespace sexagesimal are admissible at all, and whether a
/// bare number is read as hours (equatorial longitude) or degrees.
pub fn parse_sexagesimal(text: &str, is_latitude: bool, is_equatorial: bool) -> Result<f64, SexError> {
    let mut p = text.trim();
    if p.is_empty() {
        return Err(SexError::Empty);
    }

    let mut sign = 1.0;
    if let Some(rest) = p.strip_prefix('-') {
        sign = -1.0;
        p = rest;
    } else if let Some(rest) = p.strip_prefix('+') {
        p = rest;
    }
    p = p.trim_start(); // space allowed between sign and number
    if p.is_empty() {
        return Err(SexError::Invalid);
    }

    let mut parts: Vec<f64> = Vec::with_capacity(3);
    let mut seps: Vec<char> = Vec::with_capacity(3);
    let mut points: Vec<bool> = Vec::with_capacity(3);

    for _ in 0..3 {
        if p.is_empty() {
            break;
        }
        let (value, had_point, after) = scan_part(p)?;
        parts.push(value);
        points.push(had_point);

        // Classify the separator that follows the number. A space counts
        // as a separator; anything else unrecognized is junk.
        let trimmed = after.trim_start();
        let sep = match trimmed.chars().next() {
            None => {
                p = trimmed;
                seps.push(' ');
                continue;
            }
            Some(c) => classify_separator(c),
        };
        match sep {
            Some(s) => {
                seps.push(s);
                p = &trimmed[trimmed.chars().next().map_or(0, char::len_utf8)..];
            }
            None => {
                if after.starts_with(char::is_whitespace) {
                    seps.push(' ');
                    p = after.trim_start();
                } else {
                    return Err(SexError::Invalid);
                }
            }
        }
        p = p.trim_start();
    }

    // Anything left after three parts is junk.
    if !p.trim().is_empty() {
        return Err(SexError::Invalid);
    }

    let n = parts.len();
    if n == 0 {
        return Err(SexError::Invalid);
    }

    // A decimal point is only legal in the last part.
    if points[..n - 1].iter().any(|&seen| seen) {
        return Err(SexError::Invalid);
    }

    // Validate the separator pattern and decide hour-vs-degree form.
    // degrees: Some(false) = hour form, Some(true) = degree form,
    // None = undetermined (falls back on the latitude/equatorial hints).
    let mut degrees: Option<bool> = None;
    let is_decimal: bool;
    match n {
        3 => {
            is_decimal = false;
            match (seps[0], seps[1], seps[2]) {
                ('h', 'm', 's') | ('h', 'm', ' ') => degrees = Some(false),
                ('d', 'm', 's') | ('d', 'm', ' ') => degrees = Some(true),
                ('d', '\'', '"') | ('d', '\'', ' ') => degrees = Some(true),
                (':', ':', ' ') | (' ', ' ', ' ') => {}
                _ => return Err(SexError::Separator),
            }
        }
        2 => {
            is_decimal = false;
            match (seps[0], seps[1]) {
                ('h', 'm') | ('h', ' ') => degrees = Some(false),
                ('d', 'm') | ('d', ' ') => degrees = Some(true),
                ('d', '\'') | ('\'', '"') | ('\'', ' ') => degrees = Some(true),
                ('m', 's') | ('m', ' ') | (':', ' ') | (' ', ' ') => {}
                _ => return Err(SexError::Separator),
            }
        }
        _ => match seps[0] {
            'h' => {
                degrees = Some(false);
                is_decimal = false;
            }
            'd' => {
                degrees = Some(true);
                is_decimal = true;
            }
            ' ' => {
                is_decimal = is_equatorial && !is_latitude;
            }
            'm' | 's' => {
                is_decimal = false;
            }
            '\'' | '"' => {
                degrees = Some(true);
                is_decimal = false;
            }
            _ => return Err(SexError::Separator),
        },
    }

    let in_degrees = match degrees {
        Some(d) => d,
        // Latitudes are degrees, equatorial longitudes are hours (RA),
        // everything else is degrees.
        None => is_latitude || !is_equatorial,
    };

    // Hour notation never applies to a latitude.
    if !in_degrees && is_latitude {
        return Err(SexError::HmsForLatitude);
    }

    // Sexagesimal (non-decimal) input only makes sense on an equatorial
    // frame.
    if !is_equatorial && !is_decimal {
        return Err(SexError::SexForNonEquatorial);
    }

    for &part in &parts[1..] {
        if part >= 60.0 {
            return Err(SexError::MinSecTooBig);
        }
    }

    let mut angle = 0.0;
    let mut base = 1.0;
    for &part in &parts {
        angle += part / base;
        base *= 60.0;
    }

    // The leading part may itself have been minutes or seconds
    // (e.g. "20m30s" or just "45s").
    match seps[0] {
        'm' | '\'' => angle /= 60.0,
        's' | '"' => angle /= 3600.0,
        _ => {}
    }

    angle *= sign;

    if is_latitude || in_degrees {
        check_coordinate_range(angle, is_latitude)?;
    } else {
        if angle >= 24.0 {
            return Err(SexError::RaTooBig);
        }
        if angle < 0.0 {
            return Err(SexError::LonNegative);
        }
    }

    if !in_degrees {
        angle *= 15.0;
    }
    Ok(angle)
}

const MAX_PRECISION: u8 = 8;

/// Format decimal degrees back into the canonical sexagesimal string
/// for the given frame: DMS for equatorial latitudes, HMS for equatorial
/// longitudes, decimal degrees with a `d` suffix elsewhere.
///
/// `precision` (clamped to 0..=8) bounds the round-trip error at
/// 10^-precision degrees: for DMS it is 3 + the number of fractional
/// second digits, for HMS 2 + that number. Lower precisions
/// progressively drop the seconds and minutes fields, rounding with
/// carry.
pub fn format_sexagesimal(value: f64, is_latitude: bool, is_equatorial: bool, precision: u8) -> String {
    let precision = precision.min(MAX_PRECISION) as i32;

    let mut angle = value;
    let negative_lat = is_latitude && angle < 0.0;
    if !is_latitude {
        if angle < 0.0 {
            angle = angle % 360.0 + 360.0;
        }
        if angle >= 360.0 {
            angle %= 360.0;
        }
    }

    let sign_str = if is_latitude {
        if negative_lat {
            "-"
        } else {
            "+"
        }
    } else {
        ""
    };

    if !is_equatorial {
        // Decimal-degree form, e.g. "+12.34500d". The sign of a negative
        // latitude comes from the number itself.
        let plus = if is_latitude && value >= 0.0 { "+" } else { "" };
        return format!("{}{:.*}d", plus, precision as usize, angle);
    }

    let hms = !is_latitude;
    let (circ, head_char, min_per_degree) = if hms {
        (24i64, 'h', 4.0)
    } else {
        (360i64, 'd', 60.0)
    };

    // Width of the sexagesimal breakdown: 1 = head only, 2 = head+min,
    // 3 = head+min+sec, 4 = fractional seconds. Chosen so that the
    // rounding error of the last printed field stays below 10^-precision
    // degrees (one second of time is 15 arcsec).
    let (field_count, frac_digits) = if hms {
        match precision {
            0 => (2, 0),
            1 | 2 => (3, 0),
            p => (4, p - 2),
        }
    } else {
        match precision {
            0 => (1, 0),
            1 | 2 => (2, 0),
            3 => (3, 0),
            p => (4, p - 3),
        }
    };

    // Round once, in units of the last printed field, then decompose;
    // carries fall out of the integer division and the head wraps at
    // 24h/360d.
    let abs = angle.abs();
    match field_count {
        1 => {
            let mut rhd = abs.round() as i64;
            if rhd >= circ {
                rhd -= circ;
            }
            format!("{}{:02}d", sign_str, rhd)
        }
        2 => {
            let total = (abs * min_per_degree).round() as i64;
            let mut rhd = total / 60;
            let rm = total % 60;
            if rhd >= circ {
                rhd -= circ;
            }
            format!("{}{}{}{:02}m", sign_str, rhd, head_char, rm)
        }
        3 => {
            let total = (abs * min_per_degree * 60.0).round() as i64;
            let mut rhd = total / 3600;
            let rm = total / 60 % 60;
            let rs = total % 60;
            if rhd >= circ {
                rhd -= circ;
            }
            format!("{}{}{}{:02}m{:02}s", sign_str, rhd, head_char, rm, rs)
        }
        _ => {
            let scale = 10i64.pow(frac_digits as u32);
            let total = (abs * min_per_degree * 60.0 * scale as f64).round() as i64;
            let rfs = total % scale;
            let seconds = total / scale;
            let mut rhd = seconds / 3600;
            let rm = seconds / 60 % 60;
            let rs = seconds % 60;
            if rhd >= circ {
                rhd -= circ;
            }
            format!(
                "{}{}{}{:02}m{:02}.{:0width$}s",
                sign_str,
                rhd,
                head_char,
                rm,
                rs,
                rfs,
                width = frac_digits as usize
            )
        }
    }
}
