//! Degree-string coordinate parsing
//!
//! Field exports write positions as degree strings with a hemisphere suffix
//! and a decimal comma, e.g. `20,7547°S` or `164,2385°E`, and the combined
//! location column joins the two with `", "`. Decimal commas are never
//! followed by a space, so that separator is unambiguous.

use thiserror::Error;

/// Which axis a hemisphere suffix pins a value to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

/// A parsed signed angle, with the axis implied by its suffix (if any)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignedAngle {
    pub value: f64,
    pub axis: Option<Axis>,
}

#[derive(Debug, Error, PartialEq)]
pub enum CoordError {
    #[error("empty coordinate")]
    Empty,

    #[error("not a number: '{0}'")]
    NotANumber(String),

    #[error("'{0}' carries a hemisphere suffix but is already signed")]
    ConflictingSign(String),

    #[error("latitude {0} out of range [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} out of range [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("expected a 'lat, lon' pair, got '{0}'")]
    NotAPair(String),

    #[error("'{0}' and '{1}' do not form one latitude and one longitude")]
    AmbiguousPair(String, String),

    #[error("'{value}' is not a {expected}")]
    WrongAxis { value: String, expected: &'static str },
}

/// Parse a single degree string into a signed decimal angle.
///
/// `"20,7547°S"` becomes `-20.7547` with `Axis::Latitude`; a bare signed
/// number like `"-20.7547"` parses with no axis information.
pub fn parse_angle(raw: &str) -> Result<SignedAngle, CoordError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoordError::Empty);
    }

    let (body, sign, axis) = match trimmed.chars().last() {
        Some('N') | Some('n') => (&trimmed[..trimmed.len() - 1], 1.0, Some(Axis::Latitude)),
        Some('S') | Some('s') => (&trimmed[..trimmed.len() - 1], -1.0, Some(Axis::Latitude)),
        Some('E') | Some('e') => (&trimmed[..trimmed.len() - 1], 1.0, Some(Axis::Longitude)),
        Some('W') | Some('w') => (&trimmed[..trimmed.len() - 1], -1.0, Some(Axis::Longitude)),
        _ => (trimmed, 1.0, None),
    };

    // The degree sign sits between the number and the hemisphere letter
    let body = body.trim_end_matches('°').trim();
    let normalized = body.replace(',', ".");

    let magnitude: f64 = normalized
        .parse()
        .map_err(|_| CoordError::NotANumber(raw.trim().to_string()))?;

    if axis.is_some() && magnitude < 0.0 {
        return Err(CoordError::ConflictingSign(raw.trim().to_string()));
    }

    Ok(SignedAngle { value: sign * magnitude, axis })
}

/// Parse a latitude string, rejecting longitude suffixes and out-of-range values
pub fn parse_latitude(raw: &str) -> Result<f64, CoordError> {
    let angle = parse_angle(raw)?;
    if angle.axis == Some(Axis::Longitude) {
        return Err(CoordError::WrongAxis { value: raw.trim().to_string(), expected: "latitude" });
    }
    check_latitude(angle.value)
}

/// Parse a longitude string, rejecting latitude suffixes and out-of-range values
pub fn parse_longitude(raw: &str) -> Result<f64, CoordError> {
    let angle = parse_angle(raw)?;
    if angle.axis == Some(Axis::Latitude) {
        return Err(CoordError::WrongAxis { value: raw.trim().to_string(), expected: "longitude" });
    }
    check_longitude(angle.value)
}

/// Parse a combined `"20,7547°S, 164,2385°E"` location field into
/// `(latitude, longitude)`.
///
/// Halves are classified by their hemisphere suffix, so a file that writes
/// longitude first still parses correctly. Suffix-less pairs are taken in
/// `lat, lon` order.
pub fn parse_location(raw: &str) -> Result<(f64, f64), CoordError> {
    let mut parts = raw.trim().split(", ");
    let (first, second) = match (parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(b), None) => (a, b),
        _ => return Err(CoordError::NotAPair(raw.trim().to_string())),
    };
    classify_pair(first, second)
}

/// Turn two coordinate fields into `(latitude, longitude)` using hemisphere
/// suffixes where present. Survey exports have been seen with the latitude
/// and longitude columns swapped; the suffix is authoritative.
pub fn classify_pair(first: &str, second: &str) -> Result<(f64, f64), CoordError> {
    let a = parse_angle(first)?;
    let b = parse_angle(second)?;

    let (lat, lon) = match (a.axis, b.axis) {
        (Some(Axis::Latitude), Some(Axis::Longitude)) => (a.value, b.value),
        (Some(Axis::Longitude), Some(Axis::Latitude)) => (b.value, a.value),
        // One suffix pins one axis, the other half takes the remaining one
        (Some(Axis::Latitude), None) => (a.value, b.value),
        (Some(Axis::Longitude), None) => (b.value, a.value),
        (None, Some(Axis::Latitude)) => (b.value, a.value),
        (None, Some(Axis::Longitude)) => (a.value, b.value),
        // No suffixes at all: assume lat, lon order
        (None, None) => (a.value, b.value),
        _ => {
            return Err(CoordError::AmbiguousPair(
                first.trim().to_string(),
                second.trim().to_string(),
            ))
        }
    };

    Ok((check_latitude(lat)?, check_longitude(lon)?))
}

fn check_latitude(value: f64) -> Result<f64, CoordError> {
    if !(-90.0..=90.0).contains(&value) {
        return Err(CoordError::LatitudeOutOfRange(value));
    }
    Ok(value)
}

fn check_longitude(value: f64) -> Result<f64, CoordError> {
    if !(-180.0..=180.0).contains(&value) {
        return Err(CoordError::LongitudeOutOfRange(value));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_angle_south() {
        let angle = parse_angle("1,234°S").unwrap();
        assert_eq!(angle.value, -1.234);
        assert_eq!(angle.axis, Some(Axis::Latitude));
    }

    #[test]
    fn test_parse_angle_east() {
        let angle = parse_angle("164,2385°E").unwrap();
        assert_eq!(angle.value, 164.2385);
        assert_eq!(angle.axis, Some(Axis::Longitude));
    }

    #[test]
    fn test_parse_angle_bare_number() {
        let angle = parse_angle("-20.7547").unwrap();
        assert_eq!(angle.value, -20.7547);
        assert_eq!(angle.axis, None);
    }

    #[test]
    fn test_parse_angle_no_degree_sign() {
        let angle = parse_angle("20,75S").unwrap();
        assert_eq!(angle.value, -20.75);
    }

    #[test]
    fn test_parse_angle_rejects_garbage() {
        assert_eq!(parse_angle(""), Err(CoordError::Empty));
        assert!(matches!(parse_angle("north"), Err(CoordError::NotANumber(_))));
        assert!(matches!(parse_angle("-1,2°S"), Err(CoordError::ConflictingSign(_))));
    }

    #[test]
    fn test_parse_location() {
        let (lat, lon) = parse_location("20,7547°S, 164,2385°E").unwrap();
        assert_eq!(lat, -20.7547);
        assert_eq!(lon, 164.2385);
    }

    #[test]
    fn test_parse_location_swapped_order() {
        let (lat, lon) = parse_location("164,2385°E, 20,7547°S").unwrap();
        assert_eq!(lat, -20.7547);
        assert_eq!(lon, 164.2385);
    }

    #[test]
    fn test_parse_location_not_a_pair() {
        assert!(matches!(parse_location("20,7547°S"), Err(CoordError::NotAPair(_))));
        assert!(matches!(
            parse_location("1°S, 2°S, 3°E"),
            Err(CoordError::NotAPair(_))
        ));
    }

    #[test]
    fn test_classify_pair_swapped_columns() {
        // Bats export: the LATITUDE column actually holds the longitude
        let (lat, lon) = classify_pair("164,2385°E", "20,7547°S").unwrap();
        assert_eq!(lat, -20.7547);
        assert_eq!(lon, 164.2385);
    }

    #[test]
    fn test_classify_pair_two_latitudes() {
        assert!(matches!(
            classify_pair("1°S", "2°N"),
            Err(CoordError::AmbiguousPair(_, _))
        ));
    }

    #[test]
    fn test_range_checks() {
        assert!(matches!(
            parse_latitude("95,0°S"),
            Err(CoordError::LatitudeOutOfRange(_))
        ));
        assert!(matches!(
            parse_longitude("181°E"),
            Err(CoordError::LongitudeOutOfRange(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_south_latitudes_sign_flip(deg in 0u32..90, frac in 0u32..10_000) {
            let raw = format!("{deg},{frac:04}°S");
            let expected = -(deg as f64 + frac as f64 / 10_000.0);
            let parsed = parse_latitude(&raw).unwrap();
            prop_assert!((parsed - expected).abs() < 1e-9);
        }

        #[test]
        fn prop_east_longitudes_positive(deg in 0u32..180, frac in 0u32..10_000) {
            let raw = format!("{deg},{frac:04}°E");
            let expected = deg as f64 + frac as f64 / 10_000.0;
            let parsed = parse_longitude(&raw).unwrap();
            prop_assert!((parsed - expected).abs() < 1e-9);
        }

        #[test]
        fn prop_location_pair_roundtrip(
            lat_deg in 0u32..90, lat_frac in 0u32..10_000,
            lon_deg in 0u32..180, lon_frac in 0u32..10_000,
        ) {
            let raw = format!("{lat_deg},{lat_frac:04}°S, {lon_deg},{lon_frac:04}°E");
            let (lat, lon) = parse_location(&raw).unwrap();
            prop_assert!(lat <= 0.0);
            prop_assert!(lon >= 0.0);
            prop_assert!((lat + (lat_deg as f64 + lat_frac as f64 / 10_000.0)).abs() < 1e-9);
            prop_assert!((lon - (lon_deg as f64 + lon_frac as f64 / 10_000.0)).abs() < 1e-9);
        }
    }
}
