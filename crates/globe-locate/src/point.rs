//! `LAT,LON` argument parsing.

use globe_projection::GeographicPosition;

/// Parse `"LAT,LON"` in degrees into a surface position.
///
/// Range checking is left to the model so out-of-range points are reported
/// with the same error as library callers see.
pub fn parse_point(s: &str) -> Result<GeographicPosition, String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got '{s}'"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|e| format!("invalid latitude '{}': {e}", lat.trim()))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|e| format!("invalid longitude '{}': {e}", lon.trim()))?;
    Ok(GeographicPosition::surface(lat, lon))
}
