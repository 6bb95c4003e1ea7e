//! Geographic positions
//!
//! Decimal-degree positions with the NMEA `DDMM.MMMM,N,DDDMM.MMMM,E` field
//! form and the great-circle helpers the simulation needs.

use std::fmt;

use crate::error::ParseError;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Meters per nautical mile
pub const METERS_PER_NM: f64 = 1852.0;

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
}

/// The four NMEA position fields: latitude, N/S, longitude, E/W
pub type NmeaPositionFields = (String, char, String, char);

impl GeoPosition {
    /// The AIS "position not available" marker (91°, 181°)
    pub const NOT_AVAILABLE: GeoPosition = GeoPosition {
        latitude: 91.0,
        longitude: 181.0,
    };

    /// Create a position, `None` if it is off the globe
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        ((-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude))
            .then_some(Self {
                latitude,
                longitude,
            })
    }

    /// Render as NMEA position fields
    pub fn to_nmea(&self) -> NmeaPositionFields {
        let lat_hem = if self.latitude >= 0.0 { 'N' } else { 'S' };
        let lon_hem = if self.longitude >= 0.0 { 'E' } else { 'W' };
        (
            format_dm(self.latitude.abs(), 2),
            lat_hem,
            format_dm(self.longitude.abs(), 3),
            lon_hem,
        )
    }

    /// Parse NMEA position fields
    pub fn from_nmea(lat: &str, lat_hem: &str, lon: &str, lon_hem: &str) -> Result<Self, ParseError> {
        let mut latitude = parse_dm(lat, 2, "latitude")?;
        match lat_hem {
            "N" => {}
            "S" => latitude = -latitude,
            other => return Err(invalid("latitude hemisphere", other)),
        }
        let mut longitude = parse_dm(lon, 3, "longitude")?;
        match lon_hem {
            "E" => {}
            "W" => longitude = -longitude,
            other => return Err(invalid("longitude hemisphere", other)),
        }
        Self::new(latitude, longitude).ok_or_else(|| invalid("position", &format!("{lat},{lon}")))
    }

    /// Haversine distance in meters
    pub fn distance_to(&self, other: &GeoPosition) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let dlat = lat2 - lat1;
        let dlon = (other.longitude - self.longitude).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().asin()
    }

    /// Initial great-circle bearing to `other`, degrees in [0, 360)
    pub fn bearing_to(&self, other: &GeoPosition) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let dlon = (other.longitude - self.longitude).to_radians();
        let y = dlon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
        y.atan2(x).to_degrees().rem_euclid(360.0)
    }

    /// Point reached after travelling `distance_m` along `bearing_deg`
    pub fn destination(&self, bearing_deg: f64, distance_m: f64) -> GeoPosition {
        let lat1 = self.latitude.to_radians();
        let lon1 = self.longitude.to_radians();
        let brg = bearing_deg.to_radians();
        let delta = distance_m / EARTH_RADIUS_M;

        let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * brg.cos()).asin();
        let lon2 = lon1
            + (brg.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());

        GeoPosition {
            latitude: lat2.to_degrees(),
            longitude: normalize_longitude(lon2.to_degrees()),
        }
    }
}

impl fmt::Display for GeoPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lat_hem = if self.latitude >= 0.0 { 'N' } else { 'S' };
        let lon_hem = if self.longitude >= 0.0 { 'E' } else { 'W' };
        write!(
            f,
            "{:.6}°{}, {:.6}°{}",
            self.latitude.abs(),
            lat_hem,
            self.longitude.abs(),
            lon_hem
        )
    }
}

fn normalize_longitude(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && lon > 0.0 {
        180.0
    } else {
        wrapped
    }
}

fn invalid(field: &'static str, value: &str) -> ParseError {
    ParseError::InvalidField {
        field,
        value: value.to_string(),
    }
}

// Work in integer 1/10000 minutes so rounding can never produce "60.0000"
fn format_dm(abs_degrees: f64, degree_digits: usize) -> String {
    let total = (abs_degrees * 600_000.0).round() as u64;
    let degrees = total / 600_000;
    let minutes = total % 600_000;
    format!(
        "{:0width$}{:02}.{:04}",
        degrees,
        minutes / 10_000,
        minutes % 10_000,
        width = degree_digits
    )
}

fn parse_dm(s: &str, degree_digits: usize, field: &'static str) -> Result<f64, ParseError> {
    if s.len() <= degree_digits || !s.is_ascii() {
        return Err(invalid(field, s));
    }
    let degrees: u32 = s[..degree_digits].parse().map_err(|_| invalid(field, s))?;
    let minutes: f64 = s[degree_digits..].parse().map_err(|_| invalid(field, s))?;
    if !(0.0..60.0).contains(&minutes) {
        return Err(invalid(field, s));
    }
    Ok(f64::from(degrees) + minutes / 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_nmea() {
        let pos = GeoPosition::new(48.1173, 11.516_666_7).unwrap();
        let (lat, ns, lon, ew) = pos.to_nmea();
        assert_eq!(lat, "4807.0380");
        assert_eq!(ns, 'N');
        assert_eq!(lon, "01131.0000");
        assert_eq!(ew, 'E');
    }

    #[test]
    fn test_to_nmea_southwest() {
        let pos = GeoPosition::new(-33.5, -70.25).unwrap();
        assert_eq!(
            pos.to_nmea(),
            ("3330.0000".to_string(), 'S', "07015.0000".to_string(), 'W')
        );
    }

    #[test]
    fn test_to_nmea_no_sixty_minutes() {
        let pos = GeoPosition::new(10.999_999_99, 0.0).unwrap();
        assert_eq!(pos.to_nmea().0, "1100.0000");
    }

    #[test]
    fn test_from_nmea() {
        let pos = GeoPosition::from_nmea("4807.038", "N", "01131.000", "W").unwrap();
        assert!((pos.latitude - 48.1173).abs() < 1e-6);
        assert!((pos.longitude + 11.516_666).abs() < 1e-5);

        assert!(GeoPosition::from_nmea("4807.038", "X", "01131.000", "E").is_err());
        assert!(GeoPosition::from_nmea("48", "N", "01131.000", "E").is_err());
        assert!(GeoPosition::from_nmea("4860.000", "N", "01131.000", "E").is_err());
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(GeoPosition::new(91.0, 0.0).is_none());
        assert!(GeoPosition::new(0.0, -180.5).is_none());
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        let a = GeoPosition::new(0.0, 0.0).unwrap();
        let b = GeoPosition::new(1.0, 0.0).unwrap();
        let d = a.distance_to(&b);
        assert!((d - 111_195.0).abs() < 10.0, "{d}");
    }

    #[test]
    fn test_bearing() {
        let a = GeoPosition::new(0.0, 0.0).unwrap();
        assert!((a.bearing_to(&GeoPosition::new(1.0, 0.0).unwrap()) - 0.0).abs() < 1e-9);
        assert!((a.bearing_to(&GeoPosition::new(0.0, 1.0).unwrap()) - 90.0).abs() < 1e-9);
        assert!((a.bearing_to(&GeoPosition::new(-1.0, 0.0).unwrap()) - 180.0).abs() < 1e-9);
        assert!((a.bearing_to(&GeoPosition::new(0.0, -1.0).unwrap()) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_destination_inverts_distance() {
        let start = GeoPosition::new(37.8, -122.4).unwrap();
        let end = start.destination(45.0, 10_000.0);
        assert!((start.distance_to(&end) - 10_000.0).abs() < 0.01);
        assert!((start.bearing_to(&end) - 45.0).abs() < 0.01);
    }

    #[test]
    fn test_destination_wraps_antimeridian() {
        let start = GeoPosition::new(0.0, 179.99).unwrap();
        let end = start.destination(90.0, 5_000.0);
        assert!(end.longitude < -179.0);
    }
}
