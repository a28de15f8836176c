//! Geospatial support for the persistence layer.
//!
//! SQLite has no native nearest-within-radius queries, so the capability
//! lives here at the store boundary: a coarse bounding box narrows the
//! candidate rows in SQL, and the precise great-circle distance filters and
//! orders them. Callers never do coordinate math themselves.

use crate::db::models::GeoPoint;

/// Mean Earth radius in meters (IUGG)
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Radius applied when a search has a center but no explicit radius
pub const DEFAULT_SEARCH_RADIUS_M: f64 = 5_000.0;

/// Great-circle distance between two points in meters (haversine formula).
pub fn distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Axis-aligned coordinate window guaranteed to contain a radius around a
/// center point. Used as an index-friendly SQL prefilter; candidates still
/// go through the exact distance check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

pub fn bounding_box(center: GeoPoint, radius_m: f64) -> BoundingBox {
    let d_lat = (radius_m / EARTH_RADIUS_M).to_degrees();

    // Longitude degrees shrink with latitude; near the poles the window
    // degenerates, so fall back to the full range there.
    let cos_lat = center.latitude.to_radians().cos();
    let d_lon = if cos_lat > 1e-6 {
        (radius_m / (EARTH_RADIUS_M * cos_lat)).to_degrees()
    } else {
        360.0
    };

    BoundingBox {
        min_latitude: (center.latitude - d_lat).max(-90.0),
        max_latitude: (center.latitude + d_lat).min(90.0),
        min_longitude: (center.longitude - d_lon).max(-180.0),
        max_longitude: (center.longitude + d_lon).min(180.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        let p = GeoPoint::new(18.06, 59.33);
        assert_eq!(distance_m(p, p), 0.0);
    }

    #[test]
    fn test_known_distance_at_equator() {
        // One degree of longitude at the equator is roughly 111.19 km
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 0.0);
        let d = distance_m(a, b);
        assert!((d - 111_195.0).abs() < 100.0, "got {}", d);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = GeoPoint::new(18.0686, 59.3293); // Stockholm
        let b = GeoPoint::new(12.5683, 55.6761); // Copenhagen
        let d = distance_m(a, b);
        assert_eq!(d, distance_m(b, a));
        // ~520 km as the crow flies
        assert!((500_000.0..550_000.0).contains(&d), "got {}", d);
    }

    #[test]
    fn test_bounding_box_contains_radius() {
        let center = GeoPoint::new(18.0686, 59.3293);
        let bbox = bounding_box(center, 5_000.0);

        assert!(bbox.min_latitude < center.latitude);
        assert!(bbox.max_latitude > center.latitude);
        assert!(bbox.min_longitude < center.longitude);
        assert!(bbox.max_longitude > center.longitude);

        // Points on the cardinal edges of the circle must fall inside the box
        let north = GeoPoint::new(center.longitude, center.latitude + 0.0449);
        assert!(north.latitude <= bbox.max_latitude + 1e-9);
    }

    #[test]
    fn test_bounding_box_clamps_at_pole() {
        let bbox = bounding_box(GeoPoint::new(0.0, 89.99), 10_000.0);
        assert!(bbox.max_latitude <= 90.0);
        assert_eq!(bbox.min_longitude, -180.0);
        assert_eq!(bbox.max_longitude, 180.0);
    }
}
