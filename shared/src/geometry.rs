//! Polygon feature extraction for drawn field boundaries
//!
//! Derives area, center and bounding box from a ring of [lon, lat] vertices.
//! Area uses the geodesic ring-area formula on a spherical Earth, which is
//! what the map surface itself reports for drawn polygons.

use serde::{Deserialize, Serialize};

use crate::types::{BoundingBox, GeoPoint};

/// WGS84 equatorial radius in meters
const EARTH_RADIUS_M: f64 = 6_378_137.0;

const SQUARE_METERS_PER_HECTARE: f64 = 10_000.0;

/// Derived geometry for a field polygon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldGeometry {
    pub area_m2: f64,
    pub area_hectares: f64,
    pub center: GeoPoint,
    pub bounding_box: BoundingBox,
}

/// Return a closed copy of the ring, appending the first vertex if the last
/// does not already equal it. Empty rings are returned unchanged.
pub fn close_ring(ring: &[GeoPoint]) -> Vec<GeoPoint> {
    let mut closed = ring.to_vec();
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if first != last => closed.push(*first),
        _ => {}
    }
    closed
}

/// Number of distinct vertices, ignoring the closing duplicate
pub fn distinct_vertex_count(ring: &[GeoPoint]) -> usize {
    let mut distinct: Vec<GeoPoint> = Vec::with_capacity(ring.len());
    for point in ring {
        if !distinct.contains(point) {
            distinct.push(*point);
        }
    }
    distinct.len()
}

/// Geodesic area of a closed ring in square meters
///
/// Degenerate rings (fewer than 3 distinct vertices) have area 0. The result
/// is always non-negative regardless of winding order.
pub fn ring_area_m2(ring: &[GeoPoint]) -> f64 {
    if distinct_vertex_count(ring) < 3 {
        return 0.0;
    }

    let closed = close_ring(ring);
    let mut sum = 0.0;
    for pair in closed.windows(2) {
        let (p1, p2) = (pair[0], pair[1]);
        let lon1 = p1.longitude.to_radians();
        let lon2 = p2.longitude.to_radians();
        let lat1 = p1.latitude.to_radians();
        let lat2 = p2.latitude.to_radians();
        sum += (lon2 - lon1) * (2.0 + lat1.sin() + lat2.sin());
    }

    (sum * EARTH_RADIUS_M * EARTH_RADIUS_M / 2.0).abs()
}

/// Center point of a ring
///
/// Area-weighted planar centroid of the closed ring; falls back to the
/// arithmetic mean of the distinct vertices when the ring has no area.
pub fn ring_center(ring: &[GeoPoint]) -> Option<GeoPoint> {
    if ring.is_empty() {
        return None;
    }

    let closed = close_ring(ring);
    let mut signed_area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for pair in closed.windows(2) {
        let (p1, p2) = (pair[0], pair[1]);
        let cross = p1.longitude * p2.latitude - p2.longitude * p1.latitude;
        signed_area += cross;
        cx += (p1.longitude + p2.longitude) * cross;
        cy += (p1.latitude + p2.latitude) * cross;
    }

    if signed_area.abs() > f64::EPSILON {
        let factor = 3.0 * signed_area;
        return Some(GeoPoint::new(cx / factor, cy / factor));
    }

    // Degenerate ring: arithmetic centroid of the distinct vertices
    let mut distinct: Vec<GeoPoint> = Vec::new();
    for point in ring {
        if !distinct.contains(point) {
            distinct.push(*point);
        }
    }
    let n = distinct.len() as f64;
    let lon = distinct.iter().map(|p| p.longitude).sum::<f64>() / n;
    let lat = distinct.iter().map(|p| p.latitude).sum::<f64>() / n;
    Some(GeoPoint::new(lon, lat))
}

/// Bounding box of a ring, None for an empty ring
pub fn ring_bounding_box(ring: &[GeoPoint]) -> Option<BoundingBox> {
    let first = ring.first()?;
    let mut bbox = BoundingBox {
        min_lon: first.longitude,
        min_lat: first.latitude,
        max_lon: first.longitude,
        max_lat: first.latitude,
    };
    for point in ring {
        bbox.min_lon = bbox.min_lon.min(point.longitude);
        bbox.min_lat = bbox.min_lat.min(point.latitude);
        bbox.max_lon = bbox.max_lon.max(point.longitude);
        bbox.max_lat = bbox.max_lat.max(point.latitude);
    }
    Some(bbox)
}

/// Extract all derived geometry for a drawn ring
pub fn extract_geometry(ring: &[GeoPoint]) -> Option<FieldGeometry> {
    let center = ring_center(ring)?;
    let bounding_box = ring_bounding_box(ring)?;
    let area_m2 = ring_area_m2(ring);

    Some(FieldGeometry {
        area_m2,
        area_hectares: area_m2 / SQUARE_METERS_PER_HECTARE,
        center,
        bounding_box,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(1.0, 1.0),
            GeoPoint::new(1.0, 0.0),
            GeoPoint::new(0.0, 0.0),
        ]
    }

    #[test]
    fn test_close_ring_appends_first_vertex() {
        let open = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(1.0, 1.0),
        ];
        let closed = close_ring(&open);
        assert_eq!(closed.len(), 4);
        assert_eq!(closed.first(), closed.last());
    }

    #[test]
    fn test_close_ring_idempotent() {
        let closed = close_ring(&unit_square());
        assert_eq!(closed.len(), unit_square().len());
    }

    #[test]
    fn test_equatorial_degree_square_area() {
        // 1°x1° square at the equator is roughly 1.23e10 m²
        let area = ring_area_m2(&unit_square());
        assert!(area > 1.15e10, "area too small: {}", area);
        assert!(area < 1.30e10, "area too large: {}", area);
    }

    #[test]
    fn test_area_ignores_winding_order() {
        let mut reversed = unit_square();
        reversed.reverse();
        let a = ring_area_m2(&unit_square());
        let b = ring_area_m2(&reversed);
        assert!((a - b).abs() < 1.0);
    }

    #[test]
    fn test_degenerate_rings_have_zero_area() {
        assert_eq!(ring_area_m2(&[]), 0.0);
        assert_eq!(ring_area_m2(&[GeoPoint::new(5.0, 5.0)]), 0.0);
        assert_eq!(
            ring_area_m2(&[GeoPoint::new(5.0, 5.0), GeoPoint::new(6.0, 6.0)]),
            0.0
        );
        // Three vertices but only two distinct
        assert_eq!(
            ring_area_m2(&[
                GeoPoint::new(5.0, 5.0),
                GeoPoint::new(6.0, 6.0),
                GeoPoint::new(5.0, 5.0),
            ]),
            0.0
        );
    }

    #[test]
    fn test_square_center() {
        let center = ring_center(&unit_square()).unwrap();
        assert!((center.longitude - 0.5).abs() < 1e-9);
        assert!((center.latitude - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_center_is_arithmetic_mean() {
        let line = vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(2.0, 2.0)];
        let center = ring_center(&line).unwrap();
        assert!((center.longitude - 1.0).abs() < 1e-9);
        assert!((center.latitude - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_bounding_box() {
        let bbox = ring_bounding_box(&unit_square()).unwrap();
        assert_eq!(bbox.min_lon, 0.0);
        assert_eq!(bbox.min_lat, 0.0);
        assert_eq!(bbox.max_lon, 1.0);
        assert_eq!(bbox.max_lat, 1.0);
    }

    #[test]
    fn test_extract_geometry_empty_ring() {
        assert!(extract_geometry(&[]).is_none());
    }

    #[test]
    fn test_extract_geometry_square() {
        let geom = extract_geometry(&unit_square()).unwrap();
        assert!(geom.area_m2 > 0.0);
        assert!((geom.area_hectares - geom.area_m2 / 10_000.0).abs() < 1e-6);
    }
}
