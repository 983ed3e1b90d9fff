//! Web Mercator projection between WGS84 coordinates and absolute "world
//! pixels" at an integer zoom level (origin at the north-west corner,
//! 256 * 2^zoom pixels per axis).

use std::f64::consts::PI;

use beacon_shared::{GeoBounds, GeoPoint};

pub const TILE_SIZE: f64 = 256.0;

/// Latitude beyond which the Mercator projection blows up; the standard
/// slippy-map cutoff.
pub const LAT_LIMIT: f64 = 85.051_128_78;

/// World-pixel width (and height) of the map at `zoom`.
pub fn world_size(zoom: u8) -> f64 {
    TILE_SIZE * (1u32 << zoom.min(30)) as f64
}

/// Project a coordinate to world pixels at `zoom`.
pub fn project(point: GeoPoint, zoom: u8) -> (f64, f64) {
    let size = world_size(zoom);
    let x = (point.lng + 180.0) / 360.0 * size;
    let lat = point.lat.clamp(-LAT_LIMIT, LAT_LIMIT);
    let sin = (lat * PI / 180.0).sin();
    let y = (0.5 - ((1.0 + sin) / (1.0 - sin)).ln() / (4.0 * PI)) * size;
    (x, y)
}

/// Inverse of [`project`].
pub fn unproject(x: f64, y: f64, zoom: u8) -> GeoPoint {
    let size = world_size(zoom);
    let lng = x / size * 360.0 - 180.0;
    let n = PI * (1.0 - 2.0 * y / size);
    let lat = n.sinh().atan().to_degrees();
    GeoPoint::new(lat, lng)
}

/// Highest integer zoom at which `bounds`, inset by `padding_px` on every
/// side, fits a `viewport_w` x `viewport_h` surface. Degenerate bounds (a
/// single point) fit at any zoom and get `max_zoom`.
pub fn zoom_for_bounds(
    bounds: GeoBounds,
    viewport_w: f64,
    viewport_h: f64,
    padding_px: f64,
    min_zoom: u8,
    max_zoom: u8,
) -> u8 {
    let usable_w = (viewport_w - padding_px * 2.0).max(1.0);
    let usable_h = (viewport_h - padding_px * 2.0).max(1.0);
    let nw = GeoPoint::new(bounds.north, bounds.west);
    let se = GeoPoint::new(bounds.south, bounds.east);

    for zoom in (min_zoom..=max_zoom).rev() {
        let (x0, y0) = project(nw, zoom);
        let (x1, y1) = project(se, zoom);
        if (x1 - x0) <= usable_w && (y1 - y0) <= usable_h {
            return zoom;
        }
    }
    min_zoom
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        let diff = (actual - expected).abs();
        assert!(
            diff < tolerance,
            "expected {expected}, got {actual} (diff: {diff})"
        );
    }

    #[test]
    fn origin_projects_to_world_center() {
        let (x, y) = project(GeoPoint::new(0.0, 0.0), 2);
        assert_close(x, world_size(2) / 2.0, 1e-9);
        assert_close(y, world_size(2) / 2.0, 1e-9);
    }

    #[test]
    fn project_unproject_round_trip() {
        for &(lat, lng) in &[(39.8283, -98.5795), (-33.86, 151.21), (60.17, 24.94)] {
            let (x, y) = project(GeoPoint::new(lat, lng), 12);
            let back = unproject(x, y, 12);
            assert_close(back.lat, lat, 1e-6);
            assert_close(back.lng, lng, 1e-6);
        }
    }

    #[test]
    fn poleward_latitudes_clamp() {
        let (_, y_top) = project(GeoPoint::new(90.0, 0.0), 4);
        let (_, y_limit) = project(GeoPoint::new(LAT_LIMIT, 0.0), 4);
        assert_close(y_top, y_limit, 1e-9);
        assert_close(y_limit, 0.0, 1e-6);
    }

    #[test]
    fn wider_bounds_fit_at_lower_zoom() {
        let tight = GeoBounds {
            south: 39.9,
            west: -75.2,
            north: 40.0,
            east: -75.1,
        };
        let wide = GeoBounds {
            south: 25.0,
            west: -120.0,
            north: 48.0,
            east: -70.0,
        };
        let z_tight = zoom_for_bounds(tight, 800.0, 600.0, 48.0, 2, 18);
        let z_wide = zoom_for_bounds(wide, 800.0, 600.0, 48.0, 2, 18);
        assert!(z_tight > z_wide, "{z_tight} vs {z_wide}");
    }

    #[test]
    fn single_point_bounds_fit_at_max_zoom() {
        let point = GeoBounds::of(GeoPoint::new(40.0, -75.0));
        assert_eq!(zoom_for_bounds(point, 800.0, 600.0, 48.0, 2, 18), 18);
    }
}
