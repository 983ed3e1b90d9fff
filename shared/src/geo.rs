use serde::{Deserialize, Serialize};

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat.abs() <= 90.0
            && self.lng.abs() <= 180.0
    }
}

/// Axis-aligned geographic rectangle. Degenerate (single-point) bounds are
/// legal; antimeridian-crossing bounds are not modeled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBounds {
    pub const fn of(point: GeoPoint) -> Self {
        Self {
            south: point.lat,
            west: point.lng,
            north: point.lat,
            east: point.lng,
        }
    }

    /// Smallest bounds covering every point, or `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        let mut points = points.into_iter();
        let mut bounds = Self::of(points.next()?);
        for point in points {
            bounds.extend(point);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, point: GeoPoint) {
        self.south = self.south.min(point.lat);
        self.west = self.west.min(point.lng);
        self.north = self.north.max(point.lat);
        self.east = self.east.max(point.lng);
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    pub fn lat_span(&self) -> f64 {
        self.north - self.south
    }

    pub fn lng_span(&self) -> f64 {
        self.east - self.west
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_folds_min_max() {
        let bounds = GeoBounds::from_points([
            GeoPoint::new(40.0, -75.0),
            GeoPoint::new(42.5, -71.0),
            GeoPoint::new(39.0, -77.0),
        ])
        .unwrap();
        assert_eq!(bounds.south, 39.0);
        assert_eq!(bounds.north, 42.5);
        assert_eq!(bounds.west, -77.0);
        assert_eq!(bounds.east, -71.0);
    }

    #[test]
    fn from_points_empty_is_none() {
        assert!(GeoBounds::from_points([]).is_none());
    }

    #[test]
    fn single_point_bounds_are_degenerate() {
        let bounds = GeoBounds::from_points([GeoPoint::new(40.0, -75.0)]).unwrap();
        assert_eq!(bounds.lat_span(), 0.0);
        assert_eq!(bounds.lng_span(), 0.0);
        assert_eq!(bounds.center(), GeoPoint::new(40.0, -75.0));
    }

    #[test]
    fn validity_rejects_nan_and_out_of_range() {
        assert!(GeoPoint::new(40.0, -75.0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, f64::INFINITY).is_valid());
        assert!(!GeoPoint::new(-90.5, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, 180.5).is_valid());
        assert!(GeoPoint::new(90.0, -180.0).is_valid());
    }
}
