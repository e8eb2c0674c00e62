//! Great-circle distance between coordinates.

use crate::model::sample::GeoPoint;
use geo::{point, HaversineDistance};

/// Returns the haversine distance between two points in meters.
pub fn distance_m(from: GeoPoint, to: GeoPoint) -> f64 {
    let from = point!(x: from.longitude, y: from.latitude);
    let to = point!(x: to.longitude, y: to.latitude);
    from.haversine_distance(&to)
}

#[cfg(test)]
mod tests {
    use super::distance_m;
    use crate::model::sample::GeoPoint;

    #[test]
    fn identical_points_are_zero_apart() {
        let point = GeoPoint::new(52.52, 13.405);
        assert_eq!(distance_m(point, point), 0.0);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let meters = distance_m(GeoPoint::new(10.0, 20.0), GeoPoint::new(11.0, 20.0));
        assert!((meters - 111_195.0).abs() < 200.0, "got {meters}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = GeoPoint::new(51.5074, -0.1278);
        let b = GeoPoint::new(48.8566, 2.3522);
        assert!((distance_m(a, b) - distance_m(b, a)).abs() < 1e-6);
    }
}
