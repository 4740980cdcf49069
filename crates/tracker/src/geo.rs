//! Great-circle (haversine) distance between GPS fixes

/// Mean Earth radius in meters (IUGG R1).
pub const EARTH_RADIUS_M: f64 = 6_371_008.7714150598;

/// Distance in meters along the Earth's surface between two fixes.
pub fn great_circle_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + (d_lon / 2.0).sin().powi(2) * lat1.cos() * lat2.cos();

    EARTH_RADIUS_M * (2.0 * h.sqrt().asin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equator_millidegree_of_longitude() {
        // 0.001° of longitude at the equator is one arc-millidegree of the
        // full circle: R * 0.001 * pi/180 ≈ 111.19 m.
        let d = great_circle_m(0.0, 0.0, 0.0, 0.001);
        assert!((d - 111.195).abs() < 0.01, "got {d}");
    }

    #[test]
    fn test_london_to_new_york() {
        let d = great_circle_m(51.5007, -0.1246, 40.6892, -74.0445);
        assert!((d - 5_574_848.0).abs() < 10.0, "got {d}");
    }

    #[test]
    fn test_zero_distance_for_identical_fixes() {
        assert_eq!(great_circle_m(48.8584, 2.2945, 48.8584, 2.2945), 0.0);
    }

    #[test]
    fn test_symmetric() {
        let a = great_circle_m(49.2358, 28.4859, 49.2330, 28.4933);
        let b = great_circle_m(49.2330, 28.4933, 49.2358, 28.4859);
        assert!((a - b).abs() < 1e-9);
    }
}
