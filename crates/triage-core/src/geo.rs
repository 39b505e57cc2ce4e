//! Great-circle distance.

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in metres between two WGS84 points given in degrees.
pub fn haversine_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lng2 - lng1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();
    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        assert_eq!(haversine_m(19.076, 72.8777, 19.076, 72.8777), 0.0);
    }

    #[test]
    fn test_short_hop_in_mumbai() {
        let d = haversine_m(19.0760, 72.8777, 19.0761, 72.8776);
        assert!(d > 10.0 && d < 20.0, "got {d}");
    }

    #[test]
    fn test_mumbai_to_delhi() {
        let d = haversine_m(19.0760, 72.8777, 28.7041, 77.1025);
        assert!((d / 1000.0 - 1153.0).abs() < 10.0, "got {d}");
    }

    #[test]
    fn test_symmetric() {
        let a = haversine_m(10.0, 20.0, -5.0, 100.0);
        let b = haversine_m(-5.0, 100.0, 10.0, 20.0);
        assert!((a - b).abs() < 1e-6);
    }
}
