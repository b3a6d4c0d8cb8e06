use serde::Serialize;

/// Mean Earth radius used for great-circle distances
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Point in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Point from optional coordinates; both must be present
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        Some(Self::new(latitude?, longitude?))
    }
}

/// Haversine distance in kilometres, rounded to two decimals
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (to.longitude - from.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Floating error can push h slightly above 1 for antipodal points
    let c = 2.0 * h.sqrt().min(1.0).asin();

    (EARTH_RADIUS_KM * c * 100.0).round() / 100.0
}
