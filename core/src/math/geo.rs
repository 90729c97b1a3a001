use crate::prelude::Coordinate;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub struct GeoHelper;

impl GeoHelper {
    /// Great-circle distance in kilometres on a 6371 km sphere.
    pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
        let lat1 = from.lat.to_radians();
        let lat2 = to.lat.to_radians();
        let dlat = (to.lat - from.lat).to_radians();
        let dlng = (to.lng - from.lng).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
    }

    /// Short human label: metres under one kilometre, one decimal above.
    pub fn distance_label(km: f64) -> String {
        if km < 1.0 {
            format!("{} m", (km * 1000.0).round() as i64)
        } else {
            format!("{:.1} km", km)
        }
    }
}
