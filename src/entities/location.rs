use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Assumed average speed in city traffic, used wherever a distance has to be
/// turned into a time.
pub const AVERAGE_CITY_SPEED_KMH: f64 = 30.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to another location in kilometers (haversine).
    pub fn distance_km(&self, other: &Location) -> f64 {
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + self.latitude.to_radians().cos()
                * other.latitude.to_radians().cos()
                * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }

    pub fn travel_time_minutes(&self, other: &Location) -> f64 {
        self.travel_time_minutes_at(other, AVERAGE_CITY_SPEED_KMH)
    }

    /// Estimated driving time in minutes at the given average speed.
    pub fn travel_time_minutes_at(&self, other: &Location, speed_kmh: f64) -> f64 {
        self.distance_km(other) / speed_kmh * 60.0
    }
}
