use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::Location;

/// A rider with a requested trip. Membership in a ride is carried as a
/// nullable ride id, resolved through the store, never as an owning pointer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Passenger {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub pickup: Location,
    pub dropoff: Location,
    pub luggage_count: u32,
    pub max_detour_minutes: u32,
    pub ride_id: Option<Uuid>,
    pub requested_at: DateTime<Utc>,
    pub version: i64,
}

impl Passenger {
    pub fn new(
        name: String,
        phone: String,
        pickup: Location,
        dropoff: Location,
        luggage_count: u32,
        max_detour_minutes: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            phone,
            pickup,
            dropoff,
            luggage_count,
            max_detour_minutes,
            ride_id: None,
            requested_at: Utc::now(),
            version: 0,
        }
    }

    pub fn direct_distance_km(&self) -> f64 {
        self.pickup.distance_km(&self.dropoff)
    }

    pub fn direct_travel_time_minutes(&self) -> f64 {
        self.pickup.travel_time_minutes(&self.dropoff)
    }
}
