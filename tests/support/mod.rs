#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use ridepool::api::RideIntent;
use ridepool::entities::{Location, Passenger, Ride, Status};
use ridepool::error::{conflict_error, Error};
use ridepool::store::{MemoryStore, RideStore};

pub fn intent(name: &str, pickup: (f64, f64), dropoff: (f64, f64)) -> RideIntent {
    intent_with(name, pickup, dropoff, 1, 20)
}

pub fn intent_with(
    name: &str,
    pickup: (f64, f64),
    dropoff: (f64, f64),
    luggage_count: u32,
    max_detour_minutes: u32,
) -> RideIntent {
    RideIntent {
        name: name.into(),
        phone: "555-0100".into(),
        pickup: Location::new(pickup.0, pickup.1),
        dropoff: Location::new(dropoff.0, dropoff.1),
        luggage_count,
        max_detour_minutes,
    }
}

/// Store that fails the next `failures` ride saves with a version conflict
/// before behaving normally again. A deterministic stand-in for losing the
/// booking race.
pub struct ConflictingStore {
    inner: MemoryStore,
    failures: AtomicU32,
}

impl ConflictingStore {
    pub fn new(failures: u32) -> Self {
        Self {
            inner: MemoryStore::new(),
            failures: AtomicU32::new(failures),
        }
    }
}

#[async_trait]
impl RideStore for ConflictingStore {
    async fn find_poolable_rides(&self, status: Status) -> Result<Vec<Ride>, Error> {
        self.inner.find_poolable_rides(status).await
    }

    async fn count_by_status(&self, status: Status) -> Result<i64, Error> {
        self.inner.count_by_status(status).await
    }

    async fn find_ride(&self, id: Uuid) -> Result<Option<Ride>, Error> {
        self.inner.find_ride(id).await
    }

    async fn create_ride(&self, ride: Ride) -> Result<Ride, Error> {
        self.inner.create_ride(ride).await
    }

    async fn save_ride(&self, ride: Ride) -> Result<Ride, Error> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(conflict_error());
        }

        self.inner.save_ride(ride).await
    }

    async fn find_passenger(&self, id: Uuid) -> Result<Option<Passenger>, Error> {
        self.inner.find_passenger(id).await
    }

    async fn create_passenger(&self, passenger: Passenger) -> Result<Passenger, Error> {
        self.inner.create_passenger(passenger).await
    }

    async fn save_passenger(&self, passenger: Passenger) -> Result<Passenger, Error> {
        self.inner.save_passenger(passenger).await
    }
}
