use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use super::RideStore;
use crate::entities::{Passenger, Ride, Status};
use crate::error::{conflict_error, not_found_error, Error};

/// Thread-safe in-memory store, used by tests and the simulation harness.
///
/// The version compare-and-increment happens under the write lock, which
/// gives the same all-or-nothing save the database store gets from its
/// conditional update.
#[derive(Clone, Default)]
pub struct MemoryStore {
    rides: Arc<RwLock<HashMap<Uuid, Ride>>>,
    passengers: Arc<RwLock<HashMap<Uuid, Passenger>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RideStore for MemoryStore {
    async fn find_poolable_rides(&self, status: Status) -> Result<Vec<Ride>, Error> {
        let rides = self.rides.read().expect("store lock poisoned");

        let mut pool: Vec<Ride> = rides
            .values()
            .filter(|ride| ride.status == status && ride.available_seats > 0)
            .cloned()
            .collect();

        // map iteration order is arbitrary; keep the pool stable across reads
        pool.sort_by_key(|ride| (ride.created_at, ride.id));

        Ok(pool)
    }

    async fn count_by_status(&self, status: Status) -> Result<i64, Error> {
        let rides = self.rides.read().expect("store lock poisoned");

        Ok(rides.values().filter(|ride| ride.status == status).count() as i64)
    }

    async fn find_ride(&self, id: Uuid) -> Result<Option<Ride>, Error> {
        let rides = self.rides.read().expect("store lock poisoned");

        Ok(rides.get(&id).cloned())
    }

    async fn create_ride(&self, ride: Ride) -> Result<Ride, Error> {
        let mut rides = self.rides.write().expect("store lock poisoned");

        rides.insert(ride.id, ride.clone());

        Ok(ride)
    }

    async fn save_ride(&self, ride: Ride) -> Result<Ride, Error> {
        let mut rides = self.rides.write().expect("store lock poisoned");

        let stored = rides.get(&ride.id).ok_or_else(not_found_error)?;
        if stored.version != ride.version {
            return Err(conflict_error());
        }

        let mut ride = ride;
        ride.version += 1;
        rides.insert(ride.id, ride.clone());

        Ok(ride)
    }

    async fn find_passenger(&self, id: Uuid) -> Result<Option<Passenger>, Error> {
        let passengers = self.passengers.read().expect("store lock poisoned");

        Ok(passengers.get(&id).cloned())
    }

    async fn create_passenger(&self, passenger: Passenger) -> Result<Passenger, Error> {
        let mut passengers = self.passengers.write().expect("store lock poisoned");

        passengers.insert(passenger.id, passenger.clone());

        Ok(passenger)
    }

    async fn save_passenger(&self, passenger: Passenger) -> Result<Passenger, Error> {
        let mut passengers = self.passengers.write().expect("store lock poisoned");

        let stored = passengers.get(&passenger.id).ok_or_else(not_found_error)?;
        if stored.version != passenger.version {
            return Err(conflict_error());
        }

        let mut passenger = passenger;
        passenger.version += 1;
        passengers.insert(passenger.id, passenger.clone());

        Ok(passenger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Location;

    fn ride() -> Ride {
        Ride::new()
    }

    fn passenger() -> Passenger {
        Passenger::new(
            "test".into(),
            "555-0100".into(),
            Location::new(40.0, -74.0),
            Location::new(40.1, -74.0),
            1,
            15,
        )
    }

    #[test]
    fn save_rejects_a_stale_ride_version() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            let stored = store.create_ride(ride()).await.unwrap();

            let first = store.save_ride(stored.clone()).await.unwrap();
            assert_eq!(first.version, stored.version + 1);

            // the second writer still holds the version it read before the
            // first save landed
            let err = store.save_ride(stored).await.unwrap_err();
            assert!(err.is_conflict());
        });
    }

    #[test]
    fn save_of_an_unknown_ride_is_not_found() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();

            let err = store.save_ride(ride()).await.unwrap_err();
            assert_eq!(err.code, not_found_error().code);
        });
    }

    #[test]
    fn poolable_rides_exclude_full_and_non_pending_ones() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();

            let open = store.create_ride(ride()).await.unwrap();

            let (full, _) = Ride::with_capacity(1, 6).with_passenger(passenger()).unwrap();
            store.create_ride(full).await.unwrap();

            let mut cancelled = ride();
            cancelled.status = Status::Cancelled;
            store.create_ride(cancelled).await.unwrap();

            let pool = store.find_poolable_rides(Status::Pending).await.unwrap();

            assert_eq!(pool.len(), 1);
            assert_eq!(pool[0].id, open.id);
            assert_eq!(store.count_by_status(Status::Pending).await.unwrap(), 2);
        });
    }

    #[test]
    fn passenger_versioning_mirrors_ride_versioning() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            let stored = store.create_passenger(passenger()).await.unwrap();

            let saved = store.save_passenger(stored.clone()).await.unwrap();
            assert_eq!(saved.version, 1);

            assert!(store.save_passenger(stored).await.unwrap_err().is_conflict());
        });
    }
}
