use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{Passenger, Ride, Status};
use crate::error::Error;

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Persistence boundary for rides and passengers.
///
/// Saves are optimistic: the stored version must still match the version the
/// entity was read at, or the write is rejected with a conflict error. A
/// successful save returns the entity carrying the incremented version, so
/// callers only ever continue with store-acknowledged state.
#[async_trait]
pub trait RideStore {
    /// Rides in the given status that still have a free seat, in an order
    /// that is stable within a call.
    async fn find_poolable_rides(&self, status: Status) -> Result<Vec<Ride>, Error>;

    async fn count_by_status(&self, status: Status) -> Result<i64, Error>;

    async fn find_ride(&self, id: Uuid) -> Result<Option<Ride>, Error>;

    async fn create_ride(&self, ride: Ride) -> Result<Ride, Error>;

    async fn save_ride(&self, ride: Ride) -> Result<Ride, Error>;

    async fn find_passenger(&self, id: Uuid) -> Result<Option<Passenger>, Error>;

    async fn create_passenger(&self, passenger: Passenger) -> Result<Passenger, Error>;

    async fn save_passenger(&self, passenger: Passenger) -> Result<Passenger, Error>;
}

pub type DynStore = Arc<dyn RideStore + Send + Sync>;
