use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{Location, Status};
use crate::error::Error;

/// An incoming request for a seat, before any matching decision.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RideIntent {
    pub name: String,
    pub phone: String,
    pub pickup: Location,
    pub dropoff: Location,
    #[serde(default = "default_luggage_count")]
    pub luggage_count: u32,
    #[serde(default = "default_max_detour_minutes")]
    pub max_detour_minutes: u32,
}

fn default_luggage_count() -> u32 {
    1
}

fn default_max_detour_minutes() -> u32 {
    15
}

/// Outcome of a ride request: either a seat on an existing ride or a freshly
/// opened one.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RideReceipt {
    pub ride_id: Uuid,
    pub passenger_id: Uuid,
    pub status: Status,
    pub estimated_fare: f64,
    pub distance_km: f64,
    pub total_passengers: usize,
    pub available_seats: u32,
    pub is_pooled: bool,
    pub savings_percentage: f64,
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PassengerSummary {
    pub id: Uuid,
    pub name: String,
    pub pickup: Location,
    pub dropoff: Location,
    pub luggage_count: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RideDetails {
    pub ride_id: Uuid,
    pub status: Status,
    pub passengers: Vec<PassengerSummary>,
    pub available_seats: u32,
    pub available_luggage: u32,
    pub total_distance: Option<f64>,
    pub final_fare: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Snapshot of current demand pressure.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SurgeInfo {
    pub active_rides: i64,
    pub multiplier: f64,
    pub is_surging: bool,
}

#[async_trait]
pub trait RideAPI {
    async fn request_ride(&self, intent: RideIntent) -> Result<RideReceipt, Error>;

    async fn find_ride_details(&self, id: Uuid) -> Result<RideDetails, Error>;

    async fn cancel_ride(&self, passenger_id: Uuid) -> Result<(), Error>;
}

#[async_trait]
pub trait PricingAPI {
    async fn surge_info(&self) -> Result<SurgeInfo, Error>;
}

pub trait API: RideAPI + PricingAPI {}

pub type DynAPI = Arc<dyn API + Send + Sync>;
