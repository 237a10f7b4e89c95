use async_trait::async_trait;
use uuid::Uuid;

use super::{matching, pricing, Engine};
use crate::api::{
    PassengerSummary, PricingAPI, RideAPI, RideDetails, RideIntent, RideReceipt, SurgeInfo,
};
use crate::entities::{Passenger, Ride, Status};
use crate::error::{invalid_state_error, not_found_error, Error};

const MAX_BOOKING_ATTEMPTS: u32 = 3;

#[async_trait]
impl RideAPI for Engine {
    /// Match the rider into an existing ride or open a new one.
    ///
    /// Each attempt re-reads the pool, decides, mutates a private copy and
    /// saves. A version conflict on save means another booking won the race;
    /// the attempt is thrown away and the search restarts against fresh
    /// state. After the last attempt the rider gets a dedicated ride instead
    /// of an error.
    #[tracing::instrument(skip(self, intent))]
    async fn request_ride(&self, intent: RideIntent) -> Result<RideReceipt, Error> {
        let passenger = Passenger::new(
            intent.name,
            intent.phone,
            intent.pickup,
            intent.dropoff,
            intent.luggage_count,
            intent.max_detour_minutes,
        );
        let passenger = self.store.create_passenger(passenger).await?;

        tracing::info!(
            "processing ride request for passenger {} ({:.2} km trip)",
            passenger.id,
            passenger.direct_distance_km()
        );

        let mut attempt = 1;
        loop {
            let pool = self.store.find_poolable_rides(Status::Pending).await?;

            let Some(matched) = matching::find_best_match(&passenger, &pool) else {
                return self.open_ride(passenger).await;
            };

            match self.join_ride(matched.clone(), passenger.clone()).await {
                Ok(receipt) => return Ok(receipt),
                Err(err) if err.is_conflict() => {
                    if attempt >= MAX_BOOKING_ATTEMPTS {
                        tracing::warn!("booking attempts exhausted, opening a dedicated ride");
                        return self.open_ride(passenger).await;
                    }

                    tracing::warn!(attempt, "ride was booked concurrently, searching again");
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    #[tracing::instrument(skip(self))]
    async fn find_ride_details(&self, id: Uuid) -> Result<RideDetails, Error> {
        let ride = self.store.find_ride(id).await?.ok_or_else(not_found_error)?;

        let passengers = ride
            .passengers
            .iter()
            .map(|p| PassengerSummary {
                id: p.id,
                name: p.name.clone(),
                pickup: p.pickup,
                dropoff: p.dropoff,
                luggage_count: p.luggage_count,
            })
            .collect();

        Ok(RideDetails {
            ride_id: ride.id,
            status: ride.status,
            passengers,
            available_seats: ride.available_seats,
            available_luggage: ride.available_luggage,
            total_distance: ride.total_distance,
            final_fare: ride.final_fare,
            created_at: ride.created_at,
        })
    }

    /// Take the passenger off their ride. An emptied ride is cancelled,
    /// otherwise the fare is recomputed for whoever stays on.
    #[tracing::instrument(skip(self))]
    async fn cancel_ride(&self, passenger_id: Uuid) -> Result<(), Error> {
        let passenger = self
            .store
            .find_passenger(passenger_id)
            .await?
            .ok_or_else(not_found_error)?;

        let ride_id = passenger.ride_id.ok_or_else(invalid_state_error)?;
        let ride = self
            .store
            .find_ride(ride_id)
            .await?
            .ok_or_else(not_found_error)?;

        let (mut ride, _removed) = ride.without_passenger(passenger.id);

        if ride.passengers.is_empty() {
            ride.status = Status::Cancelled;
            tracing::info!("ride {} cancelled, no passengers remaining", ride.id);
        } else {
            let active_rides = self.store.count_by_status(Status::Pending).await?;
            let fare = pricing::fare(
                ride.total_distance.unwrap_or(0.0),
                ride.passenger_count(),
                active_rides,
            );
            ride.final_fare = Some(fare);
            tracing::info!(
                "ride {} repriced at {:.2} for {} remaining passenger(s)",
                ride.id,
                fare,
                ride.passenger_count()
            );
        }

        self.store.save_ride(ride).await?;

        // the stored row is authoritative for the passenger's version; only
        // the back-reference changes here
        let mut passenger = passenger;
        passenger.ride_id = None;
        self.store.save_passenger(passenger).await?;

        Ok(())
    }
}

#[async_trait]
impl PricingAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn surge_info(&self) -> Result<SurgeInfo, Error> {
        let active_rides = self.store.count_by_status(Status::Pending).await?;
        let multiplier = pricing::surge_multiplier(active_rides);

        Ok(SurgeInfo {
            active_rides,
            multiplier,
            is_surging: multiplier > 1.0,
        })
    }
}

impl Engine {
    /// Book the passenger onto the matched ride against the exact version the
    /// pool read returned; the save is where a lost race surfaces.
    async fn join_ride(&self, ride: Ride, passenger: Passenger) -> Result<RideReceipt, Error> {
        let (mut ride, passenger) = ride.with_passenger(passenger)?;

        let active_rides = self.store.count_by_status(Status::Pending).await?;
        let distance = passenger.direct_distance_km();
        let pooled_fare = pricing::fare(distance, ride.passenger_count(), active_rides);
        ride.final_fare = Some(pooled_fare);

        let ride = self.store.save_ride(ride).await?;
        let passenger = self.store.save_passenger(passenger).await?;

        let solo_fare = pricing::fare(distance, 1, active_rides);
        let savings = pricing::savings_percentage(solo_fare, pooled_fare);

        tracing::info!(
            "passenger {} joined ride {}, fare {:.2}, saving {:.1}%",
            passenger.id,
            ride.id,
            pooled_fare,
            savings
        );

        Ok(RideReceipt {
            ride_id: ride.id,
            passenger_id: passenger.id,
            status: ride.status,
            estimated_fare: pooled_fare,
            distance_km: distance,
            total_passengers: ride.passenger_count(),
            available_seats: ride.available_seats,
            is_pooled: true,
            savings_percentage: savings,
            message: format!(
                "ride matched, pooling with {} other passenger(s) saves {:.1}%",
                ride.passenger_count() - 1,
                savings
            ),
        })
    }

    /// Open a fresh ride with full capacity for the passenger.
    async fn open_ride(&self, passenger: Passenger) -> Result<RideReceipt, Error> {
        let (mut ride, passenger) = Ride::new().with_passenger(passenger)?;

        let active_rides = self.store.count_by_status(Status::Pending).await?;
        let distance = passenger.direct_distance_km();
        let fare = pricing::fare(distance, 1, active_rides);

        ride.total_distance = Some(distance);
        ride.base_fare = Some(fare);
        ride.final_fare = Some(fare);

        let ride = self.store.create_ride(ride).await?;
        let passenger = self.store.save_passenger(passenger).await?;

        tracing::info!(
            "opened ride {} for passenger {}, fare {:.2}",
            ride.id,
            passenger.id,
            fare
        );

        Ok(RideReceipt {
            ride_id: ride.id,
            passenger_id: passenger.id,
            status: ride.status,
            estimated_fare: fare,
            distance_km: distance,
            total_passengers: 1,
            available_seats: ride.available_seats,
            is_pooled: false,
            savings_percentage: 0.0,
            message: "ride created, the fare drops as soon as a match joins".into(),
        })
    }
}
