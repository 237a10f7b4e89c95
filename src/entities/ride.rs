use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::Passenger;
use crate::error::{capacity_violation_error, Error};

const DEFAULT_MAX_SEATS: u32 = 4;
const DEFAULT_MAX_LUGGAGE: u32 = 6;

/// A vehicle trip shared by up to `max_seats` passengers.
///
/// Mutations return fresh values instead of touching `self`, so a booking
/// attempt that loses the version race has nothing half-applied to unwind.
/// The version counter is advanced by the store, atomically with the save.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ride {
    pub id: Uuid,
    pub status: Status,
    pub passengers: Vec<Passenger>,
    pub max_seats: u32,
    pub max_luggage: u32,
    pub available_seats: u32,
    pub available_luggage: u32,
    pub total_distance: Option<f64>,
    pub base_fare: Option<f64>,
    pub final_fare: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub version: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Matched,
    InProgress,
    Completed,
    Cancelled,
}

impl Status {
    pub fn name(&self) -> String {
        match self {
            Self::Pending => "pending".into(),
            Self::Matched => "matched".into(),
            Self::InProgress => "in_progress".into(),
            Self::Completed => "completed".into(),
            Self::Cancelled => "cancelled".into(),
        }
    }
}

impl Ride {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_SEATS, DEFAULT_MAX_LUGGAGE)
    }

    pub fn with_capacity(max_seats: u32, max_luggage: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: Status::Pending,
            passengers: Vec::new(),
            max_seats,
            max_luggage,
            available_seats: max_seats,
            available_luggage: max_luggage,
            total_distance: None,
            base_fare: None,
            final_fare: None,
            created_at: Utc::now(),
            version: 0,
        }
    }

    pub fn can_accommodate(&self, passenger: &Passenger) -> bool {
        self.available_seats >= 1 && self.available_luggage >= passenger.luggage_count
    }

    /// Returns the ride with the passenger appended and the passenger with its
    /// back-reference set. Fails when seats or luggage space would go negative.
    pub fn with_passenger(&self, passenger: Passenger) -> Result<(Ride, Passenger), Error> {
        if !self.can_accommodate(&passenger) {
            return Err(capacity_violation_error());
        }

        let mut ride = self.clone();
        let mut passenger = passenger;

        passenger.ride_id = Some(ride.id);
        ride.available_seats -= 1;
        ride.available_luggage -= passenger.luggage_count;
        ride.passengers.push(passenger.clone());

        if ride.status == Status::Pending && ride.passengers.len() >= 2 {
            ride.status = Status::Matched;
        }

        Ok((ride, passenger))
    }

    /// Returns the ride without the passenger, plus the detached passenger
    /// value with its back-reference cleared. No-op when not a member.
    pub fn without_passenger(&self, passenger_id: Uuid) -> (Ride, Option<Passenger>) {
        let mut ride = self.clone();

        let Some(index) = ride.passengers.iter().position(|p| p.id == passenger_id) else {
            return (ride, None);
        };

        let mut passenger = ride.passengers.remove(index);
        passenger.ride_id = None;
        ride.available_seats += 1;
        ride.available_luggage += passenger.luggage_count;

        (ride, Some(passenger))
    }

    /// First passenger to book; their pickup anchors the proximity search.
    pub fn primary_passenger(&self) -> Option<&Passenger> {
        self.passengers.first()
    }

    pub fn passenger_count(&self) -> usize {
        self.passengers.len()
    }

    pub fn is_full(&self) -> bool {
        self.available_seats == 0
    }

    pub fn is_poolable(&self) -> bool {
        self.status == Status::Pending && self.available_seats > 0
    }

    pub fn occupancy_rate(&self) -> f64 {
        f64::from(self.max_seats - self.available_seats) / f64::from(self.max_seats) * 100.0
    }
}

impl Default for Ride {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Location;

    fn passenger(luggage_count: u32) -> Passenger {
        Passenger::new(
            "test".into(),
            "555-0100".into(),
            Location::new(40.0, -74.0),
            Location::new(40.1, -74.0),
            luggage_count,
            15,
        )
    }

    #[test]
    fn adding_a_passenger_books_a_seat_and_luggage_space() {
        let ride = Ride::new();

        let (ride, added) = ride.with_passenger(passenger(2)).unwrap();

        assert_eq!(ride.passenger_count(), 1);
        assert_eq!(ride.available_seats, 3);
        assert_eq!(ride.available_luggage, 4);
        assert_eq!(added.ride_id, Some(ride.id));
        assert_eq!(ride.status, Status::Pending);
    }

    #[test]
    fn seat_and_luggage_accounting_holds_through_mutations() {
        let mut ride = Ride::new();
        let mut ids = Vec::new();

        for luggage in [0, 1, 2] {
            let (next, added) = ride.with_passenger(passenger(luggage)).unwrap();
            ids.push(added.id);
            ride = next;

            let booked_luggage: u32 = ride.passengers.iter().map(|p| p.luggage_count).sum();
            assert_eq!(
                ride.available_seats + ride.passenger_count() as u32,
                ride.max_seats
            );
            assert_eq!(ride.available_luggage + booked_luggage, ride.max_luggage);
        }

        let (ride, removed) = ride.without_passenger(ids[1]);

        assert!(removed.is_some());
        assert_eq!(ride.passenger_count(), 2);
        assert_eq!(ride.available_seats, 2);
        assert_eq!(ride.available_luggage, 4);
    }

    #[test]
    fn second_passenger_flips_the_ride_to_matched() {
        let (ride, _) = Ride::new().with_passenger(passenger(1)).unwrap();
        let (ride, _) = ride.with_passenger(passenger(1)).unwrap();

        assert_eq!(ride.status, Status::Matched);
        assert_eq!(ride.passenger_count(), 2);
    }

    #[test]
    fn a_full_ride_rejects_further_passengers() {
        let (ride, _) = Ride::with_capacity(1, 6).with_passenger(passenger(1)).unwrap();

        assert!(ride.is_full());

        let err = ride.with_passenger(passenger(0)).unwrap_err();
        assert_eq!(err.code, capacity_violation_error().code);
    }

    #[test]
    fn luggage_overflow_is_rejected_even_with_free_seats() {
        let (ride, _) = Ride::new().with_passenger(passenger(5)).unwrap();

        assert_eq!(ride.available_luggage, 1);
        assert!(!ride.can_accommodate(&passenger(3)));
        assert!(ride.with_passenger(passenger(3)).is_err());
    }

    #[test]
    fn removing_an_unknown_passenger_is_a_no_op() {
        let (ride, _) = Ride::new().with_passenger(passenger(1)).unwrap();

        let (unchanged, removed) = ride.without_passenger(Uuid::new_v4());

        assert!(removed.is_none());
        assert_eq!(unchanged.passenger_count(), 1);
        assert_eq!(unchanged.available_seats, ride.available_seats);
    }

    #[test]
    fn occupancy_rate_tracks_booked_seats() {
        let ride = Ride::new();
        assert_eq!(ride.occupancy_rate(), 0.0);

        let (ride, _) = ride.with_passenger(passenger(1)).unwrap();
        assert_eq!(ride.occupancy_rate(), 25.0);

        let (ride, _) = ride.with_passenger(passenger(1)).unwrap();
        assert_eq!(ride.occupancy_rate(), 50.0);
    }
}
