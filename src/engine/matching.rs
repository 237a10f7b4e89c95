//! Greedy matcher: pick the pending ride that absorbs a candidate with the
//! least added distance, subject to capacity, pickup proximity and every
//! rider's detour tolerance. Pure decision logic over a pool the caller read
//! from the store; nothing in here mutates or persists.

use crate::entities::{Location, Passenger, Ride, AVERAGE_CITY_SPEED_KMH};

pub const MAX_SEARCH_RADIUS_KM: f64 = 5.0;

/// Scan the pool and return the ride with the strictly smallest detour cost
/// among those passing every constraint, or `None`. Ties keep the earliest
/// ride in pool order. O(pool x members).
pub fn find_best_match<'a>(candidate: &Passenger, pool: &'a [Ride]) -> Option<&'a Ride> {
    let mut best: Option<&Ride> = None;
    let mut min_detour = f64::MAX;

    for ride in pool {
        if !ride.can_accommodate(candidate) {
            tracing::debug!("ride {} skipped, insufficient capacity", ride.id);
            continue;
        }

        if !within_search_radius(ride, candidate) {
            tracing::debug!("ride {} skipped, pickup outside search radius", ride.id);
            continue;
        }

        let detour = detour_cost(ride, candidate);

        if exceeds_detour_tolerance(ride, candidate, detour) {
            tracing::debug!("ride {} skipped, detour over a rider's tolerance", ride.id);
            continue;
        }

        if detour < min_detour {
            min_detour = detour;
            best = Some(ride);
        }
    }

    match best {
        Some(ride) => {
            tracing::info!("best match is ride {} with detour {:.2} km", ride.id, min_detour)
        }
        None => tracing::info!("no ride passes all constraints"),
    }

    best
}

fn within_search_radius(ride: &Ride, candidate: &Passenger) -> bool {
    match ride.primary_passenger() {
        Some(primary) => primary.pickup.distance_km(&candidate.pickup) <= MAX_SEARCH_RADIUS_KM,
        None => true,
    }
}

/// Extra distance the pooled route drives over serving both trips directly.
/// Negative when the trips overlap enough that pooling shortens the total.
pub fn detour_cost(ride: &Ride, candidate: &Passenger) -> f64 {
    let Some(primary) = ride.primary_passenger() else {
        return 0.0;
    };

    let pooled = pooled_route_distance(
        &primary.pickup,
        &primary.dropoff,
        &candidate.pickup,
        &candidate.dropoff,
    );

    pooled - primary.direct_distance_km() - candidate.direct_distance_km()
}

// Both pickups first, then the shorter of the two dropoff orders. A coarse
// stand-in for the full 4-point shortest-path problem.
fn pooled_route_distance(
    pickup_a: &Location,
    dropoff_a: &Location,
    pickup_b: &Location,
    dropoff_b: &Location,
) -> f64 {
    let pickup_leg = pickup_a.distance_km(pickup_b);

    let drop_a_first =
        pickup_leg + pickup_b.distance_km(dropoff_a) + dropoff_a.distance_km(dropoff_b);
    let drop_b_first =
        pickup_leg + pickup_b.distance_km(dropoff_b) + dropoff_b.distance_km(dropoff_a);

    drop_a_first.min(drop_b_first)
}

fn exceeds_detour_tolerance(ride: &Ride, candidate: &Passenger, detour_km: f64) -> bool {
    let detour_minutes = detour_km / AVERAGE_CITY_SPEED_KMH * 60.0;

    for member in &ride.passengers {
        if detour_minutes > f64::from(member.max_detour_minutes) {
            return true;
        }
    }

    // The candidate's own bound scales their direct travel time by the
    // fractional detour instead of converting the detour to minutes.
    let candidate_detour_minutes =
        candidate.direct_travel_time_minutes() * (detour_km / candidate.direct_distance_km());

    candidate_detour_minutes > f64::from(candidate.max_detour_minutes)
}
