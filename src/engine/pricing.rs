//! Fare calculation. Pure functions of distance, group size and a demand
//! snapshot; the caller reads the snapshot from the store.

const BASE_FARE: f64 = 5.0;
const RATE_PER_KM: f64 = 2.0;
const SHARING_DISCOUNT_RATE: f64 = 0.25;
const MAX_SHARING_DISCOUNT: f64 = 0.75;
const MAX_SURGE_FACTOR: f64 = 0.5;
const SURGE_THRESHOLD: i64 = 100;

/// Demand-based amplification: 1.0x with no pending rides, ramping linearly
/// to 1.5x at the surge threshold and saturating there.
pub fn surge_multiplier(active_ride_count: i64) -> f64 {
    let pressure = (active_ride_count as f64 / SURGE_THRESHOLD as f64).min(1.0);

    1.0 + pressure * MAX_SURGE_FACTOR
}

/// Discount per co-rider, capped at 75% for groups of four or more.
pub fn sharing_discount(passenger_count: usize) -> f64 {
    if passenger_count <= 1 {
        return 0.0;
    }

    (SHARING_DISCOUNT_RATE * (passenger_count - 1) as f64).min(MAX_SHARING_DISCOUNT)
}

pub fn fare(distance_km: f64, passenger_count: usize, active_ride_count: i64) -> f64 {
    let base = BASE_FARE + distance_km * RATE_PER_KM;
    let price =
        base * surge_multiplier(active_ride_count) * (1.0 - sharing_discount(passenger_count));

    round_to_cents(price)
}

pub fn savings_percentage(solo_fare: f64, pooled_fare: f64) -> f64 {
    if solo_fare == 0.0 {
        return 0.0;
    }

    (solo_fare - pooled_fare) / solo_fare * 100.0
}

fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_kilometers_solo_without_demand_is_twenty_five() {
        assert_eq!(fare(10.0, 1, 0), 25.0);
    }

    #[test]
    fn each_co_rider_takes_a_quarter_off() {
        assert_eq!(fare(10.0, 2, 0), 18.75);
        assert_eq!(fare(10.0, 3, 0), 12.5);
        assert_eq!(fare(10.0, 4, 0), 6.25);
    }

    #[test]
    fn sharing_discount_is_monotone_and_capped() {
        let mut previous = 0.0;
        for count in 1..10 {
            let discount = sharing_discount(count);
            assert!(discount >= previous);
            assert!(discount <= MAX_SHARING_DISCOUNT);
            previous = discount;
        }
        assert_eq!(sharing_discount(4), MAX_SHARING_DISCOUNT);
        assert_eq!(sharing_discount(9), MAX_SHARING_DISCOUNT);
    }

    #[test]
    fn surge_ramps_linearly_and_saturates() {
        assert_eq!(surge_multiplier(0), 1.0);
        assert_eq!(surge_multiplier(50), 1.25);
        assert_eq!(surge_multiplier(100), 1.5);
        assert_eq!(surge_multiplier(2500), 1.5);

        let mut previous = 0.0;
        for count in 0..200 {
            let multiplier = surge_multiplier(count);
            assert!(multiplier >= previous);
            previous = multiplier;
        }
    }

    #[test]
    fn surge_applies_before_the_discount() {
        // (5 + 20) * 1.25 * 0.75
        assert_eq!(fare(10.0, 2, 50), 23.44);
    }

    #[test]
    fn fares_are_rounded_half_up_to_cents() {
        // 5 + 3.333 * 2 = 11.666
        assert_eq!(fare(3.333, 1, 0), 11.67);
    }

    #[test]
    fn savings_compare_solo_against_pooled() {
        assert_eq!(savings_percentage(25.0, 18.75), 25.0);
        assert_eq!(savings_percentage(0.0, 10.0), 0.0);
    }
}
