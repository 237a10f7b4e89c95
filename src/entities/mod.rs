mod location;
mod passenger;
mod ride;

pub use location::{Location, AVERAGE_CITY_SPEED_KMH};
pub use passenger::Passenger;
pub use ride::{Ride, Status};
