//! Upstream payload shapes served by the mobility API.

pub mod parkings;
pub mod stations;

/// Value of `etat` for a station that is operating normally.
pub const STATION_IN_SERVICE: &str = "EN SERVICE";
