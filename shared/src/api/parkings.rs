use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ParkingsRoot {
    pub parkings: Vec<Parking>,
}

/// A parking lot.
///
/// Despite their names, `longitude` and `latitude` hold Lambert-93
/// easting/northing in meters, not geographic degrees.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Parking {
    pub nom: String,
    pub longitude: f64,
    pub latitude: f64,
    pub nbr_libre: u32,
}
