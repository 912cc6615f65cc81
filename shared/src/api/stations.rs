use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StationsRoot {
    pub velos: Vec<Station>,
}

/// A bike-sharing station. `x`/`y` are WGS84 longitude/latitude.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Station {
    pub nom: String,
    pub adresse: String,
    pub x: f64,
    pub y: f64,
    pub nb_velos_dispo: u32,
    pub nb_places_dispo: u32,
    pub etat: String,
    pub date_modification: String,
}
