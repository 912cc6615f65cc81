//! Normalized facility records, built fresh from every fetched payload.

use crate::error::ParseError;
use crate::geo::SourceCrs;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use shared::SourceKind;
use shared::api::STATION_IN_SERVICE;
use shared::api::parkings::{Parking, ParkingsRoot};
use shared::api::stations::{Station, StationsRoot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FacilityKind {
    Station,
    Parking,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum OperationalState {
    InService,
    /// Carries the upstream status label, e.g. `"HORS SERVICE"`.
    OutOfService(String),
}

impl OperationalState {
    pub fn is_in_service(&self) -> bool {
        matches!(self, OperationalState::InService)
    }

    pub fn label(&self) -> &str {
        match self {
            OperationalState::InService => STATION_IN_SERVICE,
            OperationalState::OutOfService(label) => label,
        }
    }
}

/// Position exactly as received, tagged with the CRS it is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RawPosition {
    pub x: f64,
    pub y: f64,
    pub crs: SourceCrs,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Facility {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub kind: FacilityKind,
    pub raw_position: RawPosition,
    pub available_units: u32,
    pub available_slots: Option<u32>,
    pub state: OperationalState,
    pub last_modified: Option<DateTime<Utc>>,
}

impl From<Station> for Facility {
    fn from(station: Station) -> Self {
        let state = if station.etat == STATION_IN_SERVICE {
            OperationalState::InService
        } else {
            OperationalState::OutOfService(station.etat)
        };

        Facility {
            id: station.nom.clone(),
            name: station.nom,
            address: Some(station.adresse),
            kind: FacilityKind::Station,
            raw_position: RawPosition {
                x: station.x,
                y: station.y,
                crs: SourceCrs::Wgs84,
            },
            available_units: station.nb_velos_dispo,
            available_slots: Some(station.nb_places_dispo),
            state,
            last_modified: parse_timestamp(&station.date_modification),
        }
    }
}

impl From<Parking> for Facility {
    fn from(parking: Parking) -> Self {
        Facility {
            id: parking.nom.clone(),
            name: parking.nom,
            address: None,
            kind: FacilityKind::Parking,
            // `longitude`/`latitude` are Lambert-93 easting/northing
            raw_position: RawPosition {
                x: parking.longitude,
                y: parking.latitude,
                crs: SourceCrs::Lambert93,
            },
            available_units: parking.nbr_libre,
            available_slots: None,
            state: OperationalState::InService,
            last_modified: None,
        }
    }
}

/// Parses a raw response body of the given shape into facilities, in
/// payload order.
pub fn parse_snapshot(kind: SourceKind, body: &str) -> Result<Vec<Facility>, ParseError> {
    let facilities = match kind {
        SourceKind::Stations => serde_json::from_str::<StationsRoot>(body)?
            .velos
            .into_iter()
            .map(Facility::from)
            .collect(),
        SourceKind::Parkings => serde_json::from_str::<ParkingsRoot>(body)?
            .parkings
            .into_iter()
            .map(Facility::from)
            .collect(),
    };
    Ok(facilities)
}

/// Accepts RFC 3339 and zone-less ISO-8601 (read as UTC). Anything else
/// only loses the popup timestamp, not the record.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
