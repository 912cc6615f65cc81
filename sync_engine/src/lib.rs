//! Live geospatial synchronization of shared-mobility facilities.
//!
//! Each cycle fetches a fresh snapshot, normalizes positions to WGS84,
//! classifies and filters facilities, and converges the map with the
//! smallest set of marker operations.

pub mod classify;
pub mod engine;
pub mod error;
pub mod facility;
pub mod filter;
pub mod geo;
pub mod poller;
pub mod reconcile;
pub mod render;
pub mod source;
pub mod status;

pub use classify::{Category, Thresholds, classify};
pub use engine::{CycleOutcome, CycleSummary, EngineSettings, SyncEngine, SyncPhase};
pub use error::{FetchError, ParseError};
pub use facility::Facility;
pub use filter::{FilterInputSource, FilterState, FilterToggle};
pub use geo::{CoordinateError, GeoPosition, SourceCrs, transform};
pub use poller::{PollerHandle, RefreshTrigger};
pub use reconcile::{Delta, RenderedSet, reconcile};
pub use render::{MapRenderer, MarkerVisual, Viewport};
pub use source::{FacilitySource, HttpSource};
pub use status::{SharedStatus, SyncStatus};
