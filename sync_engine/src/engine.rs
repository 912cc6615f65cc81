//! Orchestrates one reconciliation cycle at a time.
//!
//! `IDLE -> FETCHING -> (SUCCESS -> RENDERING | FAILURE) -> IDLE`. The
//! engine does no I/O itself: a driver calls [`SyncEngine::begin_cycle`],
//! performs the fetch, and hands the result back with the ticket it got.
//! Every begun cycle bumps a counter; a result whose ticket is not the
//! latest is discarded, as is anything arriving after [`SyncEngine::stop`].

use crate::classify::{Thresholds, classify};
use crate::error::FetchError;
use crate::facility::Facility;
use crate::filter::FilterState;
use crate::geo::{GeoPosition, transform};
use crate::reconcile::{RenderedSet, reconcile};
use crate::render::{FitOptions, MapRenderer, MarkerVisual, Viewport, popup_for, style_for};
use shared::{Config, ViewConfig};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    pub thresholds: Thresholds,
    pub view: ViewConfig,
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            thresholds: Thresholds {
                low_stock: config.source.low_stock_threshold(),
            },
            view: config.view(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Fetching,
    Stopped,
}

/// Proof that a cycle was started; must accompany its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleTicket(u64);

impl CycleTicket {
    pub fn cycle(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub cycle: u64,
    pub received: usize,
    pub dropped: usize,
    pub hidden: usize,
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
    pub rendered: usize,
}

#[derive(Debug)]
pub enum CycleOutcome {
    Applied(CycleSummary),
    Failed { cycle: u64, error: FetchError },
    /// A newer cycle started before this result arrived.
    Stale { cycle: u64 },
    Stopped { cycle: u64 },
}

pub struct SyncEngine<R> {
    renderer: R,
    rendered: RenderedSet,
    filter: FilterState,
    viewport: Viewport,
    settings: EngineSettings,
    latest_cycle: u64,
    phase: SyncPhase,
    framed: bool,
}

impl<R: MapRenderer> SyncEngine<R> {
    pub fn new(renderer: R, filter: FilterState, viewport: Viewport, settings: EngineSettings) -> Self {
        Self {
            renderer,
            rendered: RenderedSet::new(),
            filter,
            viewport,
            settings,
            latest_cycle: 0,
            phase: SyncPhase::Idle,
            framed: false,
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn rendered(&self) -> &RenderedSet {
        &self.rendered
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Starts a cycle unless one is already in flight; overlapping
    /// requests are dropped, not queued.
    pub fn begin_cycle(&mut self) -> Option<CycleTicket> {
        match self.phase {
            SyncPhase::Stopped => None,
            SyncPhase::Fetching => {
                debug!(name: "engine.cycle.coalesced", in_flight = self.latest_cycle, "cycle already in flight, skipping");
                None
            }
            SyncPhase::Idle => Some(self.next_ticket()),
        }
    }

    /// Starts a cycle even if one is in flight. The in-flight result will
    /// be discarded as stale when it arrives.
    pub fn supersede_cycle(&mut self) -> Option<CycleTicket> {
        if self.phase == SyncPhase::Stopped {
            return None;
        }
        if self.phase == SyncPhase::Fetching {
            debug!(name: "engine.cycle.superseded", superseded = self.latest_cycle, "superseding in-flight cycle");
        }
        Some(self.next_ticket())
    }

    fn next_ticket(&mut self) -> CycleTicket {
        self.latest_cycle += 1;
        self.phase = SyncPhase::Fetching;
        CycleTicket(self.latest_cycle)
    }

    pub fn complete_cycle(
        &mut self,
        ticket: CycleTicket,
        result: Result<Vec<Facility>, FetchError>,
    ) -> CycleOutcome {
        let cycle = ticket.cycle();
        if self.phase == SyncPhase::Stopped {
            debug!(name: "engine.cycle.dropped", cycle, "engine stopped, dropping late result");
            return CycleOutcome::Stopped { cycle };
        }
        if cycle != self.latest_cycle {
            debug!(name: "engine.cycle.stale", cycle, latest = self.latest_cycle, "discarding stale result");
            return CycleOutcome::Stale { cycle };
        }
        self.phase = SyncPhase::Idle;

        match result {
            Ok(facilities) => CycleOutcome::Applied(self.apply_snapshot(cycle, facilities)),
            Err(error) => {
                warn!(name: "engine.cycle.failed", cycle, kind = error.kind(), error = ?error, "cycle failed, keeping current markers");
                if !self.framed {
                    self.frame(&[]);
                }
                CycleOutcome::Failed { cycle, error }
            }
        }
    }

    /// No state changes once this returns.
    pub fn stop(&mut self) {
        self.phase = SyncPhase::Stopped;
    }

    fn apply_snapshot(&mut self, cycle: u64, facilities: Vec<Facility>) -> CycleSummary {
        let filter = self.filter.snapshot();
        let mobile = self.viewport.is_mobile();

        let mut summary = CycleSummary {
            cycle,
            received: facilities.len(),
            ..CycleSummary::default()
        };
        let mut positions = Vec::with_capacity(facilities.len());
        let mut targets = Vec::with_capacity(facilities.len());

        for facility in facilities {
            let raw = facility.raw_position;
            let position = match transform(raw.x, raw.y, raw.crs) {
                Ok(position) => position,
                Err(e) => {
                    warn!(name: "engine.facility.dropped", id = %facility.id, error = %e, "dropping facility with invalid position");
                    summary.dropped += 1;
                    continue;
                }
            };
            positions.push(position);

            let category = classify(&facility, &self.settings.thresholds);
            if !filter.is_visible(category) {
                summary.hidden += 1;
                continue;
            }

            let visual = MarkerVisual {
                position,
                style: style_for(facility.kind, category, mobile),
                popup: popup_for(&facility),
            };
            targets.push((facility.id, visual));
        }

        if !self.framed {
            self.frame(&positions);
        }

        let delta = reconcile(&self.rendered, targets);
        delta.render(&mut self.renderer);
        self.rendered.apply(&delta);

        summary.added = delta.to_add.len();
        summary.updated = delta.to_update.len();
        summary.removed = delta.to_remove.len();
        summary.rendered = self.rendered.len();

        info!(
            name: "engine.cycle.applied",
            cycle,
            received = summary.received,
            dropped = summary.dropped,
            hidden = summary.hidden,
            added = summary.added,
            updated = summary.updated,
            removed = summary.removed,
            rendered = summary.rendered,
            "applied facility snapshot"
        );
        summary
    }

    /// Initial framing, done once. Falls back to the configured view when
    /// there is nothing to fit.
    fn frame(&mut self, positions: &[GeoPosition]) {
        self.framed = true;
        let view = self.settings.view;

        if positions.is_empty() {
            match GeoPosition::new(view.latitude, view.longitude) {
                Ok(center) => self.renderer.set_view(center, view.zoom),
                Err(e) => error!(name: "engine.view.invalid", error = %e, "configured default view is not a valid position"),
            }
        } else {
            self.renderer.fit_bounds(
                positions,
                FitOptions {
                    padding: view.fit_padding,
                    max_zoom: view.fit_max_zoom,
                },
            );
        }
    }
}
