//! Render-command surface consumed by the map widget.

mod popup;
mod style;

pub use popup::popup_for;
pub use style::{MarkerShape, MarkerStyle, Viewport, style_for};

use crate::geo::GeoPosition;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

/// Options sent with `fit_bounds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FitOptions {
    pub padding: u32,
    pub max_zoom: u8,
}

/// Everything the map needs to draw one facility marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerVisual {
    pub position: GeoPosition,
    pub style: MarkerStyle,
    pub popup: String,
}

pub trait MapRenderer {
    fn add_marker(&mut self, id: &str, position: GeoPosition, style: &MarkerStyle, popup: &str);
    /// Restyles an existing marker; `position` is resent so a moved
    /// facility does not need a remove/add pair.
    fn update_marker(&mut self, id: &str, position: GeoPosition, style: &MarkerStyle, popup: &str);
    fn remove_marker(&mut self, id: &str);
    fn fit_bounds(&mut self, positions: &[GeoPosition], options: FitOptions);
    fn set_view(&mut self, center: GeoPosition, zoom: u8);
}

/// A render call captured as data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderCommand {
    AddMarker { id: String, visual: MarkerVisual },
    UpdateMarker { id: String, visual: MarkerVisual },
    RemoveMarker { id: String },
    FitBounds { positions: Vec<GeoPosition>, options: FitOptions },
    SetView { center: GeoPosition, zoom: u8 },
}

impl MapRenderer for Vec<RenderCommand> {
    fn add_marker(&mut self, id: &str, position: GeoPosition, style: &MarkerStyle, popup: &str) {
        self.push(RenderCommand::AddMarker {
            id: id.to_string(),
            visual: MarkerVisual { position, style: *style, popup: popup.to_string() },
        });
    }

    fn update_marker(&mut self, id: &str, position: GeoPosition, style: &MarkerStyle, popup: &str) {
        self.push(RenderCommand::UpdateMarker {
            id: id.to_string(),
            visual: MarkerVisual { position, style: *style, popup: popup.to_string() },
        });
    }

    fn remove_marker(&mut self, id: &str) {
        self.push(RenderCommand::RemoveMarker { id: id.to_string() });
    }

    fn fit_bounds(&mut self, positions: &[GeoPosition], options: FitOptions) {
        self.push(RenderCommand::FitBounds { positions: positions.to_vec(), options });
    }

    fn set_view(&mut self, center: GeoPosition, zoom: u8) {
        self.push(RenderCommand::SetView { center, zoom });
    }
}

/// Lets a renderer be observed from outside the task that drives it.
impl<R: MapRenderer> MapRenderer for Arc<Mutex<R>> {
    fn add_marker(&mut self, id: &str, position: GeoPosition, style: &MarkerStyle, popup: &str) {
        self.lock().add_marker(id, position, style, popup);
    }

    fn update_marker(&mut self, id: &str, position: GeoPosition, style: &MarkerStyle, popup: &str) {
        self.lock().update_marker(id, position, style, popup);
    }

    fn remove_marker(&mut self, id: &str) {
        self.lock().remove_marker(id);
    }

    fn fit_bounds(&mut self, positions: &[GeoPosition], options: FitOptions) {
        self.lock().fit_bounds(positions, options);
    }

    fn set_view(&mut self, center: GeoPosition, zoom: u8) {
        self.lock().set_view(center, zoom);
    }
}
