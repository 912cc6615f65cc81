use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use sync_engine::GeoPosition;
use sync_engine::MapRenderer;
use sync_engine::MarkerVisual;
use sync_engine::render::{FitOptions, MarkerStyle};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Framing {
    FitBounds {
        south_west: GeoPosition,
        north_east: GeoPosition,
        options: FitOptions,
    },
    SetView {
        center: GeoPosition,
        zoom: u8,
    },
}

/// What a map client should currently display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MapView {
    pub framing: Option<Framing>,
    pub markers: BTreeMap<String, MarkerVisual>,
}

/// In-process map fed by render commands and served over HTTP.
#[derive(Debug, Clone, Default)]
pub struct LiveMap(Arc<RwLock<MapView>>);

impl LiveMap {
    pub fn view(&self) -> MapView {
        self.0.read().clone()
    }
}

impl MapRenderer for LiveMap {
    fn add_marker(&mut self, id: &str, position: GeoPosition, style: &MarkerStyle, popup: &str) {
        debug!(name: "map.marker.added", id, category = %style.category, "adding marker");
        self.0.write().markers.insert(
            id.to_string(),
            MarkerVisual {
                position,
                style: *style,
                popup: popup.to_string(),
            },
        );
    }

    fn update_marker(&mut self, id: &str, position: GeoPosition, style: &MarkerStyle, popup: &str) {
        debug!(name: "map.marker.updated", id, category = %style.category, "updating marker");
        let mut view = self.0.write();
        if let Some(marker) = view.markers.get_mut(id) {
            marker.position = position;
            marker.style = *style;
            popup.clone_into(&mut marker.popup);
        }
    }

    fn remove_marker(&mut self, id: &str) {
        debug!(name: "map.marker.removed", id, "removing marker");
        self.0.write().markers.remove(id);
    }

    fn fit_bounds(&mut self, positions: &[GeoPosition], options: FitOptions) {
        let Some(first) = positions.first() else {
            return;
        };
        let (mut south, mut west) = (first.latitude(), first.longitude());
        let (mut north, mut east) = (south, west);
        for p in &positions[1..] {
            south = south.min(p.latitude());
            north = north.max(p.latitude());
            west = west.min(p.longitude());
            east = east.max(p.longitude());
        }

        // Corners of valid positions are themselves valid.
        if let (Ok(south_west), Ok(north_east)) =
            (GeoPosition::new(south, west), GeoPosition::new(north, east))
        {
            debug!(name: "map.view.fit", count = positions.len(), "fitting map to facilities");
            self.0.write().framing = Some(Framing::FitBounds {
                south_west,
                north_east,
                options,
            });
        }
    }

    fn set_view(&mut self, center: GeoPosition, zoom: u8) {
        debug!(name: "map.view.set", zoom, "setting default map view");
        self.0.write().framing = Some(Framing::SetView { center, zoom });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sync_engine::render::style_for;
    use sync_engine::{Category, facility::FacilityKind};

    fn pos(lat: f64, lon: f64) -> GeoPosition {
        GeoPosition::new(lat, lon).unwrap()
    }

    #[test]
    fn markers_follow_commands() {
        let mut map = LiveMap::default();
        let style = style_for(FacilityKind::Station, Category::Low, false);
        map.add_marker("a", pos(50.6, 3.0), &style, "a");

        let empty = style_for(FacilityKind::Station, Category::Empty, false);
        map.update_marker("a", pos(50.6, 3.0), &empty, "a empty");
        let view = map.view();
        assert_eq!(view.markers["a"].style.category, Category::Empty);
        assert_eq!(view.markers["a"].popup, "a empty");

        map.remove_marker("a");
        assert!(map.view().markers.is_empty());
    }

    #[test]
    fn fit_bounds_stores_enclosing_box() {
        let mut map = LiveMap::default();
        let options = FitOptions { padding: 50, max_zoom: 13 };
        map.fit_bounds(&[pos(50.6, 3.1), pos(50.7, 3.0), pos(50.65, 3.05)], options);

        assert_eq!(
            map.view().framing,
            Some(Framing::FitBounds {
                south_west: pos(50.6, 3.0),
                north_east: pos(50.7, 3.1),
                options,
            })
        );
    }

    #[test]
    fn clones_share_the_same_view() {
        let map = LiveMap::default();
        let mut writer = map.clone();
        writer.set_view(pos(50.63297, 3.05752), 13);
        assert!(matches!(map.view().framing, Some(Framing::SetView { zoom: 13, .. })));
    }
}
