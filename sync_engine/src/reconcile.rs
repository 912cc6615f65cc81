//! Incremental diff between what is drawn and what should be drawn.
//!
//! Markers that persist keep their identity on the map; only attribute
//! changes are sent as updates. Nothing is ever cleared wholesale.

use crate::render::{MapRenderer, MarkerVisual};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// What is currently on the map, keyed by facility identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedSet {
    markers: HashMap<String, MarkerVisual>,
}

impl RenderedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&MarkerVisual> {
        self.markers.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.markers.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MarkerVisual)> {
        self.markers.iter().map(|(id, visual)| (id.as_str(), visual))
    }

    /// Converges this set to the target the delta was computed against.
    pub fn apply(&mut self, delta: &Delta) {
        for id in &delta.to_remove {
            self.markers.remove(id);
        }
        for (id, visual) in delta.to_add.iter().chain(&delta.to_update) {
            self.markers.insert(id.clone(), visual.clone());
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delta {
    pub to_add: Vec<(String, MarkerVisual)>,
    pub to_update: Vec<(String, MarkerVisual)>,
    pub to_remove: Vec<String>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_update.is_empty() && self.to_remove.is_empty()
    }

    /// Emits removals first, then additions and updates.
    pub fn render<R: MapRenderer + ?Sized>(&self, renderer: &mut R) {
        for id in &self.to_remove {
            renderer.remove_marker(id);
        }
        for (id, visual) in &self.to_add {
            renderer.add_marker(id, visual.position, &visual.style, &visual.popup);
        }
        for (id, visual) in &self.to_update {
            renderer.update_marker(id, visual.position, &visual.style, &visual.popup);
        }
    }
}

/// Computes the minimal add/update/remove set that turns `previous` into
/// `next`.
///
/// `next` is in fetch order. A repeated identifier keeps its first slot
/// but takes the visual of its last occurrence. Additions and updates
/// follow that order; removals are sorted by identifier.
pub fn reconcile<I>(previous: &RenderedSet, next: I) -> Delta
where
    I: IntoIterator<Item = (String, MarkerVisual)>,
{
    let mut order: Vec<(String, MarkerVisual)> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();
    for (id, visual) in next {
        match slots.entry(id) {
            Entry::Occupied(slot) => order[*slot.get()].1 = visual,
            Entry::Vacant(slot) => {
                order.push((slot.key().clone(), visual));
                slot.insert(order.len() - 1);
            }
        }
    }

    let mut to_remove: Vec<String> = previous
        .markers
        .keys()
        .filter(|id| !slots.contains_key(id.as_str()))
        .cloned()
        .collect();
    to_remove.sort_unstable();

    let mut delta = Delta {
        to_remove,
        ..Delta::default()
    };
    for (id, visual) in order {
        match previous.markers.get(&id) {
            None => delta.to_add.push((id, visual)),
            Some(current) if *current != visual => delta.to_update.push((id, visual)),
            Some(_) => {}
        }
    }
    delta
}
