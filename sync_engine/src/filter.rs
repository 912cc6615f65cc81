//! Per-category visibility, driven only by external toggle events.

use crate::classify::Category;
use parking_lot::RwLock;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Consistent copy of every category's visibility, taken once per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSnapshot([bool; 4]);

impl Default for FilterSnapshot {
    fn default() -> Self {
        Self([true; 4])
    }
}

impl FilterSnapshot {
    pub fn is_visible(&self, category: Category) -> bool {
        self.0[category.index()]
    }
}

/// Shared handle; clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    inner: Arc<RwLock<FilterSnapshot>>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self, category: Category) -> bool {
        self.inner.read().is_visible(category)
    }

    /// Returns whether the stored value changed.
    pub fn set_visible(&self, category: Category, visible: bool) -> bool {
        let mut guard = self.inner.write();
        let slot = &mut guard.0[category.index()];
        let changed = *slot != visible;
        *slot = visible;
        changed
    }

    pub fn snapshot(&self) -> FilterSnapshot {
        *self.inner.read()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterToggle {
    pub category: Category,
    pub visible: bool,
}

/// Anything that produces visibility toggles, e.g. UI checkboxes or an
/// HTTP control route. `None` means the source is closed.
pub trait FilterInputSource: Send {
    fn next_toggle(&mut self) -> impl Future<Output = Option<FilterToggle>> + Send;
}

#[derive(Debug)]
pub struct ChannelFilterInput {
    rx: mpsc::Receiver<FilterToggle>,
}

impl FilterInputSource for ChannelFilterInput {
    async fn next_toggle(&mut self) -> Option<FilterToggle> {
        self.rx.recv().await
    }
}

pub fn filter_channel(capacity: usize) -> (mpsc::Sender<FilterToggle>, ChannelFilterInput) {
    let (tx, rx) = mpsc::channel(capacity);
    (tx, ChannelFilterInput { rx })
}

/// Applies toggles from `input` to `state` until the input closes.
/// `on_change` runs after every toggle that actually changed visibility.
pub async fn run_filter_input<I, F>(mut input: I, state: FilterState, mut on_change: F)
where
    I: FilterInputSource,
    F: FnMut(FilterToggle) + Send,
{
    while let Some(toggle) = input.next_toggle().await {
        if state.set_visible(toggle.category, toggle.visible) {
            info!(
                name: "filter.toggle.applied",
                category = %toggle.category,
                visible = toggle.visible,
                "category visibility changed"
            );
            on_change(toggle);
        } else {
            debug!(name: "filter.toggle.unchanged", category = %toggle.category, "toggle did not change visibility");
        }
    }
    debug!(name: "filter.input.closed", "filter input source closed");
}
