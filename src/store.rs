//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity.

use leptos::prelude::*;
use org_chart_core::{project, CanvasView, ChartDesigner, DefaultPresenter, LoadFilter, LoadedItem};
use reactive_stores::Store;

use crate::models::{DesignerSettings, DomainKind};

/// Global application state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct ChartState {
    /// Canvas model: graph, selection, menu and save tracking
    pub designer: ChartDesigner,
    /// Subtree/search scope of the current load
    pub filter: LoadFilter,
    pub domain: DomainKind,
    /// Host settings have arrived; loads wait for them
    pub ready: bool,
}

/// Type alias for the store
pub type ChartStore = Store<ChartState>;

/// Get the chart store from context
pub fn use_chart_store() -> ChartStore {
    expect_context::<ChartStore>()
}

// ========================
// Store Helper Functions
// ========================

/// Start a designer for the host's settings
pub fn store_apply_settings(store: &ChartStore, settings: DesignerSettings) {
    *store.designer().write() = ChartDesigner::new(settings.config, settings.capabilities);
    *store.domain().write() = settings.domain;
    *store.ready().write() = true;
}

/// Merge a fresh backend load into the canvas
pub fn store_sync(store: &ChartStore, loaded: Vec<LoadedItem>) -> bool {
    store.designer().write().sync_from_backend(loaded)
}

/// Projection of the whole designer for rendering
pub fn store_project(store: &ChartStore) -> CanvasView {
    let presenter = DefaultPresenter::new(store.domain().get().labels());
    store.designer().with(|designer| project(designer, &presenter))
}
