//! Org Chart Core
//!
//! Layered architecture:
//! - domain: Hierarchy entities, identifiers and backend errors
//! - tree / layout: Forest building and tidy-tree geometry
//! - store: Draft and persisted partitions merged into canvas state
//! - controller / menu: Gestures, selection and capability gating
//! - save: Validation and reconciliation against a backend
//! - presentation: Pure projection consumed by UI hosts

pub mod backend;
pub mod capabilities;
pub mod config;
pub mod controller;
pub mod domain;
pub mod error;
pub mod layout;
pub mod menu;
pub mod presentation;
pub mod save;
pub mod store;
pub mod tree;
pub mod visual;

#[cfg(test)]
mod test_support;

pub use backend::{DraftCreate, HierarchyBackend, LoadFilter, ParentUpdate, PositionUpdate};
pub use capabilities::{Capabilities, Capability};
pub use config::{DesignerConfig, LayoutConfig};
pub use controller::{ChartDesigner, DeleteOutcome, DraftPatch, Key, ReparentOutcome};
pub use domain::{
    ChartItem, DomainError, DomainResult, DraftId, DraftItem, HierarchyItem, ItemId, LoadedItem, NodeId, Position,
};
pub use error::ChartError;
pub use layout::{layout, needs_auto_layout};
pub use menu::{ContextMenu, MenuAction, MenuEffect, MenuTarget};
pub use presentation::{project, CanvasView, DefaultPresenter, DomainLabels, NodePresenter, PanelView};
pub use save::{execute_plan, SaveError, SavePlan, SaveReport, SaveStatus, ValidationIssue};
pub use store::GraphStore;
pub use tree::{build_forest, flatten_forest, HierarchyNode, TreeNode};
