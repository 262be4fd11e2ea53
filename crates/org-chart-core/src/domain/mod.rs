//! Domain Layer
//!
//! Hierarchy entities, identifiers and the backend error contract.
//! This layer has NO external dependencies (except serde/thiserror).

mod entity;
mod item;
mod node_id;

pub use entity::{find_by_id, find_by_id_mut, DomainError, DomainResult, Entity};
pub use item::{ChartItem, DraftItem, HierarchyItem, LoadedItem, Position};
pub use node_id::{DraftId, ItemId, NodeId};
