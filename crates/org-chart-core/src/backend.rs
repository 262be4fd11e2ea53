//! Backend Contract
//!
//! The remote collaborator that loads the hierarchy and persists what the
//! designer proposes. Transport and schema belong to the implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainResult, DraftId, HierarchyItem, ItemId, LoadedItem, NodeId};

/// Scoping for a hierarchy load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoadFilter {
    /// Only this item and everything below it
    pub root: Option<ItemId>,
    /// Case-insensitive name match
    pub search: Option<String>,
}

/// One entry of the positional snapshot sent on save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionUpdate {
    pub id: ItemId,
    pub position_x: i32,
    pub position_y: i32,
    /// Only present when the structural depth disagrees with the stored level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
}

/// One draft to create.
///
/// `parent_id` may name a draft that appears earlier in the same batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftCreate {
    pub draft_id: DraftId,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<NodeId>,
    pub level: u32,
    pub position_x: i32,
    pub position_y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentUpdate {
    pub id: ItemId,
    pub new_parent_id: Option<ItemId>,
}

/// Hierarchy persistence.
///
/// Futures are not required to be `Send` so that browser IPC bindings can
/// implement the same contract as native stores.
#[async_trait(?Send)]
pub trait HierarchyBackend {
    /// Current flat list with occupancy metadata
    async fn load(&self, filter: &LoadFilter) -> DomainResult<Vec<LoadedItem>>;

    /// All-or-nothing position/level update
    async fn bulk_update_positions(&self, updates: &[PositionUpdate]) -> DomainResult<()>;

    /// All-or-nothing create; results follow payload order
    async fn bulk_create(&self, drafts: &[DraftCreate]) -> DomainResult<Vec<HierarchyItem>>;

    /// Reparent one persisted item, effective immediately
    async fn update_parent(&self, update: &ParentUpdate) -> DomainResult<()>;

    async fn delete_item(&self, id: ItemId) -> DomainResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_update_omits_unchanged_level() {
        let update = PositionUpdate { id: ItemId(3), position_x: 10, position_y: -4, level: None };
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"id":3,"positionX":10,"positionY":-4}"#);
    }

    #[test]
    fn test_parent_update_wire_shape() {
        let update = ParentUpdate { id: ItemId(5), new_parent_id: Some(ItemId(2)) };
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"id":5,"newParentId":2}"#);
    }
}
