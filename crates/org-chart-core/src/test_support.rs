//! Shared fixtures for unit tests

use std::cell::{Cell, RefCell};

use async_trait::async_trait;

use crate::backend::{DraftCreate, HierarchyBackend, LoadFilter, ParentUpdate, PositionUpdate};
use crate::domain::{DomainError, DomainResult, HierarchyItem, ItemId, LoadedItem, NodeId};

pub fn loaded(id: u32, parent: Option<u32>, x: i32, y: i32) -> LoadedItem {
    LoadedItem::from(HierarchyItem {
        parent_id: parent.map(ItemId),
        level: u32::from(parent.is_some()),
        position_x: x,
        position_y: y,
        ..HierarchyItem::new(id, format!("Role {}", id))
    })
}

pub fn p(id: u32) -> NodeId {
    NodeId::Persisted(ItemId(id))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Load,
    UpdatePositions(Vec<PositionUpdate>),
    Create(Vec<DraftCreate>),
    UpdateParent(ParentUpdate),
    Delete(ItemId),
}

/// In-memory backend that records every call
#[derive(Default)]
pub struct RecordingBackend {
    items: Vec<HierarchyItem>,
    calls: RefCell<Vec<Call>>,
    fail_create: Cell<bool>,
    next_id: Cell<u32>,
}

impl RecordingBackend {
    pub fn with_items(items: Vec<HierarchyItem>) -> Self {
        Self { items, ..Default::default() }
    }

    pub fn fail_create(&self, fail: bool) {
        self.fail_create.set(fail);
    }

    /// Calls other than loads, in order
    pub fn calls(&self) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|call| **call != Call::Load)
            .cloned()
            .collect()
    }
}

#[async_trait(?Send)]
impl HierarchyBackend for RecordingBackend {
    async fn load(&self, _filter: &LoadFilter) -> DomainResult<Vec<LoadedItem>> {
        self.calls.borrow_mut().push(Call::Load);
        Ok(self.items.iter().cloned().map(LoadedItem::from).collect())
    }

    async fn bulk_update_positions(&self, updates: &[PositionUpdate]) -> DomainResult<()> {
        self.calls.borrow_mut().push(Call::UpdatePositions(updates.to_vec()));
        Ok(())
    }

    async fn bulk_create(&self, drafts: &[DraftCreate]) -> DomainResult<Vec<HierarchyItem>> {
        self.calls.borrow_mut().push(Call::Create(drafts.to_vec()));
        if self.fail_create.get() {
            return Err(DomainError::Internal("backend unavailable".to_string()));
        }
        Ok(drafts
            .iter()
            .map(|draft| {
                let id = 100 + self.next_id.get();
                self.next_id.set(self.next_id.get() + 1);
                HierarchyItem {
                    level: draft.level,
                    position_x: draft.position_x,
                    position_y: draft.position_y,
                    description: draft.description.clone(),
                    ..HierarchyItem::new(id, draft.name.clone())
                }
            })
            .collect())
    }

    async fn update_parent(&self, update: &ParentUpdate) -> DomainResult<()> {
        self.calls.borrow_mut().push(Call::UpdateParent(*update));
        Ok(())
    }

    async fn delete_item(&self, id: ItemId) -> DomainResult<()> {
        self.calls.borrow_mut().push(Call::Delete(id));
        Ok(())
    }
}
