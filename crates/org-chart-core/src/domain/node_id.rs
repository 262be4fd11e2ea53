//! Node Identifiers
//!
//! Persisted and draft items live in disjoint id namespaces. `NodeId` is the
//! tagged union used everywhere the two partitions meet.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

/// Identifier assigned locally to a draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftId(pub u32);

/// Any node on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeId {
    Persisted(ItemId),
    Draft(DraftId),
}

impl NodeId {
    pub fn is_draft(&self) -> bool {
        matches!(self, NodeId::Draft(_))
    }

    pub fn as_persisted(&self) -> Option<ItemId> {
        match self {
            NodeId::Persisted(id) => Some(*id),
            NodeId::Draft(_) => None,
        }
    }

    pub fn as_draft(&self) -> Option<DraftId> {
        match self {
            NodeId::Draft(id) => Some(*id),
            NodeId::Persisted(_) => None,
        }
    }
}

impl From<ItemId> for NodeId {
    fn from(id: ItemId) -> Self {
        NodeId::Persisted(id)
    }
}

impl From<DraftId> for NodeId {
    fn from(id: DraftId) -> Self {
        NodeId::Draft(id)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Persisted(id) => write!(f, "item-{}", id.0),
            NodeId::Draft(id) => write!(f, "draft-{}", id.0),
        }
    }
}
