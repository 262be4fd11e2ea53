//! Hierarchy Entities
//!
//! Persisted items mirror the backend; drafts exist only in memory until a
//! bulk create turns them into persisted items.

use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::node_id::{DraftId, ItemId, NodeId};

/// Canvas coordinates (integer pixels)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// `(0, 0)` doubles as the "never positioned" sentinel
    pub fn is_origin(&self) -> bool {
        *self == Self::ORIGIN
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// A hierarchy node known to the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyItem {
    pub id: ItemId,
    pub name: String,
    pub description: Option<String>,
    /// Parent item ID (None = root level)
    pub parent_id: Option<ItemId>,
    /// Depth from a root, denormalized by the backend
    pub level: u32,
    /// Position within siblings (for ordering)
    pub sort_order: i32,
    pub position_x: i32,
    pub position_y: i32,
}

impl HierarchyItem {
    /// Create a new root item at the sentinel position
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id: ItemId(id),
            name: name.into(),
            description: None,
            parent_id: None,
            level: 0,
            sort_order: 0,
            position_x: 0,
            position_y: 0,
        }
    }

    /// Create a new child item under a parent
    pub fn new_child(id: u32, name: impl Into<String>, parent: &HierarchyItem, sort_order: i32) -> Self {
        Self {
            parent_id: Some(parent.id),
            level: parent.level + 1,
            sort_order,
            ..Self::new(id, name)
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.position_x, self.position_y)
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

impl Entity for HierarchyItem {
    type Id = ItemId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// A hierarchy node created locally and not yet acknowledged by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftItem {
    pub id: DraftId,
    pub name: String,
    pub description: Option<String>,
    /// May point at a persisted item or at another draft
    pub parent_id: Option<NodeId>,
    pub level: u32,
    pub position_x: i32,
    pub position_y: i32,
}

impl DraftItem {
    pub fn new(id: DraftId, parent_id: Option<NodeId>, level: u32, position: Position) -> Self {
        Self {
            id,
            name: String::new(),
            description: None,
            parent_id,
            level,
            position_x: position.x,
            position_y: position.y,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.position_x, self.position_y)
    }

    pub fn set_position(&mut self, position: Position) {
        self.position_x = position.x;
        self.position_y = position.y;
    }
}

impl Entity for DraftItem {
    type Id = DraftId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// A loaded item plus occupancy metadata computed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedItem {
    #[serde(flatten)]
    pub item: HierarchyItem,
    #[serde(default)]
    pub child_count: Option<u32>,
    #[serde(default)]
    pub holder_count: Option<u32>,
}

impl From<HierarchyItem> for LoadedItem {
    fn from(item: HierarchyItem) -> Self {
        Self { item, child_count: None, holder_count: None }
    }
}

/// Borrowed view over either partition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartItem<'a> {
    Persisted(&'a HierarchyItem),
    Draft(&'a DraftItem),
}

impl<'a> ChartItem<'a> {
    pub fn node_id(&self) -> NodeId {
        match self {
            ChartItem::Persisted(item) => NodeId::Persisted(item.id),
            ChartItem::Draft(draft) => NodeId::Draft(draft.id),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        match self {
            ChartItem::Persisted(item) => item.parent_id.map(NodeId::Persisted),
            ChartItem::Draft(draft) => draft.parent_id,
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            ChartItem::Persisted(item) => &item.name,
            ChartItem::Draft(draft) => &draft.name,
        }
    }

    pub fn description(&self) -> Option<&'a str> {
        match self {
            ChartItem::Persisted(item) => item.description.as_deref(),
            ChartItem::Draft(draft) => draft.description.as_deref(),
        }
    }

    pub fn level(&self) -> u32 {
        match self {
            ChartItem::Persisted(item) => item.level,
            ChartItem::Draft(draft) => draft.level,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            ChartItem::Persisted(item) => item.position(),
            ChartItem::Draft(draft) => draft.position(),
        }
    }
}
