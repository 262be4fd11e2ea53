//! Canvas Visuals
//!
//! Nodes and edges as the canvas draws them. Both are derived from the flat
//! item lists; edges touching a draft are dashed and animated.

use serde::{Deserialize, Serialize};

use crate::domain::{DraftItem, LoadedItem, NodeId, Position};

/// Render data carried by a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub name: String,
    pub description: Option<String>,
    pub level: u32,
    pub is_draft: bool,
    pub child_count: Option<u32>,
    pub holder_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualNode {
    pub id: NodeId,
    pub position: Position,
    pub data: NodeData,
}

impl VisualNode {
    pub fn persisted(loaded: &LoadedItem, position: Position) -> Self {
        Self {
            id: NodeId::Persisted(loaded.item.id),
            position,
            data: NodeData {
                name: loaded.item.name.clone(),
                description: loaded.item.description.clone(),
                level: loaded.item.level,
                is_draft: false,
                child_count: loaded.child_count,
                holder_count: loaded.holder_count,
            },
        }
    }

    pub fn draft(draft: &DraftItem) -> Self {
        Self {
            id: NodeId::Draft(draft.id),
            position: draft.position(),
            data: Self::draft_data(draft),
        }
    }

    pub fn draft_data(draft: &DraftItem) -> NodeData {
        NodeData {
            name: draft.name.clone(),
            description: draft.description.clone(),
            level: draft.level,
            is_draft: true,
            child_count: None,
            holder_count: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeStyle {
    Solid,
    DashedAnimated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualEdge {
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
    pub style: EdgeStyle,
}

impl VisualEdge {
    /// Edge from `parent` down to `child`
    pub fn between(parent: NodeId, child: NodeId) -> Self {
        let style = if parent.is_draft() || child.is_draft() {
            EdgeStyle::DashedAnimated
        } else {
            EdgeStyle::Solid
        };
        Self {
            id: format!("e-{}-{}", parent, child),
            source: parent,
            target: child,
            style,
        }
    }

    pub fn touches(&self, id: NodeId) -> bool {
        self.source == id || self.target == id
    }

    pub fn touches_draft(&self) -> bool {
        self.source.is_draft() || self.target.is_draft()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DraftId, ItemId};

    #[test]
    fn test_edge_style_follows_drafts() {
        let a = NodeId::Persisted(ItemId(1));
        let b = NodeId::Persisted(ItemId(2));
        let d = NodeId::Draft(DraftId(1));

        let solid = VisualEdge::between(a, b);
        assert_eq!(solid.style, EdgeStyle::Solid);
        assert_eq!(solid.id, "e-item-1-item-2");

        assert_eq!(VisualEdge::between(a, d).style, EdgeStyle::DashedAnimated);
        assert_eq!(VisualEdge::between(d, a).style, EdgeStyle::DashedAnimated);
        assert!(VisualEdge::between(a, d).touches(d));
        assert!(!solid.touches(d));
    }
}
