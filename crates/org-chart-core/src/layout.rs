//! Tree Layout
//!
//! Top-down tidy layout for a parent/child forest: subtree widths are sized
//! post-order, then nodes are placed pre-order. Each node's `x` is the centre
//! of its subtree box and `y` is its depth band. Roots are centred as a group
//! around `x = 0`.

use std::collections::HashMap;

use crate::config::LayoutConfig;
use crate::domain::{NodeId, Position};
use crate::tree::{build_forest, preorder, HierarchyNode, TreeNode};

/// Compute a position for every item.
///
/// Deterministic: the same items in the same order always give the same map.
pub fn layout<T: HierarchyNode>(items: &[T], config: &LayoutConfig) -> HashMap<NodeId, Position> {
    let forest = build_forest(items);
    let widths = measure(&forest, config);

    let total = span(forest.iter().map(|root| widths[&root.item.node_id()]), config);
    let mut positions = HashMap::with_capacity(items.len());
    let mut left = -total / 2;
    for root in &forest {
        let width = widths[&root.item.node_id()];
        place(root, left, config, &widths, &mut positions);
        left += width + config.horizontal_gap;
    }

    log::debug!("laid out {} nodes in {} trees", positions.len(), forest.len());
    positions
}

/// The "never positioned" sentinel: a non-empty set where everything is at the origin
pub fn needs_auto_layout<I>(positions: I) -> bool
where
    I: IntoIterator<Item = Position>,
{
    let mut any = false;
    for position in positions {
        if !position.is_origin() {
            return false;
        }
        any = true;
    }
    any
}

/// Width of a row of boxes separated by the horizontal gap
fn span<I: Iterator<Item = i32>>(widths: I, config: &LayoutConfig) -> i32 {
    let (sum, count) = widths.fold((0, 0), |(sum, count), w| (sum + w, count + 1));
    if count == 0 {
        0
    } else {
        sum + (count - 1) * config.horizontal_gap
    }
}

/// Subtree widths; reverse pre-order sees every child before its parent
fn measure<T: HierarchyNode>(forest: &[TreeNode<'_, T>], config: &LayoutConfig) -> HashMap<NodeId, i32> {
    let mut widths = HashMap::new();
    for node in preorder(forest).into_iter().rev() {
        let children = span(node.children.iter().map(|child| widths[&child.item.node_id()]), config);
        widths.insert(node.item.node_id(), config.node_width.max(children));
    }
    widths
}

/// Place a tree pre-order, each subtree starting at its left edge
fn place<T: HierarchyNode>(
    root: &TreeNode<'_, T>,
    left: i32,
    config: &LayoutConfig,
    widths: &HashMap<NodeId, i32>,
    positions: &mut HashMap<NodeId, Position>,
) {
    let mut stack = vec![(root, left)];
    while let Some((node, left)) = stack.pop() {
        let id = node.item.node_id();
        let width = widths[&id];
        let depth = i32::try_from(node.depth).unwrap_or(i32::MAX / config.band_height().max(1));
        positions.insert(id, Position::new(left + width / 2, depth.saturating_mul(config.band_height())));

        let children_span = span(node.children.iter().map(|c| widths[&c.item.node_id()]), config);
        let mut child_left = left + (width - children_span) / 2;
        for child in &node.children {
            stack.push((child, child_left));
            child_left += widths[&child.item.node_id()] + config.horizontal_gap;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HierarchyItem, ItemId};

    fn make_item(id: u32, parent_id: Option<u32>, sort_order: i32) -> HierarchyItem {
        HierarchyItem {
            parent_id: parent_id.map(ItemId),
            sort_order,
            ..HierarchyItem::new(id, format!("Role {}", id))
        }
    }

    fn at(positions: &HashMap<NodeId, Position>, id: u32) -> Position {
        positions[&NodeId::Persisted(ItemId(id))]
    }

    #[test]
    fn test_scenario_four_nodes() {
        // A(1) -> B(2), C(3); B -> D(4)
        let items = vec![
            make_item(1, None, 0),
            make_item(2, Some(1), 0),
            make_item(3, Some(1), 1),
            make_item(4, Some(2), 0),
        ];
        let positions = layout(&items, &LayoutConfig::default());
        assert_eq!(positions.len(), 4);

        let (a, b, c, d) = (at(&positions, 1), at(&positions, 2), at(&positions, 3), at(&positions, 4));
        assert!(a.y < b.y);
        assert_eq!(b.y, c.y);
        assert!(b.y < d.y);
        assert!(b.x < a.x && a.x < c.x);
        assert_eq!(b.x, d.x);
    }

    #[test]
    fn test_single_root_is_centred_on_origin() {
        let items = vec![make_item(1, None, 0)];
        let positions = layout(&items, &LayoutConfig::default());
        assert_eq!(at(&positions, 1), Position::new(0, 0));
    }

    #[test]
    fn test_roots_spread_left_to_right() {
        let config = LayoutConfig::default();
        let items = vec![make_item(1, None, 0), make_item(2, None, 1)];
        let positions = layout(&items, &config);
        let (a, b) = (at(&positions, 1), at(&positions, 2));
        assert_eq!(b.x - a.x, config.column_width());
        assert_eq!(a.x + b.x, 0);
        assert_eq!(a.y, 0);
        assert_eq!(b.y, 0);
    }

    #[test]
    fn test_parent_is_centred_over_children() {
        let config = LayoutConfig::default();
        let items = vec![
            make_item(1, None, 0),
            make_item(2, Some(1), 0),
            make_item(3, Some(1), 1),
            make_item(4, Some(1), 2),
        ];
        let positions = layout(&items, &config);
        let first = at(&positions, 2).x;
        let last = at(&positions, 4).x;
        assert_eq!(at(&positions, 1).x * 2, first + last);
        assert_eq!(at(&positions, 3).x, at(&positions, 1).x);
    }

    #[test]
    fn test_y_uses_structure_not_stored_level() {
        let config = LayoutConfig::default();
        let mut child = make_item(2, Some(1), 0);
        child.level = 9;
        let items = vec![make_item(1, None, 0), child];
        let positions = layout(&items, &config);
        assert_eq!(at(&positions, 2).y, config.band_height());
    }

    #[test]
    fn test_cycle_terminates() {
        let items = vec![make_item(1, Some(2), 0), make_item(2, Some(1), 0)];
        let positions = layout(&items, &LayoutConfig::default());
        assert_eq!(positions.len(), 2);
        assert_eq!(at(&positions, 1).y, 0);
    }

    #[test]
    fn test_ten_thousand_deep_chain() {
        let config = LayoutConfig::default();
        let items: Vec<HierarchyItem> = (1..=10_000u32)
            .map(|id| make_item(id, id.checked_sub(1).filter(|p| *p > 0), 0))
            .collect();
        let positions = layout(&items, &config);
        assert_eq!(positions.len(), 10_000);
        assert_eq!(at(&positions, 1), Position::new(0, 0));
        assert_eq!(at(&positions, 10_000), Position::new(0, 9_999 * config.band_height()));
    }

    #[test]
    fn test_empty_input() {
        let items: Vec<HierarchyItem> = Vec::new();
        assert!(layout(&items, &LayoutConfig::default()).is_empty());
    }

    #[test]
    fn test_needs_auto_layout() {
        assert!(!needs_auto_layout(Vec::<Position>::new()));
        assert!(needs_auto_layout(vec![Position::ORIGIN, Position::ORIGIN]));
        assert!(!needs_auto_layout(vec![Position::ORIGIN, Position::new(0, 1)]));
    }
}
