//! Tree Utilities
//!
//! Builds the ordered forest from a flat parent-pointer list. The forest is a
//! projection and is rebuilt whenever the list changes.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use crate::domain::{ChartItem, DraftItem, HierarchyItem, NodeId};

/// Anything that can be placed in the hierarchy
pub trait HierarchyNode {
    fn node_id(&self) -> NodeId;
    fn parent_node(&self) -> Option<NodeId>;
    fn level(&self) -> u32;
    /// Drafts have no backend ordering and report `None`
    fn sort_order(&self) -> Option<i32>;
}

impl HierarchyNode for HierarchyItem {
    fn node_id(&self) -> NodeId {
        NodeId::Persisted(self.id)
    }

    fn parent_node(&self) -> Option<NodeId> {
        self.parent_id.map(NodeId::Persisted)
    }

    fn level(&self) -> u32 {
        self.level
    }

    fn sort_order(&self) -> Option<i32> {
        Some(self.sort_order)
    }
}

impl HierarchyNode for DraftItem {
    fn node_id(&self) -> NodeId {
        NodeId::Draft(self.id)
    }

    fn parent_node(&self) -> Option<NodeId> {
        self.parent_id
    }

    fn level(&self) -> u32 {
        self.level
    }

    fn sort_order(&self) -> Option<i32> {
        None
    }
}

impl HierarchyNode for ChartItem<'_> {
    fn node_id(&self) -> NodeId {
        ChartItem::node_id(self)
    }

    fn parent_node(&self) -> Option<NodeId> {
        self.parent()
    }

    fn level(&self) -> u32 {
        ChartItem::level(self)
    }

    fn sort_order(&self) -> Option<i32> {
        match self {
            ChartItem::Persisted(item) => Some(item.sort_order),
            ChartItem::Draft(_) => None,
        }
    }
}

impl<T: HierarchyNode + ?Sized> HierarchyNode for &T {
    fn node_id(&self) -> NodeId {
        (**self).node_id()
    }

    fn parent_node(&self) -> Option<NodeId> {
        (**self).parent_node()
    }

    fn level(&self) -> u32 {
        (**self).level()
    }

    fn sort_order(&self) -> Option<i32> {
        (**self).sort_order()
    }
}

/// Sibling ordering: level first, then sort order; drafts go last
fn sibling_key<T: HierarchyNode>(item: &T) -> (u32, i32) {
    (item.level(), item.sort_order().unwrap_or(i32::MAX))
}

/// One node of the derived forest
#[derive(Debug)]
pub struct TreeNode<'a, T> {
    pub item: &'a T,
    pub children: Vec<TreeNode<'a, T>>,
    pub depth: usize,
}

impl<T> TreeNode<'_, T> {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, including self
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

// Unlinks children iteratively so very deep chains do not recurse on drop
impl<T> Drop for TreeNode<'_, T> {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

/// Pre-order walk of a forest without recursion
pub fn preorder<'t, 'a, T>(forest: &'t [TreeNode<'a, T>]) -> Vec<&'t TreeNode<'a, T>> {
    let mut order = Vec::new();
    let mut stack: Vec<&'t TreeNode<'a, T>> = forest.iter().rev().collect();
    while let Some(node) = stack.pop() {
        order.push(node);
        stack.extend(node.children.iter().rev());
    }
    order
}

/// Build the ordered forest.
///
/// Roots are items with no parent, a parent missing from `items`, or
/// themselves as parent. Every item appears exactly once: items stranded on a
/// parent cycle are promoted to roots in input order.
pub fn build_forest<T: HierarchyNode>(items: &[T]) -> Vec<TreeNode<'_, T>> {
    // First occurrence of each id wins
    let mut index: HashMap<NodeId, usize> = HashMap::new();
    let mut unique = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        if let Entry::Vacant(slot) = index.entry(item.node_id()) {
            slot.insert(i);
            unique.push(i);
        }
    }

    // Build parent -> children map
    let mut children_map: HashMap<NodeId, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();
    for &i in &unique {
        let item = &items[i];
        match item.parent_node() {
            Some(parent) if parent != item.node_id() && index.contains_key(&parent) => {
                children_map.entry(parent).or_default().push(i);
            }
            _ => roots.push(i),
        }
    }

    // Stable sort keeps input order among equal keys
    for children in children_map.values_mut() {
        children.sort_by_key(|&i| sibling_key(&items[i]));
    }
    roots.sort_by_key(|&i| sibling_key(&items[i]));

    let mut visited = vec![false; items.len()];
    let mut forest = Vec::with_capacity(roots.len());
    for &root in &roots {
        forest.push(collect(root, items, &children_map, &mut visited));
    }

    for &i in &unique {
        if !visited[i] {
            log::warn!("parent cycle through {}, promoting it to a root", items[i].node_id());
            forest.push(collect(i, items, &children_map, &mut visited));
        }
    }

    forest
}

/// Assemble the subtree under `root`.
///
/// Visits pre-order with an explicit stack, then builds nodes in reverse
/// pre-order so every child exists before its parent.
fn collect<'a, T: HierarchyNode>(
    root: usize,
    items: &'a [T],
    children_map: &HashMap<NodeId, Vec<usize>>,
    visited: &mut [bool],
) -> TreeNode<'a, T> {
    // (item index, depth, parent slot in `order`)
    let mut order: Vec<(usize, usize, Option<usize>)> = Vec::new();
    let mut stack = vec![(root, 0usize, None::<usize>)];
    while let Some((idx, depth, parent)) = stack.pop() {
        if visited[idx] {
            continue;
        }
        visited[idx] = true;
        let slot = order.len();
        order.push((idx, depth, parent));
        if let Some(kids) = children_map.get(&items[idx].node_id()) {
            for &kid in kids.iter().rev() {
                if !visited[kid] {
                    stack.push((kid, depth + 1, Some(slot)));
                }
            }
        }
    }

    let mut pending: Vec<Vec<TreeNode<'a, T>>> = (0..order.len()).map(|_| Vec::new()).collect();
    let mut built = None;
    for (slot, &(idx, depth, parent)) in order.iter().enumerate().rev() {
        let mut children = std::mem::take(&mut pending[slot]);
        children.reverse();
        let node = TreeNode { item: &items[idx], children, depth };
        match parent {
            Some(parent) => pending[parent].push(node),
            None => built = Some(node),
        }
    }
    // slot 0 is the root and is always present
    built.unwrap_or_else(|| TreeNode { item: &items[root], children: Vec::new(), depth: 0 })
}

/// Flatten a forest in display order, returning (item, depth) pairs
pub fn flatten_forest<'a, T>(forest: &[TreeNode<'a, T>]) -> Vec<(&'a T, usize)> {
    preorder(forest).into_iter().map(|node| (node.item, node.depth)).collect()
}

/// Whether `candidate` sits somewhere below `ancestor`.
///
/// Walks parent pointers upwards and stops on a repeated node, so malformed
/// cyclic input terminates.
pub fn is_descendant<T: HierarchyNode>(items: &[T], ancestor: NodeId, candidate: NodeId) -> bool {
    let parents: HashMap<NodeId, Option<NodeId>> = items
        .iter()
        .map(|item| (item.node_id(), item.parent_node()))
        .collect();

    let mut seen = HashSet::new();
    let mut current = parents.get(&candidate).copied().flatten();
    while let Some(node) = current {
        if node == ancestor {
            return true;
        }
        if !seen.insert(node) {
            return false;
        }
        current = parents.get(&node).copied().flatten();
    }
    false
}
