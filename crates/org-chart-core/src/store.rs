//! Graph State Store
//!
//! The single owner of what the canvas shows. Durable state is the flat
//! persisted snapshot plus the draft list; nodes and edges are kept merged,
//! persisted partition first, and re-derived on every structural change.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::config::LayoutConfig;
use crate::domain::{find_by_id, find_by_id_mut, ChartItem, DraftId, DraftItem, HierarchyItem, ItemId, LoadedItem, NodeId, Position};
use crate::layout::{layout, needs_auto_layout};
use crate::visual::{VisualEdge, VisualNode};

#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    config: LayoutConfig,
    /// Last list received from the backend
    loaded: Vec<LoadedItem>,
    synced: bool,
    drafts: Vec<DraftItem>,
    nodes: Vec<VisualNode>,
    edges: Vec<VisualEdge>,
    dirty: bool,
    /// Bumped on every `mark_dirty`
    generation: u64,
    dragging: Option<NodeId>,
    /// Persisted nodes whose position changed since the last save
    moved: BTreeSet<ItemId>,
    next_draft: u32,
    saving: bool,
}

impl GraphStore {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config, ..Default::default() }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    // ========================
    // Queries
    // ========================

    pub fn loaded(&self) -> &[LoadedItem] {
        &self.loaded
    }

    pub fn persisted(&self) -> impl Iterator<Item = &HierarchyItem> + '_ {
        self.loaded.iter().map(|loaded| &loaded.item)
    }

    pub fn persisted_item(&self, id: ItemId) -> Option<&HierarchyItem> {
        self.persisted().find(|item| item.id == id)
    }

    pub fn drafts(&self) -> &[DraftItem] {
        &self.drafts
    }

    pub fn draft(&self, id: DraftId) -> Option<&DraftItem> {
        find_by_id(&self.drafts, id)
    }

    pub fn nodes(&self) -> &[VisualNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[VisualEdge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> Option<&VisualNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn position_of(&self, id: NodeId) -> Option<Position> {
        self.node(id).map(|node| node.position)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.item(id).is_some()
    }

    /// Either partition, by id
    pub fn item(&self, id: NodeId) -> Option<ChartItem<'_>> {
        match id {
            NodeId::Persisted(id) => self.persisted_item(id).map(ChartItem::Persisted),
            NodeId::Draft(id) => self.draft(id).map(ChartItem::Draft),
        }
    }

    /// Both partitions, persisted first
    pub fn chart_items(&self) -> Vec<ChartItem<'_>> {
        self.persisted()
            .map(ChartItem::Persisted)
            .chain(self.drafts.iter().map(ChartItem::Draft))
            .collect()
    }

    /// Number of direct children across both partitions
    pub fn child_count(&self, id: NodeId) -> usize {
        self.chart_items()
            .iter()
            .filter(|item| item.parent() == Some(id))
            .count()
    }

    /// Structural depth of persisted items whose whole ancestor chain is
    /// loaded and ends at a real root. Items under a filtered-out parent or on
    /// a parent cycle are left out; their stored level is all there is.
    pub fn anchored_depths(&self) -> HashMap<NodeId, usize> {
        let parents: HashMap<ItemId, Option<ItemId>> =
            self.persisted().map(|item| (item.id, item.parent_id)).collect();
        let mut resolved: HashMap<ItemId, Option<usize>> = HashMap::with_capacity(parents.len());

        for &start in parents.keys() {
            let mut chain = Vec::new();
            let mut seen = HashSet::new();
            let mut node = start;
            // depth of the topmost chain entry
            let top = loop {
                if let Some(&known) = resolved.get(&node) {
                    break known.map(|depth| depth + 1);
                }
                if !seen.insert(node) {
                    break None;
                }
                chain.push(node);
                match parents.get(&node).copied().flatten() {
                    None => break Some(0),
                    Some(parent) if parents.contains_key(&parent) => node = parent,
                    Some(_) => break None,
                }
            };
            for (offset, id) in chain.iter().rev().enumerate() {
                resolved.insert(*id, top.map(|depth| depth + offset));
            }
        }

        resolved
            .into_iter()
            .filter_map(|(id, depth)| depth.map(|depth| (NodeId::Persisted(id), depth)))
            .collect()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn dragging(&self) -> Option<NodeId> {
        self.dragging
    }

    pub fn moved(&self) -> &BTreeSet<ItemId> {
        &self.moved
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    // ========================
    // Backend sync
    // ========================

    /// Replace the persisted partition with a fresh backend list.
    ///
    /// Returns `false` without touching anything when the list is unchanged.
    /// Drafts, the node being dragged and persisted nodes moved since the last
    /// save keep their live positions.
    pub fn sync_from_backend(&mut self, loaded: Vec<LoadedItem>) -> bool {
        if self.synced && self.loaded == loaded {
            log::debug!("sync skipped, backend list unchanged");
            return false;
        }

        let positions: HashMap<NodeId, Position> =
            if needs_auto_layout(loaded.iter().map(|l| l.item.position())) {
                let items: Vec<&HierarchyItem> = loaded.iter().map(|l| &l.item).collect();
                layout(&items, &self.config)
            } else {
                loaded
                    .iter()
                    .map(|l| (NodeId::Persisted(l.item.id), l.item.position()))
                    .collect()
            };

        let live: HashMap<NodeId, Position> = self
            .nodes
            .iter()
            .filter(|node| match node.id {
                NodeId::Persisted(id) => self.dragging == Some(node.id) || self.moved.contains(&id),
                NodeId::Draft(_) => false,
            })
            .map(|node| (node.id, node.position))
            .collect();

        let mut nodes: Vec<VisualNode> = loaded
            .iter()
            .map(|l| {
                let id = NodeId::Persisted(l.item.id);
                let position = live
                    .get(&id)
                    .or_else(|| positions.get(&id))
                    .copied()
                    .unwrap_or_else(|| l.item.position());
                VisualNode::persisted(l, position)
            })
            .collect();
        nodes.extend(self.nodes.drain(..).filter(|node| node.id.is_draft()));
        self.nodes = nodes;

        self.moved.retain(|id| loaded.iter().any(|l| l.item.id == *id));
        if let Some(NodeId::Persisted(id)) = self.dragging {
            if !loaded.iter().any(|l| l.item.id == id) {
                self.dragging = None;
            }
        }

        log::info!("synced {} persisted items ({} drafts kept)", loaded.len(), self.drafts.len());
        self.loaded = loaded;
        self.synced = true;
        self.rebuild_edges();
        true
    }

    /// Persisted edges are recomputed; draft edges are kept while both ends
    /// exist and appended for drafts whose parent just appeared.
    fn rebuild_edges(&mut self) {
        let mut edges: Vec<VisualEdge> = self
            .persisted()
            .filter_map(|item| {
                let parent = item.parent_id?;
                (parent != item.id && self.persisted_item(parent).is_some())
                    .then(|| VisualEdge::between(NodeId::Persisted(parent), NodeId::Persisted(item.id)))
            })
            .collect();

        let kept: Vec<VisualEdge> = self
            .edges
            .iter()
            .filter(|edge| edge.touches_draft() && self.contains(edge.source) && self.contains(edge.target))
            .cloned()
            .collect();
        edges.extend(kept);

        for draft in &self.drafts {
            let id = NodeId::Draft(draft.id);
            if let Some(parent) = draft.parent_id {
                let present = edges.iter().any(|edge| edge.target == id);
                if !present && self.contains(parent) {
                    edges.push(VisualEdge::between(parent, id));
                }
            }
        }

        self.edges = edges;
    }

    // ========================
    // Dirty tracking
    // ========================

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.generation += 1;
    }

    /// Clear dirty once no unsaved delta remains
    pub fn settle(&mut self) {
        if self.drafts.is_empty() && self.moved.is_empty() && !self.saving {
            self.dirty = false;
        }
    }

    pub fn set_saving(&mut self, saving: bool) {
        self.saving = saving;
    }

    pub fn clear_moved(&mut self) {
        self.moved.clear();
    }

    // ========================
    // Gestures
    // ========================

    /// Apply a drag frame. Only the frame that ends a drag marks the store
    /// dirty, and only that frame returns `true`.
    pub fn move_node(&mut self, id: NodeId, position: Position, dragging: bool) -> bool {
        // A release with no drag in progress is ignored outright
        if !dragging && self.dragging != Some(id) {
            return false;
        }
        let Some(node) = self.nodes.iter_mut().find(|node| node.id == id) else {
            return false;
        };
        node.position = position;

        if dragging {
            self.dragging = Some(id);
            return false;
        }

        self.dragging = None;
        match id {
            NodeId::Persisted(item) => {
                self.moved.insert(item);
            }
            NodeId::Draft(draft) => {
                if let Some(draft) = find_by_id_mut(&mut self.drafts, draft) {
                    draft.set_position(position);
                }
            }
        }
        log::debug!("drag of {} ended at ({}, {})", id, position.x, position.y);
        self.mark_dirty();
        true
    }

    /// Lay out both partitions together and adopt the result
    pub fn auto_layout(&mut self) {
        let positions = {
            let items = self.chart_items();
            layout(&items, &self.config)
        };
        self.apply_layout(&positions);
        let persisted: Vec<ItemId> = self.persisted().map(|item| item.id).collect();
        self.moved.extend(persisted);
        self.mark_dirty();
    }

    /// Write computed positions into both partitions
    pub fn apply_layout(&mut self, positions: &HashMap<NodeId, Position>) {
        for node in &mut self.nodes {
            if let Some(position) = positions.get(&node.id) {
                node.position = *position;
            }
        }
        for draft in &mut self.drafts {
            if let Some(position) = positions.get(&NodeId::Draft(draft.id)) {
                draft.set_position(*position);
            }
        }
    }

    // ========================
    // Drafts
    // ========================

    pub fn next_draft_id(&mut self) -> DraftId {
        self.next_draft += 1;
        DraftId(self.next_draft)
    }

    pub fn insert_draft(&mut self, draft: DraftItem) {
        let id = NodeId::Draft(draft.id);
        self.nodes.push(VisualNode::draft(&draft));
        if let Some(parent) = draft.parent_id {
            if self.contains(parent) {
                self.edges.push(VisualEdge::between(parent, id));
            }
        }
        self.drafts.push(draft);
        self.mark_dirty();
    }

    /// Mutate one draft in place and refresh its node and its single edge
    pub fn update_draft<F>(&mut self, id: DraftId, apply: F) -> bool
    where
        F: FnOnce(&mut DraftItem),
    {
        let Some(draft) = find_by_id_mut(&mut self.drafts, id) else {
            return false;
        };
        let old_parent = draft.parent_id;
        apply(draft);
        let draft = draft.clone();

        let node_id = NodeId::Draft(id);
        if let Some(node) = self.nodes.iter_mut().find(|node| node.id == node_id) {
            node.data = VisualNode::draft_data(&draft);
            node.position = draft.position();
        }
        if old_parent != draft.parent_id {
            self.edges.retain(|edge| edge.target != node_id);
            if let Some(parent) = draft.parent_id {
                if self.contains(parent) {
                    self.edges.push(VisualEdge::between(parent, node_id));
                }
            }
        }
        self.mark_dirty();
        true
    }

    /// Recompute `level` for every draft below `root`
    pub fn cascade_draft_levels(&mut self, root: NodeId) {
        let mut pending = vec![root];
        let mut guard = 0usize;
        while let Some(parent) = pending.pop() {
            guard += 1;
            if guard > self.drafts.len() + 1 {
                break;
            }
            let Some(parent_level) = self.item(parent).map(|item| item.level()) else {
                continue;
            };
            for draft in self.drafts.iter_mut().filter(|d| d.parent_id == Some(parent)) {
                draft.level = parent_level + 1;
                pending.push(NodeId::Draft(draft.id));
            }
        }
        for node in &mut self.nodes {
            if let NodeId::Draft(id) = node.id {
                if let Some(draft) = self.drafts.iter().find(|d| d.id == id) {
                    node.data.level = draft.level;
                }
            }
        }
    }

    /// Remove a draft with its node and edges; its draft children become top-level
    pub fn remove_draft(&mut self, id: DraftId) -> Option<DraftItem> {
        let index = self.drafts.iter().position(|draft| draft.id == id)?;
        let removed = self.drafts.remove(index);
        let node_id = NodeId::Draft(id);

        self.nodes.retain(|node| node.id != node_id);
        self.edges.retain(|edge| !edge.touches(node_id));

        let orphans: Vec<DraftId> = self
            .drafts
            .iter()
            .filter(|draft| draft.parent_id == Some(node_id))
            .map(|draft| draft.id)
            .collect();
        for orphan in orphans {
            if let Some(draft) = find_by_id_mut(&mut self.drafts, orphan) {
                draft.parent_id = None;
                draft.level = 0;
            }
            self.cascade_draft_levels(NodeId::Draft(orphan));
        }

        self.settle();
        Some(removed)
    }

    /// Drop drafts that were persisted by a save
    pub fn remove_drafts(&mut self, ids: &[DraftId]) {
        self.drafts.retain(|draft| !ids.contains(&draft.id));
        self.nodes.retain(|node| match node.id {
            NodeId::Draft(id) => !ids.contains(&id),
            NodeId::Persisted(_) => true,
        });
        self.edges.retain(|edge| {
            ![edge.source, edge.target]
                .iter()
                .any(|end| end.as_draft().is_some_and(|id| ids.contains(&id)))
        });
    }

    /// Point remaining drafts at the persisted ids their draft parents became.
    /// Their edges reappear once the new items arrive through a sync.
    pub fn remap_draft_parents(&mut self, created: &HashMap<DraftId, ItemId>) {
        for draft in &mut self.drafts {
            if let Some(NodeId::Draft(parent)) = draft.parent_id {
                if let Some(new_id) = created.get(&parent) {
                    draft.parent_id = Some(NodeId::Persisted(*new_id));
                }
            }
        }
    }

    /// Forget every unsaved delta
    pub fn discard_changes(&mut self) {
        self.drafts.clear();
        self.nodes.retain(|node| !node.id.is_draft());
        self.edges.retain(|edge| !edge.touches_draft());
        self.moved.clear();
        self.dragging = None;

        let loaded = std::mem::take(&mut self.loaded);
        self.synced = false;
        self.sync_from_backend(loaded);

        self.dirty = false;
        self.generation += 1;
        log::info!("discarded unsaved changes");
    }
}
