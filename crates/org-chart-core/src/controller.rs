//! Interaction Controller
//!
//! Maps canvas gestures onto store mutations and owns selection, the
//! properties-panel focus and fullscreen. Every mutation path goes through
//! `ChartDesigner` so dirty timing and id-namespace rules live in one place.

use crate::backend::{HierarchyBackend, LoadFilter, ParentUpdate};
use crate::capabilities::{Capabilities, Capability};
use crate::config::DesignerConfig;
use crate::domain::{DraftId, DraftItem, ItemId, LoadedItem, NodeId, Position};
use crate::error::ChartError;
use crate::menu::ContextMenu;
use crate::save::SaveTracker;
use crate::store::GraphStore;
use crate::tree::is_descendant;

/// What a reparent gesture turned into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReparentOutcome {
    /// A draft was updated in place
    Local,
    /// A persisted item must be reparented by the backend
    Remote(ParentUpdate),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Local(DraftItem),
    Remote(ItemId),
}

/// Field edits from the properties panel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub parent: Option<Option<NodeId>>,
    /// Ignored when `parent` is also set; the level then follows the parent
    pub level: Option<u32>,
}

impl DraftPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), ..Default::default() }
    }

    pub fn parent(parent: Option<NodeId>) -> Self {
        Self { parent: Some(parent), ..Default::default() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other,
}

#[derive(Debug, Clone, Default)]
pub struct ChartDesigner {
    pub(crate) store: GraphStore,
    pub(crate) config: DesignerConfig,
    pub(crate) capabilities: Capabilities,
    pub(crate) selection: Vec<NodeId>,
    pub(crate) focus: Option<NodeId>,
    pub(crate) fullscreen: bool,
    pub(crate) context_menu: Option<ContextMenu>,
    pub(crate) save: SaveTracker,
}

impl ChartDesigner {
    pub fn new(config: DesignerConfig, capabilities: Capabilities) -> Self {
        Self {
            store: GraphStore::new(config.layout),
            config,
            capabilities,
            ..Default::default()
        }
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn config(&self) -> &DesignerConfig {
        &self.config
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn set_capabilities(&mut self, capabilities: Capabilities) {
        self.capabilities = capabilities;
        if let Some(focus) = self.focus {
            if !self.may_focus(focus) {
                self.focus = None;
            }
        }
    }

    pub fn selection(&self) -> &[NodeId] {
        &self.selection
    }

    /// Item open in the properties panel
    pub fn focus(&self) -> Option<NodeId> {
        self.focus
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn context_menu(&self) -> Option<&ContextMenu> {
        self.context_menu.as_ref()
    }

    pub(crate) fn require(&self, capability: Capability) -> Result<(), ChartError> {
        if self.capabilities.allows(capability) {
            Ok(())
        } else {
            log::warn!("refused gesture, missing {} capability", capability);
            Err(ChartError::NotPermitted(capability))
        }
    }

    /// Drafts belong to whoever may create them
    pub(crate) fn may_edit_draft(&self) -> bool {
        self.capabilities.can_create || self.capabilities.can_edit
    }

    fn may_focus(&self, id: NodeId) -> bool {
        match id {
            NodeId::Persisted(_) => self.capabilities.can_edit,
            NodeId::Draft(_) => self.may_edit_draft(),
        }
    }

    fn forget(&mut self, id: NodeId) {
        self.selection.retain(|selected| *selected != id);
        if self.focus == Some(id) {
            self.focus = None;
        }
    }

    // ========================
    // Backend sync
    // ========================

    pub fn sync_from_backend(&mut self, loaded: Vec<LoadedItem>) -> bool {
        let changed = self.store.sync_from_backend(loaded);
        if changed {
            let store = &self.store;
            self.selection.retain(|id| store.contains(*id));
            if self.focus.is_some_and(|id| !store.contains(id)) {
                self.focus = None;
            }
        }
        changed
    }

    pub async fn reload<B>(&mut self, backend: &B, filter: &LoadFilter) -> Result<bool, ChartError>
    where
        B: HierarchyBackend + ?Sized,
    {
        let loaded = backend.load(filter).await?;
        Ok(self.sync_from_backend(loaded))
    }

    // ========================
    // Gestures
    // ========================

    /// Create a draft at the top level or under `parent` and focus it
    pub fn add_node(&mut self, parent: Option<NodeId>) -> Result<DraftId, ChartError> {
        self.require(Capability::Create)?;
        let layout = self.config.layout;

        let (level, mut position) = match parent {
            Some(parent) => {
                let item = self.store.item(parent).ok_or(ChartError::UnknownNode(parent))?;
                let level = item.level() + 1;
                let anchor = self.store.position_of(parent).unwrap_or_else(|| item.position());
                let siblings = i32::try_from(self.store.child_count(parent)).unwrap_or(i32::MAX / 2);
                (level, anchor.offset(siblings.saturating_mul(layout.column_width()), layout.band_height()))
            }
            None => {
                let nodes = self.store.nodes();
                let position = match nodes.iter().map(|n| n.position.x).max() {
                    Some(right) => {
                        let top = nodes.iter().map(|n| n.position.y).min().unwrap_or(0);
                        Position::new(right + layout.column_width(), top)
                    }
                    None => Position::ORIGIN,
                };
                (0, position)
            }
        };

        for _ in 0..=self.store.nodes().len() {
            if !self.store.nodes().iter().any(|node| node.position == position) {
                break;
            }
            position = position.offset(self.config.draft_offset, self.config.draft_offset);
        }

        let id = self.store.next_draft_id();
        self.store.insert_draft(DraftItem::new(id, parent, level, position));
        self.selection = vec![NodeId::Draft(id)];
        self.focus = Some(NodeId::Draft(id));
        log::debug!("added draft {} under {:?}", id, parent);
        Ok(id)
    }

    /// Exactly one selected node opens the properties panel
    pub fn select(&mut self, ids: &[NodeId]) {
        let selection: Vec<NodeId> = ids.iter().copied().filter(|id| self.store.contains(*id)).collect();
        self.selection = selection;
        match self.selection.as_slice() {
            [only] => {
                let only = *only;
                if self.focus == Some(only) {
                    return;
                }
                self.focus = self.may_focus(only).then_some(only);
            }
            _ => self.focus = None,
        }
    }

    pub fn clear_selection(&mut self) {
        self.select(&[]);
    }

    /// Forward a drag frame; returns `true` on the frame that ends a drag
    pub fn drag_node(&mut self, id: NodeId, position: Position, dragging: bool) -> bool {
        if !self.capabilities.can_edit && !(id.is_draft() && self.may_edit_draft()) {
            return false;
        }
        self.store.move_node(id, position, dragging)
    }

    /// Edge drawn from `source` to `target`: target's parent becomes source
    pub fn connect(&mut self, source: NodeId, target: NodeId) -> Result<ReparentOutcome, ChartError> {
        self.require(Capability::Edit)?;
        if source == target {
            return Err(ChartError::SelfParent);
        }
        self.reparent(target, Some(source))
    }

    pub async fn connect_with<B>(
        &mut self,
        backend: &B,
        source: NodeId,
        target: NodeId,
    ) -> Result<ReparentOutcome, ChartError>
    where
        B: HierarchyBackend + ?Sized,
    {
        let outcome = self.connect(source, target)?;
        if let ReparentOutcome::Remote(update) = &outcome {
            backend.update_parent(update).await?;
        }
        Ok(outcome)
    }

    /// Detach a node from its parent
    pub fn make_top_level(&mut self, id: NodeId) -> Result<ReparentOutcome, ChartError> {
        self.require(Capability::Edit)?;
        self.reparent(id, None)
    }

    pub async fn make_top_level_with<B>(&mut self, backend: &B, id: NodeId) -> Result<ReparentOutcome, ChartError>
    where
        B: HierarchyBackend + ?Sized,
    {
        let outcome = self.make_top_level(id)?;
        if let ReparentOutcome::Remote(update) = &outcome {
            backend.update_parent(update).await?;
        }
        Ok(outcome)
    }

    fn reparent(&mut self, target: NodeId, new_parent: Option<NodeId>) -> Result<ReparentOutcome, ChartError> {
        if !self.store.contains(target) {
            return Err(ChartError::UnknownNode(target));
        }
        if let Some(parent) = new_parent {
            if parent == target {
                return Err(ChartError::SelfParent);
            }
            if !self.store.contains(parent) {
                return Err(ChartError::UnknownNode(parent));
            }
            if let (NodeId::Persisted(id), NodeId::Draft(_)) = (target, parent) {
                return Err(ChartError::DraftParentForPersisted(id));
            }
            if is_descendant(&self.store.chart_items(), target, parent) {
                return Err(ChartError::WouldCycle { parent, child: target });
            }
        }

        match target {
            NodeId::Draft(id) => {
                let level = match new_parent {
                    Some(parent) => self.store.item(parent).map_or(0, |item| item.level() + 1),
                    None => 0,
                };
                self.store.update_draft(id, |draft| {
                    draft.parent_id = new_parent;
                    draft.level = level;
                });
                self.store.cascade_draft_levels(target);
                log::debug!("reparented draft {} under {:?}", id, new_parent);
                Ok(ReparentOutcome::Local)
            }
            NodeId::Persisted(id) => {
                let new_parent_id = new_parent.and_then(|parent| parent.as_persisted());
                log::debug!("delegating reparent of {} to backend", id);
                Ok(ReparentOutcome::Remote(ParentUpdate { id, new_parent_id }))
            }
        }
    }

    /// Apply properties-panel edits to one draft
    pub fn edit_draft(&mut self, id: DraftId, patch: DraftPatch) -> Result<(), ChartError> {
        if !self.may_edit_draft() {
            return Err(ChartError::NotPermitted(Capability::Edit));
        }
        if self.store.draft(id).is_none() {
            return Err(ChartError::UnknownNode(NodeId::Draft(id)));
        }

        if let Some(parent) = patch.parent {
            let current = self.store.draft(id).and_then(|draft| draft.parent_id);
            if current != parent || patch.level.is_some() {
                self.reparent(NodeId::Draft(id), parent)?;
            }
        } else if let Some(level) = patch.level {
            self.store.update_draft(id, |draft| draft.level = level);
            self.store.cascade_draft_levels(NodeId::Draft(id));
        }

        let DraftPatch { name, description, .. } = patch;
        if name.is_some() || description.is_some() {
            self.store.update_draft(id, |draft| {
                if let Some(name) = name {
                    draft.name = name;
                }
                if let Some(description) = description {
                    draft.description = description.filter(|text| !text.trim().is_empty());
                }
            });
        }
        self.save.forget_draft(id);
        Ok(())
    }

    /// Panel entry point; persisted items are read-only there
    pub fn edit_node(&mut self, id: NodeId, patch: DraftPatch) -> Result<(), ChartError> {
        match id {
            NodeId::Draft(draft) => self.edit_draft(draft, patch),
            NodeId::Persisted(_) => Err(ChartError::NotADraft(id)),
        }
    }

    pub fn delete_draft(&mut self, id: DraftId) -> Result<DraftItem, ChartError> {
        if !(self.capabilities.can_delete || self.capabilities.can_create) {
            return Err(ChartError::NotPermitted(Capability::Delete));
        }
        let removed = self
            .store
            .remove_draft(id)
            .ok_or(ChartError::UnknownNode(NodeId::Draft(id)))?;
        self.forget(NodeId::Draft(id));
        self.save.forget_draft(id);
        Ok(removed)
    }

    /// Drafts are removed locally; persisted items are handed to the backend
    pub fn delete_node(&mut self, id: NodeId) -> Result<DeleteOutcome, ChartError> {
        match id {
            NodeId::Draft(draft) => self.delete_draft(draft).map(DeleteOutcome::Local),
            NodeId::Persisted(item) => {
                self.require(Capability::Delete)?;
                if self.store.persisted_item(item).is_none() {
                    return Err(ChartError::UnknownNode(id));
                }
                Ok(DeleteOutcome::Remote(item))
            }
        }
    }

    pub async fn delete_with<B>(&mut self, backend: &B, id: NodeId) -> Result<DeleteOutcome, ChartError>
    where
        B: HierarchyBackend + ?Sized,
    {
        let outcome = self.delete_node(id)?;
        if let DeleteOutcome::Remote(item) = &outcome {
            backend.delete_item(*item).await?;
            self.forget(id);
        }
        Ok(outcome)
    }

    pub fn auto_layout(&mut self) -> Result<(), ChartError> {
        self.require(Capability::Edit)?;
        self.store.auto_layout();
        Ok(())
    }

    pub fn discard_changes(&mut self) {
        self.store.discard_changes();
        let store = &self.store;
        self.selection.retain(|id| store.contains(*id));
        if self.focus.is_some_and(|id| !store.contains(id)) {
            self.focus = None;
        }
        self.save.clear_error();
    }

    // ========================
    // Presentation state
    // ========================

    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen = !self.fullscreen;
    }

    /// Escape closes an open context menu first, then leaves fullscreen
    pub fn handle_key(&mut self, key: Key) -> bool {
        match key {
            Key::Escape if self.context_menu.is_some() => {
                self.context_menu = None;
                true
            }
            Key::Escape if self.fullscreen => {
                self.fullscreen = false;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HierarchyItem;
    use crate::test_support::{loaded, p, Call, RecordingBackend};

    fn designer(caps: Capabilities) -> ChartDesigner {
        let mut designer = ChartDesigner::new(DesignerConfig::default(), caps);
        designer.sync_from_backend(vec![
            loaded(1, None, 0, 0),
            loaded(2, Some(1), -130, 160),
            loaded(3, Some(1), 130, 160),
        ]);
        designer
    }

    #[test]
    fn test_add_root_node_focuses_draft() {
        let mut designer = designer(Capabilities::all());
        let id = designer.add_node(None).unwrap();
        let draft = designer.store().draft(id).unwrap();
        assert_eq!(draft.level, 0);
        assert_eq!(draft.parent_id, None);
        assert_eq!(designer.focus(), Some(NodeId::Draft(id)));
        assert!(designer.store().is_dirty());
        // right of the right-most node
        assert!(draft.position_x > 130);
    }

    #[test]
    fn test_add_child_node_below_parent() {
        let mut designer = designer(Capabilities::all());
        let id = designer.add_node(Some(p(2))).unwrap();
        let draft = designer.store().draft(id).unwrap();
        assert_eq!(draft.level, 2);
        assert_eq!(draft.position_y, 320);
        assert_eq!(designer.store().edges().iter().filter(|e| e.target == NodeId::Draft(id)).count(), 1);
    }

    #[test]
    fn test_add_node_avoids_exact_overlap() {
        let mut designer = designer(Capabilities::all());
        let first = designer.add_node(Some(p(2))).unwrap();
        designer.delete_draft(first).unwrap();
        let a = designer.add_node(Some(p(3))).unwrap();
        let b = designer.add_node(Some(p(3))).unwrap();
        let pa = designer.store().draft(a).unwrap().position();
        let pb = designer.store().draft(b).unwrap().position();
        assert_ne!(pa, pb);
    }

    #[test]
    fn test_add_node_requires_create() {
        let mut designer = designer(Capabilities::read_only());
        assert_eq!(designer.add_node(None), Err(ChartError::NotPermitted(Capability::Create)));
        assert!(!designer.store().is_dirty());
    }

    #[test]
    fn test_add_node_under_unknown_parent() {
        let mut designer = designer(Capabilities::all());
        assert_eq!(designer.add_node(Some(p(42))), Err(ChartError::UnknownNode(p(42))));
    }

    #[test]
    fn test_select_single_focuses() {
        let mut designer = designer(Capabilities::all());
        designer.select(&[p(2)]);
        assert_eq!(designer.focus(), Some(p(2)));
        designer.select(&[p(2), p(3)]);
        assert_eq!(designer.focus(), None);
        designer.select(&[]);
        assert_eq!(designer.focus(), None);
    }

    #[test]
    fn test_select_without_edit_rights_keeps_panel_closed() {
        let mut designer = designer(Capabilities::read_only());
        designer.select(&[p(2)]);
        assert_eq!(designer.selection(), &[p(2)]);
        assert_eq!(designer.focus(), None);
    }

    #[test]
    fn test_reselecting_focus_is_a_no_op() {
        let mut designer = designer(Capabilities::all());
        let id = designer.add_node(None).unwrap();
        designer.select(&[NodeId::Draft(id)]);
        assert_eq!(designer.focus(), Some(NodeId::Draft(id)));
    }

    #[test]
    fn test_drag_marks_dirty_exactly_once() {
        let mut designer = designer(Capabilities::all());
        let mut ends = 0;
        for step in 0..50 {
            if designer.drag_node(p(2), Position::new(-130 + step, 160), true) {
                ends += 1;
            }
        }
        assert!(!designer.store().is_dirty());
        if designer.drag_node(p(2), Position::new(-60, 160), false) {
            ends += 1;
        }
        assert_eq!(ends, 1);
        assert_eq!(designer.store().generation(), 1);
    }

    #[test]
    fn test_drag_requires_edit_for_persisted() {
        let mut designer = designer(Capabilities::read_only());
        designer.drag_node(p(2), Position::new(1, 1), true);
        assert!(!designer.drag_node(p(2), Position::new(2, 2), false));
        assert_eq!(designer.store().position_of(p(2)), Some(Position::new(-130, 160)));
    }

    #[tokio::test]
    async fn test_connect_to_draft_is_local() {
        let backend = RecordingBackend::default();
        let mut designer = designer(Capabilities::all());
        let draft = designer.add_node(None).unwrap();

        let outcome = designer.connect_with(&backend, p(3), NodeId::Draft(draft)).await.unwrap();
        assert_eq!(outcome, ReparentOutcome::Local);
        assert!(backend.calls().is_empty());

        let draft_item = designer.store().draft(draft).unwrap();
        assert_eq!(draft_item.parent_id, Some(p(3)));
        assert_eq!(draft_item.level, 2);
        let edges: Vec<_> = designer.store().edges().iter().filter(|e| e.target == NodeId::Draft(draft)).collect();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].source, p(3));
    }

    #[tokio::test]
    async fn test_connect_to_persisted_calls_backend_once() {
        let backend = RecordingBackend::default();
        let mut designer = designer(Capabilities::all());

        let outcome = designer.connect_with(&backend, p(2), p(3)).await.unwrap();
        let expected = ParentUpdate { id: ItemId(3), new_parent_id: Some(ItemId(2)) };
        assert_eq!(outcome, ReparentOutcome::Remote(expected));
        assert_eq!(backend.calls(), vec![Call::UpdateParent(expected)]);
        // local state untouched until the next sync
        assert_eq!(designer.store().persisted_item(ItemId(3)).unwrap().parent_id, Some(ItemId(1)));
    }

    #[test]
    fn test_connect_rejections() {
        let mut designer = designer(Capabilities::all());
        let draft = designer.add_node(Some(p(2))).unwrap();

        assert_eq!(designer.connect(p(2), p(2)), Err(ChartError::SelfParent));
        assert_eq!(
            designer.connect(p(2), p(1)),
            Err(ChartError::WouldCycle { parent: p(2), child: p(1) })
        );
        assert_eq!(
            designer.connect(NodeId::Draft(draft), p(3)),
            Err(ChartError::DraftParentForPersisted(ItemId(3)))
        );
        assert_eq!(designer.connect(p(9), p(3)), Err(ChartError::UnknownNode(p(9))));
    }

    #[test]
    fn test_connect_requires_edit() {
        let mut designer = designer(Capabilities { can_create: true, ..Default::default() });
        assert_eq!(designer.connect(p(2), p(3)), Err(ChartError::NotPermitted(Capability::Edit)));
    }

    #[test]
    fn test_edit_draft_fields_and_parent() {
        let mut designer = designer(Capabilities::all());
        let id = designer.add_node(None).unwrap();

        designer
            .edit_draft(
                id,
                DraftPatch {
                    name: Some("Platform Lead".to_string()),
                    description: Some(Some("Owns infra".to_string())),
                    parent: Some(Some(p(3))),
                    level: None,
                },
            )
            .unwrap();

        let draft = designer.store().draft(id).unwrap();
        assert_eq!(draft.name, "Platform Lead");
        assert_eq!(draft.description.as_deref(), Some("Owns infra"));
        assert_eq!(draft.parent_id, Some(p(3)));
        assert_eq!(draft.level, 2);
        let node = designer.store().node(NodeId::Draft(id)).unwrap();
        assert_eq!(node.data.name, "Platform Lead");

        designer.edit_draft(id, DraftPatch::parent(None)).unwrap();
        let draft = designer.store().draft(id).unwrap();
        assert_eq!(draft.level, 0);
        assert!(designer.store().edges().iter().all(|e| e.target != NodeId::Draft(id)));
    }

    #[test]
    fn test_edit_draft_cascades_levels_to_draft_children() {
        let mut designer = designer(Capabilities::all());
        let parent = designer.add_node(None).unwrap();
        let child = designer.add_node(Some(NodeId::Draft(parent))).unwrap();
        assert_eq!(designer.store().draft(child).unwrap().level, 1);

        designer.edit_draft(parent, DraftPatch::parent(Some(p(2)))).unwrap();
        assert_eq!(designer.store().draft(parent).unwrap().level, 2);
        assert_eq!(designer.store().draft(child).unwrap().level, 3);
    }

    #[test]
    fn test_edit_draft_rejects_cycle_between_drafts() {
        let mut designer = designer(Capabilities::all());
        let parent = designer.add_node(None).unwrap();
        let child = designer.add_node(Some(NodeId::Draft(parent))).unwrap();
        let result = designer.edit_draft(parent, DraftPatch::parent(Some(NodeId::Draft(child))));
        assert_eq!(
            result,
            Err(ChartError::WouldCycle { parent: NodeId::Draft(child), child: NodeId::Draft(parent) })
        );
    }

    #[test]
    fn test_edit_node_refuses_persisted() {
        let mut designer = designer(Capabilities::all());
        assert_eq!(designer.edit_node(p(2), DraftPatch::name("X")), Err(ChartError::NotADraft(p(2))));
    }

    #[test]
    fn test_delete_draft_closes_panel() {
        let mut designer = designer(Capabilities::all());
        let id = designer.add_node(Some(p(1))).unwrap();
        assert_eq!(designer.focus(), Some(NodeId::Draft(id)));

        let outcome = designer.delete_node(NodeId::Draft(id)).unwrap();
        assert!(matches!(outcome, DeleteOutcome::Local(ref d) if d.id == id));
        assert_eq!(designer.focus(), None);
        assert!(designer.selection().is_empty());
        assert!(designer.store().edges().iter().all(|e| !e.touches_draft()));
        assert!(!designer.store().is_dirty());
    }

    #[tokio::test]
    async fn test_delete_persisted_is_delegated() {
        let backend = RecordingBackend::default();
        let mut designer = designer(Capabilities::all());
        let outcome = designer.delete_with(&backend, p(3)).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Remote(ItemId(3)));
        assert_eq!(backend.calls(), vec![Call::Delete(ItemId(3))]);
    }

    #[test]
    fn test_delete_persisted_requires_delete() {
        let mut designer = designer(Capabilities { can_edit: true, can_create: true, can_delete: false });
        assert_eq!(designer.delete_node(p(3)), Err(ChartError::NotPermitted(Capability::Delete)));
    }

    #[tokio::test]
    async fn test_make_top_level_persisted() {
        let backend = RecordingBackend::default();
        let mut designer = designer(Capabilities::all());
        designer.make_top_level_with(&backend, p(2)).await.unwrap();
        assert_eq!(
            backend.calls(),
            vec![Call::UpdateParent(ParentUpdate { id: ItemId(2), new_parent_id: None })]
        );
    }

    #[test]
    fn test_auto_layout_twice_is_stable() {
        let mut designer = designer(Capabilities::all());
        designer.add_node(Some(p(2))).unwrap();
        designer.auto_layout().unwrap();
        let first: Vec<_> = designer.store().nodes().iter().map(|n| n.position).collect();
        designer.auto_layout().unwrap();
        let second: Vec<_> = designer.store().nodes().iter().map(|n| n.position).collect();
        assert_eq!(first, second);
        assert!(designer.store().is_dirty());
    }

    #[test]
    fn test_escape_leaves_fullscreen() {
        let mut designer = designer(Capabilities::all());
        assert!(!designer.handle_key(Key::Escape));
        designer.toggle_fullscreen();
        assert!(designer.is_fullscreen());
        assert!(!designer.handle_key(Key::Other));
        assert!(designer.handle_key(Key::Escape));
        assert!(!designer.is_fullscreen());
    }

    #[test]
    fn test_sync_prunes_selection_of_vanished_items() {
        let mut designer = designer(Capabilities::all());
        designer.select(&[p(3)]);
        designer.sync_from_backend(vec![loaded(1, None, 0, 0), loaded(2, Some(1), -130, 160)]);
        assert!(designer.selection().is_empty());
        assert_eq!(designer.focus(), None);
    }

    #[tokio::test]
    async fn test_reload_syncs_from_backend() {
        let backend = RecordingBackend::with_items(vec![HierarchyItem::new(7, "Board")]);
        let mut designer = ChartDesigner::new(DesignerConfig::default(), Capabilities::all());
        assert!(designer.reload(&backend, &LoadFilter::default()).await.unwrap());
        assert!(designer.store().contains(p(7)));
        assert!(!designer.reload(&backend, &LoadFilter::default()).await.unwrap());
    }
}
