//! Context Menu
//!
//! Right-click menus for the canvas and for nodes. Actions the current
//! capabilities withhold are never listed.

use crate::capabilities::Capability;
use crate::controller::{ChartDesigner, DeleteOutcome, ReparentOutcome};
use crate::domain::{DraftId, NodeId, Position};
use crate::error::ChartError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTarget {
    Canvas,
    Node(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    AddRoot,
    AutoLayout,
    Edit(NodeId),
    AddChild(NodeId),
    Delete(NodeId),
    MakeTopLevel(NodeId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextMenu {
    pub target: MenuTarget,
    /// Screen anchor of the right-click
    pub at: Position,
    pub actions: Vec<MenuAction>,
}

/// What activating a menu entry did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEffect {
    Added(DraftId),
    LaidOut,
    Focused(Option<NodeId>),
    Deleted(DeleteOutcome),
    Reparented(ReparentOutcome),
}

impl ChartDesigner {
    pub fn menu_actions(&self, target: MenuTarget) -> Vec<MenuAction> {
        let caps = self.capabilities;
        let mut actions = Vec::new();
        match target {
            MenuTarget::Canvas => {
                if caps.can_create {
                    actions.push(MenuAction::AddRoot);
                }
                if caps.can_edit {
                    actions.push(MenuAction::AutoLayout);
                }
            }
            MenuTarget::Node(id) => {
                let Some(item) = self.store.item(id) else {
                    return actions;
                };
                let draft = id.is_draft();
                if caps.can_edit || (draft && caps.can_create) {
                    actions.push(MenuAction::Edit(id));
                }
                if caps.can_create {
                    actions.push(MenuAction::AddChild(id));
                }
                if caps.can_delete || (draft && caps.can_create) {
                    actions.push(MenuAction::Delete(id));
                }
                if caps.can_edit && item.parent().is_some() {
                    actions.push(MenuAction::MakeTopLevel(id));
                }
            }
        }
        actions
    }

    /// Open a menu; returns `false` when nothing would be offered
    pub fn open_context_menu(&mut self, target: MenuTarget, at: Position) -> bool {
        let actions = self.menu_actions(target);
        if actions.is_empty() {
            self.context_menu = None;
            return false;
        }
        if let MenuTarget::Node(id) = target {
            if !self.selection.contains(&id) {
                self.select(&[id]);
            }
        }
        self.context_menu = Some(ContextMenu { target, at, actions });
        true
    }

    pub fn close_context_menu(&mut self) {
        self.context_menu = None;
    }

    /// Close the menu and run the chosen operation
    pub fn activate_menu(&mut self, action: MenuAction) -> Result<MenuEffect, ChartError> {
        self.context_menu = None;
        match action {
            MenuAction::AddRoot => self.add_node(None).map(MenuEffect::Added),
            MenuAction::AddChild(parent) => self.add_node(Some(parent)).map(MenuEffect::Added),
            MenuAction::AutoLayout => self.auto_layout().map(|()| MenuEffect::LaidOut),
            MenuAction::Edit(id) => {
                if !self.store.contains(id) {
                    return Err(ChartError::UnknownNode(id));
                }
                if id.is_draft() {
                    if !self.may_edit_draft() {
                        return Err(ChartError::NotPermitted(Capability::Edit));
                    }
                } else {
                    self.require(Capability::Edit)?;
                }
                self.select(&[id]);
                Ok(MenuEffect::Focused(self.focus))
            }
            MenuAction::Delete(id) => self.delete_node(id).map(MenuEffect::Deleted),
            MenuAction::MakeTopLevel(id) => self.make_top_level(id).map(MenuEffect::Reparented),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::Capabilities;
    use crate::config::DesignerConfig;
    use crate::controller::Key;
    use crate::domain::ItemId;
    use crate::test_support::{loaded, p};

    fn designer(caps: Capabilities) -> ChartDesigner {
        let mut designer = ChartDesigner::new(DesignerConfig::default(), caps);
        designer.sync_from_backend(vec![loaded(1, None, 0, 0), loaded(2, Some(1), 0, 160)]);
        designer
    }

    #[test]
    fn test_canvas_menu_by_capability() {
        let full = designer(Capabilities::all());
        assert_eq!(full.menu_actions(MenuTarget::Canvas), vec![MenuAction::AddRoot, MenuAction::AutoLayout]);

        let create_only = designer(Capabilities { can_create: true, ..Default::default() });
        assert_eq!(create_only.menu_actions(MenuTarget::Canvas), vec![MenuAction::AddRoot]);
    }

    #[test]
    fn test_node_menu_offers_make_top_level_only_with_parent() {
        let designer = designer(Capabilities::all());
        let root = designer.menu_actions(MenuTarget::Node(p(1)));
        assert!(!root.contains(&MenuAction::MakeTopLevel(p(1))));
        let child = designer.menu_actions(MenuTarget::Node(p(2)));
        assert_eq!(
            child,
            vec![
                MenuAction::Edit(p(2)),
                MenuAction::AddChild(p(2)),
                MenuAction::Delete(p(2)),
                MenuAction::MakeTopLevel(p(2)),
            ]
        );
    }

    #[test]
    fn test_draft_menu_with_create_only() {
        let mut designer = designer(Capabilities { can_create: true, ..Default::default() });
        let id = NodeId::Draft(designer.add_node(None).unwrap());
        assert_eq!(
            designer.menu_actions(MenuTarget::Node(id)),
            vec![MenuAction::Edit(id), MenuAction::AddChild(id), MenuAction::Delete(id)]
        );
        // persisted nodes only get add-child
        assert_eq!(designer.menu_actions(MenuTarget::Node(p(2))), vec![MenuAction::AddChild(p(2))]);
    }

    #[test]
    fn test_read_only_never_opens_menu() {
        let mut designer = designer(Capabilities::read_only());
        assert!(!designer.open_context_menu(MenuTarget::Canvas, Position::new(10, 10)));
        assert!(designer.context_menu().is_none());
    }

    #[test]
    fn test_activate_closes_menu_and_runs_operation() {
        let mut designer = designer(Capabilities::all());
        assert!(designer.open_context_menu(MenuTarget::Node(p(2)), Position::new(5, 5)));
        assert_eq!(designer.selection(), &[p(2)]);

        let effect = designer.activate_menu(MenuAction::AddChild(p(2))).unwrap();
        let MenuEffect::Added(draft) = effect else {
            panic!("expected a draft, got {:?}", effect);
        };
        assert!(designer.context_menu().is_none());
        assert_eq!(designer.store().draft(draft).unwrap().parent_id, Some(p(2)));
    }

    #[test]
    fn test_activate_make_top_level_is_remote_for_persisted() {
        let mut designer = designer(Capabilities::all());
        let effect = designer.activate_menu(MenuAction::MakeTopLevel(p(2))).unwrap();
        match effect {
            MenuEffect::Reparented(ReparentOutcome::Remote(update)) => {
                assert_eq!(update.id, ItemId(2));
                assert_eq!(update.new_parent_id, None);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_activate_edit_focuses() {
        let mut designer = designer(Capabilities::all());
        let effect = designer.activate_menu(MenuAction::Edit(p(1))).unwrap();
        assert_eq!(effect, MenuEffect::Focused(Some(p(1))));
        assert_eq!(designer.focus(), Some(p(1)));
    }

    #[test]
    fn test_escape_closes_menu_before_fullscreen() {
        let mut designer = designer(Capabilities::all());
        designer.toggle_fullscreen();
        designer.open_context_menu(MenuTarget::Canvas, Position::ORIGIN);
        assert!(designer.handle_key(Key::Escape));
        assert!(designer.context_menu().is_none());
        assert!(designer.is_fullscreen());
        assert!(designer.handle_key(Key::Escape));
        assert!(!designer.is_fullscreen());
    }
}
