//! Presentation Projection
//!
//! A pure snapshot of everything the canvas, toolbar, menu and properties
//! panel draw. Hosts render a `CanvasView`; they never read the store
//! directly.

use serde::Serialize;

use crate::controller::ChartDesigner;
use crate::domain::{ChartItem, DraftId, NodeId, Position};
use crate::menu::MenuAction;
use crate::save::{SaveStatus, ValidationIssue};
use crate::tree::{build_forest, flatten_forest, is_descendant};
use crate::visual::{EdgeStyle, NodeData};

/// Domain wording for one kind of hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainLabels {
    pub singular: String,
    pub plural: String,
    /// Noun for direct children, e.g. "direct reports"
    pub child_noun: String,
    /// Noun for the occupancy count
    pub holder_noun: String,
    pub icon: String,
}

impl DomainLabels {
    pub fn roles() -> Self {
        Self {
            singular: "Role".to_string(),
            plural: "Roles".to_string(),
            child_noun: "direct reports".to_string(),
            holder_noun: "holders".to_string(),
            icon: "👤".to_string(),
        }
    }

    pub fn categories() -> Self {
        Self {
            singular: "Category".to_string(),
            plural: "Categories".to_string(),
            child_noun: "subcategories".to_string(),
            holder_noun: "items".to_string(),
            icon: "📁".to_string(),
        }
    }
}

/// Per-node rendering hooks
pub trait NodePresenter: Send + Sync {
    fn labels(&self) -> &DomainLabels;

    fn icon(&self, data: &NodeData) -> String {
        if data.is_draft {
            "✏️".to_string()
        } else {
            self.labels().icon.clone()
        }
    }

    /// Secondary lines under the title
    fn content(&self, data: &NodeData) -> Vec<String> {
        let labels = self.labels();
        let mut lines = Vec::new();
        if let Some(children) = data.child_count {
            lines.push(format!("{} {}", children, labels.child_noun));
        }
        if let Some(holders) = data.holder_count {
            lines.push(format!("{} {}", holders, labels.holder_noun));
        }
        lines
    }

    fn color(&self, data: &NodeData) -> String;
}

const LEVEL_COLORS: [&str; 5] = ["#2563eb", "#7c3aed", "#0891b2", "#059669", "#d97706"];
const DRAFT_COLOR: &str = "#f59e0b";

#[derive(Debug, Clone)]
pub struct DefaultPresenter {
    labels: DomainLabels,
}

impl DefaultPresenter {
    pub fn new(labels: DomainLabels) -> Self {
        Self { labels }
    }
}

impl Default for DefaultPresenter {
    fn default() -> Self {
        Self::new(DomainLabels::roles())
    }
}

impl NodePresenter for DefaultPresenter {
    fn labels(&self) -> &DomainLabels {
        &self.labels
    }

    fn color(&self, data: &NodeData) -> String {
        if data.is_draft {
            return DRAFT_COLOR.to_string();
        }
        let index = usize::try_from(data.level).unwrap_or(0) % LEVEL_COLORS.len();
        LEVEL_COLORS[index].to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeBox {
    pub id: NodeId,
    /// Stable DOM key
    pub key: String,
    /// Top-left corner
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub title: String,
    pub lines: Vec<String>,
    pub icon: String,
    pub color: String,
    pub is_draft: bool,
    pub selected: bool,
    pub focused: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeLine {
    pub id: String,
    /// Bottom centre of the parent
    pub from: Position,
    /// Top centre of the child
    pub to: Position,
    pub dashed: bool,
    pub animated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    #[serde(skip)]
    pub action: MenuAction,
    pub label: String,
    pub destructive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuView {
    pub at: Position,
    pub entries: Vec<MenuEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParentOption {
    pub id: NodeId,
    /// Name indented by depth
    pub label: String,
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PanelView {
    Draft {
        id: DraftId,
        title: String,
        name: String,
        description: String,
        parent: Option<NodeId>,
        level: u32,
        parent_options: Vec<ParentOption>,
        issues: Vec<ValidationIssue>,
        can_delete: bool,
    },
    Persisted {
        id: NodeId,
        title: String,
        name: String,
        description: Option<String>,
        parent_name: Option<String>,
        level: u32,
        child_count: Option<u32>,
        holder_count: Option<u32>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolbarView {
    pub show_add_root: bool,
    pub show_auto_layout: bool,
    pub save_enabled: bool,
    pub discard_enabled: bool,
    pub status: String,
    pub fullscreen: bool,
}

/// Padded extent of everything drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Bounds {
    pub min_x: i32,
    pub min_y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanvasView {
    pub nodes: Vec<NodeBox>,
    pub edges: Vec<EdgeLine>,
    pub menu: Option<MenuView>,
    pub panel: Option<PanelView>,
    pub toolbar: ToolbarView,
    pub bounds: Bounds,
    pub empty_message: Option<String>,
}

const CANVAS_PADDING: i32 = 40;

pub fn status_label(status: SaveStatus) -> &'static str {
    match status {
        SaveStatus::Clean => "All changes saved",
        SaveStatus::Dirty => "Unsaved changes",
        SaveStatus::Saving => "Saving…",
        SaveStatus::DirtyWithError => "Save failed, retry",
    }
}

pub fn menu_label(action: MenuAction, labels: &DomainLabels) -> String {
    match action {
        MenuAction::AddRoot => format!("Add top-level {}", labels.singular.to_lowercase()),
        MenuAction::AutoLayout => "Auto layout".to_string(),
        MenuAction::Edit(_) => "Edit".to_string(),
        MenuAction::AddChild(_) => format!("Add child {}", labels.singular.to_lowercase()),
        MenuAction::Delete(_) => "Delete".to_string(),
        MenuAction::MakeTopLevel(_) => "Make top-level".to_string(),
    }
}

/// Candidate parents for a draft, pre-order with indentation. The draft and
/// its own descendants are left out.
pub fn parent_options(designer: &ChartDesigner, draft: DraftId) -> Vec<ParentOption> {
    let items = designer.store().chart_items();
    let own = NodeId::Draft(draft);
    let forest = build_forest(&items);
    flatten_forest(&forest)
        .into_iter()
        .filter(|(item, _)| {
            let id = item.node_id();
            id != own && !is_descendant(&items, own, id)
        })
        .map(|(item, depth)| ParentOption {
            id: item.node_id(),
            label: format!("{}{}", "  ".repeat(depth), display_name(item.name())),
            depth,
        })
        .collect()
}

fn display_name(name: &str) -> String {
    if name.trim().is_empty() {
        "(untitled)".to_string()
    } else {
        name.to_string()
    }
}

fn panel_view(designer: &ChartDesigner, presenter: &dyn NodePresenter) -> Option<PanelView> {
    let focus = designer.focus()?;
    let store = designer.store();
    let labels = presenter.labels();
    match store.item(focus)? {
        ChartItem::Draft(draft) => Some(PanelView::Draft {
            id: draft.id,
            title: format!("New {}", labels.singular.to_lowercase()),
            name: draft.name.clone(),
            description: draft.description.clone().unwrap_or_default(),
            parent: draft.parent_id,
            level: draft.level,
            parent_options: parent_options(designer, draft.id),
            issues: designer.validation_issues_for(draft.id).into_iter().cloned().collect(),
            can_delete: designer.capabilities().can_delete || designer.capabilities().can_create,
        }),
        ChartItem::Persisted(item) => {
            let data = store.node(focus).map(|node| &node.data);
            Some(PanelView::Persisted {
                id: focus,
                title: labels.singular.clone(),
                name: item.name.clone(),
                description: item.description.clone(),
                parent_name: item
                    .parent_id
                    .and_then(|parent| store.persisted_item(parent))
                    .map(|parent| parent.name.clone()),
                level: item.level,
                child_count: data.and_then(|d| d.child_count),
                holder_count: data.and_then(|d| d.holder_count),
            })
        }
    }
}

fn bounds(nodes: &[NodeBox]) -> Bounds {
    let Some(first) = nodes.first() else {
        return Bounds::default();
    };
    let (mut left, mut top) = (first.x, first.y);
    let (mut right, mut bottom) = (first.x + first.width, first.y + first.height);
    for node in &nodes[1..] {
        left = left.min(node.x);
        top = top.min(node.y);
        right = right.max(node.x + node.width);
        bottom = bottom.max(node.y + node.height);
    }
    Bounds {
        min_x: left - CANVAS_PADDING,
        min_y: top - CANVAS_PADDING,
        width: right - left + 2 * CANVAS_PADDING,
        height: bottom - top + 2 * CANVAS_PADDING,
    }
}

pub fn project(designer: &ChartDesigner, presenter: &dyn NodePresenter) -> CanvasView {
    let store = designer.store();
    let layout = designer.config().layout;
    let caps = designer.capabilities();
    let labels = presenter.labels();

    let nodes: Vec<NodeBox> = store
        .nodes()
        .iter()
        .map(|node| NodeBox {
            id: node.id,
            key: node.id.to_string(),
            x: node.position.x - layout.node_width / 2,
            y: node.position.y,
            width: layout.node_width,
            height: layout.node_height,
            title: display_name(&node.data.name),
            lines: presenter.content(&node.data),
            icon: presenter.icon(&node.data),
            color: presenter.color(&node.data),
            is_draft: node.data.is_draft,
            selected: designer.selection().contains(&node.id),
            focused: designer.focus() == Some(node.id),
        })
        .collect();

    let edges = store
        .edges()
        .iter()
        .filter_map(|edge| {
            let from = store.position_of(edge.source)?;
            let to = store.position_of(edge.target)?;
            let draft = edge.style == EdgeStyle::DashedAnimated;
            Some(EdgeLine {
                id: edge.id.clone(),
                from: from.offset(0, layout.node_height),
                to,
                dashed: draft,
                animated: draft,
            })
        })
        .collect();

    let menu = designer.context_menu().map(|menu| MenuView {
        at: menu.at,
        entries: menu
            .actions
            .iter()
            .map(|action| MenuEntry {
                action: *action,
                label: menu_label(*action, labels),
                destructive: matches!(action, MenuAction::Delete(_)),
            })
            .collect(),
    });

    let status = designer.save_status();
    let toolbar = ToolbarView {
        show_add_root: caps.can_create,
        show_auto_layout: caps.can_edit,
        save_enabled: matches!(status, SaveStatus::Dirty | SaveStatus::DirtyWithError),
        discard_enabled: matches!(status, SaveStatus::Dirty | SaveStatus::DirtyWithError),
        status: status_label(status).to_string(),
        fullscreen: designer.is_fullscreen(),
    };

    let empty_message = nodes
        .is_empty()
        .then(|| format!("No {} yet", labels.plural.to_lowercase()));

    CanvasView {
        bounds: bounds(&nodes),
        nodes,
        edges,
        menu,
        panel: panel_view(designer, presenter),
        toolbar,
        empty_message,
    }
}
