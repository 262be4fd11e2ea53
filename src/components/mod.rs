//! UI Components
//!
//! Reusable Leptos components.

mod chart_canvas;
mod chart_node;
mod chart_toolbar;
mod context_menu;
mod delete_confirm_button;
mod notice_bar;
mod properties_panel;

pub use chart_canvas::ChartCanvas;
pub use chart_node::ChartNode;
pub use chart_toolbar::ChartToolbar;
pub use context_menu::ContextMenuView;
pub use delete_confirm_button::DeleteConfirmButton;
pub use notice_bar::NoticeBar;
pub use properties_panel::PropertiesPanel;
