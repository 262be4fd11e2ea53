//! Frontend Models
//!
//! Host-supplied settings and transient UI notices.

use org_chart_core::{Capabilities, DesignerConfig, DomainLabels};
use serde::{Deserialize, Serialize};

/// Which kind of hierarchy the designer is editing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DomainKind {
    #[default]
    Roles,
    Categories,
}

impl DomainKind {
    pub fn labels(&self) -> DomainLabels {
        match self {
            DomainKind::Roles => DomainLabels::roles(),
            DomainKind::Categories => DomainLabels::categories(),
        }
    }
}

/// Settings returned by `get_designer_settings` (matches backend)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DesignerSettings {
    pub capabilities: Capabilities,
    pub config: DesignerConfig,
    pub domain: DomainKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Toast shown above the canvas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u32,
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn class(&self) -> &'static str {
        match self.kind {
            NoticeKind::Info => "notice info",
            NoticeKind::Error => "notice error",
        }
    }
}
