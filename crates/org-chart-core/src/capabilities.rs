//! Capability Flags
//!
//! Supplied by the host's authorization layer. The designer only branches on
//! them; it never decides permissions itself.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Capabilities {
    pub can_edit: bool,
    pub can_create: bool,
    pub can_delete: bool,
}

impl Capabilities {
    pub fn all() -> Self {
        Self { can_edit: true, can_create: true, can_delete: true }
    }

    pub fn read_only() -> Self {
        Self::default()
    }

    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::Edit => self.can_edit,
            Capability::Create => self.can_create,
            Capability::Delete => self.can_delete,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Edit,
    Create,
    Delete,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Edit => write!(f, "edit"),
            Capability::Create => write!(f, "create"),
            Capability::Delete => write!(f, "delete"),
        }
    }
}
