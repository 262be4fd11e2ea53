//! Designer Errors

use thiserror::Error;

use crate::capabilities::Capability;
use crate::domain::{DomainError, ItemId, NodeId};

/// Why a gesture was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    #[error("{0} is not permitted")]
    NotPermitted(Capability),
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    #[error("a node cannot be its own parent")]
    SelfParent,
    #[error("{child} cannot move under its own descendant {parent}")]
    WouldCycle { parent: NodeId, child: NodeId },
    #[error("item {0} cannot hang under an unsaved draft")]
    DraftParentForPersisted(ItemId),
    #[error("{0} is not a draft")]
    NotADraft(NodeId),
    #[error(transparent)]
    Backend(#[from] DomainError),
}
