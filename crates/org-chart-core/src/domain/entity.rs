//! Domain Layer - Core Entity Trait
//!
//! This trait defines the basic contract for hierarchy entities.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core trait for all domain entities
pub trait Entity: Sized + Clone {
    /// The type of the entity's unique identifier
    type Id: Copy + Eq + std::hash::Hash;

    /// Returns the entity's unique identifier
    fn id(&self) -> Self::Id;
}

/// Find an entity by id in a flat list
pub fn find_by_id<T: Entity>(list: &[T], id: T::Id) -> Option<&T> {
    list.iter().find(|entity| entity.id() == id)
}

/// Find an entity by id in a flat list, mutably
pub fn find_by_id_mut<T: Entity>(list: &mut [T], id: T::Id) -> Option<&mut T> {
    list.iter_mut().find(|entity| entity.id() == id)
}

/// Common result type for backend operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Errors reported by the hierarchy backend.
///
/// Serializable so that they survive the IPC hop between host and UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal error: {0}")]
    Internal(String),
}
