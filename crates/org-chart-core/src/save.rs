//! Reconciliation Pipeline
//!
//! Turns local edits into backend calls. Saving is split into
//! `begin_save` / `execute_plan` / `finish_save` so an event-driven host can
//! release its state borrow while the calls are in flight.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::{DraftCreate, HierarchyBackend, PositionUpdate};
use crate::controller::ChartDesigner;
use crate::domain::{DomainError, DraftId, HierarchyItem, ItemId, NodeId};
use crate::store::GraphStore;
use crate::tree::{build_forest, flatten_forest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Clean,
    Dirty,
    Saving,
    DirtyWithError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftField {
    Name,
    Parent,
}

/// A draft field that blocks the save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub draft: DraftId,
    pub field: DraftField,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    #[error("{} draft field(s) need attention", .0.len())]
    Validation(Vec<ValidationIssue>),
    #[error("a save is already in progress")]
    InProgress,
    #[error("save failed: {0}")]
    Backend(#[from] DomainError),
}

/// Everything one save will send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavePlan {
    /// Store generation the plan was taken at
    pub generation: u64,
    pub positions: Vec<PositionUpdate>,
    /// Parents before children
    pub drafts: Vec<DraftCreate>,
}

impl SavePlan {
    pub fn draft_ids(&self) -> Vec<DraftId> {
        self.drafts.iter().map(|draft| draft.draft_id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.drafts.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    pub updated: usize,
    pub created: Vec<HierarchyItem>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SaveTracker {
    in_flight: bool,
    last_error: Option<SaveError>,
}

impl SaveTracker {
    pub(crate) fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Drop validation issues of one draft after it was edited or removed
    pub(crate) fn forget_draft(&mut self, id: DraftId) {
        if let Some(SaveError::Validation(issues)) = &mut self.last_error {
            issues.retain(|issue| issue.draft != id);
            if issues.is_empty() {
                self.last_error = None;
            }
        }
    }
}

/// Blank names and vanished parents, in draft order
pub fn validate_drafts(store: &GraphStore) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for draft in store.drafts() {
        if draft.name.trim().is_empty() {
            issues.push(ValidationIssue {
                draft: draft.id,
                field: DraftField::Name,
                message: "Name is required".to_string(),
            });
        }
        if let Some(parent) = draft.parent_id {
            if !store.contains(parent) {
                issues.push(ValidationIssue {
                    draft: draft.id,
                    field: DraftField::Parent,
                    message: format!("Parent {} no longer exists", parent),
                });
            }
        }
    }
    issues
}

fn build_plan(store: &GraphStore) -> SavePlan {
    let depths = store.anchored_depths();

    let positions = store
        .persisted()
        .map(|item| {
            let id = NodeId::Persisted(item.id);
            let position = store.position_of(id).unwrap_or_else(|| item.position());
            let level = depths
                .get(&id)
                .and_then(|depth| u32::try_from(*depth).ok())
                .filter(|depth| *depth != item.level);
            PositionUpdate { id: item.id, position_x: position.x, position_y: position.y, level }
        })
        .collect();

    let forest = build_forest(store.drafts());
    let drafts = flatten_forest(&forest)
        .into_iter()
        .map(|(draft, _)| {
            let position = store.position_of(NodeId::Draft(draft.id)).unwrap_or_else(|| draft.position());
            DraftCreate {
                draft_id: draft.id,
                name: draft.name.trim().to_string(),
                description: draft
                    .description
                    .as_deref()
                    .map(str::trim)
                    .filter(|text| !text.is_empty())
                    .map(str::to_string),
                parent_id: draft.parent_id,
                level: draft.level,
                position_x: position.x,
                position_y: position.y,
            }
        })
        .collect();

    SavePlan { generation: store.generation(), positions, drafts }
}

/// Issue the plan's calls, positions first
pub async fn execute_plan<B>(backend: &B, plan: &SavePlan) -> Result<Vec<HierarchyItem>, SaveError>
where
    B: HierarchyBackend + ?Sized,
{
    if !plan.positions.is_empty() {
        backend.bulk_update_positions(&plan.positions).await?;
    }
    if plan.drafts.is_empty() {
        return Ok(Vec::new());
    }
    let created = backend.bulk_create(&plan.drafts).await?;
    if created.len() != plan.drafts.len() {
        return Err(SaveError::Backend(DomainError::Internal(format!(
            "created {} items for {} drafts",
            created.len(),
            plan.drafts.len()
        ))));
    }
    Ok(created)
}

impl ChartDesigner {
    pub fn save_status(&self) -> SaveStatus {
        if self.save.in_flight {
            SaveStatus::Saving
        } else if !self.store.is_dirty() {
            SaveStatus::Clean
        } else if matches!(self.save.last_error, Some(SaveError::Backend(_))) {
            SaveStatus::DirtyWithError
        } else {
            SaveStatus::Dirty
        }
    }

    pub fn last_save_error(&self) -> Option<&SaveError> {
        self.save.last_error.as_ref()
    }

    /// Inline validation messages for one draft
    pub fn validation_issues_for(&self, id: DraftId) -> Vec<&ValidationIssue> {
        match &self.save.last_error {
            Some(SaveError::Validation(issues)) => issues.iter().filter(|issue| issue.draft == id).collect(),
            _ => Vec::new(),
        }
    }

    /// Validate and snapshot. `Ok(None)` means there is nothing to save.
    pub fn begin_save(&mut self) -> Result<Option<SavePlan>, SaveError> {
        if self.save.in_flight {
            return Err(SaveError::InProgress);
        }
        if !self.store.is_dirty() {
            log::debug!("save skipped, nothing changed");
            return Ok(None);
        }

        let issues = validate_drafts(&self.store);
        if !issues.is_empty() {
            log::warn!("save blocked by {} validation issue(s)", issues.len());
            let error = SaveError::Validation(issues);
            self.save.last_error = Some(error.clone());
            return Err(error);
        }

        let plan = build_plan(&self.store);
        self.save.in_flight = true;
        self.save.last_error = None;
        self.store.set_saving(true);
        log::info!(
            "saving {} positions and {} drafts (generation {})",
            plan.positions.len(),
            plan.drafts.len(),
            plan.generation
        );
        Ok(Some(plan))
    }

    /// Fold the backend result back into local state
    pub fn finish_save(
        &mut self,
        plan: &SavePlan,
        result: Result<Vec<HierarchyItem>, SaveError>,
    ) -> Result<SaveReport, SaveError> {
        self.save.in_flight = false;
        self.store.set_saving(false);

        let created = match result {
            Ok(created) => created,
            Err(error) => {
                log::warn!("{}", error);
                self.save.last_error = Some(error.clone());
                return Err(error);
            }
        };

        let saved = plan.draft_ids();
        let mapping: HashMap<DraftId, ItemId> = plan
            .drafts
            .iter()
            .zip(&created)
            .map(|(draft, item)| (draft.draft_id, item.id))
            .collect();

        self.store.remove_drafts(&saved);
        self.store.remap_draft_parents(&mapping);
        for id in &saved {
            let node = NodeId::Draft(*id);
            self.selection.retain(|selected| *selected != node);
            if self.focus == Some(node) {
                self.focus = None;
            }
        }

        if self.store.generation() == plan.generation {
            self.store.clear_moved();
        }
        self.store.settle();
        self.save.last_error = None;

        log::info!("save complete, {} created", created.len());
        Ok(SaveReport { updated: plan.positions.len(), created })
    }

    /// Run the whole pipeline against `backend`
    pub async fn save<B>(&mut self, backend: &B) -> Result<SaveReport, SaveError>
    where
        B: HierarchyBackend + ?Sized,
    {
        let Some(plan) = self.begin_save()? else {
            return Ok(SaveReport::default());
        };
        let result = execute_plan(backend, &plan).await;
        self.finish_save(&plan, result)
    }
}
