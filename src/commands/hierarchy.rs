//! Hierarchy Commands
//!
//! The designer's backend contract over Tauri IPC.

use async_trait::async_trait;
use org_chart_core::{
    DomainError, DomainResult, DraftCreate, HierarchyBackend, HierarchyItem, ItemId, LoadFilter, LoadedItem,
    ParentUpdate, PositionUpdate,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use super::invoke;

// ========================
// Argument Structs
// ========================

#[derive(Serialize)]
struct FilterArgs<'a> {
    filter: &'a LoadFilter,
}

#[derive(Serialize)]
struct UpdatesArgs<'a> {
    updates: &'a [PositionUpdate],
}

#[derive(Serialize)]
struct DraftsArgs<'a> {
    drafts: &'a [DraftCreate],
}

#[derive(Serialize)]
struct ParentArgs<'a> {
    update: &'a ParentUpdate,
}

#[derive(Serialize)]
struct IdArgs {
    id: ItemId,
}

// ========================
// Transport
// ========================

/// Rejections arrive either as a serialized `DomainError` or as a bare string
fn to_domain_error(err: JsValue) -> DomainError {
    if let Ok(domain) = serde_wasm_bindgen::from_value::<DomainError>(err.clone()) {
        return domain;
    }
    DomainError::Internal(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}

async fn call<A, R>(cmd: &str, args: &A) -> DomainResult<R>
where
    A: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let js_args = serde_wasm_bindgen::to_value(args).map_err(|e| DomainError::InvalidInput(e.to_string()))?;
    let result = invoke(cmd, js_args).await.map_err(to_domain_error)?;
    serde_wasm_bindgen::from_value(result).map_err(|e| DomainError::Internal(format!("Response error: {}", e)))
}

async fn call_unit<A>(cmd: &str, args: &A) -> DomainResult<()>
where
    A: Serialize + ?Sized,
{
    let js_args = serde_wasm_bindgen::to_value(args).map_err(|e| DomainError::InvalidInput(e.to_string()))?;
    invoke(cmd, js_args).await.map_err(to_domain_error)?;
    Ok(())
}

/// Backend reached through the Tauri host
#[derive(Clone, Copy, Debug, Default)]
pub struct TauriBackend;

#[async_trait(?Send)]
impl HierarchyBackend for TauriBackend {
    async fn load(&self, filter: &LoadFilter) -> DomainResult<Vec<LoadedItem>> {
        call("load_hierarchy", &FilterArgs { filter }).await
    }

    async fn bulk_update_positions(&self, updates: &[PositionUpdate]) -> DomainResult<()> {
        call_unit("bulk_update_positions", &UpdatesArgs { updates }).await
    }

    async fn bulk_create(&self, drafts: &[DraftCreate]) -> DomainResult<Vec<HierarchyItem>> {
        call("bulk_create_items", &DraftsArgs { drafts }).await
    }

    async fn update_parent(&self, update: &ParentUpdate) -> DomainResult<()> {
        call_unit("update_item_parent", &ParentArgs { update }).await
    }

    async fn delete_item(&self, id: ItemId) -> DomainResult<()> {
        call_unit("delete_hierarchy_item", &IdArgs { id }).await
    }
}
