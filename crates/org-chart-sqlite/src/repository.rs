//! Hierarchy Repository
//!
//! SQLite-backed implementation of the designer's backend contract.
//! Every multi-row write runs in one transaction.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use org_chart_core::{
    DomainError, DomainResult, DraftCreate, DraftId, HierarchyBackend, HierarchyItem, ItemId, LoadFilter, LoadedItem,
    NodeId, ParentUpdate, PositionUpdate,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::Mutex;

const ITEM_COLUMNS: &str = "id, name, description, parent_id, level, sort_order, position_x, position_y";

/// SQLite implementation of the hierarchy backend
pub struct SqliteHierarchyRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteHierarchyRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Insert one item directly, appended after its siblings
    pub async fn create_item(
        &self,
        name: &str,
        description: Option<&str>,
        parent_id: Option<ItemId>,
        holder_count: Option<u32>,
    ) -> DomainResult<HierarchyItem> {
        let conn = self.conn.lock().await;
        let level = match parent_id {
            Some(parent) => {
                find_item(&conn, parent)?
                    .ok_or_else(|| DomainError::NotFound(format!("Parent {} not found", parent.0)))?
                    .level
                    + 1
            }
            None => 0,
        };
        let sort_order = next_sort_order(&conn, parent_id)?;
        let now = chrono::Utc::now().timestamp_millis();
        conn.execute(
            "INSERT INTO hierarchy_items (name, description, parent_id, level, sort_order, holder_count, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![name, description, parent_id.map(|p| p.0), level, sort_order, holder_count, now, now],
        )
        .map_err(|e| DomainError::Internal(e.to_string()))?;
        let id = row_id(conn.last_insert_rowid())?;
        find_item(&conn, id)?.ok_or_else(|| DomainError::Internal(format!("Item {} vanished after insert", id.0)))
    }

    pub async fn find_by_id(&self, id: ItemId) -> DomainResult<Option<HierarchyItem>> {
        let conn = self.conn.lock().await;
        find_item(&conn, id)
    }
}

fn row_id(rowid: i64) -> DomainResult<ItemId> {
    u32::try_from(rowid)
        .map(ItemId)
        .map_err(|_| DomainError::Internal(format!("Row id {} out of range", rowid)))
}

/// Convert a database row to HierarchyItem
fn row_to_item(row: &Row<'_>) -> rusqlite::Result<HierarchyItem> {
    Ok(HierarchyItem {
        id: ItemId(row.get(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        parent_id: row.get::<_, Option<u32>>(3)?.map(ItemId),
        level: row.get(4)?,
        sort_order: row.get(5)?,
        position_x: row.get(6)?,
        position_y: row.get(7)?,
    })
}

fn find_item(conn: &Connection, id: ItemId) -> DomainResult<Option<HierarchyItem>> {
    conn.query_row(
        &format!("SELECT {} FROM hierarchy_items WHERE id = ?", ITEM_COLUMNS),
        params![id.0],
        row_to_item,
    )
    .optional()
    .map_err(|e| DomainError::Internal(e.to_string()))
}

/// Next free sibling slot under `parent_id`
fn next_sort_order(conn: &Connection, parent_id: Option<ItemId>) -> DomainResult<i32> {
    let result = match parent_id {
        Some(parent) => conn.query_row(
            "SELECT COALESCE(MAX(sort_order), -1) + 1 FROM hierarchy_items WHERE parent_id = ?",
            params![parent.0],
            |row| row.get(0),
        ),
        None => conn.query_row(
            "SELECT COALESCE(MAX(sort_order), -1) + 1 FROM hierarchy_items WHERE parent_id IS NULL",
            [],
            |row| row.get(0),
        ),
    };
    result.map_err(|e| DomainError::Internal(e.to_string()))
}

/// Whether `candidate` lies in the subtree below `ancestor`
fn is_in_subtree(conn: &Connection, ancestor: ItemId, candidate: ItemId) -> DomainResult<bool> {
    conn.query_row(
        "WITH RECURSIVE descendants(id) AS (
            SELECT id FROM hierarchy_items WHERE parent_id = ?1
            UNION
            SELECT i.id FROM hierarchy_items i JOIN descendants d ON i.parent_id = d.id
        )
        SELECT EXISTS(SELECT 1 FROM descendants WHERE id = ?2)",
        params![ancestor.0, candidate.0],
        |row| row.get(0),
    )
    .map_err(|e| DomainError::Internal(e.to_string()))
}

/// Add `delta` to the level of every descendant of `root`
fn shift_subtree_levels(conn: &Connection, root: ItemId, delta: i64) -> DomainResult<()> {
    if delta == 0 {
        return Ok(());
    }
    conn.execute(
        "UPDATE hierarchy_items SET level = MAX(level + ?2, 0) WHERE id IN (
            WITH RECURSIVE descendants(id) AS (
                SELECT id FROM hierarchy_items WHERE parent_id = ?1
                UNION
                SELECT i.id FROM hierarchy_items i JOIN descendants d ON i.parent_id = d.id
            )
            SELECT id FROM descendants
        )",
        params![root.0, delta],
    )
    .map_err(|e| DomainError::Internal(e.to_string()))?;
    Ok(())
}

#[async_trait(?Send)]
impl HierarchyBackend for SqliteHierarchyRepository {
    async fn load(&self, filter: &LoadFilter) -> DomainResult<Vec<LoadedItem>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(
                "SELECT i.id, i.name, i.description, i.parent_id, i.level, i.sort_order, i.position_x, i.position_y,
                        i.holder_count,
                        (SELECT COUNT(*) FROM hierarchy_items c WHERE c.parent_id = i.id) AS child_count
                 FROM hierarchy_items i
                 WHERE (?1 IS NULL OR i.id IN (
                        WITH RECURSIVE subtree(id) AS (
                            SELECT ?1
                            UNION
                            SELECT h.id FROM hierarchy_items h JOIN subtree s ON h.parent_id = s.id
                        )
                        SELECT id FROM subtree
                     ))
                   AND (?2 IS NULL OR LOWER(i.name) LIKE '%' || LOWER(?2) || '%')
                 ORDER BY i.level, i.sort_order, i.id",
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let search = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let rows = stmt
            .query_map(params![filter.root.map(|r| r.0), search], |row| {
                Ok(LoadedItem {
                    item: row_to_item(row)?,
                    holder_count: row.get(8)?,
                    child_count: Some(row.get(9)?),
                })
            })
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row.map_err(|e| DomainError::Internal(e.to_string()))?);
        }
        log::debug!("loaded {} hierarchy items", items.len());
        Ok(items)
    }

    async fn bulk_update_positions(&self, updates: &[PositionUpdate]) -> DomainResult<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction().map_err(|e| DomainError::Internal(e.to_string()))?;
        let now = chrono::Utc::now().timestamp_millis();

        for update in updates {
            let changed = tx
                .execute(
                    "UPDATE hierarchy_items
                     SET position_x = ?, position_y = ?, level = COALESCE(?, level), updated_at = ?
                     WHERE id = ?",
                    params![update.position_x, update.position_y, update.level, now, update.id.0],
                )
                .map_err(|e| DomainError::Internal(e.to_string()))?;
            if changed == 0 {
                return Err(DomainError::NotFound(format!("Item {} not found", update.id.0)));
            }
        }

        tx.commit().map_err(|e| DomainError::Internal(e.to_string()))?;
        log::info!("updated positions of {} items", updates.len());
        Ok(())
    }

    async fn bulk_create(&self, drafts: &[DraftCreate]) -> DomainResult<Vec<HierarchyItem>> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction().map_err(|e| DomainError::Internal(e.to_string()))?;
        let now = chrono::Utc::now().timestamp_millis();

        let mut resolved: HashMap<DraftId, ItemId> = HashMap::new();
        let mut created = Vec::with_capacity(drafts.len());

        for draft in drafts {
            if draft.name.trim().is_empty() {
                return Err(DomainError::InvalidInput(format!("Draft {} has no name", draft.draft_id.0)));
            }
            let parent_id = match draft.parent_id {
                None => None,
                Some(NodeId::Persisted(id)) => Some(id),
                Some(NodeId::Draft(parent)) => Some(*resolved.get(&parent).ok_or_else(|| {
                    DomainError::InvalidInput(format!(
                        "Draft {} refers to draft {} which is not earlier in the batch",
                        draft.draft_id.0, parent.0
                    ))
                })?),
            };
            let level = match parent_id {
                Some(parent) => {
                    find_item(&tx, parent)?
                        .ok_or_else(|| DomainError::InvalidInput(format!("Parent {} not found", parent.0)))?
                        .level
                        + 1
                }
                None => 0,
            };
            let sort_order = next_sort_order(&tx, parent_id)?;

            tx.execute(
                "INSERT INTO hierarchy_items
                    (name, description, parent_id, level, sort_order, position_x, position_y, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    draft.name.trim(),
                    draft.description,
                    parent_id.map(|p| p.0),
                    level,
                    sort_order,
                    draft.position_x,
                    draft.position_y,
                    now,
                    now
                ],
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;

            let id = row_id(tx.last_insert_rowid())?;
            resolved.insert(draft.draft_id, id);
            created.push(HierarchyItem {
                id,
                name: draft.name.trim().to_string(),
                description: draft.description.clone(),
                parent_id,
                level,
                sort_order,
                position_x: draft.position_x,
                position_y: draft.position_y,
            });
        }

        tx.commit().map_err(|e| DomainError::Internal(e.to_string()))?;
        log::info!("created {} items from drafts", created.len());
        Ok(created)
    }

    async fn update_parent(&self, update: &ParentUpdate) -> DomainResult<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction().map_err(|e| DomainError::Internal(e.to_string()))?;

        let item = find_item(&tx, update.id)?
            .ok_or_else(|| DomainError::NotFound(format!("Item {} not found", update.id.0)))?;

        let level = match update.new_parent_id {
            Some(parent) if parent == update.id => {
                return Err(DomainError::Conflict("An item cannot be its own parent".to_string()));
            }
            Some(parent) => {
                if is_in_subtree(&tx, update.id, parent)? {
                    return Err(DomainError::Conflict(format!(
                        "Item {} is below item {}",
                        parent.0, update.id.0
                    )));
                }
                find_item(&tx, parent)?
                    .ok_or_else(|| DomainError::NotFound(format!("Parent {} not found", parent.0)))?
                    .level
                    + 1
            }
            None => 0,
        };

        let sort_order = next_sort_order(&tx, update.new_parent_id)?;
        tx.execute(
            "UPDATE hierarchy_items SET parent_id = ?, level = ?, sort_order = ?, updated_at = ? WHERE id = ?",
            params![
                update.new_parent_id.map(|p| p.0),
                level,
                sort_order,
                chrono::Utc::now().timestamp_millis(),
                update.id.0
            ],
        )
        .map_err(|e| DomainError::Internal(e.to_string()))?;
        shift_subtree_levels(&tx, update.id, i64::from(level) - i64::from(item.level))?;

        tx.commit().map_err(|e| DomainError::Internal(e.to_string()))?;
        log::info!("moved item {} under {:?}", update.id.0, update.new_parent_id.map(|p| p.0));
        Ok(())
    }

    async fn delete_item(&self, id: ItemId) -> DomainResult<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction().map_err(|e| DomainError::Internal(e.to_string()))?;

        let item = find_item(&tx, id)?.ok_or_else(|| DomainError::NotFound(format!("Item {} not found", id.0)))?;

        // Children move up one level, keeping their relative order after the new siblings
        shift_subtree_levels(&tx, id, -1)?;
        let base = next_sort_order(&tx, item.parent_id)?;
        tx.execute(
            "UPDATE hierarchy_items SET parent_id = ?, sort_order = sort_order + ? WHERE parent_id = ?",
            params![item.parent_id.map(|p| p.0), base, id.0],
        )
        .map_err(|e| DomainError::Internal(e.to_string()))?;
        tx.execute("DELETE FROM hierarchy_items WHERE id = ?", params![id.0])
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        tx.commit().map_err(|e| DomainError::Internal(e.to_string()))?;
        log::info!("deleted item {}", id.0);
        Ok(())
    }
}
