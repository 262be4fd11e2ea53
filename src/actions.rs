//! Designer Actions
//!
//! Gestures whose outcome has to cross the IPC boundary. The designer is
//! never borrowed across an await: each action mutates it synchronously,
//! awaits the backend, then folds the answer back in.

use leptos::prelude::*;
use leptos::task::spawn_local;
use org_chart_core::{
    execute_plan, ChartError, DeleteOutcome, HierarchyBackend, MenuAction, MenuEffect, NodeId, ReparentOutcome,
    SaveError,
};

use crate::commands::TauriBackend;
use crate::context::AppContext;
use crate::store::{ChartStateStoreFields, ChartStore};

/// Validate, snapshot and send the canvas state
pub fn save_chart(store: ChartStore, ctx: AppContext) {
    let begun = store.designer().write().begin_save();
    let plan = match begun {
        Ok(Some(plan)) => plan,
        Ok(None) => return,
        Err(SaveError::Validation(issues)) => {
            ctx.error(format!("{} unsaved item(s) need a name", issues.len()));
            return;
        }
        Err(err) => {
            ctx.error(err.to_string());
            return;
        }
    };

    web_sys::console::log_1(
        &format!("[SAVE] Saving {} positions, {} new items", plan.positions.len(), plan.drafts.len()).into(),
    );
    spawn_local(async move {
        let result = execute_plan(&TauriBackend, &plan).await;
        let report = store.designer().write().finish_save(&plan, result);
        match report {
            Ok(report) => {
                ctx.info(format!("Saved, {} created", report.created.len()));
                ctx.reload();
            }
            Err(err) => ctx.error(format!("Save failed: {}", err)),
        }
    });
}

/// Send a persisted reparent to the backend; drafts were already updated
pub fn apply_reparent(outcome: ReparentOutcome, ctx: AppContext) {
    let ReparentOutcome::Remote(update) = outcome else {
        return;
    };
    spawn_local(async move {
        match TauriBackend.update_parent(&update).await {
            Ok(()) => ctx.reload(),
            Err(err) => ctx.error(format!("Could not move item: {}", err)),
        }
    });
}

/// Delete a persisted item through the backend; drafts were already removed
pub fn apply_delete(outcome: DeleteOutcome, ctx: AppContext) {
    let DeleteOutcome::Remote(id) = outcome else {
        return;
    };
    spawn_local(async move {
        match TauriBackend.delete_item(id).await {
            Ok(()) => ctx.reload(),
            Err(err) => ctx.error(format!("Could not delete item: {}", err)),
        }
    });
}

/// Edge gesture: `target` moves under `source`
pub fn connect_nodes(store: ChartStore, ctx: AppContext, source: NodeId, target: NodeId) {
    web_sys::console::log_1(&format!("[DND] connect {} -> {}", source, target).into());
    let outcome = store.designer().write().connect(source, target);
    report(ctx, outcome.map(|outcome| apply_reparent(outcome, ctx)));
}

pub fn delete_node(store: ChartStore, ctx: AppContext, id: NodeId) {
    let outcome = store.designer().write().delete_node(id);
    report(ctx, outcome.map(|outcome| apply_delete(outcome, ctx)));
}

pub fn run_menu_action(store: ChartStore, ctx: AppContext, action: MenuAction) {
    let effect = store.designer().write().activate_menu(action);
    let effect = effect.map(|effect| match effect {
        MenuEffect::Deleted(outcome) => apply_delete(outcome, ctx),
        MenuEffect::Reparented(outcome) => apply_reparent(outcome, ctx),
        MenuEffect::Added(_) | MenuEffect::LaidOut | MenuEffect::Focused(_) => {}
    });
    report(ctx, effect);
}

/// Surface a refused gesture
pub fn report(ctx: AppContext, result: Result<(), ChartError>) {
    if let Err(err) = result {
        ctx.error(err.to_string());
    }
}
