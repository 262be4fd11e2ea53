//! Chart Toolbar Component
//!
//! Canvas-level actions, save state and the hierarchy filter.

use leptos::prelude::*;
use org_chart_core::CanvasView;

use crate::actions::{report, save_chart};
use crate::context::AppContext;
use crate::store::{use_chart_store, ChartStateStoreFields};

#[component]
pub fn ChartToolbar(canvas: Memo<CanvasView>) -> impl IntoView {
    let store = use_chart_store();
    let ctx = expect_context::<AppContext>();
    let toolbar = Memo::new(move |_| canvas.with(|view| view.toolbar.clone()));

    let add_root = move |_| {
        let added = store.designer().write().add_node(None);
        report(ctx, added.map(|_| ()));
    };
    let auto_layout = move |_| {
        let laid_out = store.designer().write().auto_layout();
        report(ctx, laid_out);
    };
    let save = move |_| save_chart(store, ctx);
    let discard = move |_| {
        store.designer().write().discard_changes();
        ctx.reload();
    };
    let toggle_fullscreen = move |_| store.designer().write().toggle_fullscreen();

    // Name search narrows the load; empty input clears it
    let on_search = move |ev| {
        let text = event_target_value(&ev);
        let search = (!text.trim().is_empty()).then(|| text.trim().to_string());
        store.filter().update(|filter| filter.search = search);
    };
    let show_all = move |_| store.filter().update(|filter| filter.root = None);

    view! {
        <div class="chart-toolbar">
            <Show when=move || toolbar.with(|t| t.show_add_root)>
                <button class="toolbar-btn" on:click=add_root>"+ Add"</button>
            </Show>
            <Show when=move || toolbar.with(|t| t.show_auto_layout)>
                <button class="toolbar-btn" on:click=auto_layout>"Auto layout"</button>
            </Show>
            <button
                class="toolbar-btn primary"
                disabled=move || !toolbar.with(|t| t.save_enabled)
                on:click=save
            >
                "Save"
            </button>
            <button
                class="toolbar-btn"
                disabled=move || !toolbar.with(|t| t.discard_enabled)
                on:click=discard
            >
                "Discard"
            </button>
            <span class="save-status">{move || toolbar.with(|t| t.status.clone())}</span>

            <input
                class="toolbar-search"
                type="search"
                placeholder="Search…"
                on:change=on_search
            />
            <Show when=move || store.filter().with(|filter| filter.root.is_some())>
                <button class="toolbar-btn" on:click=show_all>"Show all"</button>
            </Show>
            <button
                class="toolbar-btn"
                title=move || if toolbar.with(|t| t.fullscreen) { "Exit fullscreen (Esc)" } else { "Fullscreen" }
                on:click=toggle_fullscreen
            >
                {move || if toolbar.with(|t| t.fullscreen) { "⤡" } else { "⤢" }}
            </button>
        </div>
    }
}
