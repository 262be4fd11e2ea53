//! Context Menu Component

use leptos::prelude::*;
use org_chart_core::CanvasView;

use crate::actions::run_menu_action;
use crate::context::AppContext;
use crate::store::use_chart_store;

/// Right-click menu anchored at the click's screen position
#[component]
pub fn ContextMenuView(canvas: Memo<CanvasView>) -> impl IntoView {
    let store = use_chart_store();
    let ctx = expect_context::<AppContext>();
    let menu = Memo::new(move |_| canvas.with(|view| view.menu.clone()));

    view! {
        {move || menu.get().map(|menu| {
            let entries = menu
                .entries
                .into_iter()
                .map(|entry| {
                    let action = entry.action;
                    let class = if entry.destructive { "menu-entry destructive" } else { "menu-entry" };
                    view! {
                        <button
                            class=class
                            on:click=move |ev| {
                                ev.stop_propagation();
                                run_menu_action(store, ctx, action);
                            }
                        >
                            {entry.label}
                        </button>
                    }
                })
                .collect_view();
            view! {
                <div
                    class="context-menu"
                    style=format!("left: {}px; top: {}px;", menu.at.x, menu.at.y)
                    on:mousedown=move |ev| ev.stop_propagation()
                    on:mouseup=move |ev| ev.stop_propagation()
                    on:contextmenu=move |ev| ev.prevent_default()
                >
                    {entries}
                </div>
            }
        })}
    }
}
