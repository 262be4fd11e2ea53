//! Chart Node Component
//!
//! One hierarchy box on the SVG canvas: body drag moves it, the bottom
//! handle drags out a new parent edge.

use leptos::prelude::*;
use leptos_dragdrop::{make_on_mousedown, make_on_mouseleave, make_on_target_mouseenter, DndSignals, DragMode};
use org_chart_core::{CanvasView, MenuTarget, NodeId, Position};

use crate::store::{use_chart_store, ChartStateStoreFields};

const HANDLE_RADIUS: i32 = 6;

#[component]
pub fn ChartNode(id: NodeId, canvas: Memo<CanvasView>, dnd: DndSignals<NodeId>) -> impl IntoView {
    let store = use_chart_store();
    let node = Memo::new(move |_| canvas.with(|view| view.nodes.iter().find(|node| node.id == id).cloned()));
    let can_connect = Memo::new(move |_| store.designer().with(|designer| designer.capabilities().can_edit));

    let on_move_down = make_on_mousedown(dnd, id, DragMode::Move);
    let on_connect_down = make_on_mousedown(dnd, id, DragMode::Connect);
    let on_enter = make_on_target_mouseenter(dnd, id);
    let on_leave = make_on_mouseleave(dnd);

    let on_click = move |ev: web_sys::MouseEvent| {
        ev.stop_propagation();
        if dnd.drag_just_ended_read.get_untracked() {
            return;
        }
        let binding = store.designer();
        let mut designer = binding.write();
        designer.close_context_menu();
        if ev.shift_key() {
            let mut ids = designer.selection().to_vec();
            match ids.iter().position(|selected| *selected == id) {
                Some(index) => {
                    ids.remove(index);
                }
                None => ids.push(id),
            }
            designer.select(&ids);
        } else {
            designer.select(&[id]);
        }
    };

    let on_contextmenu = move |ev: web_sys::MouseEvent| {
        ev.prevent_default();
        ev.stop_propagation();
        let at = Position::new(ev.client_x(), ev.client_y());
        store.designer().write().open_context_menu(MenuTarget::Node(id), at);
    };

    let node_class = move || {
        let hovered = dnd.hover_read.get() == Some(id);
        let dragging = dnd.dragging_id_read.get() == Some(id);
        node.with(|node| {
            let mut class = String::from("chart-node");
            if let Some(node) = node {
                if node.is_draft {
                    class.push_str(" draft");
                }
                if node.selected {
                    class.push_str(" selected");
                }
                if node.focused {
                    class.push_str(" focused");
                }
            }
            if hovered {
                class.push_str(" drop-target");
            }
            if dragging {
                class.push_str(" dragging");
            }
            class
        })
    };

    view! {
        {move || node.get().map(|node| {
            let lines = node
                .lines
                .iter()
                .enumerate()
                .map(|(index, line)| {
                    let y = 48 + index as i32 * 16;
                    view! { <text x="40" y=y class="node-line">{line.clone()}</text> }
                })
                .collect_view();
            let (width, height) = (node.width, node.height);
            view! {
                <g
                    class=node_class
                    transform=format!("translate({},{})", node.x, node.y)
                    on:mousedown=move |ev: web_sys::MouseEvent| {
                        ev.stop_propagation();
                        on_move_down(ev);
                    }
                    on:mouseenter=on_enter
                    on:mouseleave=on_leave
                    on:click=on_click
                    on:contextmenu=on_contextmenu
                >
                    <rect
                        class="node-body"
                        width=node.width
                        height=node.height
                        rx="8"
                        stroke=node.color.clone()
                        stroke-dasharray=if node.is_draft { "6 4" } else { "none" }
                    />
                    <rect class="node-accent" width="6" height=node.height rx="3" fill=node.color.clone() />
                    <text x="16" y="30" class="node-icon">{node.icon.clone()}</text>
                    <text x="40" y="28" class="node-title">{node.title.clone()}</text>
                    {lines}
                    <Show when=move || can_connect.get()>
                        <circle
                            class="connect-handle"
                            cx=width / 2
                            cy=height
                            r=HANDLE_RADIUS
                            on:mousedown=on_connect_down
                        />
                    </Show>
                </g>
            }
        })}
    }
}
