//! Chart Canvas Component
//!
//! SVG surface for the hierarchy. The viewBox pans with background drags
//! and zooms with the wheel; node drags are converted from screen pixels
//! into chart units before they reach the designer.

use leptos::prelude::*;
use leptos_dragdrop::{bind_global_mouseup, create_dnd_signals, exceeds_threshold, DragFrame, DragMode};
use org_chart_core::presentation::EdgeLine;
use org_chart_core::{CanvasView, MenuTarget, NodeId, Position};

use super::{ChartNode, ContextMenuView};
use crate::actions::connect_nodes;
use crate::context::AppContext;
use crate::store::{use_chart_store, ChartStateStoreFields};

const ZOOM_STEP: f64 = 1.1;
const MIN_VIEW_WIDTH: f64 = 200.0;
const MAX_VIEW_WIDTH: f64 = 20_000.0;

/// Visible region in chart units
#[derive(Debug, Clone, Copy, PartialEq)]
struct ViewBox {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl ViewBox {
    /// Cover `bounds` while matching the container's aspect ratio
    fn fit(min_x: i32, min_y: i32, width: i32, height: i32, aspect: f64) -> Self {
        let (mut w, mut h) = (f64::from(width.max(1)), f64::from(height.max(1)));
        if w / h < aspect {
            w = h * aspect;
        } else {
            h = w / aspect;
        }
        let cx = f64::from(min_x) + f64::from(width) / 2.0;
        let cy = f64::from(min_y) + f64::from(height) / 2.0;
        Self { x: cx - w / 2.0, y: cy - h / 2.0, width: w, height: h }
    }

    fn zoom(self, factor: f64) -> Self {
        let width = (self.width * factor).clamp(MIN_VIEW_WIDTH, MAX_VIEW_WIDTH);
        let factor = width / self.width;
        let height = self.height * factor;
        Self {
            x: self.x + (self.width - width) / 2.0,
            y: self.y + (self.height - height) / 2.0,
            width,
            height,
        }
    }

    fn attr(&self) -> String {
        format!("{} {} {} {}", self.x, self.y, self.width, self.height)
    }
}

/// Pan gesture in progress: pointer and viewBox at mousedown
#[derive(Debug, Clone, Copy)]
struct Pan {
    start: (i32, i32),
    origin: ViewBox,
    moved: bool,
}

fn edge_path(edge: &EdgeLine) -> String {
    let mid = (edge.from.y + edge.to.y) / 2;
    format!(
        "M {} {} C {} {}, {} {}, {} {}",
        edge.from.x, edge.from.y, edge.from.x, mid, edge.to.x, mid, edge.to.x, edge.to.y
    )
}

#[component]
pub fn ChartCanvas(canvas: Memo<CanvasView>) -> impl IntoView {
    let store = use_chart_store();
    let ctx = expect_context::<AppContext>();
    let container = NodeRef::<leptos::html::Div>::new();

    let view_box = RwSignal::new(ViewBox { x: -400.0, y: -40.0, width: 800.0, height: 600.0 });
    let fitted = RwSignal::new(false);
    let pan = StoredValue::new(None::<Pan>);
    let drag_origin = StoredValue::new(None::<(NodeId, Position)>);
    let dnd = create_dnd_signals::<NodeId>();

    // Client rect of the canvas and chart units per client pixel
    let metrics = move || {
        let rect = container.get_untracked()?.get_bounding_client_rect();
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return None;
        }
        let vb = view_box.get_untracked();
        let scale = (vb.width / rect.width()).max(vb.height / rect.height());
        Some((rect, scale))
    };
    let to_chart = move |client_x: i32, client_y: i32| {
        let (rect, scale) = metrics()?;
        let vb = view_box.get_untracked();
        Some((
            vb.x + (f64::from(client_x) - rect.left()) * scale,
            vb.y + (f64::from(client_y) - rect.top()) * scale,
        ))
    };

    // Frame the chart once it has content, and again after "Fit"
    Effect::new(move |_| {
        let bounds = canvas.with(|view| view.bounds);
        if fitted.get() || bounds.width == 0 {
            return;
        }
        let Some(rect) = container.get().map(|el| el.get_bounding_client_rect()) else {
            return;
        };
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return;
        }
        let aspect = rect.width() / rect.height();
        view_box.set(ViewBox::fit(bounds.min_x, bounds.min_y, bounds.width, bounds.height, aspect));
        fitted.set(true);
    });

    let on_frame = move |frame: DragFrame<NodeId>| {
        let origin = match drag_origin.get_value() {
            Some((id, origin)) if id == frame.id => origin,
            _ => {
                let Some(origin) = store
                    .designer()
                    .with_untracked(|designer| designer.store().position_of(frame.id))
                else {
                    return;
                };
                drag_origin.set_value(Some((frame.id, origin)));
                origin
            }
        };
        let scale = metrics().map_or(1.0, |(_, scale)| scale);
        let dx = (f64::from(frame.dx) * scale).round() as i32;
        let dy = (f64::from(frame.dy) * scale).round() as i32;
        store.designer().write().drag_node(frame.id, origin.offset(dx, dy), frame.dragging);
        if !frame.dragging {
            drag_origin.set_value(None);
        }
    };
    let on_connect = move |source: NodeId, target: NodeId| connect_nodes(store, ctx, source, target);
    bind_global_mouseup(dnd, on_frame, on_connect);

    let on_mousedown = move |ev: web_sys::MouseEvent| {
        if ev.button() != 0 {
            return;
        }
        store.designer().write().close_context_menu();
        pan.set_value(Some(Pan {
            start: (ev.client_x(), ev.client_y()),
            origin: view_box.get_untracked(),
            moved: false,
        }));
    };
    let on_mousemove = move |ev: web_sys::MouseEvent| {
        let Some(mut active) = pan.get_value() else {
            return;
        };
        let dx = ev.client_x() - active.start.0;
        let dy = ev.client_y() - active.start.1;
        if !active.moved && !exceeds_threshold(dx, dy) {
            return;
        }
        active.moved = true;
        pan.set_value(Some(active));
        let scale = metrics().map_or(1.0, |(_, scale)| scale);
        view_box.set(ViewBox {
            x: active.origin.x - f64::from(dx) * scale,
            y: active.origin.y - f64::from(dy) * scale,
            ..active.origin
        });
    };
    let on_mouseup = move |_ev: web_sys::MouseEvent| {
        // A background click without movement clears the selection
        if let Some(active) = pan.get_value() {
            if !active.moved {
                store.designer().write().clear_selection();
            }
        }
        pan.set_value(None);
    };
    let on_mouseleave = move |_ev: web_sys::MouseEvent| pan.set_value(None);

    let on_wheel = move |ev: web_sys::WheelEvent| {
        ev.prevent_default();
        let factor = if ev.delta_y() > 0.0 { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
        view_box.update(|vb| *vb = vb.zoom(factor));
    };

    let on_contextmenu = move |ev: web_sys::MouseEvent| {
        ev.prevent_default();
        let at = Position::new(ev.client_x(), ev.client_y());
        store.designer().write().open_context_menu(MenuTarget::Canvas, at);
    };

    // Rubber band from the source handle to the pointer during a connect drag
    let pending_edge = move || {
        if dnd.mode_read.get() != DragMode::Connect {
            return None;
        }
        let source = dnd.dragging_id_read.get()?;
        let (px, py) = dnd.pointer_read.get();
        let from = canvas.with(|view| {
            view.nodes
                .iter()
                .find(|node| node.id == source)
                .map(|node| (node.x + node.width / 2, node.y + node.height))
        })?;
        let (tx, ty) = to_chart(px, py)?;
        Some(view! {
            <line class="edge pending" x1=from.0 y1=from.1 x2=tx y2=ty />
        })
    };

    let node_ids = move || canvas.with(|view| view.nodes.iter().map(|node| node.id).collect::<Vec<_>>());

    view! {
        <div
            class="chart-canvas"
            node_ref=container
            on:mousedown=on_mousedown
            on:mousemove=on_mousemove
            on:mouseup=on_mouseup
            on:mouseleave=on_mouseleave
            on:wheel=on_wheel
            on:contextmenu=on_contextmenu
        >
            <svg width="100%" height="100%" viewBox=move || view_box.get().attr()>
                <g class="edges">
                    <For
                        each=move || canvas.with(|view| view.edges.clone())
                        key=|edge| (edge.id.clone(), edge.from, edge.to, edge.dashed)
                        children=move |edge| {
                            let class = if edge.animated { "edge draft animated" } else { "edge" };
                            view! {
                                <path
                                    class=class
                                    d=edge_path(&edge)
                                    stroke-dasharray=if edge.dashed { "6 4" } else { "none" }
                                />
                            }
                        }
                    />
                    {pending_edge}
                </g>
                <g class="nodes">
                    <For
                        each=node_ids
                        key=|id| *id
                        children=move |id| view! { <ChartNode id=id canvas=canvas dnd=dnd /> }
                    />
                </g>
            </svg>

            {move || canvas.with(|view| view.empty_message.clone()).map(|message| view! {
                <div class="canvas-empty">{message}</div>
            })}

            <button
                class="canvas-fit-btn"
                title="Fit to content"
                on:mousedown=move |ev| ev.stop_propagation()
                on:click=move |_| fitted.set(false)
            >
                "⊡"
            </button>

            <ContextMenuView canvas=canvas />
        </div>
    }
}
