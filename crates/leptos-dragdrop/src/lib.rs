//! Leptos DragDrop Utilities
//!
//! Mouse-driven dragging for Leptos canvases.
//! Uses a movement threshold to distinguish click from drag.
//!
//! Two gestures share one state machine:
//! - `DragMode::Move` streams per-frame offsets and reports the drag end
//! - `DragMode::Connect` tracks the element under the pointer and reports
//!   `(source, target)` on release

use leptos::prelude::*;
use wasm_bindgen::JsCast;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragMode {
    #[default]
    Move,
    Connect,
}

/// One pointer frame of a move drag.
///
/// `dx`/`dy` are client pixels since mousedown; `dragging` is `false` on the
/// final frame only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DragFrame<K> {
    pub id: K,
    pub dx: i32,
    pub dy: i32,
    pub dragging: bool,
}

/// DnD state signals
pub struct DndSignals<K: Send + Sync + 'static> {
    pub dragging_id_read: ReadSignal<Option<K>>,
    pub dragging_id_write: WriteSignal<Option<K>>,
    pub mode_read: ReadSignal<DragMode>,
    pub mode_write: WriteSignal<DragMode>,
    /// Element under the pointer during a connect drag
    pub hover_read: ReadSignal<Option<K>>,
    pub hover_write: WriteSignal<Option<K>>,
    pub drag_just_ended_read: ReadSignal<bool>,
    pub drag_just_ended_write: WriteSignal<bool>,
    /// Pending id (mousedown but not yet dragging)
    pub pending_id_read: ReadSignal<Option<K>>,
    pub pending_id_write: WriteSignal<Option<K>>,
    /// Start position for movement detection
    pub start_read: ReadSignal<(i32, i32)>,
    pub start_write: WriteSignal<(i32, i32)>,
    /// Latest client position while a drag is active
    pub pointer_read: ReadSignal<(i32, i32)>,
    pub pointer_write: WriteSignal<(i32, i32)>,
}

impl<K: Send + Sync + 'static> Clone for DndSignals<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: Send + Sync + 'static> Copy for DndSignals<K> {}

/// Movement threshold in pixels to start dragging
const DRAG_THRESHOLD_PX: i32 = 5;

/// Whether a pointer offset counts as a drag rather than a click
pub fn exceeds_threshold(dx: i32, dy: i32) -> bool {
    dx.abs() > DRAG_THRESHOLD_PX || dy.abs() > DRAG_THRESHOLD_PX
}

pub fn create_dnd_signals<K>() -> DndSignals<K>
where
    K: Copy + PartialEq + Send + Sync + 'static,
{
    let (dragging_id_read, dragging_id_write) = signal(None::<K>);
    let (mode_read, mode_write) = signal(DragMode::Move);
    let (hover_read, hover_write) = signal(None::<K>);
    let (drag_just_ended_read, drag_just_ended_write) = signal(false);
    let (pending_id_read, pending_id_write) = signal(None::<K>);
    let (start_read, start_write) = signal((0i32, 0i32));
    let (pointer_read, pointer_write) = signal((0i32, 0i32));
    DndSignals {
        dragging_id_read,
        dragging_id_write,
        mode_read,
        mode_write,
        hover_read,
        hover_write,
        drag_just_ended_read,
        drag_just_ended_write,
        pending_id_read,
        pending_id_write,
        start_read,
        start_write,
        pointer_read,
        pointer_write,
    }
}

/// End drag operation
pub fn end_drag<K>(dnd: &DndSignals<K>)
where
    K: Copy + PartialEq + Send + Sync + 'static,
{
    dnd.dragging_id_write.set(None);
    dnd.hover_write.set(None);
    dnd.pending_id_write.set(None);
    dnd.drag_just_ended_write.set(true);

    // Swallow the click that follows a real drag
    if let Some(win) = web_sys::window() {
        let clear = dnd.drag_just_ended_write;
        let cb = wasm_bindgen::closure::Closure::<dyn FnMut()>::new(move || {
            clear.set(false);
        });
        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), 100);
        cb.forget();
    }
}

/// Create mousedown handler for a draggable element or a connect handle.
/// Records a pending drag with its start position.
pub fn make_on_mousedown<K>(dnd: DndSignals<K>, id: K, mode: DragMode) -> impl Fn(web_sys::MouseEvent) + Copy + 'static
where
    K: Copy + PartialEq + Send + Sync + 'static,
{
    move |ev: web_sys::MouseEvent| {
        if ev.button() != 0 {
            return;
        }
        // Ignore if target is input or button
        if let Some(target) = ev.target() {
            if target.dyn_ref::<web_sys::HtmlInputElement>().is_some() {
                return;
            }
            if target.dyn_ref::<web_sys::HtmlButtonElement>().is_some() {
                return;
            }
        }
        if mode == DragMode::Connect {
            // handles sit on top of the node body
            ev.stop_propagation();
        }
        dnd.pending_id_write.set(Some(id));
        dnd.mode_write.set(mode);
        dnd.start_write.set((ev.client_x(), ev.client_y()));
        dnd.pointer_write.set((ev.client_x(), ev.client_y()));
    }
}

/// Create mouseenter handler for connect targets
pub fn make_on_target_mouseenter<K>(dnd: DndSignals<K>, id: K) -> impl Fn(web_sys::MouseEvent) + Copy + 'static
where
    K: Copy + PartialEq + Send + Sync + 'static,
{
    move |_ev: web_sys::MouseEvent| {
        if dnd.mode_read.get_untracked() != DragMode::Connect {
            return;
        }
        // Don't allow connecting to self
        if let Some(dragging) = dnd.dragging_id_read.get_untracked() {
            if dragging != id {
                dnd.hover_write.set(Some(id));
            }
        }
    }
}

/// Create mouseleave handler
pub fn make_on_mouseleave<K>(dnd: DndSignals<K>) -> impl Fn(web_sys::MouseEvent) + Copy + 'static
where
    K: Copy + PartialEq + Send + Sync + 'static,
{
    move |_ev: web_sys::MouseEvent| {
        if dnd.dragging_id_read.get_untracked().is_some() {
            dnd.hover_write.set(None);
        }
    }
}

/// Offset from the mousedown point
fn offset<K>(dnd: &DndSignals<K>, ev: &web_sys::MouseEvent) -> (i32, i32)
where
    K: Copy + PartialEq + Send + Sync + 'static,
{
    let (start_x, start_y) = dnd.start_read.get_untracked();
    (ev.client_x() - start_x, ev.client_y() - start_y)
}

/// Bind document mousemove: starts a drag past the threshold and streams
/// move frames to `on_frame`
pub fn bind_global_mousemove<K, F>(dnd: DndSignals<K>, on_frame: F)
where
    K: Copy + PartialEq + Send + Sync + 'static,
    F: Fn(DragFrame<K>) + 'static,
{
    use wasm_bindgen::closure::Closure;

    let on_mousemove = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
        let Some(pending) = dnd.pending_id_read.get_untracked() else {
            return;
        };
        let (dx, dy) = offset(&dnd, &ev);

        if dnd.dragging_id_read.get_untracked().is_none() {
            if !exceeds_threshold(dx, dy) {
                return;
            }
            dnd.dragging_id_write.set(Some(pending));
        }

        dnd.pointer_write.set((ev.client_x(), ev.client_y()));
        if dnd.mode_read.get_untracked() == DragMode::Move {
            on_frame(DragFrame { id: pending, dx, dy, dragging: true });
        }
    });

    if let Some(win) = web_sys::window() {
        if let Some(doc) = win.document() {
            let _ = doc.add_event_listener_with_callback("mousemove", on_mousemove.as_ref().unchecked_ref());
        }
    }
    on_mousemove.forget();
}

/// Bind document mouseup (and the matching mousemove).
///
/// A move drag ends with one final frame where `dragging == false`; a connect
/// drag released over a target calls `on_connect(source, target)`. Plain
/// clicks produce neither.
pub fn bind_global_mouseup<K, M, C>(dnd: DndSignals<K>, on_frame: M, on_connect: C)
where
    K: Copy + PartialEq + Send + Sync + 'static,
    M: Fn(DragFrame<K>) + Clone + 'static,
    C: Fn(K, K) + 'static,
{
    use wasm_bindgen::closure::Closure;

    let on_move_end = on_frame.clone();
    let on_mouseup = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
        let dragging = dnd.dragging_id_read.get_untracked();
        let hover = dnd.hover_read.get_untracked();
        let mode = dnd.mode_read.get_untracked();
        let (dx, dy) = offset(&dnd, &ev);

        end_drag(&dnd);
        let Some(id) = dragging else {
            // Not dragging - click event will fire naturally on the element
            return;
        };
        match (mode, hover) {
            (DragMode::Move, _) => on_move_end(DragFrame { id, dx, dy, dragging: false }),
            (DragMode::Connect, Some(target)) => on_connect(id, target),
            (DragMode::Connect, None) => {}
        }
    });

    if let Some(win) = web_sys::window() {
        if let Some(doc) = win.document() {
            let _ = doc.add_event_listener_with_callback("mouseup", on_mouseup.as_ref().unchecked_ref());
        }
    }
    on_mouseup.forget();

    // Also bind global mousemove
    bind_global_mousemove(dnd, on_frame);
}
