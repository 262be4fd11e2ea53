//! Org Chart Designer App
//!
//! Toolbar above the canvas, properties panel on the right.

use leptos::prelude::*;
use leptos::task::spawn_local;
use org_chart_core::{HierarchyBackend, Key};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::commands::{self, TauriBackend};
use crate::components::{ChartCanvas, ChartToolbar, NoticeBar, PropertiesPanel};
use crate::context::AppContext;
use crate::store::{store_apply_settings, store_project, store_sync, ChartState, ChartStateStoreFields, ChartStore};

#[component]
pub fn App() -> impl IntoView {
    let store: ChartStore = reactive_stores::Store::new(ChartState::default());
    provide_context(store);

    let (reload_trigger, set_reload_trigger) = signal(0u32);
    let (notice, set_notice) = signal(None);
    let ctx = AppContext::new((reload_trigger, set_reload_trigger), (notice, set_notice));
    provide_context(ctx);

    // Host settings decide capabilities, geometry and wording
    spawn_local(async move {
        let settings = match commands::get_designer_settings().await {
            Ok(settings) => settings,
            Err(err) => {
                web_sys::console::warn_1(&format!("[APP] Using read-only defaults: {}", err).into());
                Default::default()
            }
        };
        store_apply_settings(&store, settings);
    });

    // Load hierarchy when settings, filter or trigger change
    Effect::new(move |_| {
        let trigger = reload_trigger.get();
        if !store.ready().get() {
            return;
        }
        let filter = store.filter().get();
        web_sys::console::log_1(&format!("[APP] Loading hierarchy {:?}, trigger={}", filter, trigger).into());
        spawn_local(async move {
            match TauriBackend.load(&filter).await {
                Ok(loaded) => {
                    let count = loaded.len();
                    if store_sync(&store, loaded) {
                        web_sys::console::log_1(&format!("[APP] Synced {} items", count).into());
                    }
                }
                Err(err) => ctx.error(format!("Could not load hierarchy: {}", err)),
            }
        });
    });

    // Escape closes the menu, then leaves fullscreen
    let on_keydown = Closure::<dyn FnMut(web_sys::KeyboardEvent)>::new(move |ev: web_sys::KeyboardEvent| {
        let key = if ev.key() == "Escape" { Key::Escape } else { Key::Other };
        if key == Key::Escape && store.designer().write().handle_key(key) {
            ev.prevent_default();
        }
    });
    if let Some(doc) = web_sys::window().and_then(|win| win.document()) {
        let _ = doc.add_event_listener_with_callback("keydown", on_keydown.as_ref().unchecked_ref());
    }
    on_keydown.forget();

    let canvas = Memo::new(move |_| store_project(&store));

    let layout_class = move || {
        if canvas.with(|view| view.toolbar.fullscreen) {
            "app-layout fullscreen"
        } else {
            "app-layout"
        }
    };

    view! {
        <div class=layout_class>
            <ChartToolbar canvas=canvas />
            <NoticeBar />
            <div class="designer-body">
                <ChartCanvas canvas=canvas />
                <PropertiesPanel canvas=canvas />
            </div>
        </div>
    }
}
