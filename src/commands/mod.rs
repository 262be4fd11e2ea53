//! Tauri Command Wrappers
//!
//! Frontend bindings to backend commands, organized by domain.

mod hierarchy;
mod settings;

use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["window", "__TAURI__", "core"])]
    async fn invoke(cmd: &str, args: JsValue) -> Result<JsValue, JsValue>;
}

// Re-export all public items
pub use hierarchy::*;
pub use settings::*;
