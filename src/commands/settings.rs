//! Settings Commands
//!
//! Capabilities and designer configuration supplied by the host.

use wasm_bindgen::prelude::*;

use super::invoke;
use crate::models::DesignerSettings;

/// Fetch host settings; hosts without the command get read-only defaults
pub async fn get_designer_settings() -> Result<DesignerSettings, String> {
    let result = invoke("get_designer_settings", JsValue::NULL)
        .await
        .map_err(|e| e.as_string().unwrap_or_else(|| "settings unavailable".to_string()))?;
    serde_wasm_bindgen::from_value(result).map_err(|e| format!("Response error: {}", e))
}
