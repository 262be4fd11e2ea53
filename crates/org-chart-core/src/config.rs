//! Designer Configuration
//!
//! Geometry constants for the layout engine and placement heuristics.
//! Every field has a default so partial JSON files are accepted.

use serde::{Deserialize, Serialize};

/// Geometry used by the tree layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Render footprint of one node
    pub node_width: i32,
    pub node_height: i32,
    pub horizontal_gap: i32,
    pub vertical_gap: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 220,
            node_height: 80,
            horizontal_gap: 40,
            vertical_gap: 80,
        }
    }
}

impl LayoutConfig {
    /// Vertical distance between two depth bands
    pub fn band_height(&self) -> i32 {
        self.node_height + self.vertical_gap
    }

    /// Horizontal distance between two adjacent leaf centres
    pub fn column_width(&self) -> i32 {
        self.node_width + self.horizontal_gap
    }
}

/// Top-level designer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DesignerConfig {
    pub layout: LayoutConfig,
    /// Nudge applied when a new top-level draft would land on an existing node
    pub draft_offset: i32,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            draft_offset: 40,
        }
    }
}

impl DesignerConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_even() {
        let layout = LayoutConfig::default();
        assert_eq!(layout.node_width % 2, 0);
        assert_eq!(layout.horizontal_gap % 2, 0);
        assert_eq!(layout.band_height(), 160);
        assert_eq!(layout.column_width(), 260);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = DesignerConfig::from_json(r#"{"layout":{"nodeWidth":180}}"#).unwrap();
        assert_eq!(config.layout.node_width, 180);
        assert_eq!(config.layout.node_height, 80);
        assert_eq!(config.draft_offset, 40);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(DesignerConfig::from_json("{ nope").is_err());
    }
}
