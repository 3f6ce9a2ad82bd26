//! Inline style storage

use std::collections::HashMap;

/// Inline style map for one element
///
/// Values are kept as written (`"none"`, `"0.35"`, `"100%"`); only opacity
/// gets a typed accessor because the fade helper ramps it numerically.
#[derive(Debug, Clone, Default)]
pub struct StyleMap {
    properties: HashMap<String, String>,
}

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.properties.get(property).map(String::as_str)
    }

    pub fn set(&mut self, property: &str, value: &str) {
        self.properties.insert(property.to_string(), value.to_string());
    }

    pub fn remove(&mut self, property: &str) {
        self.properties.remove(property);
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Computed opacity; an absent or unparseable value reads as fully opaque
    pub fn opacity(&self) -> f32 {
        self.get("opacity")
            .and_then(|v| v.parse::<f32>().ok())
            .unwrap_or(1.0)
            .clamp(0.0, 1.0)
    }

    pub fn display(&self) -> Option<&str> {
        self.get("display")
    }
}
