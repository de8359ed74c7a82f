//! Built-in defaults (layer 1)

use serde::{Deserialize, Serialize};
use shift_patcher::AxisEdit;

/// Default plugin name for the patch layer.
pub const DEFAULT_PATCH_NAME: &str = "TreeShift.esp";

/// Built-in default settings. There is no default target; it must come from
/// the settings file or the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Plugin name of the output layer
    pub patch_name: String,

    pub x: AxisEdit,
    pub y: AxisEdit,
    pub z: AxisEdit,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            patch_name: DEFAULT_PATCH_NAME.to_string(),
            x: AxisEdit::DISABLED,
            y: AxisEdit::DISABLED,
            z: AxisEdit::DISABLED,
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "patch_name": self.patch_name,
            "x": { "enabled": self.x.enabled, "delta": self.x.delta },
            "y": { "enabled": self.y.enabled, "delta": self.y.delta },
            "z": { "enabled": self.z.enabled, "delta": self.z.delta },
        })
    }
}
