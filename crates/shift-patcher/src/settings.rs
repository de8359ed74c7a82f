//! Patch settings.

use serde::{Deserialize, Serialize};
use std::fmt;

use shift_records::FormKey;

/// Spatial axis, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Axes in the order edits are evaluated.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

/// Edit for one axis. Disabled edits are ignored whatever their delta.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisEdit {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub delta: f32,
}

impl AxisEdit {
    pub const DISABLED: AxisEdit = AxisEdit {
        enabled: false,
        delta: 0.0,
    };

    pub fn shift(delta: f32) -> Self {
        Self {
            enabled: true,
            delta,
        }
    }
}

/// Everything the patcher reads. Passed in by value; never global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchSettings {
    /// Template whose placements get moved.
    pub target: FormKey,

    #[serde(default)]
    pub x: AxisEdit,

    #[serde(default)]
    pub y: AxisEdit,

    #[serde(default)]
    pub z: AxisEdit,
}

impl PatchSettings {
    /// Settings with every axis disabled.
    pub fn new(target: FormKey) -> Self {
        Self {
            target,
            x: AxisEdit::DISABLED,
            y: AxisEdit::DISABLED,
            z: AxisEdit::DISABLED,
        }
    }

    pub fn with_edit(mut self, axis: Axis, edit: AxisEdit) -> Self {
        match axis {
            Axis::X => self.x = edit,
            Axis::Y => self.y = edit,
            Axis::Z => self.z = edit,
        }
        self
    }

    pub fn edit(&self, axis: Axis) -> AxisEdit {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Axes whose edit is enabled, in evaluation order.
    pub fn enabled_axes(&self) -> impl Iterator<Item = Axis> + '_ {
        Axis::ALL.into_iter().filter(|axis| self.edit(*axis).enabled)
    }
}
