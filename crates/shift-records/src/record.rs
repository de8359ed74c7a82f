//! Template and placement records.

use serde::{Deserialize, Serialize};

use crate::form_key::FormKey;

/// Three `f32` components, used for both position and rotation.
///
/// Treated as a value: edits build a new point instead of mutating fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub const ORIGIN: Point3 = Point3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn with_x(self, x: f32) -> Self {
        Self { x, ..self }
    }

    pub fn with_y(self, y: f32) -> Self {
        Self { y, ..self }
    }

    pub fn with_z(self, z: f32) -> Self {
        Self { z, ..self }
    }
}

/// Where a placed object sits in its cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub position: Point3,
    #[serde(default)]
    pub rotation: Point3,
}

impl Placement {
    pub fn at(position: Point3) -> Self {
        Self {
            position,
            rotation: Point3::ORIGIN,
        }
    }
}

/// A definition record that placements point at (a tree species, say).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRecord {
    pub form_key: FormKey,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_id: Option<String>,
}

impl TemplateRecord {
    pub fn new(form_key: FormKey) -> Self {
        Self {
            form_key,
            editor_id: None,
        }
    }

    pub fn with_editor_id(mut self, editor_id: impl Into<String>) -> Self {
        self.editor_id = Some(editor_id.into());
        self
    }
}

/// One placement of a template in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedObject {
    /// Stable across every layered version of this placement.
    pub form_key: FormKey,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_id: Option<String>,

    /// Link to the template. `None` is a null link.
    #[serde(default)]
    pub base: Option<FormKey>,

    /// Absent on records that carry no positional data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
}

impl PlacedObject {
    pub fn new(form_key: FormKey) -> Self {
        Self {
            form_key,
            editor_id: None,
            base: None,
            placement: None,
            scale: None,
        }
    }

    pub fn with_base(mut self, base: FormKey) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_position(mut self, position: Point3) -> Self {
        self.placement = Some(match self.placement {
            Some(p) => Placement { position, ..p },
            None => Placement::at(position),
        });
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = Some(placement);
        self
    }

    pub fn position(&self) -> Option<Point3> {
        self.placement.map(|p| p.position)
    }
}
