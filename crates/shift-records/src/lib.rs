//! Record types for the placement patcher.
//!
//! Defines the keyed records a load order is made of (templates and their
//! placement instances), the layered store that holds them, and a JSON
//! interchange form for layers.

pub mod form_key;
pub mod layer;
pub mod record;

pub use form_key::{FormKey, FormKeyError, ModKey, ModType};
pub use layer::{Layer, LayerError, LinkCache, LoadOrder, PatchLayer};
pub use record::{Placement, PlacedObject, Point3, TemplateRecord};

/// Largest local form id that fits in a FormKey.
pub const MAX_FORM_ID: u32 = 0x00FF_FFFF;
