//! tree-shift - move every placement of one template by a fixed offset
//!
//! Resolves the winning version of each placed object across a layered load
//! order, picks the placements of a target template and writes shifted
//! copies into a patch layer.

pub mod config;
pub mod pipeline;
pub mod summary;

pub use config::{ConfigError, EffectiveConfig};
pub use pipeline::{run, PatchRequest, PatchRun, PipelineError};
pub use shift_patcher::{Axis, AxisEdit, PatchReport, PatchSettings, PositionPatcher};
pub use shift_records::{FormKey, Layer, LoadOrder, ModKey, PatchLayer};
pub use summary::RunSummary;
