//! Layers, load orders and the patch output layer.
//!
//! A [`LoadOrder`] is an ordered list of [`Layer`]s, lowest priority first.
//! Each layer holds at most one version of any record key; when several layers
//! define the same key, the one loaded last wins.

use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use std::fs;
use std::io;
use std::path::Path;

use crate::form_key::{FormKey, ModKey};
use crate::record::{PlacedObject, TemplateRecord};

/// Errors reading or writing layer files.
#[derive(Debug, thiserror::Error)]
pub enum LayerError {
    #[error("failed to read layer {path}: {source}")]
    Read { path: String, source: io::Error },

    #[error("failed to write layer {path}: {source}")]
    Write { path: String, source: io::Error },

    #[error("invalid layer JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Resolves template links against whatever is loaded.
pub trait LinkCache {
    /// Winning version of the template with this key, if any layer has it.
    fn resolve_template(&self, key: &FormKey) -> Option<&TemplateRecord>;
}

/// One plugin's worth of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "LayerFile", into = "LayerFile")]
pub struct Layer {
    mod_key: ModKey,
    templates: BTreeMap<FormKey, TemplateRecord>,
    placements: BTreeMap<FormKey, PlacedObject>,
}

/// On-disk shape of a layer. Records are stored as lists; duplicate keys
/// collapse to the last entry.
#[derive(Serialize, Deserialize)]
struct LayerFile {
    mod_key: ModKey,
    #[serde(default)]
    templates: Vec<TemplateRecord>,
    #[serde(default)]
    placements: Vec<PlacedObject>,
}

impl From<LayerFile> for Layer {
    fn from(file: LayerFile) -> Self {
        let mut layer = Layer::new(file.mod_key);
        for template in file.templates {
            layer.add_template(template);
        }
        for placement in file.placements {
            layer.add_placement(placement);
        }
        layer
    }
}

impl From<Layer> for LayerFile {
    fn from(layer: Layer) -> Self {
        Self {
            mod_key: layer.mod_key,
            templates: layer.templates.into_values().collect(),
            placements: layer.placements.into_values().collect(),
        }
    }
}

impl Layer {
    pub fn new(mod_key: ModKey) -> Self {
        Self {
            mod_key,
            templates: BTreeMap::new(),
            placements: BTreeMap::new(),
        }
    }

    pub fn mod_key(&self) -> &ModKey {
        &self.mod_key
    }

    /// Insert or replace a template. Returns the replaced version.
    pub fn add_template(&mut self, template: TemplateRecord) -> Option<TemplateRecord> {
        self.templates.insert(template.form_key.clone(), template)
    }

    /// Insert or replace a placement. Returns the replaced version.
    pub fn add_placement(&mut self, placement: PlacedObject) -> Option<PlacedObject> {
        self.placements.insert(placement.form_key.clone(), placement)
    }

    pub fn template(&self, key: &FormKey) -> Option<&TemplateRecord> {
        self.templates.get(key)
    }

    pub fn placement(&self, key: &FormKey) -> Option<&PlacedObject> {
        self.placements.get(key)
    }

    /// Placements in ascending key order.
    pub fn placements(&self) -> btree_map::Values<'_, FormKey, PlacedObject> {
        self.placements.values()
    }

    pub fn placement_count(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty() && self.placements.is_empty()
    }

    /// Parse a layer from JSON text.
    pub fn from_json_str(s: &str) -> Result<Self, LayerError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a layer from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, LayerError> {
        let contents = fs::read_to_string(path).map_err(|source| LayerError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn to_json(&self) -> Result<String, LayerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to_file(&self, path: &Path) -> Result<(), LayerError> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| LayerError::Write {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Layers in load order, lowest priority first.
#[derive(Debug, Clone, Default)]
pub struct LoadOrder {
    layers: Vec<Layer>,
}

impl LoadOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer above everything loaded so far.
    pub fn push(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Layers lowest priority first.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Winning version of a placement: the highest-priority layer defining it.
    pub fn winning_placement(&self, key: &FormKey) -> Option<&PlacedObject> {
        self.layers.iter().rev().find_map(|layer| layer.placement(key))
    }

    /// Load each file in order, first file lowest priority.
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self, LayerError> {
        let mut load_order = LoadOrder::new();
        for path in paths {
            load_order.push(Layer::from_file(path.as_ref())?);
        }
        Ok(load_order)
    }
}

impl FromIterator<Layer> for LoadOrder {
    fn from_iter<I: IntoIterator<Item = Layer>>(iter: I) -> Self {
        Self {
            layers: iter.into_iter().collect(),
        }
    }
}

impl LinkCache for LoadOrder {
    fn resolve_template(&self, key: &FormKey) -> Option<&TemplateRecord> {
        self.layers.iter().rev().find_map(|layer| layer.template(key))
    }
}

/// Output layer of a patch run.
///
/// Holds at most one override per key. Writing a key that is already present
/// replaces the earlier override.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchLayer {
    layer: Layer,
}

impl PatchLayer {
    pub fn new(mod_key: ModKey) -> Self {
        Self {
            layer: Layer::new(mod_key),
        }
    }

    pub fn mod_key(&self) -> &ModKey {
        self.layer.mod_key()
    }

    /// Existing override for this key, if one was written this run.
    pub fn get_override(&self, key: &FormKey) -> Option<&PlacedObject> {
        self.layer.placement(key)
    }

    /// Write an override. Returns true when it replaced an earlier one.
    pub fn set_override(&mut self, record: PlacedObject) -> bool {
        self.layer.add_placement(record).is_some()
    }

    pub fn len(&self) -> usize {
        self.layer.placement_count()
    }

    pub fn is_empty(&self) -> bool {
        self.layer.placement_count() == 0
    }

    pub fn as_layer(&self) -> &Layer {
        &self.layer
    }
}
