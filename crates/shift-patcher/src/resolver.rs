//! Winning-override resolution.
//!
//! Walks layers from highest to lowest priority and yields each placement the
//! first time its key is seen. That first sighting is the winner; every later
//! (lower-priority) version of the same key is skipped.

use std::collections::btree_map;
use std::collections::HashSet;
use std::iter::Rev;
use std::slice;

use shift_records::{FormKey, Layer, LoadOrder, ModKey, PlacedObject};

/// The winning version of one placement.
#[derive(Debug, Clone, Copy)]
pub struct Winner<'a> {
    /// Layer that contributed the winning version.
    pub layer: &'a ModKey,
    pub record: &'a PlacedObject,
}

impl<'a> Winner<'a> {
    pub fn key(&self) -> &'a FormKey {
        &self.record.form_key
    }
}

/// Lazy iterator over winning placements.
///
/// Order: layers from highest to lowest priority, keys ascending within a
/// layer. Deterministic for a given load order.
pub struct WinningOverrides<'a> {
    layers: Rev<slice::Iter<'a, Layer>>,
    current: Option<(&'a ModKey, btree_map::Values<'a, FormKey, PlacedObject>)>,
    seen: HashSet<&'a FormKey>,
}

/// Iterate the winning version of every placement in the load order.
pub fn winning_overrides(load_order: &LoadOrder) -> WinningOverrides<'_> {
    WinningOverrides {
        layers: load_order.layers().iter().rev(),
        current: None,
        seen: HashSet::new(),
    }
}

impl<'a> Iterator for WinningOverrides<'a> {
    type Item = Winner<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((layer, records)) = &mut self.current {
                for record in records.by_ref() {
                    if self.seen.insert(&record.form_key) {
                        return Some(Winner { layer: *layer, record });
                    }
                }
            }

            let layer = self.layers.next()?;
            self.current = Some((layer.mod_key(), layer.placements()));
        }
    }
}
