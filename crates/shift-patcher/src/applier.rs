//! Conditional position patching.
//!
//! For each winning placement the patcher:
//! 1. resolves the base link; a null or dangling link is a no-match,
//! 2. compares the template key with the target by exact key equality,
//! 3. skips records with no placement data (nothing is synthesised),
//! 4. shifts each enabled axis by its delta, X then Y then Z,
//! 5. writes the result to the patch layer as one new position.
//!
//! An enabled axis whose delta is exactly zero drops the edit for the whole
//! placement, including shifts already computed for earlier axes. A zero
//! delta is not a per-axis no-op.

use shift_records::{LinkCache, PatchLayer, PlacedObject, Point3};
use tracing::debug;

use crate::outcome::{PatchOutcome, SkipReason};
use crate::resolver::Winner;
use crate::settings::{Axis, PatchSettings};

/// Applies configured axis shifts to placements of one template.
#[derive(Debug, Clone)]
pub struct PositionPatcher {
    settings: PatchSettings,
}

impl PositionPatcher {
    pub fn new(settings: PatchSettings) -> Self {
        Self { settings }
    }

    /// Patch one winning placement, writing an override when it applies.
    pub fn apply<L: LinkCache + ?Sized>(
        &self,
        winner: &Winner<'_>,
        links: &L,
        output: &mut PatchLayer,
    ) -> PatchOutcome {
        let key = winner.key().clone();

        let outcome = match self.plan(winner, links, output) {
            Ok(record) => {
                let from = record.position().unwrap_or_default();
                match self.shift(from) {
                    Ok(to) => {
                        let replaced = output.set_override(record.with_position(to));
                        PatchOutcome::Patched {
                            key,
                            from,
                            to,
                            replaced,
                        }
                    }
                    Err(axis) => PatchOutcome::Skipped {
                        key,
                        reason: SkipReason::ZeroDelta(axis),
                    },
                }
            }
            Err(reason) => PatchOutcome::Skipped { key, reason },
        };

        let key = outcome.key();
        match &outcome {
            PatchOutcome::Patched { from, to, .. } => {
                debug!(%key, layer = %winner.layer, ?from, ?to, "patched placement");
            }
            PatchOutcome::Skipped { reason, .. } => {
                debug!(%key, layer = %winner.layer, %reason, "skipped placement");
            }
        }

        outcome
    }

    /// Match the placement and pick the record to edit.
    ///
    /// An override already written this run is edited in place of the winner,
    /// so a second pass over the same key compounds on the earlier result.
    fn plan<L: LinkCache + ?Sized>(
        &self,
        winner: &Winner<'_>,
        links: &L,
        output: &PatchLayer,
    ) -> Result<PlacedObject, SkipReason> {
        let template = winner
            .record
            .base
            .as_ref()
            .and_then(|link| links.resolve_template(link))
            .ok_or(SkipReason::UnresolvedBase)?;

        if template.form_key != self.settings.target {
            return Err(SkipReason::TemplateMismatch);
        }

        let record = output
            .get_override(winner.key())
            .unwrap_or(winner.record);

        if record.placement.is_none() {
            return Err(SkipReason::NoPlacement);
        }

        Ok(record.clone())
    }

    /// Compute the shifted position, or the first axis whose zero delta
    /// abandons the edit.
    pub fn shift(&self, position: Point3) -> Result<Point3, Axis> {
        let mut next = position;

        for axis in self.settings.enabled_axes() {
            let delta = self.settings.edit(axis).delta;
            let current = component(next, axis);

            let value = if delta < 0.0 {
                current - delta.abs()
            } else if delta > 0.0 {
                current + delta
            } else if delta == 0.0 {
                return Err(axis);
            } else {
                // NaN: no comparison holds, the axis is left alone
                current
            };

            next = match axis {
                Axis::X => next.with_x(value),
                Axis::Y => next.with_y(value),
                Axis::Z => next.with_z(value),
            };
        }

        Ok(next)
    }
}

fn component(point: Point3, axis: Axis) -> f32 {
    match axis {
        Axis::X => point.x,
        Axis::Y => point.y,
        Axis::Z => point.z,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::winning_overrides;
    use crate::settings::AxisEdit;
    use shift_records::{FormKey, Layer, LoadOrder, Placement, TemplateRecord};

    fn key(s: &str) -> FormKey {
        s.parse().unwrap()
    }

    fn t1() -> FormKey {
        key("0A1B2C:Skyrim.esm")
    }

    fn t2() -> FormKey {
        key("0A1B2D:Skyrim.esm")
    }

    fn load_order(placements: Vec<PlacedObject>) -> LoadOrder {
        let mut layer = Layer::new("Skyrim.esm".parse().unwrap());
        layer.add_template(TemplateRecord::new(t1()).with_editor_id("TreePineForest01"));
        layer.add_template(TemplateRecord::new(t2()).with_editor_id("TreeAspen01"));
        for placement in placements {
            layer.add_placement(placement);
        }
        vec![layer].into_iter().collect()
    }

    fn i1() -> PlacedObject {
        PlacedObject::new(key("000D01:Skyrim.esm"))
            .with_base(t1())
            .with_position(Point3::ORIGIN)
    }

    fn patch_all(load_order: &LoadOrder, settings: PatchSettings) -> (PatchLayer, Vec<PatchOutcome>) {
        let patcher = PositionPatcher::new(settings);
        let mut output = PatchLayer::new("TreeShift.esp".parse().unwrap());
        let outcomes = winning_overrides(load_order)
            .map(|w| patcher.apply(&w, load_order, &mut output))
            .collect();
        (output, outcomes)
    }

    fn position_of(output: &PatchLayer, k: &str) -> Option<Point3> {
        output.get_override(&key(k)).and_then(|r| r.position())
    }

    #[test]
    fn test_positive_x_shift() {
        let lo = load_order(vec![i1()]);
        let settings = PatchSettings::new(t1()).with_edit(Axis::X, AxisEdit::shift(5.0));
        let (output, outcomes) = patch_all(&lo, settings);

        assert!(outcomes[0].is_patched());
        assert_eq!(position_of(&output, "000D01:Skyrim.esm"), Some(Point3::new(5.0, 0.0, 0.0)));
    }

    #[test]
    fn test_negative_x_and_positive_y() {
        let lo = load_order(vec![i1()]);
        let settings = PatchSettings::new(t1())
            .with_edit(Axis::X, AxisEdit::shift(-3.0))
            .with_edit(Axis::Y, AxisEdit::shift(2.0));
        let (output, _) = patch_all(&lo, settings);

        assert_eq!(position_of(&output, "000D01:Skyrim.esm"), Some(Point3::new(-3.0, 2.0, 0.0)));
    }

    #[test]
    fn test_zero_delta_abandons_whole_instance() {
        let lo = load_order(vec![i1()]);
        let settings = PatchSettings::new(t1())
            .with_edit(Axis::X, AxisEdit::shift(0.0))
            .with_edit(Axis::Y, AxisEdit::shift(2.0));
        let (output, outcomes) = patch_all(&lo, settings);

        assert!(output.is_empty());
        assert_eq!(outcomes[0].skip_reason(), Some(SkipReason::ZeroDelta(Axis::X)));
    }

    #[test]
    fn test_zero_on_later_axis_discards_earlier_shift() {
        let lo = load_order(vec![i1()]);
        let settings = PatchSettings::new(t1())
            .with_edit(Axis::X, AxisEdit::shift(4.0))
            .with_edit(Axis::Z, AxisEdit::shift(-0.0));
        let (output, outcomes) = patch_all(&lo, settings);

        assert!(output.is_empty());
        assert_eq!(outcomes[0].skip_reason(), Some(SkipReason::ZeroDelta(Axis::Z)));
    }

    #[test]
    fn test_disabled_zero_axis_is_ignored() {
        let lo = load_order(vec![i1()]);
        let settings = PatchSettings::new(t1())
            .with_edit(Axis::X, AxisEdit { enabled: false, delta: 0.0 })
            .with_edit(Axis::Y, AxisEdit::shift(1.5));
        let (output, _) = patch_all(&lo, settings);

        assert_eq!(position_of(&output, "000D01:Skyrim.esm"), Some(Point3::new(0.0, 1.5, 0.0)));
    }

    #[test]
    fn test_other_template_not_patched() {
        let i2 = PlacedObject::new(key("000D02:Skyrim.esm"))
            .with_base(t2())
            .with_position(Point3::ORIGIN);
        let lo = load_order(vec![i2]);
        let settings = PatchSettings::new(t1()).with_edit(Axis::X, AxisEdit::shift(5.0));
        let (output, outcomes) = patch_all(&lo, settings);

        assert!(output.is_empty());
        assert_eq!(outcomes[0].skip_reason(), Some(SkipReason::TemplateMismatch));
    }

    #[test]
    fn test_missing_placement_not_patched() {
        let i3 = PlacedObject::new(key("000D03:Skyrim.esm")).with_base(t1());
        let lo = load_order(vec![i3]);
        let settings = PatchSettings::new(t1())
            .with_edit(Axis::X, AxisEdit::shift(5.0))
            .with_edit(Axis::Y, AxisEdit::shift(0.0));
        let (output, outcomes) = patch_all(&lo, settings);

        assert!(output.is_empty());
        assert_eq!(outcomes[0].skip_reason(), Some(SkipReason::NoPlacement));
    }

    #[test]
    fn test_unresolved_base_is_no_match() {
        let null_link = PlacedObject::new(key("000D04:Skyrim.esm")).with_position(Point3::ORIGIN);
        let dangling = PlacedObject::new(key("000D05:Skyrim.esm"))
            .with_base(key("0FFFFF:Missing.esp"))
            .with_position(Point3::ORIGIN);
        let lo = load_order(vec![null_link, dangling]);
        let settings = PatchSettings::new(t1()).with_edit(Axis::X, AxisEdit::shift(5.0));
        let (output, outcomes) = patch_all(&lo, settings);

        assert!(output.is_empty());
        assert!(outcomes
            .iter()
            .all(|o| o.skip_reason() == Some(SkipReason::UnresolvedBase)));
    }

    #[test]
    fn test_no_enabled_axes_still_writes_override() {
        let lo = load_order(vec![i1()]);
        let (output, outcomes) = patch_all(&lo, PatchSettings::new(t1()));

        assert!(outcomes[0].is_patched());
        assert_eq!(position_of(&output, "000D01:Skyrim.esm"), Some(Point3::ORIGIN));
    }

    #[test]
    fn test_other_attributes_preserved() {
        let rotation = Point3::new(0.1, 0.2, 0.3);
        let mut record = i1().with_placement(Placement {
            position: Point3::new(10.0, 20.0, 30.0),
            rotation,
        });
        record.editor_id = Some("PineMarker".to_string());
        record.scale = Some(1.25);
        let lo = load_order(vec![record.clone()]);

        let settings = PatchSettings::new(t1()).with_edit(Axis::Z, AxisEdit::shift(-10.0));
        let (output, _) = patch_all(&lo, settings);

        let patched = output.get_override(&record.form_key).unwrap();
        assert_eq!(patched.editor_id, record.editor_id);
        assert_eq!(patched.scale, record.scale);
        assert_eq!(patched.base, record.base);
        let placement = patched.placement.unwrap();
        assert_eq!(placement.rotation, rotation);
        assert_eq!(placement.position, Point3::new(10.0, 20.0, 20.0));
    }

    #[test]
    fn test_reapply_updates_existing_override() {
        let lo = load_order(vec![i1()]);
        let patcher =
            PositionPatcher::new(PatchSettings::new(t1()).with_edit(Axis::X, AxisEdit::shift(5.0)));
        let mut output = PatchLayer::new("TreeShift.esp".parse().unwrap());

        for _ in 0..2 {
            for winner in winning_overrides(&lo) {
                patcher.apply(&winner, &lo, &mut output);
            }
        }

        assert_eq!(output.len(), 1);
        assert_eq!(position_of(&output, "000D01:Skyrim.esm"), Some(Point3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn test_nan_delta_leaves_axis_unchanged() {
        let patcher = PositionPatcher::new(
            PatchSettings::new(t1())
                .with_edit(Axis::X, AxisEdit::shift(f32::NAN))
                .with_edit(Axis::Y, AxisEdit::shift(1.0)),
        );
        assert_eq!(
            patcher.shift(Point3::new(1.0, 1.0, 1.0)),
            Ok(Point3::new(1.0, 2.0, 1.0))
        );
    }

    #[test]
    fn test_negative_delta_matches_plain_addition() {
        let patcher =
            PositionPatcher::new(PatchSettings::new(t1()).with_edit(Axis::Y, AxisEdit::shift(-0.1)));
        let start = Point3::new(0.0, 1234.567, 0.0);
        let shifted = patcher.shift(start).unwrap();
        assert_eq!(shifted.y, start.y + -0.1f32);
    }
}
