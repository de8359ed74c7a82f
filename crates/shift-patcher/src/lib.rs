//! Winning-override resolution and conditional position patching.
//!
//! The resolver walks a load order and yields the winning version of every
//! placement. The applier checks each winner against a target template and,
//! on a match, writes a shifted copy into the patch layer.

mod applier;
mod outcome;
mod resolver;
mod settings;

pub use applier::PositionPatcher;
pub use outcome::{PatchOutcome, PatchReport, SkipReason};
pub use resolver::{winning_overrides, Winner, WinningOverrides};
pub use settings::{Axis, AxisEdit, PatchSettings};

use shift_records::{LoadOrder, ModKey, PatchLayer};

/// Run the patcher over every winning placement in the load order.
///
/// Returns the populated patch layer and a report of what happened to each
/// placement.
pub fn run_patch(
    load_order: &LoadOrder,
    settings: PatchSettings,
    patch_name: ModKey,
) -> (PatchLayer, PatchReport) {
    let patcher = PositionPatcher::new(settings);
    let mut output = PatchLayer::new(patch_name);
    let mut report = PatchReport::default();

    for winner in winning_overrides(load_order) {
        let outcome = patcher.apply(&winner, load_order, &mut output);
        report.record(&outcome);
    }

    tracing::info!(
        seen = report.seen,
        patched = report.patched,
        patch = %output.mod_key(),
        "patch run complete"
    );

    (output, report)
}
