//! Per-placement patch outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

use shift_records::{FormKey, Point3};

use crate::settings::Axis;

/// Why a placement produced no override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    /// Base link is null or names no known template.
    UnresolvedBase,

    /// Base resolves to some other template.
    TemplateMismatch,

    /// Matched, but the record has no placement data to edit.
    NoPlacement,

    /// An enabled axis had a delta of exactly zero; the whole edit was dropped.
    ZeroDelta(Axis),
}

impl SkipReason {
    /// Machine-readable code.
    pub fn to_code(&self) -> String {
        match self {
            SkipReason::UnresolvedBase => "UNRESOLVED_BASE".to_string(),
            SkipReason::TemplateMismatch => "TEMPLATE_MISMATCH".to_string(),
            SkipReason::NoPlacement => "NO_PLACEMENT".to_string(),
            SkipReason::ZeroDelta(axis) => format!("ZERO_DELTA:{}", axis),
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_code())
    }
}

/// What happened to one winning placement.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchOutcome {
    /// An override was written to the patch layer.
    Patched {
        key: FormKey,
        from: Point3,
        to: Point3,
        /// True when an override for this key already existed and was replaced.
        replaced: bool,
    },

    Skipped { key: FormKey, reason: SkipReason },
}

impl PatchOutcome {
    pub fn key(&self) -> &FormKey {
        match self {
            PatchOutcome::Patched { key, .. } | PatchOutcome::Skipped { key, .. } => key,
        }
    }

    pub fn is_patched(&self) -> bool {
        matches!(self, PatchOutcome::Patched { .. })
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            PatchOutcome::Skipped { reason, .. } => Some(*reason),
            PatchOutcome::Patched { .. } => None,
        }
    }
}

/// Counts over a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchReport {
    /// Winning placements examined.
    pub seen: usize,
    pub patched: usize,
    /// Overrides that replaced one already written this run.
    pub replaced: usize,
    pub unresolved_base: usize,
    pub template_mismatch: usize,
    pub no_placement: usize,
    pub zero_delta: usize,
}

impl PatchReport {
    pub fn record(&mut self, outcome: &PatchOutcome) {
        self.seen += 1;
        match outcome {
            PatchOutcome::Patched { replaced, .. } => {
                self.patched += 1;
                if *replaced {
                    self.replaced += 1;
                }
            }
            PatchOutcome::Skipped { reason, .. } => match reason {
                SkipReason::UnresolvedBase => self.unresolved_base += 1,
                SkipReason::TemplateMismatch => self.template_mismatch += 1,
                SkipReason::NoPlacement => self.no_placement += 1,
                SkipReason::ZeroDelta(_) => self.zero_delta += 1,
            },
        }
    }

    /// Placements that matched the target template, patched or not.
    pub fn matched(&self) -> usize {
        self.patched + self.no_placement + self.zero_delta
    }

    pub fn skipped(&self) -> usize {
        self.seen - self.patched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> FormKey {
        "000D62:Skyrim.esm".parse().unwrap()
    }

    #[test]
    fn test_reason_codes() {
        assert_eq!(SkipReason::UnresolvedBase.to_code(), "UNRESOLVED_BASE");
        assert_eq!(SkipReason::ZeroDelta(Axis::Y).to_code(), "ZERO_DELTA:y");
    }

    #[test]
    fn test_report_counts() {
        let mut report = PatchReport::default();
        report.record(&PatchOutcome::Patched {
            key: key(),
            from: Point3::ORIGIN,
            to: Point3::new(1.0, 0.0, 0.0),
            replaced: false,
        });
        report.record(&PatchOutcome::Skipped {
            key: key(),
            reason: SkipReason::TemplateMismatch,
        });
        report.record(&PatchOutcome::Skipped {
            key: key(),
            reason: SkipReason::ZeroDelta(Axis::X),
        });
        report.record(&PatchOutcome::Skipped {
            key: key(),
            reason: SkipReason::NoPlacement,
        });

        assert_eq!(report.seen, 4);
        assert_eq!(report.patched, 1);
        assert_eq!(report.matched(), 3);
        assert_eq!(report.skipped(), 3);
        assert_eq!(report.zero_delta, 1);
    }

    #[test]
    fn test_reason_serialization() {
        let json = serde_json::to_string(&SkipReason::ZeroDelta(Axis::Z)).unwrap();
        assert_eq!(json, r#"{"type":"ZERO_DELTA","detail":"z"}"#);
    }
}
