//! Data-quality diagnostics collected while extracting entities.
//!
//! Clinical source text is full of prose, citations and asides. The parser
//! drops anything it cannot classify; this module is where those drops are
//! recorded so they can be inspected without ever failing a build.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a fragment was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// Blank after trimming and citation removal.
    Empty,
    /// The source value was not a string.
    NotText,
    /// Narrative prose (study references, "et al").
    Prose,
    /// Nothing but instructional sentences remained.
    Instructional,
    /// The therapy text defers to culture results.
    CultureDeferral,
    /// A non-drug filler segment (conditionals, durations, allergy labels).
    Filler,
    /// Left over after cleanup but does not look like a drug name.
    NotDrugLike,
    /// The condition record carried no id.
    MissingId,
}

impl SkipReason {
    pub fn label(self) -> &'static str {
        match self {
            SkipReason::Empty => "empty",
            SkipReason::NotText => "not-text",
            SkipReason::Prose => "prose",
            SkipReason::Instructional => "instructional",
            SkipReason::CultureDeferral => "culture-deferral",
            SkipReason::Filler => "filler",
            SkipReason::NotDrugLike => "not-drug-like",
            SkipReason::MissingId => "missing-id",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which part of a condition a fragment came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum FragmentField {
    Pathogen,
    Therapy { context: String },
    Identity,
    /// Recorded directly against a collector with no condition scope.
    Unscoped,
}

/// One dropped fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFragment {
    pub condition_id: Option<String>,
    pub field: FragmentField,
    pub text: String,
    pub reason: SkipReason,
}

/// Receives fragments the parser decided to drop.
///
/// The parser only knows the text and the reason; callers that know which
/// condition and field the text came from wrap their collector to add that
/// scope.
pub trait FragmentSink {
    fn skip(&mut self, text: &str, reason: SkipReason);
}

/// Discards everything. Used by the non-traced parser entry points.
pub struct NullSink;

impl FragmentSink for NullSink {
    fn skip(&mut self, _text: &str, _reason: SkipReason) {}
}

/// Ordered side list of skipped fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    skipped: Vec<SkippedFragment>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, fragment: SkippedFragment) {
        self.skipped.push(fragment);
    }

    pub fn skipped(&self) -> &[SkippedFragment] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.skipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Number of skipped fragments per reason.
    pub fn count_by_reason(&self) -> BTreeMap<SkipReason, usize> {
        let mut counts = BTreeMap::new();
        for fragment in &self.skipped {
            *counts.entry(fragment.reason).or_insert(0) += 1;
        }
        counts
    }

    /// Fragments skipped while reading one condition.
    pub fn for_condition<'a>(&'a self, condition_id: &'a str) -> impl Iterator<Item = &'a SkippedFragment> {
        self.skipped
            .iter()
            .filter(move |f| f.condition_id.as_deref() == Some(condition_id))
    }
}

impl FragmentSink for Diagnostics {
    fn skip(&mut self, text: &str, reason: SkipReason) {
        self.record(SkippedFragment {
            condition_id: None,
            field: FragmentField::Unscoped,
            text: text.to_string(),
            reason,
        });
    }
}
