//! Index construction.
//!
//! `build_indexes` walks the condition snapshot once, runs the entity parser
//! over every pathogen mention and therapy value, merges records by canonical
//! name, and then derives every reverse lookup from the merged records.
//!
//! The build never fails. Fragments the parser drops, non-text values, and
//! conditions without an id are recorded in `Indexes::diagnostics`.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use pathomap_contracts::{
    condition::Condition,
    diagnostics::{Diagnostics, FragmentField, FragmentSink, SkipReason, SkippedFragment},
    entity::{AntibioticRecord, PathogenRecord},
    index::{ConditionComplexity, Indexes},
};
use pathomap_parser::{classify_pathogen_mention, parse_therapy_string_traced};

// ── Diagnostic scope ──────────────────────────────────────────────────────────

/// Attaches the condition id and field to fragments the parser reports.
struct ConditionScope<'a> {
    diagnostics: &'a mut Diagnostics,
    condition_id: &'a str,
    field: FragmentField,
}

impl FragmentSink for ConditionScope<'_> {
    fn skip(&mut self, text: &str, reason: SkipReason) {
        debug!(condition_id = %self.condition_id, %reason, text, "fragment skipped");
        self.diagnostics.record(SkippedFragment {
            condition_id: Some(self.condition_id.to_string()),
            field: self.field.clone(),
            text: text.to_string(),
            reason,
        });
    }
}

// ── Accumulation ──────────────────────────────────────────────────────────────

/// Records merged by canonical name plus per-condition facts gathered during
/// the extraction pass.
#[derive(Default)]
struct Accumulator {
    pathogens: BTreeMap<String, PathogenRecord>,
    antibiotics: BTreeMap<String, AntibioticRecord>,
    condition_names: BTreeMap<String, String>,
    category_to_conditions: BTreeMap<String, BTreeSet<String>>,
    therapy_options: BTreeMap<String, usize>,
    diagnostics: Diagnostics,
}

impl Accumulator {
    /// Merge a parsed pathogen, unioning its condition set with any earlier
    /// record of the same canonical name. Distinct qualifiers are joined in
    /// first-seen order ("MSSA, MRSA").
    fn merge_pathogen(&mut self, record: PathogenRecord, condition_id: &str) {
        let entry = self
            .pathogens
            .entry(record.name.clone())
            .or_insert_with(|| PathogenRecord {
                conditions: BTreeSet::new(),
                ..record.clone()
            });
        if let Some(incoming) = record.details {
            match entry.details.as_mut() {
                None => entry.details = Some(incoming),
                Some(existing) => {
                    if !existing.split(", ").any(|q| q.eq_ignore_ascii_case(&incoming)) {
                        existing.push_str(", ");
                        existing.push_str(&incoming);
                    }
                }
            }
        }
        entry.conditions.insert(condition_id.to_string());
    }

    fn merge_antibiotic(&mut self, record: AntibioticRecord, condition_id: &str, context: &str) {
        let entry = self
            .antibiotics
            .entry(record.name.clone())
            .or_insert(record);
        entry.conditions.insert(condition_id.to_string());
        if !entry.therapy_contexts.iter().any(|c| c == context) {
            entry.therapy_contexts.push(context.to_string());
        }
    }

    fn resolve_id(&mut self, condition: &Condition, position: usize) -> String {
        let id = condition.id.trim();
        if !id.is_empty() {
            return id.to_string();
        }
        let synthetic = format!("anonymous-{position}");
        warn!(
            position,
            name = %condition.name,
            assigned_id = %synthetic,
            "condition has no id; indexing under a synthetic id"
        );
        self.diagnostics.record(SkippedFragment {
            condition_id: Some(synthetic.clone()),
            field: FragmentField::Identity,
            text: condition.name.clone(),
            reason: SkipReason::MissingId,
        });
        synthetic
    }

    fn absorb(&mut self, condition: &Condition, position: usize) {
        let id = self.resolve_id(condition, position);

        let display = if condition.name.trim().is_empty() {
            id.clone()
        } else {
            condition.name.trim().to_string()
        };
        self.condition_names.entry(id.clone()).or_insert(display);

        let category = condition.category.trim();
        if !category.is_empty() {
            self.category_to_conditions
                .entry(category.to_string())
                .or_default()
                .insert(id.clone());
        }
        *self.therapy_options.entry(id.clone()).or_insert(0) += condition.empiric_therapy.len();

        for mention in &condition.common_pathogens {
            let Some(text) = mention.as_text() else {
                self.skip(&id, FragmentField::Pathogen, &mention.to_string(), SkipReason::NotText);
                continue;
            };
            match classify_pathogen_mention(text) {
                Ok(record) => self.merge_pathogen(record, &id),
                Err(reason) => self.skip(&id, FragmentField::Pathogen, text, reason),
            }
        }

        for (context, therapy) in &condition.empiric_therapy {
            let field = FragmentField::Therapy { context: context.clone() };
            let Some(text) = therapy.as_text() else {
                self.skip(&id, field, &therapy.to_string(), SkipReason::NotText);
                continue;
            };
            let records = {
                let mut scope = ConditionScope {
                    diagnostics: &mut self.diagnostics,
                    condition_id: &id,
                    field,
                };
                parse_therapy_string_traced(text, &mut scope)
            };
            for record in records {
                self.merge_antibiotic(record, &id, context);
            }
        }
    }

    fn skip(&mut self, condition_id: &str, field: FragmentField, text: &str, reason: SkipReason) {
        ConditionScope {
            diagnostics: &mut self.diagnostics,
            condition_id,
            field,
        }
        .skip(text, reason);
    }

    /// Derive every reverse index from the merged records.
    fn finish(self) -> Indexes {
        let mut indexes = Indexes {
            condition_names: self.condition_names,
            category_to_conditions: self.category_to_conditions,
            diagnostics: self.diagnostics,
            ..Indexes::default()
        };

        for id in indexes.condition_names.keys() {
            indexes.condition_to_pathogens.insert(id.clone(), BTreeSet::new());
            indexes.condition_to_antibiotics.insert(id.clone(), BTreeSet::new());
        }

        for (name, record) in &self.pathogens {
            indexes
                .pathogen_to_conditions
                .insert(name.clone(), record.conditions.clone());
            for id in &record.conditions {
                indexes
                    .condition_to_pathogens
                    .entry(id.clone())
                    .or_default()
                    .insert(name.clone());
            }
        }

        for (name, record) in &self.antibiotics {
            indexes
                .antibiotic_to_conditions
                .insert(name.clone(), record.conditions.clone());
            indexes
                .antibiotic_to_drug_class
                .insert(name.clone(), record.drug_class.clone());
            indexes
                .drug_class_to_antibiotics
                .entry(record.drug_class.clone())
                .or_default()
                .insert(name.clone());
            for id in &record.conditions {
                indexes
                    .condition_to_antibiotics
                    .entry(id.clone())
                    .or_default()
                    .insert(name.clone());
            }
        }

        for (name, record) in &self.pathogens {
            let reachable: BTreeSet<String> = record
                .conditions
                .iter()
                .filter_map(|id| indexes.condition_to_antibiotics.get(id))
                .flatten()
                .cloned()
                .collect();
            indexes.pathogen_antibiotic_matrix.insert(name.clone(), reachable);
        }

        for id in indexes.condition_names.keys() {
            let complexity = ConditionComplexity::new(
                indexes.condition_to_pathogens.get(id).map_or(0, BTreeSet::len),
                indexes.condition_to_antibiotics.get(id).map_or(0, BTreeSet::len),
                self.therapy_options.get(id).copied().unwrap_or(0),
            );
            indexes.condition_complexity.insert(id.clone(), complexity);
        }

        indexes.pathogens = self.pathogens;
        indexes.antibiotics = self.antibiotics;
        indexes
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Build every index from a condition snapshot.
///
/// A total function of its input: equal inputs produce equal indexes.
pub fn build_indexes(conditions: &[Condition]) -> Indexes {
    info!(conditions = conditions.len(), "building indexes");

    let mut acc = Accumulator::default();
    for (position, condition) in conditions.iter().enumerate() {
        acc.absorb(condition, position);
    }
    let indexes = acc.finish();

    info!(
        conditions = indexes.condition_count(),
        pathogens = indexes.pathogens.len(),
        antibiotics = indexes.antibiotics.len(),
        drug_classes = indexes.drug_class_to_antibiotics.len(),
        skipped = indexes.diagnostics.len(),
        "indexes built"
    );
    indexes
}
