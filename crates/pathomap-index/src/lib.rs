//! # pathomap-index
//!
//! Builds the canonical entity lists and reverse lookups from a condition
//! snapshot, and answers read-only queries against them.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use pathomap_index::{build_indexes, get_antibiotics_for_pathogen};
//!
//! let indexes = build_indexes(&conditions);
//! let drugs = get_antibiotics_for_pathogen(&indexes, "Staphylococcus aureus");
//! ```
//!
//! Indexes are rebuilt wholesale whenever the dataset changes; nothing here
//! mutates a built index.

pub mod builder;
pub mod query;

pub use builder::build_indexes;
pub use query::{
    find_antibiotic, find_pathogen, get_antibiotics_for_pathogen, get_antibiotics_in_class,
    get_conditions_for_antibiotic, get_conditions_for_pathogen, get_conditions_in_category,
    get_pathogens_for_antibiotic, index_statistics, search_antibiotics, search_pathogens,
    IndexStatistics,
};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use serde_json::json;

    use pathomap_contracts::{
        condition::Condition,
        diagnostics::{FragmentField, SkipReason},
        entity::{GramStatus, PathogenType},
        index::ConditionComplexity,
        query::{AntibioticQuery, AntibioticSort, PathogenQuery, PathogenSort},
    };

    use super::*;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn conditions_from(value: serde_json::Value) -> Vec<Condition> {
        serde_json::from_value(value).unwrap()
    }

    /// Four conditions with overlapping pathogens and drugs, plus one prose
    /// mention and one instructional therapy note.
    fn sample_conditions() -> Vec<Condition> {
        conditions_from(json!([
            {
                "id": "c1",
                "category": "Skin",
                "name": "Cellulitis",
                "commonPathogens": ["Streptococcus pyogenes", "Staphylococcus aureus (MRSA)"],
                "empiricTherapy": {
                    "Standard": "Cefazolin OR Vancomycin",
                    "Severe PCN allergy": "Clindamycin OR Linezolid"
                }
            },
            {
                "id": "c2",
                "category": "Respiratory",
                "name": "Community-acquired pneumonia",
                "commonPathogens": [
                    "S pneumoniae",
                    "H influenzae",
                    "Mycoplasma pneumoniae",
                    "Observational studies: Smith et al"
                ],
                "empiricTherapy": {
                    "Outpatient": "Amoxicillin OR Doxycycline",
                    "Inpatient": "Ceftriaxone plus Azithromycin"
                }
            },
            {
                "id": "c3",
                "category": "CNS",
                "name": "Bacterial meningitis",
                "commonPathogens": [
                    "Streptococcus pneumoniae",
                    "Neisseria meningitidis",
                    "Listeria monocytogenes"
                ],
                "empiricTherapy": { "Adult": "Vancomycin + Ceftriaxone + Ampicillin" }
            },
            {
                "id": "c4",
                "category": "Bone",
                "name": "Osteomyelitis",
                "commonPathogens": ["S. aureus", "Gram-negative bacilli"],
                "empiricTherapy": {
                    "Standard": "Vancomycin PLUS Cefepime",
                    "Note": "Surgical debridement is often required."
                }
            }
        ]))
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    // ── 1. end-to-end scenario ────────────────────────────────────────────────

    #[test]
    fn test_single_condition_scenario() {
        let conditions = conditions_from(json!([{
            "id": "c1",
            "commonPathogens": ["Staphylococcus aureus (MRSA)"],
            "empiricTherapy": { "Standard": "Vancomycin OR Linezolid" }
        }]));
        let indexes = build_indexes(&conditions);

        assert_eq!(indexes.pathogens.len(), 1);
        let staph = &indexes.pathogens["Staphylococcus aureus"];
        assert_eq!(staph.details.as_deref(), Some("MRSA"));
        assert_eq!(staph.gram_status, GramStatus::Positive);

        assert_eq!(indexes.antibiotics.len(), 2);
        assert_eq!(indexes.antibiotics["Vancomycin"].drug_class, "Glycopeptides");
        assert_eq!(indexes.antibiotics["Linezolid"].drug_class, "Oxazolidinones");
        assert_eq!(indexes.condition_to_antibiotics["c1"], set(&["Linezolid", "Vancomycin"]));
    }

    // ── 2. merge on duplicate canonical names ─────────────────────────────────

    #[test]
    fn test_duplicate_names_union_conditions() {
        let indexes = build_indexes(&sample_conditions());

        let staph = &indexes.pathogens["Staphylococcus aureus"];
        assert_eq!(staph.conditions, set(&["c1", "c4"]));
        // "S. aureus" carries no qualifier, so the c1 one stands alone.
        assert_eq!(staph.details.as_deref(), Some("MRSA"));

        let pneumo = &indexes.pathogens["Streptococcus pneumoniae"];
        assert_eq!(pneumo.conditions, set(&["c2", "c3"]));
        assert_eq!(pneumo.short_name, "S pneumoniae");

        let vanc = &indexes.antibiotics["Vancomycin"];
        assert_eq!(vanc.conditions, set(&["c1", "c3", "c4"]));
        assert_eq!(vanc.therapy_contexts, vec!["Standard".to_string(), "Adult".to_string()]);
    }

    // ── 3. reverse index totals ───────────────────────────────────────────────

    #[test]
    fn test_distinct_qualifiers_are_joined_on_merge() {
        let conditions = conditions_from(json!([
            {
                "id": "c1",
                "commonPathogens": ["Staphylococcus aureus (MSSA)", "MRSA", "S. aureus"]
            },
            {
                "id": "c2",
                "commonPathogens": ["Staphylococcus aureus (mrsa)"]
            }
        ]));
        let indexes = build_indexes(&conditions);

        let staph = &indexes.pathogens["Staphylococcus aureus"];
        assert_eq!(staph.details.as_deref(), Some("MSSA, MRSA"), "details: {:?}", staph.details);
        assert_eq!(staph.conditions, set(&["c1", "c2"]));

        let mssa = search_pathogens(&indexes, &PathogenQuery::matching("mssa"));
        let mrsa = search_pathogens(&indexes, &PathogenQuery::matching("mrsa"));
        assert_eq!(mssa.len(), 1);
        assert_eq!(mrsa.len(), 1);
    }

    #[test]
    fn test_reverse_index_totals_match() {
        let indexes = build_indexes(&sample_conditions());

        let forward: usize = indexes.pathogen_to_conditions.values().map(|s| s.len()).sum();
        let reverse: usize = indexes.condition_to_pathogens.values().map(|s| s.len()).sum();
        assert_eq!(forward, reverse);

        let forward: usize = indexes.antibiotic_to_conditions.values().map(|s| s.len()).sum();
        let reverse: usize = indexes.condition_to_antibiotics.values().map(|s| s.len()).sum();
        assert_eq!(forward, reverse);
    }

    // ── 4. derived structures ─────────────────────────────────────────────────

    #[test]
    fn test_matrix_is_condition_co_occurrence() {
        let indexes = build_indexes(&sample_conditions());

        assert_eq!(
            indexes.pathogen_antibiotic_matrix["Streptococcus pneumoniae"],
            set(&["Amoxicillin", "Ampicillin", "Azithromycin", "Ceftriaxone", "Doxycycline", "Vancomycin"])
        );
        assert_eq!(
            indexes.pathogen_antibiotic_matrix["Gram-negative bacilli"],
            set(&["Cefepime", "Vancomycin"])
        );
    }

    #[test]
    fn test_condition_complexity_counts() {
        let indexes = build_indexes(&sample_conditions());

        assert_eq!(indexes.condition_complexity["c1"], ConditionComplexity::new(2, 4, 2));
        assert_eq!(indexes.condition_complexity["c1"].total, 8);
        // The instructional note still counts as a therapy option.
        assert_eq!(indexes.condition_complexity["c4"], ConditionComplexity::new(2, 2, 2));
    }

    #[test]
    fn test_drug_class_indexes() {
        let indexes = build_indexes(&sample_conditions());

        assert_eq!(indexes.antibiotic_to_drug_class["Cefepime"], "Cephalosporins");
        assert_eq!(
            indexes.drug_class_to_antibiotics["Cephalosporins"],
            set(&["Cefazolin", "Cefepime", "Ceftriaxone"])
        );
        assert_eq!(indexes.category_to_conditions["Skin"], set(&["c1"]));
    }

    // ── 5. determinism ────────────────────────────────────────────────────────

    #[test]
    fn test_build_is_deterministic() {
        let conditions = sample_conditions();
        assert_eq!(build_indexes(&conditions), build_indexes(&conditions));
    }

    // ── 6. degraded input ─────────────────────────────────────────────────────

    #[test]
    fn test_skipped_fragments_are_diagnosed() {
        let indexes = build_indexes(&sample_conditions());

        let c2: Vec<_> = indexes.diagnostics.for_condition("c2").collect();
        assert_eq!(c2.len(), 1);
        assert_eq!(c2[0].reason, SkipReason::Prose);
        assert_eq!(c2[0].field, FragmentField::Pathogen);

        let c4: Vec<_> = indexes.diagnostics.for_condition("c4").collect();
        assert_eq!(c4.len(), 1);
        assert_eq!(c4[0].reason, SkipReason::Instructional);
        assert_eq!(c4[0].field, FragmentField::Therapy { context: "Note".to_string() });
    }

    #[test]
    fn test_conditions_without_entities_are_indexed() {
        let conditions = conditions_from(json!([
            { "id": "empty", "name": "No data" },
            { "id": "c9", "commonPathogens": ["E coli"] }
        ]));
        let indexes = build_indexes(&conditions);

        assert!(indexes.condition_to_pathogens["empty"].is_empty());
        assert!(indexes.condition_to_antibiotics["empty"].is_empty());
        assert_eq!(indexes.condition_complexity["empty"].total, 0);
        assert_eq!(indexes.condition_name("c9"), "c9");
        assert!(indexes.pathogen_antibiotic_matrix["Escherichia coli"].is_empty());
    }

    #[test]
    fn test_missing_id_gets_synthetic_id() {
        let conditions = conditions_from(json!([
            { "name": "Mystery syndrome", "commonPathogens": ["Klebsiella pneumoniae"] },
            { "id": "c2", "commonPathogens": ["Klebsiella pneumoniae"] }
        ]));
        let indexes = build_indexes(&conditions);

        assert_eq!(
            indexes.pathogens["Klebsiella pneumoniae"].conditions,
            set(&["anonymous-0", "c2"])
        );
        assert_eq!(indexes.condition_name("anonymous-0"), "Mystery syndrome");
        let missing: Vec<_> = indexes.diagnostics.for_condition("anonymous-0").collect();
        assert_eq!(missing[0].reason, SkipReason::MissingId);
    }

    #[test]
    fn test_non_text_values_are_diagnosed() {
        let conditions = conditions_from(json!([{
            "id": "c1",
            "commonPathogens": [17, "Proteus mirabilis"],
            "empiricTherapy": { "Standard": { "drug": "x" } }
        }]));
        let indexes = build_indexes(&conditions);

        assert_eq!(indexes.pathogens.len(), 1);
        let reasons: Vec<SkipReason> =
            indexes.diagnostics.skipped().iter().map(|f| f.reason).collect();
        assert_eq!(reasons, vec![SkipReason::NotText, SkipReason::NotText]);
    }

    // ── 7. queries ────────────────────────────────────────────────────────────

    #[test]
    fn test_missing_lookups_return_empty() {
        let indexes = build_indexes(&sample_conditions());

        assert!(get_antibiotics_for_pathogen(&indexes, "Nonexistent organism").is_empty());
        assert!(get_conditions_for_pathogen(&indexes, "Nonexistent organism").is_empty());
        assert!(get_conditions_for_antibiotic(&indexes, "Unobtainium").is_empty());
        assert!(get_pathogens_for_antibiotic(&indexes, "Unobtainium").is_empty());
        assert!(get_antibiotics_in_class(&indexes, "Nonexistent class").is_empty());
    }

    #[test]
    fn test_lookups_fall_back_to_case_insensitive_names() {
        let indexes = build_indexes(&sample_conditions());

        assert_eq!(
            get_conditions_for_pathogen(&indexes, "streptococcus PNEUMONIAE"),
            vec!["c2".to_string(), "c3".to_string()]
        );
        assert_eq!(
            get_conditions_for_antibiotic(&indexes, "cefepime"),
            vec!["c4".to_string()]
        );
        assert_eq!(
            get_pathogens_for_antibiotic(&indexes, "Linezolid"),
            vec!["Staphylococcus aureus".to_string(), "Streptococcus pyogenes".to_string()]
        );
        assert_eq!(get_conditions_in_category(&indexes, "cns"), vec!["c3".to_string()]);
    }

    #[test]
    fn test_search_pathogens_filters() {
        let indexes = build_indexes(&sample_conditions());

        let negatives = search_pathogens(
            &indexes,
            &PathogenQuery {
                gram_status: Some(GramStatus::Negative),
                ..PathogenQuery::default()
            },
        );
        let names: Vec<&str> = negatives.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Gram-negative bacilli", "Haemophilus influenzae", "Neisseria meningitidis"]
        );

        let atypical = search_pathogens(
            &indexes,
            &PathogenQuery {
                pathogen_type: Some(PathogenType::AtypicalBacteria),
                ..PathogenQuery::default()
            },
        );
        assert_eq!(atypical.len(), 1);

        let shared = search_pathogens(
            &indexes,
            &PathogenQuery {
                min_conditions: 2,
                sort_by: PathogenSort::ConditionCount,
                ..PathogenQuery::default()
            },
        );
        let names: Vec<&str> = shared.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Staphylococcus aureus", "Streptococcus pneumoniae"]);
    }

    #[test]
    fn test_search_pathogens_relevance_and_details() {
        let indexes = build_indexes(&sample_conditions());

        let hits = search_pathogens(
            &indexes,
            &PathogenQuery {
                query: Some("strep".to_string()),
                sort_by: PathogenSort::Relevance,
                ..PathogenQuery::default()
            },
        );
        let names: Vec<&str> = hits.iter().map(|p| p.name.as_str()).collect();
        // Both are prefix matches; the one with more conditions ranks first.
        assert_eq!(names, vec!["Streptococcus pneumoniae", "Streptococcus pyogenes"]);

        let mrsa = search_pathogens(&indexes, &PathogenQuery::matching("mrsa"));
        assert_eq!(mrsa.len(), 1);
        assert_eq!(mrsa[0].name, "Staphylococcus aureus");
    }

    #[test]
    fn test_search_antibiotics_by_class_and_breadth() {
        let indexes = build_indexes(&sample_conditions());

        let cephs = search_antibiotics(
            &indexes,
            &AntibioticQuery {
                drug_class: Some("cephalosporins".to_string()),
                ..AntibioticQuery::default()
            },
        );
        assert_eq!(cephs.len(), 3);

        let common = search_antibiotics(
            &indexes,
            &AntibioticQuery {
                min_conditions: 2,
                sort_by: AntibioticSort::ConditionCount,
                ..AntibioticQuery::default()
            },
        );
        let names: Vec<&str> = common.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Vancomycin", "Ceftriaxone"]);

        let broad = search_antibiotics(
            &indexes,
            &AntibioticQuery {
                sort_by: AntibioticSort::SpectrumBreadth,
                ..AntibioticQuery::default()
            },
        );
        // Doxycycline (tetracyclines) has the broadest reference coverage here.
        assert_eq!(broad[0].name, "Doxycycline");
    }

    #[test]
    fn test_index_statistics() {
        let indexes = build_indexes(&sample_conditions());
        let stats = index_statistics(&indexes);

        assert_eq!(stats.condition_count, 4);
        assert_eq!(stats.pathogen_count, 8);
        assert_eq!(stats.antibiotic_count, 10);
        assert_eq!(stats.gram_distribution[&GramStatus::Positive], 4);
        assert_eq!(stats.gram_distribution[&GramStatus::Negative], 3);
        assert_eq!(stats.skipped_fragments, 2);
        assert_eq!(stats.most_complex_condition, Some(("c2".to_string(), 9)));
        assert_eq!(
            stats.most_referenced_pathogen,
            Some(("Staphylococcus aureus".to_string(), 2))
        );
    }
}
