//! # pathomap-core
//!
//! Ties the pipeline together: load a condition dataset, fingerprint it,
//! build indexes and the pathogen graph into an immutable [`Snapshot`], and
//! serve queries from an [`ExplorerSession`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pathomap_core::{load_conditions_from_file, ExplorerSession, GraphConfig};
//!
//! let conditions = load_conditions_from_file(Path::new("data/conditions.json"))?;
//! let mut session = ExplorerSession::new(&conditions, GraphConfig::default());
//!
//! let paths = session.find_paths("S. aureus", "Escherichia coli", 4)?;
//!
//! // Later, with a new dataset: rebuilds only if the content changed.
//! let rebuilt = session.refresh(&updated);
//! ```

pub mod dataset;
pub mod fingerprint;
pub mod session;

pub use dataset::{load_conditions_from_file, load_conditions_from_str, sample_conditions, SAMPLE_DATASET};
pub use fingerprint::fingerprint;
pub use session::{ExplorerSession, Snapshot};

pub use pathomap_graph::GraphConfig;
pub use pathomap_parser::{parse_pathogen_mention, parse_therapy_string};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pathomap_contracts::{
        condition::Condition,
        entity::{GramStatus, DEFAULT_DRUG_CLASS},
        error::PathomapError,
        query::PathogenQuery,
    };
    use pathomap_graph::{PathStrategy, Preferences, SearchLimits};

    use super::*;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn sample() -> Vec<Condition> {
        sample_conditions().unwrap()
    }

    fn sample_session() -> ExplorerSession {
        ExplorerSession::new(&sample(), GraphConfig::default())
    }

    // ── 1. dataset loading ────────────────────────────────────────────────────

    #[test]
    fn test_sample_dataset_loads() {
        let conditions = sample();
        assert_eq!(conditions.len(), 10);
        assert!(conditions.iter().all(|c| !c.id.is_empty()));
    }

    #[test]
    fn test_bad_records_are_salvaged_or_skipped() {
        let conditions = load_conditions_from_str(
            r#"[
                {"id": 7, "name": "Numeric id", "commonPathogens": "E coli"},
                42,
                "not a condition",
                {"id": "ok", "commonPathogens": ["Proteus mirabilis"], "notes": null}
            ]"#,
        )
        .unwrap();

        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions[0].id, "7");
        assert_eq!(conditions[0].name, "Numeric id");
        assert!(conditions[0].common_pathogens.is_empty());
        assert_eq!(conditions[1].id, "ok");
        assert_eq!(conditions[1].common_pathogens.len(), 1);
    }

    #[test]
    fn test_non_array_documents_are_rejected() {
        for text in [r#"{"id": "c1"}"#, "not json", ""] {
            match load_conditions_from_str(text) {
                Err(PathomapError::DatasetError { .. }) => {}
                other => panic!("expected DatasetError for {:?}, got {:?}", text, other),
            }
        }
    }

    #[test]
    fn test_missing_dataset_file() {
        let result = load_conditions_from_file(std::path::Path::new("/nonexistent/conditions.json"));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("failed to read dataset file"), "message: {}", err);
    }

    // ── 2. fingerprint ────────────────────────────────────────────────────────

    #[test]
    fn test_fingerprint_is_stable() {
        let a = fingerprint(&sample());
        let b = fingerprint(&sample());
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_fingerprint_tracks_content_and_order() {
        let original = sample();
        let base = fingerprint(&original);

        let mut edited = original.clone();
        edited[3].common_pathogens.push("Serratia marcescens".into());
        assert_ne!(fingerprint(&edited), base);

        let mut reordered = original.clone();
        reordered.swap(0, 1);
        assert_ne!(fingerprint(&reordered), base);

        assert_ne!(fingerprint(&original[..9]), base);
        assert_ne!(fingerprint(&[]), base);
    }

    // ── 3. session ────────────────────────────────────────────────────────────

    #[test]
    fn test_session_builds_expected_entities() {
        let session = sample_session();
        let indexes = session.indexes();

        let staph = &indexes.pathogens["Staphylococcus aureus"];
        assert!(staph.conditions.contains("cellulitis"));
        assert!(staph.conditions.contains("osteomyelitis"));
        assert!(staph.conditions.contains("hap"));
        assert_eq!(staph.details.as_deref(), Some("MSSA, MRSA"));

        let ecoli = &indexes.pathogens["Escherichia coli"];
        assert_eq!(ecoli.gram_status, GramStatus::Negative);
        assert_eq!(ecoli.conditions.len(), 3);

        assert_eq!(indexes.antibiotics["Piperacillin/tazobactam"].drug_class, "Beta-lactam/beta-lactamase inhibitors");
        assert!(!indexes.diagnostics.is_empty());
        assert_eq!(session.graph().nodes().len(), indexes.pathogens.len());
    }

    #[test]
    fn test_sample_antibiotics_resolve_to_known_classes() {
        let session = sample_session();
        let indexes = session.indexes();

        let unresolved: Vec<&str> = indexes
            .antibiotics
            .values()
            .filter(|a| a.drug_class == DEFAULT_DRUG_CLASS)
            .map(|a| a.name.as_str())
            .collect();
        assert!(unresolved.is_empty(), "unresolved antibiotics: {:?}", unresolved);

        let tmp_smx = &indexes.antibiotics["Trimethoprim/sulfamethoxazole"];
        assert_eq!(tmp_smx.drug_class, "Sulfonamides");
        assert_eq!(
            tmp_smx.conditions.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["cellulitis", "uti"]
        );
    }

    #[test]
    fn test_refresh_reuses_unchanged_snapshot() {
        let conditions = sample();
        let mut session = ExplorerSession::new(&conditions, GraphConfig::default());
        let before = session.snapshot();

        assert!(!session.refresh(&conditions));
        assert!(Arc::ptr_eq(&before, &session.snapshot()));

        let mut changed = conditions.clone();
        changed.push(Condition::new("sepsis", "Sepsis").with_pathogen("Staphylococcus aureus"));
        assert!(session.refresh(&changed));
        assert!(!Arc::ptr_eq(&before, &session.snapshot()));
        assert_eq!(session.indexes().condition_count(), 11);

        // A handle taken before the refresh still sees the old snapshot.
        assert_eq!(before.indexes().condition_count(), 10);
    }

    #[test]
    fn test_snapshot_is_shareable_across_threads() {
        let session = sample_session();
        let snapshot = session.snapshot();
        let handle = std::thread::spawn(move || snapshot.indexes().pathogens.len());
        let count = handle.join().unwrap();
        assert_eq!(count, session.indexes().pathogens.len());
    }

    #[test]
    fn test_similarity_by_name() {
        let session = sample_session();

        let result = session.similarity_by_name("escherichia coli", "Klebsiella pneumoniae").unwrap();
        assert_eq!(result.pathogen_a, "Escherichia coli");
        assert!(result.total > 0.0 && result.total <= 1.0, "total {}", result.total);

        let same = session.similarity_by_name("Candida albicans", "candida albicans").unwrap();
        assert_eq!(same.total, 1.0);

        match session.similarity_by_name("Escherichia coli", "Nonexistent organism") {
            Err(PathomapError::UnknownPathogen { name }) => assert_eq!(name, "Nonexistent organism"),
            other => panic!("expected UnknownPathogen, got {:?}", other),
        }
    }

    #[test]
    fn test_session_paths_use_configured_limits() {
        let config = GraphConfig {
            search: SearchLimits { max_depth: 3, ..SearchLimits::default() },
            ..GraphConfig::default()
        };
        let session = ExplorerSession::new(&sample(), config);

        let paths = session.find_paths("E. coli", "klebsiella pneumoniae", 3).unwrap();
        assert!(!paths.is_empty());
        assert_eq!(paths[0].nodes.first().map(String::as_str), Some("Escherichia coli"));

        let shortest = session
            .ranked_paths("Escherichia coli", "Klebsiella pneumoniae", 3, PathStrategy::Shortest)
            .unwrap();
        assert_eq!(shortest[0].hops, 1);

        assert!(matches!(
            session.find_paths("Escherichia coli", "Klebsiella pneumoniae", 4),
            Err(PathomapError::SearchLimitExceeded { .. })
        ));
        assert!(session.find_paths("Escherichia coli", "Nowhere", 3).unwrap().is_empty());
    }

    #[test]
    fn test_session_recommend_and_search() {
        let session = sample_session();

        let recs = session.recommend("E. coli", &[], &Preferences::default());
        assert!(!recs.is_empty());
        assert!(recs.len() <= 8);
        assert!(recs.iter().all(|r| r.pathogen != "Escherichia coli"));

        let recent = vec!["Klebsiella pneumoniae".to_string()];
        let filtered = session.recommend("Escherichia coli", &recent, &Preferences::default());
        assert!(filtered.iter().all(|r| r.pathogen != "Klebsiella pneumoniae"));

        let candida = session.search_pathogens(&PathogenQuery::matching("candida"));
        assert_eq!(candida.len(), 2);

        let stats = session.statistics();
        assert_eq!(stats.condition_count, 10);
    }
}
