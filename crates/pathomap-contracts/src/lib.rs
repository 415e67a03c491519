//! # pathomap-contracts
//!
//! Shared types for the pathomap knowledge graph.
//!
//! Every crate in the workspace imports from here. No extraction or scoring
//! logic lives in this crate — only the data model, query option records,
//! diagnostics, and the error type.

pub mod condition;
pub mod diagnostics;
pub mod entity;
pub mod error;
pub mod index;
pub mod query;

#[cfg(test)]
mod tests {
    use super::*;
    use condition::{Condition, RawText};
    use diagnostics::{Diagnostics, FragmentSink, SkipReason};
    use entity::{GramStatus, PathogenType};
    use error::PathomapError;

    // ── Condition deserialization ────────────────────────────────────────────

    #[test]
    fn condition_accepts_camel_case_fields() {
        let json = serde_json::json!({
            "id": "c1",
            "category": "Skin",
            "name": "Cellulitis",
            "commonPathogens": ["Staphylococcus aureus (MRSA)"],
            "empiricTherapy": { "Standard": "Vancomycin OR Linezolid" },
            "duration": "5-7 days"
        });
        let condition: Condition = serde_json::from_value(json).unwrap();

        assert_eq!(condition.id, "c1");
        assert_eq!(condition.common_pathogens.len(), 1);
        assert_eq!(
            condition.empiric_therapy["Standard"].as_text(),
            Some("Vancomycin OR Linezolid")
        );
        assert!(condition.notes.is_none());
    }

    #[test]
    fn condition_treats_missing_and_null_fields_as_empty() {
        let json = serde_json::json!({
            "name": "Orphan",
            "commonPathogens": null,
            "empiricTherapy": null
        });
        let condition: Condition = serde_json::from_value(json).unwrap();

        assert_eq!(condition.id, "");
        assert!(condition.common_pathogens.is_empty());
        assert!(condition.empiric_therapy.is_empty());
    }

    #[test]
    fn non_string_mentions_are_kept_as_other() {
        let json = serde_json::json!({
            "id": "c2",
            "commonPathogens": ["E coli", 42, { "name": "x" }]
        });
        let condition: Condition = serde_json::from_value(json).unwrap();

        let texts: Vec<Option<&str>> =
            condition.common_pathogens.iter().map(RawText::as_text).collect();
        assert_eq!(texts, vec![Some("E coli"), None, None]);
    }

    // ── Entity enums ─────────────────────────────────────────────────────────

    #[test]
    fn gram_status_serializes_kebab_case() {
        let json = serde_json::to_string(&GramStatus::AcidFast).unwrap();
        assert_eq!(json, "\"acid-fast\"");
        assert_eq!("Acid-Fast".parse::<GramStatus>().unwrap(), GramStatus::AcidFast);
        assert!("purple".parse::<GramStatus>().is_err());
    }

    #[test]
    fn pathogen_type_uses_spaced_label() {
        let json = serde_json::to_string(&PathogenType::AtypicalBacteria).unwrap();
        assert_eq!(json, "\"atypical bacteria\"");
        assert_eq!(
            "atypical-bacteria".parse::<PathogenType>().unwrap(),
            PathogenType::AtypicalBacteria
        );
    }

    // ── Diagnostics ──────────────────────────────────────────────────────────

    #[test]
    fn diagnostics_counts_by_reason() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.skip("Studies show", SkipReason::Prose);
        diagnostics.skip("Research et al", SkipReason::Prose);
        diagnostics.skip("x 7 days", SkipReason::Filler);

        let counts = diagnostics.count_by_reason();
        assert_eq!(diagnostics.len(), 3);
        assert_eq!(counts[&SkipReason::Prose], 2);
        assert_eq!(counts[&SkipReason::Filler], 1);
    }

    // ── PathomapError display messages ───────────────────────────────────────

    #[test]
    fn error_config_error_display() {
        let err = PathomapError::ConfigError {
            reason: "weights sum to 1.3".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("configuration error"));
        assert!(msg.contains("weights sum to 1.3"));
    }

    #[test]
    fn error_search_limit_display() {
        let err = PathomapError::SearchLimitExceeded {
            reason: "max_depth 9 exceeds limit 6".to_string(),
        };
        assert!(err.to_string().contains("path search limit exceeded"));
    }

    #[test]
    fn error_unknown_pathogen_display() {
        let err = PathomapError::UnknownPathogen {
            name: "Nonexistent organism".to_string(),
        };
        assert!(err.to_string().contains("'Nonexistent organism'"));
    }
}
