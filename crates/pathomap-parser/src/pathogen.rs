//! Pathogen mention parsing.
//!
//! A mention goes through a fixed pipeline: citation stripping, prose
//! rejection, `Name (Qualifier)` splitting, abbreviation expansion, then
//! classification against an ordered pattern table where the first matching
//! rule decides gram status, organism type and spectrum category.

use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use pathomap_contracts::{
    diagnostics::SkipReason,
    entity::{GramStatus, PathogenRecord, PathogenType, SpectrumCategory},
};

use crate::text::{pattern, strip_citations, tidy};

// ── Rejection and shape patterns ──────────────────────────────────────────────

static PROSE: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?i)^(?:observational studies|rcts for|studies|research)|\bet al\b"));

static QUALIFIED: Lazy<Regex> =
    Lazy::new(|| pattern(r"^(?P<name>[^()]+?)\s*\((?P<details>[^()]+)\)$"));

// ── Classification table ──────────────────────────────────────────────────────

/// The outcome of classifying a canonical pathogen name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub gram_status: GramStatus,
    pub pathogen_type: PathogenType,
    pub spectrum_category: SpectrumCategory,
}

impl Classification {
    const fn new(gram_status: GramStatus, pathogen_type: PathogenType) -> Self {
        let spectrum_category = match gram_status {
            GramStatus::Atypical => SpectrumCategory::Atypical,
            _ => SpectrumCategory::Typical,
        };
        Self { gram_status, pathogen_type, spectrum_category }
    }
}

/// Applied when no rule in the table matches.
const UNCLASSIFIED: Classification = Classification::new(GramStatus::Unknown, PathogenType::Bacteria);

struct ClassRule {
    id: &'static str,
    matcher: Regex,
    outcome: Classification,
}

/// Ordered rules, first match wins. Explicit type markers precede the
/// atypical set, which precedes the (disjoint) gram genus roots.
static CLASS_RULES: Lazy<Vec<ClassRule>> = Lazy::new(|| {
    vec![
        ClassRule {
            id: "mycobacteria",
            matcher: pattern(r"(?i)mycobacter|tubercul|\bMAC\b|\bNTM\b"),
            outcome: Classification::new(GramStatus::AcidFast, PathogenType::Mycobacteria),
        },
        ClassRule {
            id: "virus",
            matcher: pattern(r"(?i)virus|viral"),
            outcome: Classification::new(GramStatus::Unknown, PathogenType::Virus),
        },
        ClassRule {
            id: "fungal",
            matcher: pattern(
                r"(?i)fung|candida|aspergill|cryptococc|mucor|rhizopus|pneumocystis|histoplasm|blastomyc|coccidioid|yeast|\bmold",
            ),
            outcome: Classification::new(GramStatus::Unknown, PathogenType::Fungus),
        },
        ClassRule {
            id: "atypical",
            matcher: pattern(
                r"(?i)mycoplasma|chlamyd|legionella|rickettsi|coxiella|ureaplasma|treponema|borrelia|\batypical",
            ),
            outcome: Classification::new(GramStatus::Atypical, PathogenType::AtypicalBacteria),
        },
        ClassRule {
            id: "gram-positive",
            matcher: pattern(
                r"(?i)^bacillus\b|\b(?:staphylococc|streptococc|peptostreptococc|enterococc|clostridi|listeria|corynebacter|actinomyces|cutibacter|propionibacter|nocardia|viridans|gram[- ]positive)",
            ),
            outcome: Classification::new(GramStatus::Positive, PathogenType::Bacteria),
        },
        ClassRule {
            id: "gram-negative",
            matcher: pattern(
                r"(?i)\b(?:escherichia|klebsiella|pseudomonas|haemophilus|neisseria|enterobacter|proteus|serratia|acinetobacter|salmonella|shigella|campylobacter|bacteroides|moraxella|bordetella|citrobacter|helicobacter|vibrio|yersinia|pasteurella|bartonella|brucella|stenotrophomonas|fusobacterium|prevotella|gardnerella|morganella|eikenella|kingella|coliform|gram[- ]negative)",
            ),
            outcome: Classification::new(GramStatus::Negative, PathogenType::Bacteria),
        },
    ]
});

/// Classify a canonical name through the ordered rule table.
pub fn classify_name(name: &str) -> Classification {
    CLASS_RULES
        .iter()
        .find(|rule| rule.matcher.is_match(name))
        .map(|rule| {
            debug!(rule = rule.id, name, "pathogen classification rule matched");
            rule.outcome
        })
        .unwrap_or(UNCLASSIFIED)
}

// ── Abbreviations ─────────────────────────────────────────────────────────────

/// Exact-match abbreviation table: written form (periods removed) →
/// (canonical name, implied qualifier).
static ABBREVIATIONS: Lazy<HashMap<&'static str, (&'static str, Option<&'static str>)>> = Lazy::new(|| {
    HashMap::from([
        ("S aureus", ("Staphylococcus aureus", None)),
        ("Staph aureus", ("Staphylococcus aureus", None)),
        ("MRSA", ("Staphylococcus aureus", Some("MRSA"))),
        ("MSSA", ("Staphylococcus aureus", Some("MSSA"))),
        ("S epidermidis", ("Staphylococcus epidermidis", None)),
        ("CoNS", ("Coagulase-negative staphylococci", None)),
        ("S pneumoniae", ("Streptococcus pneumoniae", None)),
        ("Strep pneumoniae", ("Streptococcus pneumoniae", None)),
        ("S pyogenes", ("Streptococcus pyogenes", None)),
        ("GAS", ("Group A Streptococcus", None)),
        ("GBS", ("Group B Streptococcus", None)),
        ("VRE", ("Enterococcus faecium", Some("VRE"))),
        ("E faecalis", ("Enterococcus faecalis", None)),
        ("E coli", ("Escherichia coli", None)),
        ("K pneumoniae", ("Klebsiella pneumoniae", None)),
        ("P aeruginosa", ("Pseudomonas aeruginosa", None)),
        ("H influenzae", ("Haemophilus influenzae", None)),
        ("N meningitidis", ("Neisseria meningitidis", None)),
        ("N gonorrhoeae", ("Neisseria gonorrhoeae", None)),
        ("M catarrhalis", ("Moraxella catarrhalis", None)),
        ("B fragilis", ("Bacteroides fragilis", None)),
        ("L monocytogenes", ("Listeria monocytogenes", None)),
        ("C difficile", ("Clostridioides difficile", None)),
        ("C diff", ("Clostridioides difficile", None)),
        ("M pneumoniae", ("Mycoplasma pneumoniae", None)),
        ("C pneumoniae", ("Chlamydophila pneumoniae", None)),
        ("C trachomatis", ("Chlamydia trachomatis", None)),
        ("M tuberculosis", ("Mycobacterium tuberculosis", None)),
        ("TB", ("Mycobacterium tuberculosis", None)),
        ("HSV", ("Herpes simplex virus", None)),
        ("VZV", ("Varicella zoster virus", None)),
        ("CMV", ("Cytomegalovirus", None)),
        ("RSV", ("Respiratory syncytial virus", None)),
    ])
});

/// Expand a written name through the abbreviation table.
///
/// Periods are ignored for lookup so "S. aureus" and "S aureus" resolve
/// alike. Names not in the table come back unchanged.
pub fn expand_abbreviation(written: &str) -> (String, Option<&'static str>) {
    let key = written.replace('.', "");
    match ABBREVIATIONS.get(tidy(&key).as_str()) {
        Some((canonical, qualifier)) => (canonical.to_string(), *qualifier),
        None => (written.to_string(), None),
    }
}

// ── Entry points ──────────────────────────────────────────────────────────────

/// Parse one raw pathogen mention, reporting why it was rejected.
pub fn classify_pathogen_mention(text: &str) -> Result<PathogenRecord, SkipReason> {
    let cleaned = tidy(&strip_citations(text));
    if cleaned.is_empty() {
        return Err(SkipReason::Empty);
    }
    if PROSE.is_match(&cleaned) {
        return Err(SkipReason::Prose);
    }

    let (written, details) = match QUALIFIED.captures(&cleaned) {
        Some(caps) => (tidy(&caps["name"]), Some(tidy(&caps["details"]))),
        None => (cleaned.clone(), None),
    };
    if written.is_empty() {
        return Err(SkipReason::Empty);
    }
    let details = details.filter(|d| !d.is_empty());

    let (name, implied) = expand_abbreviation(&written);
    let details = details.or_else(|| implied.map(str::to_string));
    let classification = classify_name(&name);

    Ok(PathogenRecord {
        name,
        short_name: written,
        details,
        gram_status: classification.gram_status,
        pathogen_type: classification.pathogen_type,
        spectrum_category: classification.spectrum_category,
        conditions: BTreeSet::new(),
    })
}

/// Parse one raw pathogen mention; `None` for anything that is not a pathogen.
pub fn parse_pathogen_mention(text: &str) -> Option<PathogenRecord> {
    classify_pathogen_mention(text).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Rejection ─────────────────────────────────────────────────────────────

    #[test]
    fn rejects_prose_patterns() {
        for text in [
            "Observational studies: Smith et al",
            "RCTs for short-course therapy",
            "Studies suggest a role for anaerobes",
            "Research ongoing",
            "Jones et al. reported Klebsiella",
        ] {
            assert_eq!(parse_pathogen_mention(text), None, "should reject {text:?}");
            assert_eq!(classify_pathogen_mention(text), Err(SkipReason::Prose));
        }
    }

    #[test]
    fn rejects_blank_and_citation_only_text() {
        assert_eq!(classify_pathogen_mention("   "), Err(SkipReason::Empty));
        assert_eq!(classify_pathogen_mention("[cite: 4]"), Err(SkipReason::Empty));
    }

    // ── Shape and expansion ───────────────────────────────────────────────────

    #[test]
    fn splits_qualifier_into_details() {
        let record = parse_pathogen_mention("Staphylococcus aureus (MRSA)").unwrap();
        assert_eq!(record.name, "Staphylococcus aureus");
        assert_eq!(record.details.as_deref(), Some("MRSA"));
        assert_eq!(record.gram_status, GramStatus::Positive);
        assert_eq!(record.pathogen_type, PathogenType::Bacteria);
    }

    #[test]
    fn strips_citations_before_splitting() {
        let record = parse_pathogen_mention("Escherichia coli [cite: 7] (ESBL)").unwrap();
        assert_eq!(record.name, "Escherichia coli");
        assert_eq!(record.details.as_deref(), Some("ESBL"));
        assert_eq!(record.gram_status, GramStatus::Negative);
    }

    #[test]
    fn expands_abbreviations_and_keeps_written_form() {
        let record = parse_pathogen_mention("S. aureus").unwrap();
        assert_eq!(record.name, "Staphylococcus aureus");
        assert_eq!(record.short_name, "S. aureus");

        let gbs = parse_pathogen_mention("GBS").unwrap();
        assert_eq!(gbs.name, "Group B Streptococcus");
        assert_eq!(gbs.gram_status, GramStatus::Positive);
    }

    #[test]
    fn abbreviation_can_imply_qualifier() {
        let record = parse_pathogen_mention("MRSA").unwrap();
        assert_eq!(record.name, "Staphylococcus aureus");
        assert_eq!(record.details.as_deref(), Some("MRSA"));
    }

    // ── Classification precedence ─────────────────────────────────────────────

    #[test]
    fn atypical_set_beats_gram_roots() {
        let record = parse_pathogen_mention("Legionella pneumophila").unwrap();
        assert_eq!(record.gram_status, GramStatus::Atypical);
        assert_eq!(record.pathogen_type, PathogenType::AtypicalBacteria);
        assert_eq!(record.spectrum_category, SpectrumCategory::Atypical);
    }

    #[test]
    fn type_markers_beat_gram_roots() {
        let tb = parse_pathogen_mention("Mycobacterium tuberculosis").unwrap();
        assert_eq!(tb.gram_status, GramStatus::AcidFast);
        assert_eq!(tb.pathogen_type, PathogenType::Mycobacteria);

        let flu = parse_pathogen_mention("Influenza virus").unwrap();
        assert_eq!(flu.pathogen_type, PathogenType::Virus);
        assert_eq!(flu.gram_status, GramStatus::Unknown);

        let crypto = parse_pathogen_mention("Cryptococcus neoformans").unwrap();
        assert_eq!(crypto.pathogen_type, PathogenType::Fungus);
    }

    #[test]
    fn mycoplasma_is_not_mycobacteria() {
        let record = parse_pathogen_mention("Mycoplasma pneumoniae").unwrap();
        assert_eq!(record.pathogen_type, PathogenType::AtypicalBacteria);
    }

    #[test]
    fn gram_negative_bacilli_are_negative() {
        let record = parse_pathogen_mention("Gram-negative bacilli").unwrap();
        assert_eq!(record.gram_status, GramStatus::Negative);
    }

    #[test]
    fn unmatched_names_fall_back_to_unknown_bacteria() {
        let record = parse_pathogen_mention("Polymicrobial flora").unwrap();
        assert_eq!(record.gram_status, GramStatus::Unknown);
        assert_eq!(record.pathogen_type, PathogenType::Bacteria);
    }

    // ── Idempotence ───────────────────────────────────────────────────────────

    #[test]
    fn canonical_names_reparse_to_themselves() {
        for text in [
            "Escherichia coli",
            "Streptococcus pneumoniae",
            "Haemophilus influenzae",
            "Candida albicans",
            "Chlamydia trachomatis",
            "Polymicrobial flora",
        ] {
            let record = parse_pathogen_mention(text).unwrap();
            assert_eq!(record.details, None);
            assert_eq!(parse_pathogen_mention(&record.name).as_ref(), Some(&record));
        }
    }

    #[test]
    fn expanded_names_are_stable_under_reparse() {
        for text in ["E coli", "GBS", "S. pneumoniae", "HSV", "C diff"] {
            let record = parse_pathogen_mention(text).unwrap();
            let again = parse_pathogen_mention(&record.name).unwrap();
            assert_eq!(again.name, record.name);
            assert_eq!(again.gram_status, record.gram_status);
            assert_eq!(again.pathogen_type, record.pathogen_type);
        }
    }
}
