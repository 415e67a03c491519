//! Therapy string parsing.
//!
//! A therapy string can hold several drugs joined by alternative ("or") or
//! combination ("plus", "+", "and") connectives, wrapped in dosing, routes
//! and instructional prose. Parsing strips the prose, segments on the
//! connectives, and cleans each segment down to a canonical drug name whose
//! class comes from the spectrum reference table.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use pathomap_contracts::{
    diagnostics::{FragmentSink, NullSink, SkipReason},
    entity::{AntibioticRecord, DEFAULT_DRUG_CLASS},
};

use crate::spectrum::spectrum_table;
use crate::text::{capitalize_first, pattern, strip_citations, tidy};

/// Segments with more words than this are prose, not drug names.
const MAX_DRUG_WORDS: usize = 4;

// ── Whole-string patterns ─────────────────────────────────────────────────────

static CULTURE_DEFERRAL: Lazy<Regex> = Lazy::new(|| {
    pattern(
        r"(?i)^(?:(?:antibiotic\s+)?(?:treatment|therapy)\s+)?(?:should\s+be\s+)?(?:guided\s+by|based\s+on|tailored\s+to|directed\s+by|per|await|depends\s+on)\s+(?:the\s+)?(?:culture|susceptibilit|sensitivit)|^culture[- ]directed\b",
    )
});

/// Instructional sentences removed before segmentation.
static INSTRUCTIONAL: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // Only sentences that open with a procedure; drugs earlier in the same
        // sentence are left for segment-level filtering.
        pattern(r"(?i)(?:^|[.;])\s*(?:surgical|surgery|drainage|debridement|source\s+control|I&D|incision)\b[^.;]*"),
        pattern(r"(?i)choice\s+depends\s+on[^.;]*[.;]?"),
        pattern(r"(?i)these\s+are\s+empiric[^.;]*[.;]?"),
        pattern(r"(?i)\b(?:de-?escalate|narrow)\b[^.;]*[.;]?"),
        pattern(r"(?i)\bsee\s+(?:notes|below|above)\b[^.;]*[.;]?"),
    ]
});

/// Parentheticals carrying dosing or conditions; other parentheses are unwrapped.
static PAREN_NOTE: Lazy<Regex> = Lazy::new(|| {
    pattern(r"(?i)\((?:[^()]*\d[^()]*|\s*(?:if|for|e\.?g\.?|see|max|adjust|renal|target|consider|only|avoid)\b[^()]*)\)")
});

static CONNECTIVE: Lazy<Regex> = Lazy::new(|| {
    pattern(r"(?i)\s+or\s+|\s+plus\s+|\s+and\s+|\s+with\s+|\s*(?:\+/-|±|\+)\s*|\s*[,;]\s*|\.\s+")
});

// ── Segment patterns ──────────────────────────────────────────────────────────

static PROCEDURE: Lazy<Regex> = Lazy::new(|| {
    pattern(r"(?i)\b(?:surgical|surgery|drainage|debridement|source\s+control|incision)\b|\bI&D\b")
});

static FILLER: Lazy<Regex> = Lazy::new(|| {
    pattern(
        r"(?i)^(?:if|for|consider|add|then|when|unless|may|duration|until)\b|^(?:x\s*)?\d+(?:\s*(?:-|–|to)\s*\d+)?\s*(?:days?|d|weeks?|wks?|months?|hours?|hrs?)\b",
    )
});

static ALLERGY_LABEL: Lazy<Regex> = Lazy::new(|| pattern(r"(?i)^[^:]*\ballerg\w*\s*:?\s*"));

static LABEL: Lazy<Regex> = Lazy::new(|| {
    pattern(r"(?i)^(?:alternatives?|preferred|first[- ]line|second[- ]line|outpatient|inpatient|severe|mild|moderate|options?|regimen)\b[^:]{0,24}:\s*")
});

static DURATION: Lazy<Regex> = Lazy::new(|| {
    pattern(r"(?i)\b(?:for|x)?\s*\d+(?:\s*(?:-|–|to)\s*\d+)?\s*(?:days?|weeks?|wks?|months?|hours?)\b")
});

static DOSE: Lazy<Regex> = Lazy::new(|| {
    pattern(
        r"(?i)\b\d+(?:[.,]\d+)?(?:\s*(?:-|–|to)\s*\d+(?:[.,]\d+)?)?\s*(?:(?:mg/kg/day|mg/kg/dose|mg/kg|mcg/kg|mcg|mg|grams?|gm|g|million\s+units|units?|mu|ml)\b|%)?(?:/(?:kg|day|dose|d|h)\b)?",
    )
});

static FREQUENCY: Lazy<Regex> = Lazy::new(|| {
    pattern(r"(?i)\b(?:q\d+(?:-\d+)?h|q\d+|qd|qday|qhs|daily|bid|tid|qid|once|twice|weekly|stat|x|every\s+\d*\s*hours?)\b")
});

static ROUTE: Lazy<Regex> = Lazy::new(|| {
    pattern(
        r"(?i)\b(?:iv|po|im|sc|sq|subq|pr|it|ivpb|inh|inhaled|oral|orally|intravenous|intravenously|intramuscular|topical|nebulized|loading|load|dose|doses|max|maximum|initially)\b",
    )
});

/// Dosage forms ("1-2 DS tabs", "500 mg caps").
static FORM: Lazy<Regex> = Lazy::new(|| {
    pattern(r"(?i)\b(?:ds|ss|tabs?|tablets?|caps?|capsules?|susp|suspension|liquid)\b")
});

static NON_DRUG: Lazy<Regex> = Lazy::new(|| {
    pattern(
        r"(?i)^(?:supportive|none|no|not|avoid|observation|observe|monitor|see|discontinue|stop|treat|therapy|treatment|antibiotics?|empiric|culture|surgery|drain|remove|removal|hydration|fluids?|repeat|continue|switch|change|based|depends|other|alternative)\b",
    )
});

// ── Combination canonicalization ──────────────────────────────────────────────

/// Known spellings of combination products and common brand names.
static COMBINATIONS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (pattern(r"(?i)^(?:piperacillin\s*[-/ ]\s*tazobactam|pip[- /]?tazo|zosyn)$"), "Piperacillin/tazobactam"),
        (pattern(r"(?i)^(?:ampicillin\s*[-/ ]\s*sulbactam|amp[- /]?sulb|unasyn)$"), "Ampicillin/sulbactam"),
        (pattern(r"(?i)^(?:amoxicillin\s*[-/ ]\s*clavulan(?:ate|ic acid)|amox[- /]?clav|augmentin|co-amoxiclav)$"), "Amoxicillin/clavulanate"),
        (pattern(r"(?i)^(?:trimethoprim\s*[-/ ]\s*sulfamethoxazole|tmp\s*[-/]\s*smx|bactrim|co-?trimoxazole)$"), "Trimethoprim/sulfamethoxazole"),
        (pattern(r"(?i)^ceftazidime\s*[-/ ]\s*avibactam$"), "Ceftazidime/avibactam"),
        (pattern(r"(?i)^ceftolozane\s*[-/ ]\s*tazobactam$"), "Ceftolozane/tazobactam"),
        (pattern(r"(?i)^meropenem\s*[-/ ]\s*vaborbactam$"), "Meropenem/vaborbactam"),
        (pattern(r"(?i)^imipenem\s*[-/ ]\s*cilastatin$"), "Imipenem/cilastatin"),
        (pattern(r"(?i)^(?:vanc|vanco)$"), "Vancomycin"),
    ]
});

static GENERIC_PAIR: Lazy<Regex> =
    Lazy::new(|| pattern(r"^(?P<a>[A-Za-z]+)\s*[-/]\s*(?P<b>[A-Za-z]+)$"));

/// Canonical spelling of a cleaned drug name.
///
/// Idempotent: a canonical name maps to itself.
pub fn canonical_antibiotic_name(name: &str) -> String {
    let name = tidy(name);
    if let Some((_, canonical)) = COMBINATIONS.iter().find(|(re, _)| re.is_match(&name)) {
        return canonical.to_string();
    }
    let name = match GENERIC_PAIR.captures(&name) {
        Some(caps) => format!(
            "{}/{}",
            capitalize_first(&caps["a"].to_lowercase()),
            caps["b"].to_lowercase()
        ),
        None => name,
    };
    match spectrum_table().canonical_spelling(&name) {
        Some(spelling) => spelling.to_string(),
        None => capitalize_first(&name),
    }
}

/// Clean one connective-delimited segment down to a drug name.
fn clean_segment(segment: &str) -> Result<String, SkipReason> {
    let segment = tidy(segment);
    if FILLER.is_match(&segment) {
        return Err(SkipReason::Filler);
    }
    if PROCEDURE.is_match(&segment) {
        return Err(SkipReason::Instructional);
    }

    let segment = match ALLERGY_LABEL.find(&segment) {
        Some(label) => {
            let rest = tidy(&segment[label.end()..]);
            if rest.is_empty() {
                return Err(SkipReason::Filler);
            }
            rest
        }
        None => segment,
    };
    let segment = tidy(&LABEL.replace(&segment, ""));

    let stripped = DURATION.replace_all(&segment, " ");
    let stripped = FREQUENCY.replace_all(&stripped, " ");
    let stripped = DOSE.replace_all(&stripped, " ");
    let stripped = ROUTE.replace_all(&stripped, " ");
    let stripped = FORM.replace_all(&stripped, " ");
    let cleaned = tidy(&stripped);

    if cleaned.is_empty()
        || !cleaned.starts_with(|c: char| c.is_alphabetic())
        || cleaned.split_whitespace().count() > MAX_DRUG_WORDS
        || NON_DRUG.is_match(&cleaned)
    {
        return Err(SkipReason::NotDrugLike);
    }
    Ok(cleaned)
}

/// Parse a therapy string, reporting each dropped fragment to `sink`.
///
/// Returned records carry no conditions or therapy contexts; the index
/// builder fills those in. Duplicate drugs within one string collapse to the
/// first occurrence.
pub fn parse_therapy_string_traced(text: &str, sink: &mut dyn FragmentSink) -> Vec<AntibioticRecord> {
    let cleaned = tidy(&strip_citations(text));
    if cleaned.is_empty() {
        sink.skip(text, SkipReason::Empty);
        return Vec::new();
    }
    if CULTURE_DEFERRAL.is_match(&cleaned) {
        sink.skip(&cleaned, SkipReason::CultureDeferral);
        return Vec::new();
    }

    let mut remaining = cleaned.clone();
    for re in INSTRUCTIONAL.iter() {
        remaining = re.replace_all(&remaining, "; ").into_owned();
    }
    let remaining = tidy(&remaining);
    if remaining.is_empty() {
        sink.skip(&cleaned, SkipReason::Instructional);
        return Vec::new();
    }
    if CULTURE_DEFERRAL.is_match(&remaining) {
        sink.skip(&remaining, SkipReason::CultureDeferral);
        return Vec::new();
    }

    let unwrapped = PAREN_NOTE.replace_all(&remaining, " ").replace(['(', ')', '[', ']'], " ");

    let mut seen = BTreeSet::new();
    let mut records = Vec::new();
    for segment in CONNECTIVE.split(&unwrapped) {
        if tidy(segment).is_empty() {
            continue;
        }
        match clean_segment(segment) {
            Ok(drug) => {
                let name = canonical_antibiotic_name(&drug);
                if !seen.insert(name.clone()) {
                    continue;
                }
                let drug_class = spectrum_table()
                    .class_for(&name)
                    .unwrap_or(DEFAULT_DRUG_CLASS)
                    .to_string();
                debug!(antibiotic = %name, class = %drug_class, "therapy segment parsed");
                records.push(AntibioticRecord {
                    name,
                    drug_class,
                    conditions: BTreeSet::new(),
                    therapy_contexts: Vec::new(),
                });
            }
            Err(reason) => {
                debug!(segment = %segment.trim(), %reason, "therapy segment skipped");
                sink.skip(segment.trim(), reason);
            }
        }
    }
    records
}

/// Parse a therapy string into zero or more antibiotic records.
pub fn parse_therapy_string(text: &str) -> Vec<AntibioticRecord> {
    parse_therapy_string_traced(text, &mut NullSink)
}
