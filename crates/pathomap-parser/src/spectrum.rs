//! The antibiotic spectrum reference table.
//!
//! Process-wide constant data: each drug class with its member drugs, its
//! mechanism, and coarse coverage scores. Built once on first use and shared
//! read-only afterwards.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Serialize;

/// Coverage scores in `[0, 1]` against broad organism groups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coverage {
    pub gram_positive: f64,
    pub gram_negative: f64,
    pub anaerobic: f64,
    pub atypical: f64,
}

impl Coverage {
    const fn new(gram_positive: f64, gram_negative: f64, anaerobic: f64, atypical: f64) -> Self {
        Self { gram_positive, gram_negative, anaerobic, atypical }
    }

    /// Mean coverage across the four groups.
    pub fn breadth(&self) -> f64 {
        (self.gram_positive + self.gram_negative + self.anaerobic + self.atypical) / 4.0
    }
}

/// One drug class in the reference table.
#[derive(Debug, Clone, Serialize)]
pub struct DrugClassEntry {
    pub class: &'static str,
    pub mechanism: &'static str,
    /// Member drugs in their canonical spelling.
    pub members: &'static [&'static str],
    pub coverage: Coverage,
}

/// Lookup structure over the reference entries.
#[derive(Debug)]
pub struct SpectrumTable {
    entries: Vec<DrugClassEntry>,
    /// Lowercased member name → (entry index, canonical spelling).
    by_drug: HashMap<String, (usize, &'static str)>,
}

static SPECTRUM_TABLE: Lazy<SpectrumTable> = Lazy::new(|| SpectrumTable::from_entries(reference_entries()));

/// The shared reference table.
pub fn spectrum_table() -> &'static SpectrumTable {
    &SPECTRUM_TABLE
}

impl SpectrumTable {
    fn from_entries(entries: Vec<DrugClassEntry>) -> Self {
        let mut by_drug = HashMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            for member in entry.members {
                by_drug.entry(member.to_lowercase()).or_insert((idx, *member));
            }
        }
        Self { entries, by_drug }
    }

    pub fn entries(&self) -> &[DrugClassEntry] {
        &self.entries
    }

    /// Look up a class by label, case-insensitively.
    pub fn entry(&self, class: &str) -> Option<&DrugClassEntry> {
        self.entries.iter().find(|e| e.class.eq_ignore_ascii_case(class))
    }

    /// Resolve the drug class of a canonical antibiotic name.
    ///
    /// Exact membership first; otherwise the longest member that the name
    /// starts with as a whole word ("Penicillin G benzathine" → Penicillins).
    pub fn class_for(&self, drug: &str) -> Option<&'static str> {
        self.resolve(drug).map(|(idx, _)| self.entries[idx].class)
    }

    /// The table's own spelling of a member drug, if it is one.
    pub fn canonical_spelling(&self, drug: &str) -> Option<&'static str> {
        self.by_drug.get(&drug.trim().to_lowercase()).map(|(_, spelling)| *spelling)
    }

    pub fn coverage_breadth(&self, class: &str) -> Option<f64> {
        self.entry(class).map(|e| e.coverage.breadth())
    }

    fn resolve(&self, drug: &str) -> Option<(usize, &'static str)> {
        let lowered = drug.trim().to_lowercase();
        if let Some(hit) = self.by_drug.get(&lowered) {
            return Some(*hit);
        }
        self.by_drug
            .iter()
            .filter(|(member, _)| {
                lowered.len() > member.len()
                    && lowered.starts_with(member.as_str())
                    && lowered[member.len()..].starts_with(' ')
            })
            .max_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| b.cmp(a)))
            .map(|(_, hit)| *hit)
    }
}

fn reference_entries() -> Vec<DrugClassEntry> {
    vec![
        DrugClassEntry {
            class: "Penicillins",
            mechanism: "cell wall synthesis",
            members: &[
                "Penicillin G", "Penicillin V", "Penicillin", "Amoxicillin", "Ampicillin",
                "Nafcillin", "Oxacillin", "Dicloxacillin", "Piperacillin",
                "Benzathine penicillin G",
            ],
            coverage: Coverage::new(0.7, 0.3, 0.3, 0.0),
        },
        DrugClassEntry {
            class: "Beta-lactam/beta-lactamase inhibitors",
            mechanism: "cell wall synthesis",
            members: &[
                "Ampicillin/sulbactam", "Amoxicillin/clavulanate", "Piperacillin/tazobactam",
                "Ceftazidime/avibactam", "Ceftolozane/tazobactam", "Meropenem/vaborbactam",
            ],
            coverage: Coverage::new(0.8, 0.8, 0.9, 0.0),
        },
        DrugClassEntry {
            class: "Cephalosporins",
            mechanism: "cell wall synthesis",
            members: &[
                "Cefazolin", "Cephalexin", "Cefadroxil", "Cefuroxime", "Cefoxitin",
                "Cefotetan", "Ceftriaxone", "Cefotaxime", "Ceftazidime", "Cefepime",
                "Ceftaroline", "Cefdinir", "Cefpodoxime", "Cefixime", "Cefiderocol",
            ],
            coverage: Coverage::new(0.7, 0.7, 0.1, 0.0),
        },
        DrugClassEntry {
            class: "Carbapenems",
            mechanism: "cell wall synthesis",
            members: &["Meropenem", "Imipenem", "Imipenem/cilastatin", "Ertapenem", "Doripenem"],
            coverage: Coverage::new(0.8, 0.9, 0.9, 0.0),
        },
        DrugClassEntry {
            class: "Monobactams",
            mechanism: "cell wall synthesis",
            members: &["Aztreonam"],
            coverage: Coverage::new(0.0, 0.8, 0.0, 0.0),
        },
        DrugClassEntry {
            class: "Glycopeptides",
            mechanism: "cell wall synthesis",
            members: &["Vancomycin", "Teicoplanin", "Telavancin", "Dalbavancin", "Oritavancin"],
            coverage: Coverage::new(0.9, 0.0, 0.2, 0.0),
        },
        DrugClassEntry {
            class: "Lipopeptides",
            mechanism: "membrane depolarization",
            members: &["Daptomycin"],
            coverage: Coverage::new(0.9, 0.0, 0.0, 0.0),
        },
        DrugClassEntry {
            class: "Oxazolidinones",
            mechanism: "protein synthesis (50S)",
            members: &["Linezolid", "Tedizolid"],
            coverage: Coverage::new(0.9, 0.0, 0.1, 0.1),
        },
        DrugClassEntry {
            class: "Aminoglycosides",
            mechanism: "protein synthesis (30S)",
            members: &["Gentamicin", "Tobramycin", "Amikacin", "Streptomycin"],
            coverage: Coverage::new(0.2, 0.9, 0.0, 0.0),
        },
        DrugClassEntry {
            class: "Fluoroquinolones",
            mechanism: "DNA gyrase inhibition",
            members: &["Ciprofloxacin", "Levofloxacin", "Moxifloxacin", "Delafloxacin"],
            coverage: Coverage::new(0.5, 0.8, 0.2, 0.8),
        },
        DrugClassEntry {
            class: "Macrolides",
            mechanism: "protein synthesis (50S)",
            members: &["Azithromycin", "Clarithromycin", "Erythromycin", "Fidaxomicin"],
            coverage: Coverage::new(0.5, 0.2, 0.1, 0.9),
        },
        DrugClassEntry {
            class: "Tetracyclines",
            mechanism: "protein synthesis (30S)",
            members: &["Doxycycline", "Minocycline", "Tetracycline", "Tigecycline", "Omadacycline"],
            coverage: Coverage::new(0.6, 0.4, 0.3, 0.9),
        },
        DrugClassEntry {
            class: "Lincosamides",
            mechanism: "protein synthesis (50S)",
            members: &["Clindamycin"],
            coverage: Coverage::new(0.7, 0.0, 0.7, 0.0),
        },
        DrugClassEntry {
            class: "Nitroimidazoles",
            mechanism: "DNA damage",
            members: &["Metronidazole", "Tinidazole"],
            coverage: Coverage::new(0.0, 0.0, 1.0, 0.0),
        },
        DrugClassEntry {
            class: "Sulfonamides",
            mechanism: "folate synthesis",
            members: &["Trimethoprim/sulfamethoxazole", "Sulfadiazine"],
            coverage: Coverage::new(0.5, 0.6, 0.0, 0.0),
        },
        DrugClassEntry {
            class: "Polymyxins",
            mechanism: "membrane disruption",
            members: &["Colistin", "Polymyxin B"],
            coverage: Coverage::new(0.0, 0.8, 0.0, 0.0),
        },
        DrugClassEntry {
            class: "Rifamycins",
            mechanism: "RNA polymerase inhibition",
            members: &["Rifampin", "Rifampicin", "Rifabutin", "Rifaximin"],
            coverage: Coverage::new(0.6, 0.2, 0.1, 0.3),
        },
        DrugClassEntry {
            class: "Antimycobacterials",
            mechanism: "mycolic acid / cell wall synthesis",
            members: &["Isoniazid", "Pyrazinamide", "Ethambutol", "Bedaquiline"],
            coverage: Coverage::new(0.0, 0.0, 0.0, 0.2),
        },
        DrugClassEntry {
            class: "Nitrofurans",
            mechanism: "DNA damage",
            members: &["Nitrofurantoin"],
            coverage: Coverage::new(0.4, 0.4, 0.0, 0.0),
        },
        DrugClassEntry {
            class: "Phosphonic acids",
            mechanism: "cell wall synthesis",
            members: &["Fosfomycin"],
            coverage: Coverage::new(0.4, 0.5, 0.0, 0.0),
        },
        DrugClassEntry {
            class: "Antifungals",
            mechanism: "ergosterol / glucan synthesis",
            members: &[
                "Fluconazole", "Voriconazole", "Itraconazole", "Posaconazole", "Isavuconazole",
                "Amphotericin B", "Liposomal amphotericin B", "Micafungin", "Caspofungin",
                "Anidulafungin", "Flucytosine", "Nystatin",
            ],
            coverage: Coverage::new(0.0, 0.0, 0.0, 0.0),
        },
        DrugClassEntry {
            class: "Antivirals",
            mechanism: "viral replication",
            members: &[
                "Acyclovir", "Valacyclovir", "Ganciclovir", "Valganciclovir", "Foscarnet",
                "Oseltamivir", "Baloxavir",
            ],
            coverage: Coverage::new(0.0, 0.0, 0.0, 0.0),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_exact_members_case_insensitively() {
        let table = spectrum_table();
        assert_eq!(table.class_for("Vancomycin"), Some("Glycopeptides"));
        assert_eq!(table.class_for("linezolid"), Some("Oxazolidinones"));
        assert_eq!(table.class_for("AMPICILLIN/SULBACTAM"), Some("Beta-lactam/beta-lactamase inhibitors"));
    }

    #[test]
    fn resolves_longest_whole_word_prefix() {
        let table = spectrum_table();
        assert_eq!(table.class_for("Penicillin G benzathine"), Some("Penicillins"));
        assert_eq!(table.class_for("Amphotericin B deoxycholate"), Some("Antifungals"));
        // "Cefazolinx" is not a whole-word extension of "Cefazolin".
        assert_eq!(table.class_for("Cefazolinx"), None);
    }

    #[test]
    fn unknown_drug_has_no_class() {
        assert_eq!(spectrum_table().class_for("Unobtainium"), None);
    }

    #[test]
    fn canonical_spelling_comes_from_table() {
        let table = spectrum_table();
        assert_eq!(table.canonical_spelling("polymyxin b"), Some("Polymyxin B"));
        assert_eq!(table.canonical_spelling("Something else"), None);
    }

    #[test]
    fn every_member_belongs_to_exactly_one_class() {
        let table = spectrum_table();
        let mut seen = std::collections::HashSet::new();
        for entry in table.entries() {
            for member in entry.members {
                assert!(seen.insert(member.to_lowercase()), "duplicate member {member}");
            }
        }
    }

    #[test]
    fn breadth_is_mean_of_coverage() {
        let breadth = spectrum_table().coverage_breadth("Nitroimidazoles").unwrap();
        assert!((breadth - 0.25).abs() < 1e-9, "got {breadth}");
    }
}
