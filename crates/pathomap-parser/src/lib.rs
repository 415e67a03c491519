//! # pathomap-parser
//!
//! Entity extraction over loosely structured clinical text.
//!
//! ## Overview
//!
//! Two pure entry points turn raw fragments into typed records:
//!
//! - [`parse_pathogen_mention`] — one mention → at most one [`PathogenRecord`]
//! - [`parse_therapy_string`] — one therapy string → zero or more
//!   [`AntibioticRecord`]s
//!
//! Both drop anything they cannot classify rather than failing. The
//! `classify_*` / `*_traced` variants report why a fragment was dropped so
//! callers can build a data-quality report.
//!
//! Drug classes come from the static [`spectrum::SpectrumTable`].
//!
//! ## Classification
//!
//! Pathogen classification walks an ordered rule table and the first
//! matching rule wins: mycobacteria, virus and fungal markers, then atypical
//! organisms, then gram-positive and gram-negative genus roots.
//!
//! [`PathogenRecord`]: pathomap_contracts::entity::PathogenRecord
//! [`AntibioticRecord`]: pathomap_contracts::entity::AntibioticRecord

pub mod pathogen;
pub mod spectrum;
pub mod therapy;
mod text;

pub use pathogen::{classify_name, classify_pathogen_mention, parse_pathogen_mention, Classification};
pub use spectrum::{spectrum_table, Coverage, DrugClassEntry, SpectrumTable};
pub use therapy::{canonical_antibiotic_name, parse_therapy_string, parse_therapy_string_traced};
