//! The external condition record.
//!
//! Conditions are owned by the surrounding application and handed to the
//! index builder as a read-only snapshot. Every field is optional on the wire:
//! absent or `null` fields deserialize to empty values, and list entries that
//! are not strings are kept as [`RawText::Other`] so the index builder can
//! report them instead of failing the whole document.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A single free-text value as it appears in the source dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawText {
    /// A textual fragment, the expected shape.
    Text(String),
    /// Anything else (numbers, objects, nested arrays).
    Other(serde_json::Value),
}

impl RawText {
    /// Return the textual content, or `None` for non-text values.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawText::Text(s) => Some(s.as_str()),
            RawText::Other(_) => None,
        }
    }
}

impl fmt::Display for RawText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawText::Text(s) => f.write_str(s),
            RawText::Other(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for RawText {
    fn from(s: &str) -> Self {
        RawText::Text(s.to_string())
    }
}

impl From<String> for RawText {
    fn from(s: String) -> Self {
        RawText::Text(s)
    }
}

/// A clinical syndrome entry with its pathogens and therapy guidance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Raw pathogen mentions, e.g. `"Staphylococcus aureus (MRSA)"`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub common_pathogens: Vec<RawText>,
    /// Therapy-context label (e.g. `"Standard"`, `"Severe PCN allergy"`) to
    /// raw therapy text.
    #[serde(default, deserialize_with = "null_as_default")]
    pub empiric_therapy: BTreeMap<String, RawText>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: Option<String>,
}

impl Condition {
    /// Start a condition with the given identity and no pathogens or therapy.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_pathogen(mut self, mention: impl Into<RawText>) -> Self {
        self.common_pathogens.push(mention.into());
        self
    }

    pub fn with_therapy(mut self, context: impl Into<String>, therapy: impl Into<RawText>) -> Self {
        self.empiric_therapy.insert(context.into(), therapy.into());
        self
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Deserialize `null` the same way as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
