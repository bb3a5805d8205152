//! Corpus loading: plain-text notes and structured patient records.
//!
//! `.txt` files are read verbatim. `.json` files are parsed as a structured
//! patient record and flattened into labeled free text, one fact per line, so
//! the chunker can treat both formats the same way downstream.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{RagError, Result};

/// A structured patient record, as exported by synthetic EHR generators.
///
/// All fields are optional except the name; missing fields are simply
/// omitted from the flattened text.
#[derive(Debug, Clone, Deserialize)]
pub struct PatientRecord {
    /// Patient display name.
    #[serde(default = "unknown_name")]
    pub name: String,
    /// Administrative gender.
    #[serde(default)]
    pub gender: Option<String>,
    /// Date of birth.
    #[serde(rename = "birthDate", default)]
    pub birth_date: Option<String>,
    /// Diagnosed conditions.
    #[serde(default)]
    pub conditions: Vec<CodedItem>,
    /// Active medications.
    #[serde(default)]
    pub medications: Vec<Medication>,
    /// Observations and lab results.
    #[serde(default)]
    pub observations: Vec<Observation>,
}

fn unknown_name() -> String {
    "Unknown".to_string()
}

/// A coded concept with a display text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodedItem {
    #[serde(default)]
    code: CodeText,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CodeText {
    #[serde(default)]
    text: String,
}

/// A medication entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Medication {
    #[serde(rename = "medicationCodeableConcept", default)]
    concept: CodeText,
}

/// An observation, optionally carrying a measured quantity.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Observation {
    #[serde(default)]
    code: CodeText,
    #[serde(rename = "valueQuantity", default)]
    value_quantity: Option<ValueQuantity>,
}

#[derive(Debug, Clone, Deserialize)]
struct ValueQuantity {
    #[serde(default)]
    value: Option<f64>,
    #[serde(default)]
    unit: Option<String>,
}

/// Flatten a structured patient record into labeled free text.
///
/// Layout: name and demographics first, then a labeled section per non-empty
/// category with one `- <text>` line per item. Observations with a measured
/// quantity render as `- <text>: <value> <unit>`.
pub fn flatten_record(record: &PatientRecord) -> String {
    let mut lines = vec![format!("Patient: {}", record.name)];

    if let Some(gender) = &record.gender {
        lines.push(format!("Gender: {gender}"));
    }
    if let Some(birth_date) = &record.birth_date {
        lines.push(format!("Birth Date: {birth_date}"));
    }

    if !record.conditions.is_empty() {
        lines.push("\nConditions:".to_string());
        for condition in &record.conditions {
            lines.push(format!("- {}", condition.code.text));
        }
    }

    if !record.medications.is_empty() {
        lines.push("\nMedications:".to_string());
        for medication in &record.medications {
            lines.push(format!("- {}", medication.concept.text));
        }
    }

    if !record.observations.is_empty() {
        lines.push("\nObservations:".to_string());
        for observation in &record.observations {
            let text = &observation.code.text;
            match &observation.value_quantity {
                Some(ValueQuantity { value: Some(value), unit: Some(unit) }) => {
                    lines.push(format!("- {text}: {value} {unit}"));
                }
                _ if !text.is_empty() => lines.push(format!("- {text}")),
                _ => {}
            }
        }
    }

    lines.join("\n")
}

/// Load corpus text from a `.txt` note or a `.json` patient record.
///
/// # Errors
///
/// - [`RagError::NotFound`] if the file does not exist.
/// - [`RagError::UnsupportedFormat`] for any other extension, or if the JSON
///   does not parse as a patient record.
pub fn load_corpus(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(RagError::NotFound(path.to_path_buf()));
    }

    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    debug!(path = %path.display(), extension, "loading corpus");

    match extension {
        "txt" => Ok(std::fs::read_to_string(path)?),
        "json" => {
            let raw = std::fs::read_to_string(path)?;
            let record: PatientRecord = serde_json::from_str(&raw).map_err(|e| {
                RagError::UnsupportedFormat(format!("invalid patient record JSON: {e}"))
            })?;
            Ok(flatten_record(&record))
        }
        other => Err(RagError::UnsupportedFormat(other.to_string())),
    }
}
