//! Template structure validation.
//!
//! A template's `structure` column is free-form JSON. It is validated exactly
//! once, here, and anything that fails is replaced whole by
//! [`TemplateStructure::default`]. A malformed template never blocks rendering
//! or editing; the failure only shows up in the logs and in `used_default`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Standard,
    Split,
    Creative,
    Minimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateStructure {
    pub font_family: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub sections: Vec<String>,
    pub layout: Layout,
}

impl Default for TemplateStructure {
    fn default() -> Self {
        Self {
            font_family: "Inter".to_string(),
            primary_color: "#0f172a".to_string(),
            secondary_color: "#6366f1".to_string(),
            sections: ["summary", "experience", "education", "skills"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            layout: Layout::Standard,
        }
    }
}

/// A structure that is guaranteed valid, plus whether it is the fallback.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedStructure {
    pub structure: TemplateStructure,
    pub used_default: bool,
}

impl ValidatedStructure {
    /// For résumés with no template attached. Not a validation failure.
    pub fn missing_template() -> Self {
        debug!("No template attached; using default structure");
        Self {
            structure: TemplateStructure::default(),
            used_default: true,
        }
    }
}

/// Validates a candidate structure, falling back to the default on any failure.
///
/// Every field must be present with the right type and `layout` must be one of
/// the four known values. Extra keys are ignored.
pub fn validate_structure(candidate: &Value) -> ValidatedStructure {
    match TemplateStructure::deserialize(candidate) {
        Ok(structure) => ValidatedStructure {
            structure,
            used_default: false,
        },
        Err(e) => {
            warn!("Template structure failed validation, using default: {e}");
            ValidatedStructure {
                structure: TemplateStructure::default(),
                used_default: true,
            }
        }
    }
}
