// Résumé normalization and template binding.
// Record → canonical document, template structure validation, layout
// resolution, and field edits flowing back toward the record.
// Everything here is synchronous and pure apart from the validator's log line.

pub mod canonical;
pub mod edit;
pub mod flatten;
pub mod normalize;
pub mod renderer;
pub mod structure;

use serde::Serialize;
use serde_json::Value;

use crate::models::record::ResumeRecord;

pub use canonical::CanonicalDocument;
pub use edit::{apply_edit, field_delta, Edit, EditError, EditInstruction, FieldDelta};
pub use flatten::to_canonical;
pub use renderer::{resolve_renderer, RendererVariant};
pub use structure::{validate_structure, TemplateStructure, ValidatedStructure};

/// A canonical document together with the template it renders with.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundDocument {
    pub document: CanonicalDocument,
    pub structure: TemplateStructure,
    pub used_default: bool,
    pub renderer: RendererVariant,
}

/// Validates the template structure (if any), flattens the record, and picks a
/// renderer. `None` means the résumé has no template attached.
pub fn bind(record: &ResumeRecord, structure: Option<&Value>) -> BoundDocument {
    let validated = match structure {
        Some(candidate) => validate_structure(candidate),
        None => ValidatedStructure::missing_template(),
    };
    let renderer = resolve_renderer(&validated.structure);
    BoundDocument {
        document: to_canonical(record),
        structure: validated.structure,
        used_default: validated.used_default,
        renderer,
    }
}
