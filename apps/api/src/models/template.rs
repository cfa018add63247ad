use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A template as stored. `structure` is unvalidated until it passes through
/// `document::structure::validate_structure`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TemplateRow {
    pub id: Uuid,
    pub name: String,
    pub structure: Value,
}
