//! Persistence boundary for the editor.
//!
//! The engine never talks to storage directly; it reads a `ResumeRecord` and a
//! template through this trait and hands back `FieldDelta`s. `AppState` holds
//! an `Arc<dyn ResumeStore>` chosen at startup.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::document::FieldDelta;
use crate::models::record::ResumeRecord;
use crate::models::template::TemplateRow;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("resume {0} not found")]
    ResumeNotFound(Uuid),

    #[error("template {0} not found")]
    TemplateNotFound(Uuid),

    #[error("no {section} entry at position {index}")]
    EntryNotFound { section: &'static str, index: usize },

    #[error("field '{field}' cannot be written on {section}")]
    UnknownField { section: &'static str, field: String },

    #[error("invalid value for '{field}': {value}")]
    InvalidValue { field: String, value: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Loads the résumé with whatever sub-collections exist.
    async fn load_record(&self, resume_id: Uuid) -> Result<ResumeRecord, StoreError>;

    async fn load_template(&self, template_id: Uuid) -> Result<TemplateRow, StoreError>;

    /// Writes one field. No version check: the last write to land wins.
    async fn apply_delta(&self, resume_id: Uuid, delta: &FieldDelta) -> Result<(), StoreError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Delta value readers shared by the store backends
// ────────────────────────────────────────────────────────────────────────────

fn invalid(delta: &FieldDelta) -> StoreError {
    StoreError::InvalidValue {
        field: delta.field.clone(),
        value: delta.value.to_string(),
    }
}

/// Text column. `null` and `""` both clear it.
pub fn delta_text(delta: &FieldDelta) -> Result<Option<String>, StoreError> {
    match &delta.value {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        _ => Err(invalid(delta)),
    }
}

/// Date column. Only ISO dates are accepted; the edit path has already turned
/// display dates into ISO where it could.
pub fn delta_date(delta: &FieldDelta) -> Result<Option<NaiveDate>, StoreError> {
    match &delta.value {
        Value::Null => Ok(None),
        Value::String(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| invalid(delta)),
        _ => Err(invalid(delta)),
    }
}

pub fn delta_bool(delta: &FieldDelta) -> Result<bool, StoreError> {
    delta.value.as_bool().ok_or_else(|| invalid(delta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::normalize::RecordSection;
    use serde_json::json;

    fn delta(field: &str, value: Value) -> FieldDelta {
        FieldDelta {
            section: RecordSection::Experiences,
            index: Some(0),
            field: field.to_string(),
            value,
        }
    }

    #[test]
    fn test_delta_text() {
        assert_eq!(delta_text(&delta("company", json!("Acme"))).unwrap(), Some("Acme".into()));
        assert_eq!(delta_text(&delta("company", json!(""))).unwrap(), None);
        assert_eq!(delta_text(&delta("company", Value::Null)).unwrap(), None);
        assert!(delta_text(&delta("company", json!(3))).is_err());
    }

    #[test]
    fn test_delta_date() {
        assert_eq!(
            delta_date(&delta("startDate", json!("2020-01-01"))).unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 1)
        );
        assert_eq!(delta_date(&delta("startDate", Value::Null)).unwrap(), None);
        assert!(matches!(
            delta_date(&delta("startDate", json!("Ja"))),
            Err(StoreError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_delta_bool() {
        assert!(delta_bool(&delta("isCurrent", json!(true))).unwrap());
        assert!(delta_bool(&delta("isCurrent", json!("true"))).is_err());
    }
}
