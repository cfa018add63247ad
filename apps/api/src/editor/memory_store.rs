#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use crate::document::normalize::RecordSection;
use crate::document::FieldDelta;
use crate::editor::store::{delta_bool, delta_date, delta_text, ResumeStore, StoreError};
use crate::models::record::{DateValue, ResumeRecord};
use crate::models::template::TemplateRow;

/// Contents of a seed file for running without a database.
#[derive(Debug, Deserialize)]
struct Seed {
    #[serde(default)]
    records: Vec<ResumeRecord>,
    #[serde(default)]
    templates: Vec<TemplateRow>,
}

#[derive(Default)]
struct Inner {
    records: HashMap<Uuid, ResumeRecord>,
    templates: HashMap<Uuid, TemplateRow>,
    simulate_write_error: bool,
}

/// In-process store. Used when no database is configured, and in tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a JSON seed: `{"records": [...], "templates": [...]}`.
    pub fn from_seed_json(json: &str) -> Result<Self, serde_json::Error> {
        let seed: Seed = serde_json::from_str(json)?;
        let store = Self::new();
        for record in seed.records {
            store.insert_record(record);
        }
        for template in seed.templates {
            store.insert_template(template);
        }
        Ok(store)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn insert_record(&self, record: ResumeRecord) {
        self.lock().records.insert(record.id, record);
    }

    pub fn insert_template(&self, template: TemplateRow) {
        self.lock().templates.insert(template.id, template);
    }

    /// Current stored copy, for asserting what saves did.
    pub fn record(&self, resume_id: Uuid) -> Option<ResumeRecord> {
        self.lock().records.get(&resume_id).cloned()
    }

    /// Makes every following `apply_delta` fail until switched off.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.lock().simulate_write_error = simulate;
    }
}

#[async_trait]
impl ResumeStore for MemoryStore {
    async fn load_record(&self, resume_id: Uuid) -> Result<ResumeRecord, StoreError> {
        self.record(resume_id)
            .ok_or(StoreError::ResumeNotFound(resume_id))
    }

    async fn load_template(&self, template_id: Uuid) -> Result<TemplateRow, StoreError> {
        self.lock()
            .templates
            .get(&template_id)
            .cloned()
            .ok_or(StoreError::TemplateNotFound(template_id))
    }

    async fn apply_delta(&self, resume_id: Uuid, delta: &FieldDelta) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.simulate_write_error {
            return Err(StoreError::Unavailable("Simulated write error".to_string()));
        }
        let record = inner
            .records
            .get_mut(&resume_id)
            .ok_or(StoreError::ResumeNotFound(resume_id))?;
        apply_to_record(record, delta)
    }
}

fn unknown(delta: &FieldDelta) -> StoreError {
    StoreError::UnknownField {
        section: delta.section.as_str(),
        field: delta.field.clone(),
    }
}

fn entry<'a, T>(
    items: &'a mut Option<Vec<T>>,
    delta: &FieldDelta,
) -> Result<&'a mut T, StoreError> {
    let index = delta.index.unwrap_or(0);
    items
        .as_mut()
        .and_then(|items| items.get_mut(index))
        .ok_or(StoreError::EntryNotFound {
            section: delta.section.as_str(),
            index,
        })
}

fn date(delta: &FieldDelta) -> Result<Option<DateValue>, StoreError> {
    Ok(delta_date(delta)?.map(DateValue::Date))
}

/// Writes one delta into the record, creating singular sections on first write.
fn apply_to_record(record: &mut ResumeRecord, delta: &FieldDelta) -> Result<(), StoreError> {
    let field = delta.field.as_str();
    match delta.section {
        RecordSection::ContactInfo => {
            let c = record.contact_info.get_or_insert_with(Default::default);
            let slot = match field {
                "fullName" => &mut c.full_name,
                "email" => &mut c.email,
                "phone" => &mut c.phone,
                "location" => &mut c.location,
                "websiteUrl" => &mut c.website_url,
                "linkedinUrl" => &mut c.linkedin_url,
                _ => return Err(unknown(delta)),
            };
            *slot = delta_text(delta)?;
        }
        RecordSection::Summary => {
            if field != "content" {
                return Err(unknown(delta));
            }
            record.summary.get_or_insert_with(Default::default).content = delta_text(delta)?;
        }
        RecordSection::Experiences => {
            let e = entry(&mut record.experiences, delta)?;
            match field {
                "startDate" => e.start_date = date(delta)?,
                "endDate" => e.end_date = date(delta)?,
                "isCurrent" => {
                    let current = delta_bool(delta)?;
                    e.is_current = Some(current);
                    if current {
                        e.end_date = None;
                    }
                }
                _ => {
                    let slot = match field {
                        "jobTitle" => &mut e.job_title,
                        "company" => &mut e.company,
                        "location" => &mut e.location,
                        "description" => &mut e.description,
                        _ => return Err(unknown(delta)),
                    };
                    *slot = delta_text(delta)?;
                }
            }
        }
        RecordSection::Educations => {
            let e = entry(&mut record.educations, delta)?;
            match field {
                "startDate" => e.start_date = date(delta)?,
                "endDate" => e.end_date = date(delta)?,
                _ => {
                    let slot = match field {
                        "degree" => &mut e.degree,
                        "institution" => &mut e.institution,
                        "location" => &mut e.location,
                        "description" => &mut e.description,
                        _ => return Err(unknown(delta)),
                    };
                    *slot = delta_text(delta)?;
                }
            }
        }
        RecordSection::Projects => {
            let p = entry(&mut record.projects, delta)?;
            let slot = match field {
                "name" => &mut p.name,
                "description" => &mut p.description,
                "url" => &mut p.url,
                _ => return Err(unknown(delta)),
            };
            *slot = delta_text(delta)?;
        }
        RecordSection::Certifications => {
            let c = entry(&mut record.certifications, delta)?;
            match field {
                "issueDate" => c.issue_date = date(delta)?,
                "name" => c.name = delta_text(delta)?,
                "issuer" => c.issuer = delta_text(delta)?,
                _ => return Err(unknown(delta)),
            }
        }
        RecordSection::Languages => {
            let l = entry(&mut record.languages, delta)?;
            let slot = match field {
                "language" => &mut l.language,
                "proficiency" => &mut l.proficiency,
                _ => return Err(unknown(delta)),
            };
            *slot = delta_text(delta)?;
        }
        RecordSection::CustomSections => {
            let s = entry(&mut record.custom_sections, delta)?;
            let slot = match field {
                "title" => &mut s.title,
                "content" => &mut s.content,
                _ => return Err(unknown(delta)),
            };
            *slot = delta_text(delta)?;
        }
    }
    Ok(())
}
