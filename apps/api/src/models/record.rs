//! The persisted, relational shape of one résumé.
//!
//! Every sub-collection is optional: `None` means the persistence layer has not
//! populated it yet, `Some(vec![])` means it is populated and empty. Both flatten
//! to the same canonical output.
#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeStatus {
    Draft,
    Published,
}

/// A date as the persistence layer hands it over: a typed date, a timestamp,
/// epoch milliseconds (a serialized JS `Date`), or free text from a form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Millis(i64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub template_id: Option<Uuid>,
    #[serde(default)]
    pub is_public: bool,
    pub status: ResumeStatus,
    pub contact_info: Option<ContactInfo>,
    pub summary: Option<Summary>,
    pub experiences: Option<Vec<Experience>>,
    pub educations: Option<Vec<Education>>,
    pub skills: Option<Vec<SkillGroup>>,
    pub projects: Option<Vec<Project>>,
    pub certifications: Option<Vec<Certification>>,
    pub languages: Option<Vec<Language>>,
    pub custom_sections: Option<Vec<CustomSection>>,
}

impl ResumeRecord {
    /// A freshly created draft with nothing populated.
    pub fn empty(id: Uuid, user_id: Uuid, title: impl Into<String>) -> Self {
        Self {
            id,
            user_id,
            title: title.into(),
            template_id: None,
            is_public: false,
            status: ResumeStatus::Draft,
            contact_info: None,
            summary: None,
            experiences: None,
            educations: None,
            skills: None,
            projects: None,
            certifications: None,
            languages: None,
            custom_sections: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub website_url: Option<String>,
    pub linkedin_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<DateValue>,
    pub end_date: Option<DateValue>,
    pub is_current: Option<bool>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub degree: Option<String>,
    pub institution: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<DateValue>,
    pub end_date: Option<DateValue>,
    pub description: Option<String>,
}

/// A named group of skills ("Languages", "Infrastructure", ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillGroup {
    pub name: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    pub name: Option<String>,
    pub issuer: Option<String>,
    pub issue_date: Option<DateValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub language: Option<String>,
    pub proficiency: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomSection {
    pub title: Option<String>,
    pub content: Option<String>,
}
