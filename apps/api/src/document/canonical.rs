//! The flat, template-agnostic document the editor and preview render.
//!
//! Every field is a plain string or primitive. Dates are display strings.
//! Array elements are `Arc`-shared so an edit can replace one element and
//! leave the others pointer-identical to the previous document.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalDocument {
    pub personal_info: PersonalInfo,
    pub summary: String,
    pub experience: Vec<Arc<ExperienceItem>>,
    pub education: Vec<Arc<EducationItem>>,
    pub skills: Vec<String>,
    pub projects: Vec<Arc<ProjectItem>>,
    pub certifications: Vec<Arc<CertificationItem>>,
    pub languages: Vec<Arc<LanguageItem>>,
    pub custom_sections: Vec<Arc<CustomSectionItem>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub website: String,
    pub linkedin: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceItem {
    pub title: String,
    pub company: String,
    pub location: String,
    pub start_date: String,
    /// Empty for current positions; the renderer decides how to show that.
    pub end_date: String,
    pub current: bool,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationItem {
    pub degree: String,
    pub institution: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectItem {
    pub title: String,
    pub description: String,
    pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificationItem {
    pub name: String,
    pub issuer: String,
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageItem {
    pub language: String,
    pub proficiency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomSectionItem {
    pub title: String,
    pub content: String,
}
