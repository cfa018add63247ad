//! Edit dispatch: canonical document + one field edit → new canonical document.
//!
//! Editors send a loosely-typed [`EditInstruction`]. It is parsed once into the
//! closed [`Edit`] union, so the dispatcher itself has no "unknown section"
//! case. The only runtime no-op left is an out-of-range array index.
#![allow(dead_code)]

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::document::canonical::{
    CanonicalDocument, CertificationItem, CustomSectionItem, EducationItem, ExperienceItem,
    LanguageItem, PersonalInfo, ProjectItem,
};
use crate::document::normalize::{map_field_name, parse_display_date, RecordSection};

// ────────────────────────────────────────────────────────────────────────────
// Wire shape
// ────────────────────────────────────────────────────────────────────────────

/// A single edit event as an editor surface sends it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditInstruction {
    pub section: String,
    #[serde(default)]
    pub index: usize,
    pub field: String,
    pub value: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum EditError {
    #[error("unknown section '{0}'")]
    UnknownSection(String),

    #[error("unknown field '{field}' for section '{section}'")]
    UnknownField { section: String, field: String },

    #[error("invalid value for '{field}': expected true or false, got '{value}'")]
    InvalidBool { field: String, value: String },
}

// ────────────────────────────────────────────────────────────────────────────
// Typed fields
// ────────────────────────────────────────────────────────────────────────────

macro_rules! ui_fields {
    ($name:ident { $($variant:ident => $ui:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $ui),+
                }
            }

            pub fn parse(ui: &str) -> Option<Self> {
                match ui {
                    $($ui => Some($name::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

ui_fields!(PersonalInfoField {
    Name => "name",
    Email => "email",
    Phone => "phone",
    Location => "location",
    Website => "website",
    Linkedin => "linkedin",
});

ui_fields!(ExperienceField {
    Title => "title",
    Company => "company",
    Location => "location",
    StartDate => "startDate",
    EndDate => "endDate",
    Current => "current",
    Description => "description",
});

ui_fields!(EducationField {
    Degree => "degree",
    Institution => "institution",
    Location => "location",
    StartDate => "startDate",
    EndDate => "endDate",
    Description => "description",
});

ui_fields!(ProjectField {
    Title => "title",
    Description => "description",
    Link => "link",
});

ui_fields!(CertificationField {
    Name => "name",
    Issuer => "issuer",
    Date => "date",
});

ui_fields!(LanguageField {
    Language => "language",
    Proficiency => "proficiency",
});

ui_fields!(CustomSectionField {
    Title => "title",
    Content => "content",
});

/// A field inside one element of an array-valued section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    Experience(ExperienceField),
    Education(EducationField),
    Project(ProjectField),
    Certification(CertificationField),
    Language(LanguageField),
    CustomSection(CustomSectionField),
}

impl ItemField {
    pub fn section(&self) -> RecordSection {
        match self {
            ItemField::Experience(_) => RecordSection::Experiences,
            ItemField::Education(_) => RecordSection::Educations,
            ItemField::Project(_) => RecordSection::Projects,
            ItemField::Certification(_) => RecordSection::Certifications,
            ItemField::Language(_) => RecordSection::Languages,
            ItemField::CustomSection(_) => RecordSection::CustomSections,
        }
    }

    pub fn ui_name(&self) -> &'static str {
        match self {
            ItemField::Experience(f) => f.as_str(),
            ItemField::Education(f) => f.as_str(),
            ItemField::Project(f) => f.as_str(),
            ItemField::Certification(f) => f.as_str(),
            ItemField::Language(f) => f.as_str(),
            ItemField::CustomSection(f) => f.as_str(),
        }
    }

    fn kind(&self) -> ValueKind {
        match self {
            ItemField::Experience(ExperienceField::Current) => ValueKind::Bool,
            ItemField::Experience(ExperienceField::StartDate | ExperienceField::EndDate)
            | ItemField::Education(EducationField::StartDate | EducationField::EndDate)
            | ItemField::Certification(CertificationField::Date) => ValueKind::Date,
            _ => ValueKind::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Text,
    Date,
    Bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayFieldEdit {
    pub index: usize,
    pub field: ItemField,
    pub value: String,
}

/// A validated edit.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    PersonalInfo {
        field: PersonalInfoField,
        value: String,
    },
    Summary {
        value: String,
    },
    ArrayField(ArrayFieldEdit),
}

impl TryFrom<EditInstruction> for Edit {
    type Error = EditError;

    fn try_from(instr: EditInstruction) -> Result<Self, Self::Error> {
        let EditInstruction {
            section,
            index,
            field,
            value,
        } = instr;

        let unknown_field = || EditError::UnknownField {
            section: section.clone(),
            field: field.clone(),
        };

        let item_field = match section.as_str() {
            "personalInfo" => {
                let field = PersonalInfoField::parse(&field).ok_or_else(unknown_field)?;
                return Ok(Edit::PersonalInfo { field, value });
            }
            // The summary is a single string; index and field are ignored.
            "summary" => return Ok(Edit::Summary { value }),
            "experience" => ExperienceField::parse(&field).map(ItemField::Experience),
            "education" => EducationField::parse(&field).map(ItemField::Education),
            "projects" => ProjectField::parse(&field).map(ItemField::Project),
            "certifications" => CertificationField::parse(&field).map(ItemField::Certification),
            "languages" => LanguageField::parse(&field).map(ItemField::Language),
            "customSections" => CustomSectionField::parse(&field).map(ItemField::CustomSection),
            _ => return Err(EditError::UnknownSection(section)),
        }
        .ok_or_else(unknown_field)?;

        if item_field.kind() == ValueKind::Bool && parse_bool(&value).is_none() {
            return Err(EditError::InvalidBool { field, value });
        }

        Ok(Edit::ArrayField(ArrayFieldEdit {
            index,
            field: item_field,
            value,
        }))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Dispatch
// ────────────────────────────────────────────────────────────────────────────

/// Applies an edit and returns a new document. `doc` is left untouched.
///
/// Array edits clone only the targeted element; every other element is the
/// same `Arc` as in `doc`. An index past the end of the array is a no-op and
/// the returned document equals `doc`. This hides editor bugs that send a
/// stale index, in exchange for an editor that never crashes on one.
pub fn apply_edit(doc: &CanonicalDocument, edit: &Edit) -> CanonicalDocument {
    let mut next = doc.clone();
    match edit {
        Edit::PersonalInfo { field, value } => {
            set_personal_info(&mut next.personal_info, *field, value.clone());
        }
        Edit::Summary { value } => next.summary = value.clone(),
        Edit::ArrayField(ArrayFieldEdit {
            index,
            field,
            value,
        }) => {
            let (index, value) = (*index, value.as_str());
            match *field {
                ItemField::Experience(f) => {
                    replace_at(&mut next.experience, index, |e| set_experience(e, f, value))
                }
                ItemField::Education(f) => {
                    replace_at(&mut next.education, index, |e| set_education(e, f, value))
                }
                ItemField::Project(f) => {
                    replace_at(&mut next.projects, index, |p| set_project(p, f, value))
                }
                ItemField::Certification(f) => replace_at(&mut next.certifications, index, |c| {
                    set_certification(c, f, value)
                }),
                ItemField::Language(f) => {
                    replace_at(&mut next.languages, index, |l| set_language(l, f, value))
                }
                ItemField::CustomSection(f) => replace_at(&mut next.custom_sections, index, |s| {
                    set_custom_section(s, f, value)
                }),
            }
        }
    }
    next
}

/// Parses and applies a wire instruction in one step.
pub fn apply_instruction(
    doc: &CanonicalDocument,
    instr: EditInstruction,
) -> Result<CanonicalDocument, EditError> {
    let edit = Edit::try_from(instr)?;
    Ok(apply_edit(doc, &edit))
}

/// Swaps in an updated copy of `items[index]`. Out of range leaves `items` as is.
fn replace_at<T: Clone>(items: &mut [Arc<T>], index: usize, update: impl FnOnce(&mut T)) {
    if let Some(slot) = items.get_mut(index) {
        let mut item = T::clone(slot);
        update(&mut item);
        *slot = Arc::new(item);
    }
}

fn set_personal_info(info: &mut PersonalInfo, field: PersonalInfoField, value: String) {
    let slot = match field {
        PersonalInfoField::Name => &mut info.name,
        PersonalInfoField::Email => &mut info.email,
        PersonalInfoField::Phone => &mut info.phone,
        PersonalInfoField::Location => &mut info.location,
        PersonalInfoField::Website => &mut info.website,
        PersonalInfoField::Linkedin => &mut info.linkedin,
    };
    *slot = value;
}

fn set_experience(item: &mut ExperienceItem, field: ExperienceField, value: &str) {
    let slot = match field {
        // A current role has no end date; the stores clear it alongside.
        ExperienceField::Current => {
            item.current = parse_bool(value).unwrap_or(item.current);
            if item.current {
                item.end_date.clear();
            }
            return;
        }
        ExperienceField::Title => &mut item.title,
        ExperienceField::Company => &mut item.company,
        ExperienceField::Location => &mut item.location,
        ExperienceField::StartDate => &mut item.start_date,
        ExperienceField::EndDate => &mut item.end_date,
        ExperienceField::Description => &mut item.description,
    };
    *slot = value.to_string();
}

fn set_education(item: &mut EducationItem, field: EducationField, value: &str) {
    let slot = match field {
        EducationField::Degree => &mut item.degree,
        EducationField::Institution => &mut item.institution,
        EducationField::Location => &mut item.location,
        EducationField::StartDate => &mut item.start_date,
        EducationField::EndDate => &mut item.end_date,
        EducationField::Description => &mut item.description,
    };
    *slot = value.to_string();
}

fn set_project(item: &mut ProjectItem, field: ProjectField, value: &str) {
    let slot = match field {
        ProjectField::Title => &mut item.title,
        ProjectField::Description => &mut item.description,
        ProjectField::Link => &mut item.link,
    };
    *slot = value.to_string();
}

fn set_certification(item: &mut CertificationItem, field: CertificationField, value: &str) {
    let slot = match field {
        CertificationField::Name => &mut item.name,
        CertificationField::Issuer => &mut item.issuer,
        CertificationField::Date => &mut item.date,
    };
    *slot = value.to_string();
}

fn set_language(item: &mut LanguageItem, field: LanguageField, value: &str) {
    let slot = match field {
        LanguageField::Language => &mut item.language,
        LanguageField::Proficiency => &mut item.proficiency,
    };
    *slot = value.to_string();
}

fn set_custom_section(item: &mut CustomSectionItem, field: CustomSectionField, value: &str) {
    let slot = match field {
        CustomSectionField::Title => &mut item.title,
        CustomSectionField::Content => &mut item.content,
    };
    *slot = value.to_string();
}

// ────────────────────────────────────────────────────────────────────────────
// Persistence payload
// ────────────────────────────────────────────────────────────────────────────

/// A single field change, named the way the record names it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDelta {
    pub section: RecordSection,
    /// Position within the section's ordered list; `None` for singular sections.
    pub index: Option<usize>,
    pub field: String,
    pub value: Value,
}

/// Prepares the persistence payload for an edit against `doc`.
///
/// Returns `None` when the edit targets an element `doc` does not have, since
/// that edit changed nothing.
pub fn field_delta(doc: &CanonicalDocument, edit: &Edit) -> Option<FieldDelta> {
    match edit {
        Edit::PersonalInfo { field, value } => {
            let section = RecordSection::ContactInfo;
            Some(FieldDelta {
                section,
                index: None,
                field: map_field_name(section, field.as_str()).to_string(),
                value: Value::String(value.clone()),
            })
        }
        Edit::Summary { value } => {
            let section = RecordSection::Summary;
            Some(FieldDelta {
                section,
                index: None,
                field: map_field_name(section, "summary").to_string(),
                value: Value::String(value.clone()),
            })
        }
        Edit::ArrayField(ArrayFieldEdit {
            index,
            field,
            value,
        }) => {
            if *index >= section_len(doc, field.section()) {
                return None;
            }
            let section = field.section();
            let value = match field.kind() {
                ValueKind::Text => Value::String(value.clone()),
                ValueKind::Bool => Value::Bool(parse_bool(value).unwrap_or(false)),
                ValueKind::Date if value.trim().is_empty() => Value::Null,
                ValueKind::Date => match parse_display_date(value) {
                    Some(d) => Value::String(d.format("%Y-%m-%d").to_string()),
                    None => Value::String(value.clone()),
                },
            };
            Some(FieldDelta {
                section,
                index: Some(*index),
                field: map_field_name(section, field.ui_name()).to_string(),
                value,
            })
        }
    }
}

fn section_len(doc: &CanonicalDocument, section: RecordSection) -> usize {
    match section {
        RecordSection::Experiences => doc.experience.len(),
        RecordSection::Educations => doc.education.len(),
        RecordSection::Projects => doc.projects.len(),
        RecordSection::Certifications => doc.certifications.len(),
        RecordSection::Languages => doc.languages.len(),
        RecordSection::CustomSections => doc.custom_sections.len(),
        RecordSection::ContactInfo | RecordSection::Summary => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn instr(section: &str, index: usize, field: &str, value: &str) -> EditInstruction {
        EditInstruction {
            section: section.to_string(),
            index,
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    fn edit(section: &str, index: usize, field: &str, value: &str) -> Edit {
        Edit::try_from(instr(section, index, field, value)).unwrap()
    }

    fn two_job_doc() -> CanonicalDocument {
        CanonicalDocument {
            personal_info: PersonalInfo {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                ..PersonalInfo::default()
            },
            summary: "Systems engineer".to_string(),
            experience: vec![
                Arc::new(ExperienceItem {
                    title: "Engineer".to_string(),
                    company: "Acme".to_string(),
                    start_date: "Jan 2020".to_string(),
                    current: true,
                    ..ExperienceItem::default()
                }),
                Arc::new(ExperienceItem {
                    title: "Intern".to_string(),
                    company: "Initech".to_string(),
                    start_date: "Jun 2018".to_string(),
                    end_date: "Aug 2018".to_string(),
                    ..ExperienceItem::default()
                }),
            ],
            skills: vec!["Rust".to_string()],
            certifications: vec![Arc::new(CertificationItem {
                name: "CKA".to_string(),
                issuer: "CNCF".to_string(),
                date: "May 2022".to_string(),
            })],
            ..CanonicalDocument::default()
        }
    }

    #[test]
    fn test_personal_info_edit_touches_only_that_field() {
        let doc = two_job_doc();
        let next = apply_edit(&doc, &edit("personalInfo", 0, "phone", "555-0100"));
        assert_eq!(next.personal_info.phone, "555-0100");
        assert_eq!(next.personal_info.name, "Ada");
        assert_eq!(next.personal_info.email, "ada@example.com");
        assert_eq!(next.summary, doc.summary);
        assert_eq!(doc.personal_info.phone, "");
    }

    #[test]
    fn test_summary_edit_ignores_index_and_field() {
        let doc = two_job_doc();
        let next = apply_edit(&doc, &edit("summary", 42, "whatever", "New summary"));
        assert_eq!(next.summary, "New summary");
        assert_eq!(doc.summary, "Systems engineer");
    }

    #[test]
    fn test_array_edit_isolation() {
        let doc = two_job_doc();
        let next = apply_edit(&doc, &edit("experience", 1, "title", "Summer Intern"));

        assert_eq!(next.experience[1].title, "Summer Intern");
        assert_eq!(next.experience[1].company, "Initech");
        assert!(Arc::ptr_eq(&next.experience[0], &doc.experience[0]));
        assert!(!Arc::ptr_eq(&next.experience[1], &doc.experience[1]));
        assert!(Arc::ptr_eq(&next.certifications[0], &doc.certifications[0]));
        // Prior document still reads the old value.
        assert_eq!(doc.experience[1].title, "Intern");
    }

    #[test]
    fn test_out_of_bounds_is_noop() {
        let doc = two_job_doc();
        let next = apply_edit(&doc, &edit("experience", 99, "title", "x"));
        assert_eq!(next, doc);
        assert!(field_delta(&doc, &edit("experience", 99, "title", "x")).is_none());
    }

    #[test]
    fn test_edit_on_empty_section_does_not_grow_it() {
        let doc = two_job_doc();
        let next = apply_edit(&doc, &edit("projects", 0, "title", "New"));
        assert!(next.projects.is_empty());
    }

    #[test]
    fn test_current_flag_edit() {
        let doc = two_job_doc();
        let next = apply_edit(&doc, &edit("experience", 0, "current", "false"));
        assert!(!next.experience[0].current);
    }

    #[test]
    fn test_marking_current_clears_end_date() {
        let doc = two_job_doc();
        let next = apply_edit(&doc, &edit("experience", 1, "current", "true"));
        assert!(next.experience[1].current);
        assert_eq!(next.experience[1].end_date, "");
        assert_eq!(doc.experience[1].end_date, "Aug 2018");

        let back = apply_edit(&next, &edit("experience", 1, "current", "false"));
        assert!(!back.experience[1].current);
        assert_eq!(back.experience[1].end_date, "");
    }

    #[test]
    fn test_unknown_section_rejected() {
        let err = Edit::try_from(instr("hobbies", 0, "name", "x")).unwrap_err();
        assert_eq!(err, EditError::UnknownSection("hobbies".to_string()));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = Edit::try_from(instr("education", 0, "gpa", "4.0")).unwrap_err();
        assert!(matches!(err, EditError::UnknownField { .. }));
        assert!(apply_instruction(&two_job_doc(), instr("personalInfo", 0, "age", "3")).is_err());
    }

    #[test]
    fn test_non_bool_current_rejected() {
        let err = Edit::try_from(instr("experience", 0, "current", "yes")).unwrap_err();
        assert!(matches!(err, EditError::InvalidBool { .. }));
    }

    #[test]
    fn test_apply_instruction() {
        let next =
            apply_instruction(&two_job_doc(), instr("certifications", 0, "issuer", "LF")).unwrap();
        assert_eq!(next.certifications[0].issuer, "LF");
    }

    #[test]
    fn test_instruction_deserializes_from_editor_json() {
        let i: EditInstruction = serde_json::from_value(json!({
            "section": "summary",
            "field": "summary",
            "value": "Hi"
        }))
        .unwrap();
        assert_eq!(i.index, 0);
        assert_eq!(Edit::try_from(i).unwrap(), Edit::Summary { value: "Hi".to_string() });
    }

    #[test]
    fn test_delta_uses_record_field_names() {
        let doc = two_job_doc();

        let d = field_delta(&doc, &edit("personalInfo", 0, "name", "Grace")).unwrap();
        assert_eq!(d.section, RecordSection::ContactInfo);
        assert_eq!(d.field, "fullName");
        assert_eq!(d.index, None);

        let d = field_delta(&doc, &edit("experience", 1, "title", "Intern II")).unwrap();
        assert_eq!(d.section, RecordSection::Experiences);
        assert_eq!(d.field, "jobTitle");
        assert_eq!(d.index, Some(1));
        assert_eq!(d.value, json!("Intern II"));

        let d = field_delta(&doc, &edit("summary", 0, "summary", "s")).unwrap();
        assert_eq!(d.field, "content");
    }

    #[test]
    fn test_delta_value_kinds() {
        let doc = two_job_doc();

        let d = field_delta(&doc, &edit("experience", 0, "current", "true")).unwrap();
        assert_eq!(d.field, "isCurrent");
        assert_eq!(d.value, json!(true));

        let d = field_delta(&doc, &edit("experience", 1, "endDate", "Sep 2018")).unwrap();
        assert_eq!(d.value, json!("2018-09-01"));

        let d = field_delta(&doc, &edit("experience", 1, "endDate", "")).unwrap();
        assert_eq!(d.value, Value::Null);

        let d = field_delta(&doc, &edit("certifications", 0, "date", "someday")).unwrap();
        assert_eq!(d.field, "issueDate");
        assert_eq!(d.value, json!("someday"));
    }

    #[test]
    fn test_field_parse_matches_as_str() {
        for f in [
            ExperienceField::Title,
            ExperienceField::StartDate,
            ExperienceField::Current,
        ] {
            assert_eq!(ExperienceField::parse(f.as_str()), Some(f));
        }
        assert_eq!(PersonalInfoField::parse("linkedin"), Some(PersonalInfoField::Linkedin));
        assert_eq!(ProjectField::parse("url"), None);
    }
}
