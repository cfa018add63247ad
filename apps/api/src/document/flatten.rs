//! Record → canonical document.
//!
//! Total over any `ResumeRecord`: absent and empty sub-collections both produce
//! empty output, missing fields produce empty strings, item order is kept as the
//! persistence layer returned it. Records and entities are destructured without
//! `..` so a new field on the record side fails to compile here until it is
//! handled.

use std::sync::Arc;

use crate::document::canonical::{
    CanonicalDocument, CertificationItem, CustomSectionItem, EducationItem, ExperienceItem,
    LanguageItem, PersonalInfo, ProjectItem,
};
use crate::document::normalize::{format_date, DateStyle};
use crate::models::record::{
    Certification, ContactInfo, CustomSection, Education, Experience, Language, Project,
    ResumeRecord, SkillGroup, Summary,
};

/// Builds the canonical document for a record.
pub fn to_canonical(record: &ResumeRecord) -> CanonicalDocument {
    let ResumeRecord {
        id: _,
        user_id: _,
        title: _,
        template_id: _,
        is_public: _,
        status: _,
        contact_info,
        summary,
        experiences,
        educations,
        skills,
        projects,
        certifications,
        languages,
        custom_sections,
    } = record;

    CanonicalDocument {
        personal_info: contact_info
            .as_ref()
            .map(flatten_contact_info)
            .unwrap_or_default(),
        summary: summary.as_ref().map(flatten_summary).unwrap_or_default(),
        experience: flatten_each(experiences, flatten_experience),
        education: flatten_each(educations, flatten_education),
        skills: flatten_skills(skills.as_deref().unwrap_or_default()),
        projects: flatten_each(projects, flatten_project),
        certifications: flatten_each(certifications, flatten_certification),
        languages: flatten_each(languages, flatten_language),
        custom_sections: flatten_each(custom_sections, flatten_custom_section),
    }
}

fn flatten_each<T, U>(items: &Option<Vec<T>>, f: fn(&T) -> U) -> Vec<Arc<U>> {
    items
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|item| Arc::new(f(item)))
        .collect()
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn flatten_contact_info(c: &ContactInfo) -> PersonalInfo {
    let ContactInfo {
        full_name,
        email,
        phone,
        location,
        website_url,
        linkedin_url,
    } = c;
    PersonalInfo {
        name: text(full_name),
        email: text(email),
        phone: text(phone),
        location: text(location),
        website: text(website_url),
        linkedin: text(linkedin_url),
    }
}

fn flatten_summary(s: &Summary) -> String {
    let Summary { content } = s;
    text(content)
}

fn flatten_experience(e: &Experience) -> ExperienceItem {
    let Experience {
        job_title,
        company,
        location,
        start_date,
        end_date,
        is_current,
        description,
    } = e;
    let current = is_current.unwrap_or(false);
    ExperienceItem {
        title: text(job_title),
        company: text(company),
        location: text(location),
        start_date: format_date(start_date.as_ref(), DateStyle::MonthYear),
        end_date: if current {
            String::new()
        } else {
            format_date(end_date.as_ref(), DateStyle::MonthYear)
        },
        current,
        description: text(description),
    }
}

fn flatten_education(e: &Education) -> EducationItem {
    let Education {
        degree,
        institution,
        location,
        start_date,
        end_date,
        description,
    } = e;
    EducationItem {
        degree: text(degree),
        institution: text(institution),
        location: text(location),
        start_date: format_date(start_date.as_ref(), DateStyle::YearOnly),
        end_date: format_date(end_date.as_ref(), DateStyle::YearOnly),
        description: text(description),
    }
}

/// Concatenates groups in group order, then items in item order.
fn flatten_skills(groups: &[SkillGroup]) -> Vec<String> {
    groups
        .iter()
        .flat_map(|SkillGroup { name: _, skills }| skills.iter().cloned())
        .collect()
}

fn flatten_project(p: &Project) -> ProjectItem {
    let Project {
        name,
        description,
        url,
    } = p;
    ProjectItem {
        title: text(name),
        description: text(description),
        link: text(url),
    }
}

fn flatten_certification(c: &Certification) -> CertificationItem {
    let Certification {
        name,
        issuer,
        issue_date,
    } = c;
    CertificationItem {
        name: text(name),
        issuer: text(issuer),
        date: format_date(issue_date.as_ref(), DateStyle::MonthYear),
    }
}

fn flatten_language(l: &Language) -> LanguageItem {
    let Language {
        language,
        proficiency,
    } = l;
    LanguageItem {
        language: text(language),
        proficiency: text(proficiency),
    }
}

fn flatten_custom_section(s: &CustomSection) -> CustomSectionItem {
    let CustomSection { title, content } = s;
    CustomSectionItem {
        title: text(title),
        content: text(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::DateValue;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn bare_record() -> ResumeRecord {
        ResumeRecord::empty(Uuid::new_v4(), Uuid::new_v4(), "My Resume")
    }

    fn date(s: &str) -> Option<DateValue> {
        Some(DateValue::Text(s.to_string()))
    }

    #[test]
    fn test_all_absent_is_empty_document() {
        let doc = to_canonical(&bare_record());
        assert_eq!(doc, CanonicalDocument::default());
    }

    #[test]
    fn test_absent_and_empty_flatten_identically() {
        let mut populated = bare_record();
        populated.contact_info = Some(ContactInfo::default());
        populated.summary = Some(Summary::default());
        populated.experiences = Some(vec![]);
        populated.educations = Some(vec![]);
        populated.skills = Some(vec![SkillGroup::default()]);
        populated.projects = Some(vec![]);
        populated.certifications = Some(vec![]);
        populated.languages = Some(vec![]);
        populated.custom_sections = Some(vec![]);

        assert_eq!(to_canonical(&populated), to_canonical(&bare_record()));
    }

    #[test]
    fn test_single_current_experience_scenario() {
        let mut record = bare_record();
        record.experiences = Some(vec![Experience {
            job_title: Some("Engineer".to_string()),
            company: Some("Acme".to_string()),
            start_date: date("2020-01-01"),
            is_current: Some(true),
            ..Experience::default()
        }]);

        let doc = to_canonical(&record);
        assert_eq!(doc.experience.len(), 1);
        let exp = &doc.experience[0];
        assert_eq!(exp.title, "Engineer");
        assert_eq!(exp.company, "Acme");
        assert_eq!(exp.start_date, "Jan 2020");
        assert_eq!(exp.end_date, "");
        assert!(exp.current);
        assert!(doc.education.is_empty());
        assert!(doc.projects.is_empty());
        assert!(doc.certifications.is_empty());
    }

    #[test]
    fn test_current_position_ignores_stale_end_date() {
        let mut record = bare_record();
        record.experiences = Some(vec![Experience {
            start_date: date("2020-01-01"),
            end_date: date("2021-06-01"),
            is_current: Some(true),
            ..Experience::default()
        }]);
        assert_eq!(to_canonical(&record).experience[0].end_date, "");
    }

    #[test]
    fn test_past_position_formats_end_date() {
        let mut record = bare_record();
        record.experiences = Some(vec![Experience {
            start_date: Some(DateValue::Date(NaiveDate::from_ymd_opt(2018, 3, 1).unwrap())),
            end_date: date("2019-11-30T00:00:00Z"),
            ..Experience::default()
        }]);
        let exp = &to_canonical(&record).experience[0];
        assert_eq!(exp.start_date, "Mar 2018");
        assert_eq!(exp.end_date, "Nov 2019");
        assert!(!exp.current);
    }

    #[test]
    fn test_education_uses_year_only() {
        let mut record = bare_record();
        record.educations = Some(vec![Education {
            degree: Some("BSc".to_string()),
            institution: Some("State University".to_string()),
            start_date: date("2012-09-01"),
            end_date: date("2016-06-01"),
            ..Education::default()
        }]);
        let edu = &to_canonical(&record).education[0];
        assert_eq!(edu.start_date, "2012");
        assert_eq!(edu.end_date, "2016");
        assert_eq!(edu.description, "");
    }

    #[test]
    fn test_skills_flatten_in_group_then_item_order() {
        let mut record = bare_record();
        record.skills = Some(vec![
            SkillGroup {
                name: Some("Languages".to_string()),
                skills: vec!["Rust".to_string(), "Go".to_string()],
            },
            SkillGroup {
                name: None,
                skills: vec![],
            },
            SkillGroup {
                name: Some("Infra".to_string()),
                skills: vec!["Postgres".to_string()],
            },
        ]);
        assert_eq!(to_canonical(&record).skills, vec!["Rust", "Go", "Postgres"]);
    }

    #[test]
    fn test_order_preserved() {
        let mut record = bare_record();
        record.projects = Some(
            ["zeta", "alpha", "mid"]
                .iter()
                .map(|n| Project {
                    name: Some(n.to_string()),
                    ..Project::default()
                })
                .collect(),
        );
        let titles: Vec<_> = to_canonical(&record)
            .projects
            .iter()
            .map(|p| p.title.clone())
            .collect();
        assert_eq!(titles, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_contact_info_field_names() {
        let mut record = bare_record();
        record.contact_info = Some(ContactInfo {
            full_name: Some("Ada Lovelace".to_string()),
            website_url: Some("https://ada.dev".to_string()),
            linkedin_url: Some("https://linkedin.com/in/ada".to_string()),
            ..ContactInfo::default()
        });
        let info = to_canonical(&record).personal_info;
        assert_eq!(info.name, "Ada Lovelace");
        assert_eq!(info.website, "https://ada.dev");
        assert_eq!(info.linkedin, "https://linkedin.com/in/ada");
        assert_eq!(info.phone, "");
    }

    #[test]
    fn test_certifications_languages_custom_sections() {
        let mut record = bare_record();
        record.certifications = Some(vec![Certification {
            name: Some("CKA".to_string()),
            issuer: Some("CNCF".to_string()),
            issue_date: date("2022-05-10"),
        }]);
        record.languages = Some(vec![Language {
            language: Some("German".to_string()),
            proficiency: None,
        }]);
        record.custom_sections = Some(vec![CustomSection {
            title: Some("Volunteering".to_string()),
            content: Some("Food bank".to_string()),
        }]);

        let doc = to_canonical(&record);
        assert_eq!(doc.certifications[0].date, "May 2022");
        assert_eq!(doc.languages[0].language, "German");
        assert_eq!(doc.languages[0].proficiency, "");
        assert_eq!(doc.custom_sections[0].content, "Food bank");
    }

    #[test]
    fn test_many_entries_each_section() {
        let mut record = bare_record();
        record.experiences = Some(vec![Experience::default(); 5]);
        record.educations = Some(vec![Education::default(); 3]);
        record.certifications = Some(vec![Certification::default(); 2]);
        let doc = to_canonical(&record);
        assert_eq!(doc.experience.len(), 5);
        assert_eq!(doc.education.len(), 3);
        assert_eq!(doc.certifications.len(), 2);
    }

    #[test]
    fn test_serialized_shape_has_no_nulls() {
        let doc = to_canonical(&bare_record());
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["summary"], "");
        assert_eq!(json["personalInfo"]["linkedin"], "");
        assert_eq!(json["projects"], serde_json::json!([]));
        assert_eq!(json["customSections"], serde_json::json!([]));
    }
}
