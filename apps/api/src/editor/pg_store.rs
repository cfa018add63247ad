//! Postgres-backed `ResumeStore`.
//!
//! Each sub-collection lives in its own table keyed by `resume_id` and ordered
//! by `display_order`. Delta writes resolve the record field to a column
//! through a fixed catalog; nothing from the request is interpolated into SQL.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

use crate::document::normalize::RecordSection;
use crate::document::FieldDelta;
use crate::editor::store::{delta_bool, delta_date, delta_text, ResumeStore, StoreError};
use crate::models::record::{
    Certification, ContactInfo, CustomSection, DateValue, Education, Experience, Language,
    Project, ResumeRecord, ResumeStatus, SkillGroup, Summary,
};
use crate::models::template::TemplateRow;

#[derive(Clone)]
pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_list<T>(&self, sql: &str, resume_id: Uuid) -> Result<Vec<T>, StoreError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        Ok(sqlx::query_as::<_, T>(sql)
            .bind(resume_id)
            .fetch_all(&self.pool)
            .await?)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Row types
// ────────────────────────────────────────────────────────────────────────────

#[derive(FromRow)]
struct ResumeRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    template_id: Option<Uuid>,
    is_public: bool,
    status: String,
}

#[derive(FromRow)]
struct ContactInfoRow {
    full_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    location: Option<String>,
    website_url: Option<String>,
    linkedin_url: Option<String>,
}

#[derive(FromRow)]
struct ExperienceRow {
    job_title: Option<String>,
    company: Option<String>,
    location: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    is_current: Option<bool>,
    description: Option<String>,
}

#[derive(FromRow)]
struct EducationRow {
    degree: Option<String>,
    institution: Option<String>,
    location: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    description: Option<String>,
}

#[derive(FromRow)]
struct SkillGroupRow {
    name: Option<String>,
    skills: Vec<String>,
}

#[derive(FromRow)]
struct ProjectRow {
    name: Option<String>,
    description: Option<String>,
    url: Option<String>,
}

#[derive(FromRow)]
struct CertificationRow {
    name: Option<String>,
    issuer: Option<String>,
    issue_date: Option<NaiveDate>,
}

#[derive(FromRow)]
struct LanguageRow {
    language: Option<String>,
    proficiency: Option<String>,
}

#[derive(FromRow)]
struct CustomSectionRow {
    title: Option<String>,
    content: Option<String>,
}

fn status_from_str(s: &str) -> ResumeStatus {
    match s {
        "published" => ResumeStatus::Published,
        _ => ResumeStatus::Draft,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Column catalog
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Text,
    Date,
    Bool,
}

struct Column {
    table: &'static str,
    name: &'static str,
    kind: ColumnKind,
}

fn table_for(section: RecordSection) -> &'static str {
    match section {
        RecordSection::ContactInfo => "contact_infos",
        RecordSection::Summary => "summaries",
        RecordSection::Experiences => "experiences",
        RecordSection::Educations => "educations",
        RecordSection::Projects => "projects",
        RecordSection::Certifications => "certifications",
        RecordSection::Languages => "languages",
        RecordSection::CustomSections => "custom_sections",
    }
}

fn column_for(section: RecordSection, field: &str) -> Option<Column> {
    use ColumnKind::*;
    use RecordSection as S;

    let (name, kind) = match (section, field) {
        (S::ContactInfo, "fullName") => ("full_name", Text),
        (S::ContactInfo, "email") => ("email", Text),
        (S::ContactInfo, "phone") => ("phone", Text),
        (S::ContactInfo, "location") => ("location", Text),
        (S::ContactInfo, "websiteUrl") => ("website_url", Text),
        (S::ContactInfo, "linkedinUrl") => ("linkedin_url", Text),
        (S::Summary, "content") => ("content", Text),
        (S::Experiences, "jobTitle") => ("job_title", Text),
        (S::Experiences, "company") => ("company", Text),
        (S::Experiences | S::Educations, "location") => ("location", Text),
        (S::Experiences | S::Educations, "startDate") => ("start_date", Date),
        (S::Experiences | S::Educations, "endDate") => ("end_date", Date),
        (S::Experiences, "isCurrent") => ("is_current", Bool),
        (S::Experiences | S::Educations | S::Projects, "description") => ("description", Text),
        (S::Educations, "degree") => ("degree", Text),
        (S::Educations, "institution") => ("institution", Text),
        (S::Projects | S::Certifications, "name") => ("name", Text),
        (S::Projects, "url") => ("url", Text),
        (S::Certifications, "issuer") => ("issuer", Text),
        (S::Certifications, "issueDate") => ("issue_date", Date),
        (S::Languages, "language") => ("language", Text),
        (S::Languages, "proficiency") => ("proficiency", Text),
        (S::CustomSections, "title") => ("title", Text),
        (S::CustomSections, "content") => ("content", Text),
        _ => return None,
    };
    Some(Column {
        table: table_for(section),
        name,
        kind,
    })
}

/// Extra assignments that keep a list row consistent with the written column.
/// A role marked current loses its end date.
fn also_set(column: &Column) -> &'static str {
    if column.table == "experiences" && column.name == "is_current" {
        ", end_date = CASE WHEN $1 THEN NULL ELSE end_date END"
    } else {
        ""
    }
}

fn singular(section: RecordSection) -> bool {
    matches!(section, RecordSection::ContactInfo | RecordSection::Summary)
}

// ────────────────────────────────────────────────────────────────────────────
// Store
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn load_record(&self, resume_id: Uuid) -> Result<ResumeRecord, StoreError> {
        let resume: ResumeRow = sqlx::query_as(
            "SELECT id, user_id, title, template_id, is_public, status FROM resumes WHERE id = $1",
        )
        .bind(resume_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::ResumeNotFound(resume_id))?;

        let contact: Option<ContactInfoRow> = sqlx::query_as(
            r#"
            SELECT full_name, email, phone, location, website_url, linkedin_url
            FROM contact_infos WHERE resume_id = $1
            "#,
        )
        .bind(resume_id)
        .fetch_optional(&self.pool)
        .await?;

        let summary: Option<(Option<String>,)> =
            sqlx::query_as("SELECT content FROM summaries WHERE resume_id = $1")
                .bind(resume_id)
                .fetch_optional(&self.pool)
                .await?;

        let experiences: Vec<ExperienceRow> = self
            .fetch_list(
                r#"
                SELECT job_title, company, location, start_date, end_date, is_current, description
                FROM experiences WHERE resume_id = $1 ORDER BY display_order, id
                "#,
                resume_id,
            )
            .await?;
        let educations: Vec<EducationRow> = self
            .fetch_list(
                r#"
                SELECT degree, institution, location, start_date, end_date, description
                FROM educations WHERE resume_id = $1 ORDER BY display_order, id
                "#,
                resume_id,
            )
            .await?;
        let skills: Vec<SkillGroupRow> = self
            .fetch_list(
                "SELECT name, skills FROM skill_groups WHERE resume_id = $1 ORDER BY display_order, id",
                resume_id,
            )
            .await?;
        let projects: Vec<ProjectRow> = self
            .fetch_list(
                "SELECT name, description, url FROM projects WHERE resume_id = $1 ORDER BY display_order, id",
                resume_id,
            )
            .await?;
        let certifications: Vec<CertificationRow> = self
            .fetch_list(
                "SELECT name, issuer, issue_date FROM certifications WHERE resume_id = $1 ORDER BY display_order, id",
                resume_id,
            )
            .await?;
        let languages: Vec<LanguageRow> = self
            .fetch_list(
                "SELECT language, proficiency FROM languages WHERE resume_id = $1 ORDER BY display_order, id",
                resume_id,
            )
            .await?;
        let custom_sections: Vec<CustomSectionRow> = self
            .fetch_list(
                "SELECT title, content FROM custom_sections WHERE resume_id = $1 ORDER BY display_order, id",
                resume_id,
            )
            .await?;

        debug!(
            "Loaded resume {resume_id}: {} experiences, {} educations, {} skill groups",
            experiences.len(),
            educations.len(),
            skills.len()
        );

        let date = |d: Option<NaiveDate>| d.map(DateValue::Date);

        Ok(ResumeRecord {
            id: resume.id,
            user_id: resume.user_id,
            title: resume.title,
            template_id: resume.template_id,
            is_public: resume.is_public,
            status: status_from_str(&resume.status),
            contact_info: contact.map(|c| ContactInfo {
                full_name: c.full_name,
                email: c.email,
                phone: c.phone,
                location: c.location,
                website_url: c.website_url,
                linkedin_url: c.linkedin_url,
            }),
            summary: summary.map(|(content,)| Summary { content }),
            experiences: Some(
                experiences
                    .into_iter()
                    .map(|e| Experience {
                        job_title: e.job_title,
                        company: e.company,
                        location: e.location,
                        start_date: date(e.start_date),
                        end_date: date(e.end_date),
                        is_current: e.is_current,
                        description: e.description,
                    })
                    .collect(),
            ),
            educations: Some(
                educations
                    .into_iter()
                    .map(|e| Education {
                        degree: e.degree,
                        institution: e.institution,
                        location: e.location,
                        start_date: date(e.start_date),
                        end_date: date(e.end_date),
                        description: e.description,
                    })
                    .collect(),
            ),
            skills: Some(
                skills
                    .into_iter()
                    .map(|s| SkillGroup {
                        name: s.name,
                        skills: s.skills,
                    })
                    .collect(),
            ),
            projects: Some(
                projects
                    .into_iter()
                    .map(|p| Project {
                        name: p.name,
                        description: p.description,
                        url: p.url,
                    })
                    .collect(),
            ),
            certifications: Some(
                certifications
                    .into_iter()
                    .map(|c| Certification {
                        name: c.name,
                        issuer: c.issuer,
                        issue_date: date(c.issue_date),
                    })
                    .collect(),
            ),
            languages: Some(
                languages
                    .into_iter()
                    .map(|l| Language {
                        language: l.language,
                        proficiency: l.proficiency,
                    })
                    .collect(),
            ),
            custom_sections: Some(
                custom_sections
                    .into_iter()
                    .map(|s| CustomSection {
                        title: s.title,
                        content: s.content,
                    })
                    .collect(),
            ),
        })
    }

    async fn load_template(&self, template_id: Uuid) -> Result<TemplateRow, StoreError> {
        sqlx::query_as::<_, TemplateRow>("SELECT id, name, structure FROM templates WHERE id = $1")
            .bind(template_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::TemplateNotFound(template_id))
    }

    async fn apply_delta(&self, resume_id: Uuid, delta: &FieldDelta) -> Result<(), StoreError> {
        let column = column_for(delta.section, &delta.field).ok_or_else(|| {
            StoreError::UnknownField {
                section: delta.section.as_str(),
                field: delta.field.clone(),
            }
        })?;
        let Column { table, name, kind } = &column;
        let kind = *kind;

        // Singular sections are upserted: $1 = resume_id, $2 = value.
        // List sections update the n-th row: $1 = value, $2 = resume_id, $3 = position.
        let index = delta.index.unwrap_or(0);
        let sql = if singular(delta.section) {
            format!(
                "INSERT INTO {table} (resume_id, {name}) VALUES ($1, $2) \
                 ON CONFLICT (resume_id) DO UPDATE SET {name} = EXCLUDED.{name}"
            )
        } else {
            format!(
                "UPDATE {table} SET {name} = $1{also} WHERE id = (\
                 SELECT id FROM {table} WHERE resume_id = $2 \
                 ORDER BY display_order, id OFFSET $3 LIMIT 1)",
                also = also_set(&column),
            )
        };

        let mut query = sqlx::query::<sqlx::Postgres>(&sql);
        if singular(delta.section) {
            query = query.bind(resume_id);
        }
        query = match kind {
            ColumnKind::Text => query.bind(delta_text(delta)?),
            ColumnKind::Date => query.bind(delta_date(delta)?),
            ColumnKind::Bool => query.bind(delta_bool(delta)?),
        };
        if !singular(delta.section) {
            query = query.bind(resume_id).bind(index as i64);
        }

        let result = query.execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::EntryNotFound {
                section: delta.section.as_str(),
                index,
            });
        }

        debug!(
            "Saved {}.{} for resume {resume_id}",
            delta.section.as_str(),
            delta.field
        );
        Ok(())
    }
}
