//! Editor sessions: the single in-memory canonical document per open résumé.
//!
//! Each edit replaces the document wholesale and fires off a save without
//! waiting for it. Saves are not queued, coalesced, or cancelled; whichever
//! write lands last wins. A failed save never rolls the document back; it is
//! recorded as a [`SaveFailure`] the user can dismiss or retry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::document::{
    apply_edit, bind, field_delta, CanonicalDocument, Edit, EditError, EditInstruction,
    FieldDelta, RendererVariant, TemplateStructure,
};
use crate::editor::store::{ResumeStore, StoreError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no open editor session for resume {0}")]
    NotOpen(Uuid),

    #[error("save failure {0} not found")]
    FailureNotFound(Uuid),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A save that did not make it to storage.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveFailure {
    pub id: Uuid,
    pub delta: FieldDelta,
    pub message: String,
    pub failed_at: DateTime<Utc>,
}

/// What an editor surface needs to render the session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub resume_id: Uuid,
    pub document: Arc<CanonicalDocument>,
    pub structure: TemplateStructure,
    pub used_default: bool,
    pub renderer: RendererVariant,
}

/// Result of one edit. `save` is `None` when the edit was a no-op.
pub struct SessionEdit {
    pub document: Arc<CanonicalDocument>,
    pub delta: Option<FieldDelta>,
    pub save: Option<JoinHandle<()>>,
}

type Failures = Arc<StdMutex<Vec<SaveFailure>>>;

pub struct EditorSession {
    resume_id: Uuid,
    document: Arc<CanonicalDocument>,
    structure: TemplateStructure,
    used_default: bool,
    renderer: RendererVariant,
    store: Arc<dyn ResumeStore>,
    failures: Failures,
}

impl EditorSession {
    /// Loads the record and its template and builds the canonical document.
    ///
    /// A template reference that no longer resolves is treated like a missing
    /// template: the default structure is used and editing proceeds.
    pub async fn open(store: Arc<dyn ResumeStore>, resume_id: Uuid) -> Result<Self, SessionError> {
        let record = store.load_record(resume_id).await?;

        let template = match record.template_id {
            Some(template_id) => match store.load_template(template_id).await {
                Ok(t) => Some(t),
                Err(StoreError::TemplateNotFound(_)) => {
                    warn!("Template {template_id} for resume {resume_id} not found; using default");
                    None
                }
                Err(e) => return Err(e.into()),
            },
            None => None,
        };

        let bound = bind(&record, template.as_ref().map(|t| &t.structure));
        info!(
            "Opened editor session for resume {resume_id} (renderer: {:?}, default template: {})",
            bound.renderer, bound.used_default
        );

        Ok(Self {
            resume_id,
            document: Arc::new(bound.document),
            structure: bound.structure,
            used_default: bound.used_default,
            renderer: bound.renderer,
            store,
            failures: Arc::new(StdMutex::new(Vec::new())),
        })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            resume_id: self.resume_id,
            document: Arc::clone(&self.document),
            structure: self.structure.clone(),
            used_default: self.used_default,
            renderer: self.renderer,
        }
    }

    pub fn document(&self) -> Arc<CanonicalDocument> {
        Arc::clone(&self.document)
    }

    /// Applies an editor instruction and starts saving the resulting delta.
    ///
    /// Must be called from within a tokio runtime.
    pub fn edit(&mut self, instr: EditInstruction) -> Result<SessionEdit, EditError> {
        let edit = Edit::try_from(instr)?;
        let delta = field_delta(&self.document, &edit);
        let next = Arc::new(apply_edit(&self.document, &edit));
        self.document = Arc::clone(&next);

        if delta.is_none() {
            debug!("Edit on resume {} was out of range; nothing to save", self.resume_id);
        }
        let save = delta.clone().map(|d| self.spawn_save(d));

        Ok(SessionEdit {
            document: next,
            delta,
            save,
        })
    }

    pub fn failures(&self) -> Vec<SaveFailure> {
        lock(&self.failures).clone()
    }

    /// Removes a failure notification. Returns false if it was already gone.
    pub fn dismiss(&self, failure_id: Uuid) -> bool {
        let mut failures = lock(&self.failures);
        let before = failures.len();
        failures.retain(|f| f.id != failure_id);
        failures.len() != before
    }

    /// Re-sends a failed delta. The notification is removed; a new one is
    /// recorded if the retry fails too.
    pub fn retry(&self, failure_id: Uuid) -> Option<JoinHandle<()>> {
        let failure = {
            let mut failures = lock(&self.failures);
            let pos = failures.iter().position(|f| f.id == failure_id)?;
            failures.remove(pos)
        };
        info!(
            "Retrying save of {}.{} for resume {}",
            failure.delta.section.as_str(),
            failure.delta.field,
            self.resume_id
        );
        Some(self.spawn_save(failure.delta))
    }

    fn spawn_save(&self, delta: FieldDelta) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let failures = Arc::clone(&self.failures);
        let resume_id = self.resume_id;

        tokio::spawn(async move {
            match store.apply_delta(resume_id, &delta).await {
                Ok(()) => debug!(
                    "Saved {}.{} for resume {resume_id}",
                    delta.section.as_str(),
                    delta.field
                ),
                Err(e) => {
                    warn!(
                        "Save of {}.{} for resume {resume_id} failed: {e}",
                        delta.section.as_str(),
                        delta.field
                    );
                    lock(&failures).push(SaveFailure {
                        id: Uuid::new_v4(),
                        delta,
                        message: e.to_string(),
                        failed_at: Utc::now(),
                    });
                }
            }
        })
    }
}

fn lock(failures: &Failures) -> std::sync::MutexGuard<'_, Vec<SaveFailure>> {
    failures.lock().unwrap_or_else(|e| e.into_inner())
}

// ────────────────────────────────────────────────────────────────────────────
// Registry
// ────────────────────────────────────────────────────────────────────────────

/// Open sessions keyed by résumé id. Cheap to clone; shared through `AppState`.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<Uuid, EditorSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens (or reopens) a session. Reopening reloads from the store and
    /// replaces the previous session and its notifications.
    pub async fn open(
        &self,
        store: Arc<dyn ResumeStore>,
        resume_id: Uuid,
    ) -> Result<SessionSnapshot, SessionError> {
        let session = EditorSession::open(store, resume_id).await?;
        let snapshot = session.snapshot();
        self.sessions.lock().await.insert(resume_id, session);
        Ok(snapshot)
    }

    /// Drops the session and its notifications. Saves already in flight still
    /// run to completion, but a failure they hit is no longer reported.
    pub async fn close(&self, resume_id: Uuid) -> Result<(), SessionError> {
        let mut sessions = self.sessions.lock().await;
        sessions
            .remove(&resume_id)
            .ok_or(SessionError::NotOpen(resume_id))?;
        info!("Closed editor session for resume {resume_id}");
        Ok(())
    }

    pub async fn is_open(&self, resume_id: Uuid) -> bool {
        self.sessions.lock().await.contains_key(&resume_id)
    }

    pub async fn snapshot(&self, resume_id: Uuid) -> Result<SessionSnapshot, SessionError> {
        let sessions = self.sessions.lock().await;
        let session = sessions.get(&resume_id).ok_or(SessionError::NotOpen(resume_id))?;
        Ok(session.snapshot())
    }

    pub async fn edit(
        &self,
        resume_id: Uuid,
        instr: EditInstruction,
    ) -> Result<SessionEdit, SessionError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&resume_id)
            .ok_or(SessionError::NotOpen(resume_id))?;
        Ok(session.edit(instr)?)
    }

    pub async fn failures(&self, resume_id: Uuid) -> Result<Vec<SaveFailure>, SessionError> {
        let sessions = self.sessions.lock().await;
        let session = sessions.get(&resume_id).ok_or(SessionError::NotOpen(resume_id))?;
        Ok(session.failures())
    }

    pub async fn dismiss(&self, resume_id: Uuid, failure_id: Uuid) -> Result<(), SessionError> {
        let sessions = self.sessions.lock().await;
        let session = sessions.get(&resume_id).ok_or(SessionError::NotOpen(resume_id))?;
        if session.dismiss(failure_id) {
            Ok(())
        } else {
            Err(SessionError::FailureNotFound(failure_id))
        }
    }

    pub async fn retry(
        &self,
        resume_id: Uuid,
        failure_id: Uuid,
    ) -> Result<JoinHandle<()>, SessionError> {
        let sessions = self.sessions.lock().await;
        let session = sessions.get(&resume_id).ok_or(SessionError::NotOpen(resume_id))?;
        session
            .retry(failure_id)
            .ok_or(SessionError::FailureNotFound(failure_id))
    }
}
