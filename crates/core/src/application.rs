//! Job applications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::label::label_enum;
use crate::{ApplicationId, Job, JobId, UserLink};

label_enum! {
    /// Review state of an application, as set by recruiters.
    #[derive(Default)]
    pub enum ApplicationStatus: "application status" {
        #[default]
        Pending => "pending",
        Reviewed => "reviewed",
        Shortlisted => "shortlisted",
        Accepted => "accepted",
        Rejected => "rejected",
    }
}

/// The job an application points at: populated record or bare id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobLink {
    Job(Box<Job>),
    Id(JobId),
}

impl JobLink {
    pub fn id(&self) -> &JobId {
        match self {
            JobLink::Job(job) => &job.id,
            JobLink::Id(id) => id,
        }
    }

    pub fn job(&self) -> Option<&Job> {
        match self {
            JobLink::Job(job) => Some(job),
            JobLink::Id(_) => None,
        }
    }
}

/// An application as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(rename = "_id", alias = "id")]
    pub id: ApplicationId,
    pub job: JobLink,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicant: Option<UserLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    /// Server-relative path of the uploaded resume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume: Option<String>,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Application {
    pub fn is_for_job(&self, job: &JobId) -> bool {
        self.job.id() == job
    }
}

/// A resume file attached to an application.
#[derive(Clone, PartialEq, Eq)]
pub struct Resume {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl core::fmt::Debug for Resume {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Resume")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Payload for applying to a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
    pub job_id: JobId,
    pub cover_letter: String,
    pub resume: Option<Resume>,
}

impl NewApplication {
    pub fn new(job_id: JobId, cover_letter: impl Into<String>) -> Self {
        Self {
            job_id,
            cover_letter: cover_letter.into(),
            resume: None,
        }
    }

    pub fn with_resume(mut self, resume: Resume) -> Self {
        self.resume = Some(resume);
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if let Some(resume) = &self.resume {
            if resume.file_name.trim().is_empty() {
                return Err(DomainError::validation("resume file name cannot be empty"));
            }
            if resume.bytes.is_empty() {
                return Err(DomainError::validation("resume file is empty"));
            }
        }
        Ok(())
    }
}
