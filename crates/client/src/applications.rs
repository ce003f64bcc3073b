//! `/applications` endpoints.

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Serialize;
use tracing::info;

use jobboard_auth::{Capability, Identity};
use jobboard_core::{
    Application, ApplicationId, ApplicationStatus, DomainError, JobId, NewApplication,
    RecruiterStats,
};

use crate::api::ApiClient;
use crate::error::{ApiError, ApiResult};

#[derive(Serialize)]
struct StatusUpdate {
    status: ApplicationStatus,
}

impl ApiClient {
    /// `POST /applications` as multipart form data.
    ///
    /// A duplicate submission fails with [`ApiError::AlreadyApplied`].
    pub async fn apply(&self, application: &NewApplication) -> ApiResult<Application> {
        self.require(Capability::Apply)?;
        application.validate()?;

        let mut form = Form::new()
            .text("jobId", application.job_id.to_string())
            .text("coverLetter", application.cover_letter.clone());

        if let Some(resume) = &application.resume {
            let mut part = Part::bytes(resume.bytes.clone()).file_name(resume.file_name.clone());
            if let Some(content_type) = &resume.content_type {
                part = part.mime_str(content_type).map_err(|_| {
                    DomainError::validation(format!("invalid resume content type '{content_type}'"))
                })?;
            }
            form = form.part("resume", part);
        }

        let resp = self
            .dispatch(self.request(Method::POST, "/applications").multipart(form))
            .await?;
        let created: Application = resp
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        info!(application_id = %created.id, job_id = %application.job_id, "application submitted");
        Ok(created)
    }

    /// `GET /applications/my-applications`
    pub async fn my_applications(&self) -> ApiResult<Vec<Application>> {
        self.get_json("/applications/my-applications").await
    }

    /// `GET /applications` (applications visible to a recruiter or admin).
    pub async fn all_applications(&self) -> ApiResult<Vec<Application>> {
        self.require(Capability::ManageApplications)?;
        self.get_json("/applications").await
    }

    /// `GET /applications/job/:jobId`
    pub async fn applications_for_job(&self, job_id: &JobId) -> ApiResult<Vec<Application>> {
        self.require(Capability::ManageApplications)?;
        self.get_json(&format!("/applications/job/{job_id}")).await
    }

    /// `PUT /applications/:id/status`
    pub async fn set_application_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> ApiResult<()> {
        self.require(Capability::ManageApplications)?;

        let request = self
            .request(Method::PUT, &format!("/applications/{id}/status"))
            .json(&StatusUpdate { status });
        self.send_unit(request).await?;

        info!(application_id = %id, %status, "application status updated");
        Ok(())
    }

    /// Whether the caller already applied to `job_id`.
    ///
    /// Only job seekers apply, so other roles get `false` without a request.
    pub async fn has_applied(&self, job_id: &JobId) -> ApiResult<bool> {
        if !self.session().capabilities().allows(Capability::Apply) {
            return Ok(false);
        }
        let mine = self.my_applications().await?;
        Ok(mine.iter().any(|a| a.is_for_job(job_id)))
    }

    /// Dashboard counts for a recruiter: their own postings and the
    /// applications visible to them.
    pub async fn recruiter_stats(&self, identity: &Identity) -> ApiResult<RecruiterStats> {
        self.require(Capability::ManageApplications)?;

        let own_jobs = self.my_jobs(identity).await?;
        let applications = self.all_applications().await?;
        Ok(RecruiterStats::compute(&own_jobs, &applications))
    }

    /// Absolute download URL of an application's uploaded resume.
    pub fn resume_url(&self, application: &Application) -> Option<String> {
        let path = application.resume.as_deref()?.trim();
        if path.is_empty() {
            return None;
        }
        if path.starts_with("http://") || path.starts_with("https://") {
            return Some(path.to_string());
        }

        let path = path.replace('\\', "/");
        Some(format!(
            "{}/{}",
            self.config().api_origin(),
            path.trim_start_matches('/')
        ))
    }
}
