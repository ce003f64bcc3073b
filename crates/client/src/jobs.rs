//! `/jobs` endpoints.

use reqwest::Method;
use tracing::info;

use jobboard_auth::{Capability, Identity};
use jobboard_core::{Job, JobFilters, JobId, NewJob};

use crate::api::ApiClient;
use crate::error::{ApiError, ApiResult};

impl ApiClient {
    /// `GET /jobs`
    pub async fn list_jobs(&self) -> ApiResult<Vec<Job>> {
        self.get_json("/jobs").await
    }

    /// `GET /jobs/search`; blank filters are not sent.
    pub async fn search_jobs(&self, filters: &JobFilters) -> ApiResult<Vec<Job>> {
        if filters.is_empty() {
            return self.list_jobs().await;
        }
        let request = self
            .request(Method::GET, "/jobs/search")
            .query(&filters.to_query());
        let resp = self.dispatch(request).await?;
        resp.json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// `GET /jobs/:id`
    pub async fn get_job(&self, id: &JobId) -> ApiResult<Job> {
        self.get_json(&format!("/jobs/{id}")).await
    }

    /// `POST /jobs`
    pub async fn post_job(&self, job: &NewJob) -> ApiResult<Job> {
        self.require(Capability::PostJob)?;
        job.validate()?;

        let created: Job = self.send_json(Method::POST, "/jobs", job).await?;
        info!(job_id = %created.id, title = %created.title, "job posted");
        Ok(created)
    }

    /// `DELETE /jobs/:id`
    pub async fn delete_job(&self, id: &JobId) -> ApiResult<()> {
        self.require(Capability::PostJob)?;

        self.send_unit(self.request(Method::DELETE, &format!("/jobs/{id}")))
            .await?;
        info!(job_id = %id, "job deleted");
        Ok(())
    }

    /// Jobs posted by `identity`.
    pub async fn my_jobs(&self, identity: &Identity) -> ApiResult<Vec<Job>> {
        let jobs = self.list_jobs().await?;
        Ok(jobs
            .into_iter()
            .filter(|job| job.is_posted_by(&identity.id))
            .collect())
    }
}
