//! Recruiter dashboard statistics.

use serde::Serialize;

use crate::{Application, ApplicationStatus, Job};

/// Summary counts shown on a recruiter's home view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecruiterStats {
    pub total_jobs: usize,
    /// Postings have no closed state yet, so every posting counts as active.
    pub active_jobs: usize,
    pub total_applications: usize,
    pub pending_applications: usize,
    pub accepted_applications: usize,
}

impl RecruiterStats {
    /// Compute stats from the recruiter's own jobs and the applications
    /// visible to them.
    pub fn compute(own_jobs: &[Job], applications: &[Application]) -> Self {
        let count = |status: ApplicationStatus| {
            applications.iter().filter(|a| a.status == status).count()
        };

        Self {
            total_jobs: own_jobs.len(),
            active_jobs: own_jobs.len(),
            total_applications: applications.len(),
            pending_applications: count(ApplicationStatus::Pending),
            accepted_applications: count(ApplicationStatus::Accepted),
        }
    }
}
