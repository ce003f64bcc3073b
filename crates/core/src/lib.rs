//! `jobboard-core` — domain records shared by the job board client.
//!
//! Pure data and validation; no transport or storage concerns.

mod label;

pub mod application;
pub mod error;
pub mod id;
pub mod job;
pub mod stats;
pub mod user;

pub use application::{Application, ApplicationStatus, JobLink, NewApplication, Resume};
pub use error::{DomainError, DomainResult};
pub use id::{ApplicationId, JobId, UserId};
pub use job::{Job, JobCategory, JobFilters, JobType, NewJob};
pub use stats::RecruiterStats;
pub use user::{UserLink, UserRef};
