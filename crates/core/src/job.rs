//! Job postings and search filters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::label::label_enum;
use crate::{JobId, UserId, UserLink};

label_enum! {
    /// Employment type of a posting.
    pub enum JobType: "job type" {
        FullTime => "Full-time",
        PartTime => "Part-time",
        Contract => "Contract",
        Internship => "Internship",
        Remote => "Remote",
    }
}

label_enum! {
    /// Business area of a posting.
    pub enum JobCategory: "job category" {
        It => "IT",
        Finance => "Finance",
        Marketing => "Marketing",
        Sales => "Sales",
        Healthcare => "Healthcare",
        Education => "Education",
        Engineering => "Engineering",
        Other => "Other",
    }
}

/// A job posting as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(rename = "_id", alias = "id")]
    pub id: JobId,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub salary: Option<String>,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub category: JobCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_by: Option<UserLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Whether `user` is the account that posted this job.
    pub fn is_posted_by(&self, user: &UserId) -> bool {
        self.posted_by.as_ref().is_some_and(|p| p.id() == user)
    }
}

// Salaries are free text in the posting form but some records store numbers.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Payload for posting a new job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub requirements: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub salary: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub category: JobCategory,
}

impl NewJob {
    /// A full-time IT posting with the required fields filled in.
    pub fn new(
        title: impl Into<String>,
        company: impl Into<String>,
        location: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            location: location.into(),
            description: description.into(),
            requirements: String::new(),
            salary: String::new(),
            job_type: JobType::FullTime,
            category: JobCategory::It,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        let required = [
            ("title", &self.title),
            ("company", &self.company),
            ("location", &self.location),
            ("description", &self.description),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(DomainError::validation(format!("{field} cannot be empty")));
            }
        }
        Ok(())
    }
}

/// Search filters for `GET /jobs/search`.
///
/// Only non-blank values are sent; an all-blank filter means "list everything".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFilters {
    pub keyword: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    pub category: Option<JobCategory>,
}

impl JobFilters {
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn job_type(mut self, job_type: JobType) -> Self {
        self.job_type = Some(job_type);
        self
    }

    pub fn category(mut self, category: JobCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Query parameters in backend naming, blanks dropped.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let text = [("keyword", &self.keyword), ("location", &self.location)];
        let mut query: Vec<(&'static str, String)> = text
            .into_iter()
            .filter_map(|(key, value)| {
                let value = value.as_deref()?.trim();
                (!value.is_empty()).then(|| (key, value.to_string()))
            })
            .collect();

        if let Some(job_type) = self.job_type {
            query.push(("type", job_type.as_str().to_string()));
        }
        if let Some(category) = self.category {
            query.push(("category", category.as_str().to_string()));
        }
        query
    }

    pub fn is_empty(&self) -> bool {
        self.to_query().is_empty()
    }
}
