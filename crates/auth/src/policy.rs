//! Static route policy: which roles may reach which view.
//!
//! Role sets are named once here and referenced by the route table, so the
//! `{recruiter, admin}` allow-list cannot drift between routes.

use serde::Serialize;
use thiserror::Error;

use crate::{Role, RoleSet};

/// Every signed-in role.
pub const ANY_AUTHENTICATED: RoleSet = RoleSet::of(&[Role::JobSeeker, Role::Recruiter, Role::Admin]);
/// Roles that post jobs and triage applicants.
pub const RECRUITERS: RoleSet = RoleSet::of(&[Role::Recruiter, Role::Admin]);
pub const RECRUITER_ONLY: RoleSet = RoleSet::of(&[Role::Recruiter]);
pub const ADMINS: RoleSet = RoleSet::of(&[Role::Admin]);
pub const JOB_SEEKERS: RoleSet = RoleSet::of(&[Role::JobSeeker]);

/// Well-known paths.
pub mod paths {
    pub const LOGIN: &str = "/login";
    pub const REGISTER: &str = "/register";
    pub const HOME: &str = "/";
    pub const JOBS: &str = "/jobs";
    pub const JOB_DETAILS: &str = "/jobs/:id";
    pub const DASHBOARD: &str = "/dashboard";
    pub const MY_APPLICATIONS: &str = "/my-applications";
    pub const ADD_JOB: &str = "/add-job";
    pub const JOB_APPLICATIONS: &str = "/jobs/:jobId/applications";
    pub const RECRUITER: &str = "/recruiter";
    pub const RECRUITER_HOME: &str = "/recruiter-home";
    pub const ADMIN: &str = "/admin";
}

/// Who may reach a route.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "roles", rename_all = "snake_case")]
pub enum Access {
    /// Reachable with or without a session.
    Unrestricted,
    /// Requires a session whose role is in the set.
    Roles(RoleSet),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("route pattern must start with '/': '{0}'")]
    NotAbsolute(String),

    #[error("route pattern '{0}' has an unnamed parameter")]
    UnnamedParam(String),

    #[error("route '{0}' is already covered by '{1}'")]
    Duplicate(String, String),

    #[error("route '{0}' admits no role")]
    EmptyRoleSet(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A path pattern such as `/jobs/:jobId/applications`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(raw: &str) -> Result<Self, PolicyError> {
        if !raw.starts_with('/') {
            return Err(PolicyError::NotAbsolute(raw.to_string()));
        }

        let segments = split_path(raw)
            .map(|seg| match seg.strip_prefix(':') {
                Some("") => Err(PolicyError::UnnamedParam(raw.to_string())),
                Some(name) => Ok(Segment::Param(name.to_string())),
                None => Ok(Segment::Literal(seg.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match a concrete path, capturing named parameters.
    pub fn matches(&self, path: &str) -> Option<RouteParams> {
        let parts: Vec<&str> = split_path(strip_suffixes(path)).collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = RouteParams::default();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => params.0.push((name.clone(), part.to_string())),
            }
        }
        Some(params)
    }

    fn literal_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }

    /// Patterns with the same shape match the same paths.
    fn same_shape(&self, other: &RoutePattern) -> bool {
        self.segments.len() == other.segments.len()
            && self.segments.iter().zip(&other.segments).all(|pair| match pair {
                (Segment::Literal(a), Segment::Literal(b)) => a == b,
                (Segment::Param(_), Segment::Param(_)) => true,
                _ => false,
            })
    }
}

fn strip_suffixes(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Named parameters captured from a path, in pattern order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteParams(Vec<(String, String)>);

impl RouteParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One entry of the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicy {
    pattern: RoutePattern,
    access: Access,
}

impl RoutePolicy {
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn access(&self) -> Access {
        self.access
    }
}

/// A matched route and its captured parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub policy: &'a RoutePolicy,
    pub params: RouteParams,
}

/// Static mapping from path patterns to access policies.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RoutePolicy>,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// The job board's route table.
    pub fn standard() -> Self {
        use paths::*;

        let built = Self::builder()
            .unrestricted(LOGIN)
            .unrestricted(REGISTER)
            .protected(HOME, ANY_AUTHENTICATED)
            .protected(JOBS, ANY_AUTHENTICATED)
            .protected(JOB_DETAILS, ANY_AUTHENTICATED)
            .protected(DASHBOARD, ANY_AUTHENTICATED)
            .protected(MY_APPLICATIONS, ANY_AUTHENTICATED)
            .protected(ADD_JOB, RECRUITERS)
            .protected(JOB_APPLICATIONS, RECRUITERS)
            .protected(RECRUITER, RECRUITERS)
            .protected(RECRUITER_HOME, RECRUITER_ONLY)
            .protected(ADMIN, ADMINS)
            .build();

        match built {
            Ok(table) => table,
            Err(e) => unreachable!("standard route table is well-formed: {e}"),
        }
    }

    /// Resolve a path; the most specific pattern (most literal segments) wins.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        self.routes
            .iter()
            .filter_map(|policy| {
                policy
                    .pattern
                    .matches(path)
                    .map(|params| RouteMatch { policy, params })
            })
            .max_by_key(|m| m.policy.pattern.literal_count())
    }

    pub fn routes(&self) -> &[RoutePolicy] {
        &self.routes
    }
}

#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    entries: Vec<(String, Access)>,
}

impl RouteTableBuilder {
    pub fn unrestricted(mut self, pattern: &str) -> Self {
        self.entries.push((pattern.to_string(), Access::Unrestricted));
        self
    }

    pub fn protected(mut self, pattern: &str, roles: RoleSet) -> Self {
        self.entries.push((pattern.to_string(), Access::Roles(roles)));
        self
    }

    /// Build the table, rejecting malformed patterns, unreachable routes and
    /// patterns covered by an earlier entry.
    pub fn build(self) -> Result<RouteTable, PolicyError> {
        let mut routes: Vec<RoutePolicy> = Vec::with_capacity(self.entries.len());

        for (raw, access) in self.entries {
            let pattern = RoutePattern::parse(&raw)?;
            if let Access::Roles(roles) = access {
                if roles.is_empty() {
                    return Err(PolicyError::EmptyRoleSet(raw));
                }
            }
            if let Some(existing) = routes.iter().find(|r| r.pattern.same_shape(&pattern)) {
                return Err(PolicyError::Duplicate(raw, existing.pattern.raw.clone()));
            }
            routes.push(RoutePolicy { pattern, access });
        }

        Ok(RouteTable { routes })
    }
}
