use serde::Serialize;

use crate::policy::{ADMINS, JOB_SEEKERS, RECRUITERS};
use crate::{Role, RoleSet};

/// An action a view may offer, derived from the caller's role.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    PostJob,
    ManageApplications,
    Administer,
    Apply,
    ViewOwnApplications,
}

impl Capability {
    /// Roles granted this capability.
    pub const fn roles(self) -> RoleSet {
        match self {
            Capability::PostJob | Capability::ManageApplications => RECRUITERS,
            Capability::Administer => ADMINS,
            Capability::Apply | Capability::ViewOwnApplications => JOB_SEEKERS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::PostJob => "post_job",
            Capability::ManageApplications => "manage_applications",
            Capability::Administer => "administer",
            Capability::Apply => "apply",
            Capability::ViewOwnApplications => "view_own_applications",
        }
    }
}

impl core::fmt::Display for Capability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability flags for one role, for views that toggle controls.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Capabilities {
    pub can_post_job: bool,
    pub can_manage_applications: bool,
    pub can_administer: bool,
    pub can_apply: bool,
    pub can_view_own_applications: bool,
}

impl Capabilities {
    pub fn for_role(role: Role) -> Self {
        let has = |c: Capability| c.roles().contains(role);
        Self {
            can_post_job: has(Capability::PostJob),
            can_manage_applications: has(Capability::ManageApplications),
            can_administer: has(Capability::Administer),
            can_apply: has(Capability::Apply),
            can_view_own_applications: has(Capability::ViewOwnApplications),
        }
    }

    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::PostJob => self.can_post_job,
            Capability::ManageApplications => self.can_manage_applications,
            Capability::Administer => self.can_administer,
            Capability::Apply => self.can_apply,
            Capability::ViewOwnApplications => self.can_view_own_applications,
        }
    }
}
