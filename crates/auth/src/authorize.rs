use serde::Serialize;

use crate::policy::{paths, Access, RouteParams, RouteTable};
use crate::{Role, Session};

/// Why the gate sent a caller elsewhere.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectReason {
    /// No session; the requested path is discarded.
    Unauthenticated,
    /// Signed in, but the role is not admitted by the route.
    Forbidden,
}

/// Outcome of one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Navigation {
    Render {
        pattern: String,
        path: String,
        params: RouteParams,
    },
    Redirect {
        to: &'static str,
        reason: RedirectReason,
    },
    NotFound {
        path: String,
    },
    /// The session has not been restored yet; no decision is made.
    Pending,
}

impl Navigation {
    pub fn is_render(&self) -> bool {
        matches!(self, Navigation::Render { .. })
    }

    pub fn redirect_target(&self) -> Option<&'static str> {
        match self {
            Navigation::Redirect { to, .. } => Some(*to),
            _ => None,
        }
    }
}

/// Decide access for a role against one policy.
///
/// - No IO
/// - No panics
/// - Exact set membership, no role hierarchy
pub fn decide(access: Access, role: Option<Role>) -> Result<(), RedirectReason> {
    match (access, role) {
        (Access::Unrestricted, _) => Ok(()),
        (Access::Roles(_), None) => Err(RedirectReason::Unauthenticated),
        (Access::Roles(roles), Some(role)) if roles.contains(role) => Ok(()),
        (Access::Roles(_), Some(_)) => Err(RedirectReason::Forbidden),
    }
}

/// Authorize a navigation against a restored session.
pub fn authorize_navigation(table: &RouteTable, session: &Session, path: &str) -> Navigation {
    let Some(matched) = table.resolve(path) else {
        return Navigation::NotFound {
            path: path.to_string(),
        };
    };

    match decide(matched.policy.access(), session.role()) {
        Ok(()) => Navigation::Render {
            pattern: matched.policy.pattern().to_string(),
            path: path.to_string(),
            params: matched.params,
        },
        Err(reason) => Navigation::Redirect {
            to: redirect_target(reason),
            reason,
        },
    }
}

fn redirect_target(reason: RedirectReason) -> &'static str {
    match reason {
        RedirectReason::Unauthenticated => paths::LOGIN,
        RedirectReason::Forbidden => paths::HOME,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Navigation Explanation (debug trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Serializable account of a navigation decision, for debug logging.
#[derive(Debug, Clone, Serialize)]
pub struct NavigationExplanation {
    pub path: String,
    /// Matched route pattern, if any.
    pub pattern: Option<String>,
    pub access: Option<Access>,
    pub role: Option<Role>,
    pub decision: Navigation,
    pub reason: String,
}

/// Explain why a navigation would render, redirect or miss.
pub fn explain_navigation(table: &RouteTable, session: &Session, path: &str) -> NavigationExplanation {
    let matched = table.resolve(path);
    let decision = authorize_navigation(table, session, path);
    let role = session.role();

    let reason = match (&decision, matched.as_ref().map(|m| m.policy.access())) {
        (Navigation::NotFound { .. }, _) | (_, None) => format!("no route matches '{path}'"),
        (Navigation::Render { .. }, Some(Access::Unrestricted)) => {
            "route is unrestricted".to_string()
        }
        (Navigation::Render { .. }, Some(Access::Roles(roles))) => match role {
            Some(role) => format!("role '{role}' is admitted by {roles}"),
            None => "route admits the caller".to_string(),
        },
        (Navigation::Redirect { .. }, Some(Access::Roles(roles))) => match role {
            Some(role) => format!("role '{role}' is not in {roles}"),
            None => format!("no session; route requires one of {roles}"),
        },
        (Navigation::Redirect { .. }, Some(Access::Unrestricted)) | (Navigation::Pending, _) => {
            "no decision".to_string()
        }
    };

    NavigationExplanation {
        path: path.to_string(),
        pattern: matched.as_ref().map(|m| m.policy.pattern().to_string()),
        access: matched.map(|m| m.policy.access()),
        role,
        decision,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{ANY_AUTHENTICATED, RECRUITERS};
    use crate::{Identity, RoleSet};
    use jobboard_core::UserId;
    use proptest::prelude::*;

    fn session_as(role: Role) -> Session {
        let identity = Identity {
            id: UserId::new("u1").unwrap(),
            name: "Sam".to_string(),
            email: "a@b.com".to_string(),
            role,
        };
        Session::established("tok", identity).unwrap()
    }

    #[test]
    fn decide_is_exact_membership() {
        let access = Access::Roles(RoleSet::of(&[Role::Recruiter]));
        assert_eq!(decide(access, Some(Role::Recruiter)), Ok(()));
        assert_eq!(decide(access, Some(Role::Admin)), Err(RedirectReason::Forbidden));
        assert_eq!(decide(access, None), Err(RedirectReason::Unauthenticated));
        assert_eq!(decide(Access::Unrestricted, None), Ok(()));
    }

    #[test]
    fn recruiter_routes_admit_recruiters_and_admins_only() {
        let table = RouteTable::standard();
        let nav = authorize_navigation(&table, &session_as(Role::JobSeeker), "/add-job");
        assert_eq!(nav.redirect_target(), Some("/"));

        for role in [Role::Recruiter, Role::Admin] {
            let nav = authorize_navigation(&table, &session_as(role), "/add-job");
            assert!(nav.is_render(), "{role}");
        }
    }

    #[test]
    fn unrestricted_routes_render_with_or_without_session() {
        let table = RouteTable::standard();
        assert!(authorize_navigation(&table, &Session::empty(), "/login").is_render());
        assert!(authorize_navigation(&table, &session_as(Role::Admin), "/register").is_render());
    }

    #[test]
    fn unknown_paths_are_not_found() {
        let table = RouteTable::standard();
        let nav = authorize_navigation(&table, &Session::empty(), "/nope");
        assert_eq!(
            nav,
            Navigation::NotFound {
                path: "/nope".to_string()
            }
        );
    }

    #[test]
    fn render_carries_route_params() {
        let table = RouteTable::standard();
        let nav = authorize_navigation(&table, &session_as(Role::Recruiter), "/jobs/j42/applications");
        match nav {
            Navigation::Render { pattern, params, .. } => {
                assert_eq!(pattern, "/jobs/:jobId/applications");
                assert_eq!(params.get("jobId"), Some("j42"));
            }
            other => panic!("expected render, got {other:?}"),
        }
    }

    #[test]
    fn login_then_navigate_scenario() {
        let table = RouteTable::standard();

        let nav = authorize_navigation(&table, &Session::empty(), "/dashboard");
        assert_eq!(
            nav,
            Navigation::Redirect {
                to: "/login",
                reason: RedirectReason::Unauthenticated
            }
        );

        let recruiter = session_as(Role::Recruiter);
        assert!(authorize_navigation(&table, &recruiter, "/add-job").is_render());
        assert_eq!(
            authorize_navigation(&table, &recruiter, "/admin"),
            Navigation::Redirect {
                to: "/",
                reason: RedirectReason::Forbidden
            }
        );
    }

    #[test]
    fn recruiter_home_excludes_admins() {
        let table = RouteTable::standard();
        let nav = authorize_navigation(&table, &session_as(Role::Admin), "/recruiter-home");
        assert_eq!(nav.redirect_target(), Some("/"));
    }

    #[test]
    fn explanation_names_policy_and_role() {
        let table = RouteTable::standard();
        let explanation = explain_navigation(&table, &session_as(Role::JobSeeker), "/recruiter");
        assert_eq!(explanation.pattern.as_deref(), Some("/recruiter"));
        assert_eq!(explanation.access, Some(Access::Roles(RECRUITERS)));
        assert_eq!(explanation.role, Some(Role::JobSeeker));
        assert!(explanation.reason.contains("jobseeker"));

        let json = serde_json::to_value(&explanation).unwrap();
        assert_eq!(json["decision"]["outcome"], "redirect");
        assert_eq!(json["decision"]["to"], "/");
    }

    #[test]
    fn explanation_for_open_route() {
        let table = RouteTable::standard();
        let explanation = explain_navigation(&table, &Session::empty(), "/jobs");
        assert_eq!(explanation.access, Some(Access::Roles(ANY_AUTHENTICATED)));
        assert!(explanation.reason.contains("no session"));
    }

    fn protected_path() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("/".to_string()),
            Just("/jobs".to_string()),
            Just("/dashboard".to_string()),
            Just("/my-applications".to_string()),
            Just("/add-job".to_string()),
            Just("/recruiter".to_string()),
            Just("/recruiter-home".to_string()),
            Just("/admin".to_string()),
            "[a-z0-9]{1,12}".prop_map(|id| format!("/jobs/{id}")),
            "[a-z0-9]{1,12}".prop_map(|id| format!("/jobs/{id}/applications")),
        ]
    }

    proptest! {
        #[test]
        fn anonymous_callers_always_land_on_login(path in protected_path()) {
            let table = RouteTable::standard();
            let nav = authorize_navigation(&table, &Session::empty(), &path);
            prop_assert_eq!(nav.redirect_target(), Some("/login"));
        }

        #[test]
        fn signed_in_callers_never_land_on_login(
            path in protected_path(),
            role in prop::sample::select(Role::ALL.to_vec()),
        ) {
            let table = RouteTable::standard();
            let nav = authorize_navigation(&table, &session_as(role), &path);
            prop_assert!(nav.is_render() || nav.redirect_target() == Some("/"));
        }
    }
}
