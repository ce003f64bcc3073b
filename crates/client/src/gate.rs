//! Route gate: applies the route table to the live session on navigation.

use std::sync::Arc;

use tracing::debug;

use jobboard_auth::{authorize_navigation, explain_navigation, Navigation, NavigationExplanation, RouteTable};

use crate::session::SessionStore;

#[derive(Debug, Clone)]
pub struct RouteGate {
    table: Arc<RouteTable>,
    session: Arc<SessionStore>,
}

impl RouteGate {
    /// Gate over the standard job board routes.
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self::with_table(RouteTable::standard(), session)
    }

    pub fn with_table(table: RouteTable, session: Arc<SessionStore>) -> Self {
        Self {
            table: Arc::new(table),
            session,
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Decide immediately; `Pending` until the session has been restored.
    pub fn check(&self, path: &str) -> Navigation {
        if !self.session.is_restored() {
            return Navigation::Pending;
        }

        let session = self.session.session();
        let navigation = authorize_navigation(&self.table, &session, path);
        if let Navigation::Redirect { to, reason } = &navigation {
            debug!(path, to, ?reason, "navigation redirected");
        }
        navigation
    }

    /// Wait for session restore, then decide. Never returns `Pending`.
    pub async fn navigate(&self, path: &str) -> Navigation {
        self.session.wait_restored().await;
        self.check(path)
    }

    /// Same decision as [`RouteGate::check`], with the reason behind it.
    pub fn explain(&self, path: &str) -> NavigationExplanation {
        if !self.session.is_restored() {
            return NavigationExplanation {
                path: path.to_string(),
                pattern: None,
                access: None,
                role: None,
                decision: Navigation::Pending,
                reason: "session not restored yet".to_string(),
            };
        }

        let session = self.session.session();
        explain_navigation(&self.table, &session, path)
    }
}
