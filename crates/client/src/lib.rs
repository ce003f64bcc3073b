//! `jobboard-client` — session store, route gate and REST client for the
//! job board backend.

pub mod api;
pub mod applications;
pub mod config;
pub mod error;
pub mod gate;
pub mod jobs;
pub mod session;
pub mod storage;
pub mod users;

use std::sync::Arc;

pub use api::ApiClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, ApiResult, AuthError, StorageError};
pub use gate::RouteGate;
pub use session::{Registration, SessionStore};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
pub use users::UserSummary;

/// The wired-up client: one session store shared by the gate and the API.
#[derive(Debug, Clone)]
pub struct JobBoard {
    pub session: Arc<SessionStore>,
    pub api: ApiClient,
    pub gate: RouteGate,
}

impl JobBoard {
    /// Wire the components over `storage` and restore the persisted session.
    pub fn start(config: &ClientConfig, storage: Arc<dyn SessionStorage>) -> ApiResult<Self> {
        let session = Arc::new(SessionStore::new(config, storage));
        let api = ApiClient::new(config, session.clone())?;
        let gate = RouteGate::new(session.clone());
        session.restore();

        Ok(Self { session, api, gate })
    }
}
