use serde::{Deserialize, Serialize};

use jobboard_core::UserId;

use crate::{Capabilities, Role};

/// Authenticated account as issued by the backend.
///
/// Immutable for the lifetime of a session; a server-side role change only
/// takes effect after a fresh login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Identity {
    pub fn capabilities(&self) -> Capabilities {
        Capabilities::for_role(self.role)
    }
}
