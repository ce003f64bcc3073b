//! References to user accounts embedded in other records.

use serde::{Deserialize, Serialize};

use crate::UserId;

/// A user as embedded (populated) inside a job or application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// A user reference that the backend either populated or left as a bare id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserLink {
    User(UserRef),
    Id(UserId),
}

impl UserLink {
    pub fn id(&self) -> &UserId {
        match self {
            UserLink::User(user) => &user.id,
            UserLink::Id(id) => id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            UserLink::User(user) => user.name.as_deref(),
            UserLink::Id(_) => None,
        }
    }
}
