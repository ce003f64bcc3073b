//! `/users` endpoints (admin only).

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::info;

use jobboard_auth::{Capability, Role};
use jobboard_core::UserId;

use crate::api::ApiClient;
use crate::error::ApiResult;

/// One row of the admin user listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct RoleUpdate {
    role: Role,
}

impl ApiClient {
    /// `GET /users`
    pub async fn list_users(&self) -> ApiResult<Vec<UserSummary>> {
        self.require(Capability::Administer)?;
        self.get_json("/users").await
    }

    /// `DELETE /users/:id`
    pub async fn delete_user(&self, id: &UserId) -> ApiResult<()> {
        self.require(Capability::Administer)?;

        self.send_unit(self.request(Method::DELETE, &format!("/users/{id}")))
            .await?;
        info!(user_id = %id, "user deleted");
        Ok(())
    }

    /// `PUT /users/:id/role`. Takes effect for that user at their next sign-in.
    pub async fn set_user_role(&self, id: &UserId, role: Role) -> ApiResult<()> {
        self.require(Capability::Administer)?;

        let request = self
            .request(Method::PUT, &format!("/users/{id}/role"))
            .json(&RoleUpdate { role });
        self.send_unit(request).await?;
        info!(user_id = %id, %role, "user role updated");
        Ok(())
    }
}
