//! User and organization administration
//!
//! User management goes through REST endpoints; organizations only exist in the
//! GraphQL schema. Mutation responses are passed back as raw JSON — their shapes
//! are version-dependent and callers rarely need more than success/failure.

use crate::error::{Error, Result};
use crate::transport::Transport;
use crate::types::{Organization, User};
use serde_json::json;

impl super::Client {
    /// List the users registered on the instance (requires root)
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let response = self.transport().get("users", self.token()).await?;
        Transport::json_body(response).await
    }

    /// Find a user by login email, or `None` if no user matches
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.list_users().await?;
        Ok(users.into_iter().find(|u| u.email.as_deref() == Some(email)))
    }

    /// Create a user. Idempotent: creating an existing user is not an error.
    pub async fn create_user(&self, email: &str, is_root: bool) -> Result<serde_json::Value> {
        let body = json!({ "email": email, "isRoot": is_root });
        let response = self
            .transport()
            .post_json("users", self.token(), &body)
            .await?;
        Transport::json_body(response).await
    }

    /// Delete a user by server-assigned id
    pub async fn delete_user_by_id(&self, user_id: &str) -> Result<serde_json::Value> {
        let endpoint = format!("users/{}", urlencoding::encode(user_id));
        let response = self.transport().delete(&endpoint, self.token()).await?;
        Transport::json_body(response).await
    }

    /// Delete a user by login email.
    ///
    /// Returns `Ok(None)` if no user has that email.
    pub async fn delete_user_by_email(&self, email: &str) -> Result<Option<serde_json::Value>> {
        match self.get_user_by_email(email).await? {
            Some(user) => Ok(Some(self.delete_user_by_id(&user.id).await?)),
            None => Ok(None),
        }
    }

    /// List organizations visible to this token
    pub async fn list_organizations(&self) -> Result<Vec<Organization>> {
        let data = self
            .transport()
            .graphql(
                self.token(),
                "query { organizations { id, name, description } }",
                serde_json::Value::Null,
            )
            .await?;
        let organizations = data
            .get("organizations")
            .cloned()
            .ok_or_else(|| Error::Protocol("organization list missing from response".into()))?;
        Ok(serde_json::from_value(organizations)?)
    }

    /// Create an organization, returning its server-assigned id
    pub async fn create_organization(&self, name: &str, description: &str) -> Result<String> {
        let data = self
            .transport()
            .graphql(
                self.token(),
                "mutation($name: String!, $description: String!) { \
                 createOrganization(name: $name, description: $description) { organization { id } } }",
                json!({ "name": name, "description": description }),
            )
            .await?;
        data.pointer("/createOrganization/organization/id")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::Protocol("created organization carried no id".into()))
    }
}
