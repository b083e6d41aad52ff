//! Saved-query management
//!
//! Saved queries live in the GraphQL schema only. Create and update return the
//! stored query's id and name; the full query text comes back from
//! [`list_saved_queries`](super::Client::list_saved_queries).

use crate::error::{Error, Result};
use crate::types::SavedQuery;
use serde_json::json;

impl super::Client {
    /// Save a query under a name in this client's repository
    pub async fn create_saved_query(
        &self,
        query_name: &str,
        query_string: &str,
    ) -> Result<SavedQuery> {
        let data = self
            .transport()
            .graphql(
                self.token(),
                "mutation($input: CreateSavedQueryInput!) { \
                 createSavedQuery(input: $input) { savedQuery { id, name } } }",
                json!({
                    "input": {
                        "name": query_name,
                        "viewName": self.repository(),
                        "queryString": query_string,
                    }
                }),
            )
            .await?;
        extract_saved_query(&data, "createSavedQuery")
    }

    /// List the repository's saved queries
    pub async fn list_saved_queries(&self) -> Result<Vec<SavedQuery>> {
        let data = self
            .transport()
            .graphql(
                self.token(),
                "query($name: String!) { \
                 repository(name: $name) { \
                 savedQueries { id, name, displayName, query { queryString } } } }",
                json!({ "name": self.repository() }),
            )
            .await?;
        let queries = data
            .pointer("/repository/savedQueries")
            .cloned()
            .ok_or_else(|| Error::Protocol("saved query list missing from response".into()))?;
        Ok(serde_json::from_value(queries)?)
    }

    /// Replace a saved query's name and query text
    pub async fn update_saved_query(
        &self,
        query_id: &str,
        updated_query_name: &str,
        updated_query_string: &str,
    ) -> Result<SavedQuery> {
        let data = self
            .transport()
            .graphql(
                self.token(),
                "mutation($input: UpdateSavedQueryInput!) { \
                 updateSavedQuery(input: $input) { savedQuery { id, name } } }",
                json!({
                    "input": {
                        "id": query_id,
                        "name": updated_query_name,
                        "viewName": self.repository(),
                        "queryString": updated_query_string,
                    }
                }),
            )
            .await?;
        extract_saved_query(&data, "updateSavedQuery")
    }

    /// Delete a saved query by id
    pub async fn delete_saved_query(&self, query_id: &str) -> Result<()> {
        self.transport()
            .graphql(
                self.token(),
                "mutation($input: DeleteSavedQueryInput!) { \
                 deleteSavedQuery(input: $input) { savedQuery { id, name } } }",
                json!({
                    "input": {
                        "id": query_id,
                        "viewName": self.repository(),
                    }
                }),
            )
            .await?;
        Ok(())
    }
}

fn extract_saved_query(data: &serde_json::Value, mutation: &str) -> Result<SavedQuery> {
    let saved = data
        .pointer(&format!("/{mutation}/savedQuery"))
        .cloned()
        .ok_or_else(|| Error::Protocol(format!("{mutation} returned no saved query")))?;
    Ok(serde_json::from_value(saved)?)
}
