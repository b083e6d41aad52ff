//! Uploaded-file management
//!
//! Repositories can hold small CSV-like lookup files that queries join against.
//! Upload and download are REST (the payload is the file itself); everything else
//! (create, list, paging, row edits, delete) goes through GraphQL.

use crate::error::{Error, Result};
use crate::types::{FileContent, FileName};
use serde::Deserialize;
use serde_json::json;
use std::path::Path;

/// GraphQL wrapper around a file's name-and-path pair
#[derive(Deserialize)]
struct FileEntry {
    #[serde(rename = "nameAndPath")]
    name_and_path: FileName,
}

impl super::Client {
    /// Upload a local file to this client's repository
    pub async fn upload_file(&self, path: &Path) -> Result<()> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                Error::Io(std::io::Error::other(format!(
                    "path {} has no usable file name",
                    path.display()
                )))
            })?
            .to_string();
        let bytes = tokio::fs::read(path).await?;

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.clone());
        let form = reqwest::multipart::Form::new().part("file", part);

        let endpoint = format!("dataspaces/{}/files", self.repository());
        self.transport()
            .post_multipart(&endpoint, self.token(), form)
            .await?;

        tracing::debug!(repository = %self.repository(), file = %file_name, "uploaded file");
        Ok(())
    }

    /// Create an empty file in the repository
    pub async fn create_file(&self, file_name: &str) -> Result<FileName> {
        let data = self
            .transport()
            .graphql(
                self.token(),
                "mutation($fileName: String!, $repo: String!) { \
                 newFile(fileName: $fileName, name: $repo) { nameAndPath { name, path } } }",
                json!({ "fileName": file_name, "repo": self.repository() }),
            )
            .await?;
        let name_and_path = data
            .pointer("/newFile/nameAndPath")
            .cloned()
            .ok_or_else(|| Error::Protocol("created file carried no name".into()))?;
        Ok(serde_json::from_value(name_and_path)?)
    }

    /// List the files uploaded to the repository
    pub async fn list_files(&self) -> Result<Vec<FileName>> {
        let data = self
            .transport()
            .graphql(
                self.token(),
                "query($name: String!) { \
                 searchDomain(name: $name) { files { nameAndPath { path, name } } } }",
                json!({ "name": self.repository() }),
            )
            .await?;
        let files = data
            .pointer("/searchDomain/files")
            .cloned()
            .ok_or_else(|| Error::Protocol("file list missing from response".into()))?;
        let entries: Vec<FileEntry> = serde_json::from_value(files)?;
        Ok(entries.into_iter().map(|e| e.name_and_path).collect())
    }

    /// Fetch a window of rows from a file, optionally filtered
    pub async fn get_file_content(
        &self,
        file_name: &str,
        offset: u64,
        limit: u64,
        filter_string: Option<&str>,
    ) -> Result<FileContent> {
        let data = self
            .transport()
            .graphql(
                self.token(),
                "query($name: String!, $fileName: String!, $offset: Int!, $limit: Int!, $filterString: String) { \
                 getFileContent(name: $name, fileName: $fileName, offset: $offset, limit: $limit, filterString: $filterString) { \
                 totalLinesCount, limit, offset, headers, lines } }",
                json!({
                    "name": self.repository(),
                    "fileName": file_name,
                    "offset": offset,
                    "limit": limit,
                    "filterString": filter_string,
                }),
            )
            .await?;
        let content = data
            .get("getFileContent")
            .cloned()
            .ok_or_else(|| Error::Protocol("file content missing from response".into()))?;
        Ok(serde_json::from_value(content)?)
    }

    /// Download a file's raw bytes
    pub async fn download_file(&self, file_name: &str) -> Result<Vec<u8>> {
        let endpoint = format!(
            "dataspaces/{}/files/{}",
            self.repository(),
            urlencoding::encode(file_name)
        );
        let response = self.transport().get(&endpoint, self.token()).await?;
        let bytes = response.bytes().await.map_err(Error::from_transport)?;
        Ok(bytes.to_vec())
    }

    /// Delete a file from the repository
    pub async fn delete_file(&self, file_name: &str) -> Result<()> {
        self.transport()
            .graphql(
                self.token(),
                "mutation($fileName: String!, $repo: String!) { \
                 removeFile(fileName: $fileName, name: $repo) { __typename } }",
                json!({ "fileName": file_name, "repo": self.repository() }),
            )
            .await?;
        Ok(())
    }

    /// Overwrite rows in a window of a file and/or apply whole-file column changes.
    ///
    /// `changed_rows` replaces the rows between `offset` and `offset + limit`;
    /// `column_changes` applies to every row in the file.
    pub async fn add_file_contents(
        &self,
        file_name: &str,
        file_headers: &[String],
        changed_rows: &[Vec<String>],
        column_changes: &[serde_json::Value],
        offset: u64,
        limit: u64,
    ) -> Result<FileContent> {
        self.update_file_contents(file_name, file_headers, changed_rows, column_changes, offset, limit)
            .await
    }

    /// Clear all rows in a window of a file
    pub async fn remove_file_contents(
        &self,
        file_name: &str,
        offset: u64,
        limit: u64,
    ) -> Result<FileContent> {
        self.update_file_contents(file_name, &[], &[], &[], offset, limit)
            .await
    }

    async fn update_file_contents(
        &self,
        file_name: &str,
        file_headers: &[String],
        changed_rows: &[Vec<String>],
        column_changes: &[serde_json::Value],
        offset: u64,
        limit: u64,
    ) -> Result<FileContent> {
        let data = self
            .transport()
            .graphql(
                self.token(),
                "mutation($fileName: String!, $name: String!, $changedRows: [[String!]!]!, \
                 $headers: [String!]!, $columnChanges: [ColumnChange!]!, $limit: Int, $offset: Int) { \
                 updateFile(limit: $limit, offset: $offset, fileName: $fileName, name: $name, \
                 changedRows: $changedRows, headers: $headers, columnChanges: $columnChanges) { \
                 offset, limit, totalLinesCount, headers, lines, nameAndPath { name, path } } }",
                json!({
                    "name": self.repository(),
                    "fileName": file_name,
                    "changedRows": changed_rows,
                    "headers": file_headers,
                    "columnChanges": column_changes,
                    "offset": offset,
                    "limit": limit,
                }),
            )
            .await?;
        let content = data
            .get("updateFile")
            .cloned()
            .ok_or_else(|| Error::Protocol("file update returned no content".into()))?;
        Ok(serde_json::from_value(content)?)
    }
}
