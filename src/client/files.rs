//! Uploads and session files. Only the agent service hosts these routes;
//! on any other backend every operation fails before touching the network.

use super::core::ApiClient;
use super::types::UploadedFile;
use crate::transport::{MultipartRequest, RequestEnvelope, UploadFile};
use crate::Result;
use serde_json::Value;

impl ApiClient {
    /// Upload a single file (`POST /upload`, field `file`).
    pub async fn upload_file(&self, file: UploadFile) -> Result<UploadedFile> {
        self.require_file_support("upload_file")?;
        let value = self
            .request_multipart(MultipartRequest::post("/upload", "file", vec![file]))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Attach files to a session (`POST /sessions/{id}/files`, field `files`, repeated).
    pub async fn upload_session_files(
        &self,
        session_id: &str,
        files: Vec<UploadFile>,
    ) -> Result<Value> {
        self.require_file_support("upload_session_files")?;
        self.request_multipart(MultipartRequest::post(
            format!("/sessions/{}/files", session_id),
            "files",
            files,
        ))
        .await
    }

    pub async fn get_session_files(&self, session_id: &str) -> Result<Value> {
        self.require_file_support("get_session_files")?;
        self.request(RequestEnvelope::get(format!("/sessions/{}/files", session_id)))
            .await
    }

    pub async fn delete_session_file(&self, session_id: &str, file_id: &str) -> Result<Value> {
        self.require_file_support("delete_session_file")?;
        self.request(RequestEnvelope::delete(format!(
            "/sessions/{}/files/{}",
            session_id, file_id
        )))
        .await
    }
}
