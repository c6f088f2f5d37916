//! Request options and response types for the request pipeline.

use std::path::Path;

use anyhow::{Context, Result};
use reqwest::{multipart, Method};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::ApiError;

/// A file attached to a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    /// Create an upload, guessing the content type from the file name.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Read an upload from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read attachment {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text(String),
    File(FileUpload),
}

/// Multipart form payload. Kept as plain data so it can be inspected and
/// rebuilt into a `reqwest` form for every send.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    parts: Vec<(String, FormPart)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_text(name, value);
        self
    }

    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parts.push((name.into(), FormPart::Text(value.into())));
    }

    pub fn file(mut self, name: impl Into<String>, file: FileUpload) -> Self {
        self.parts.push((name.into(), FormPart::File(file)));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parts.iter().any(|(n, _)| n == name)
    }

    pub fn parts(&self) -> &[(String, FormPart)] {
        &self.parts
    }

    /// Text value of the first field with this name
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|(n, part)| match part {
            FormPart::Text(value) if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    pub(crate) fn to_multipart(&self) -> Result<multipart::Form, reqwest::Error> {
        let mut form = multipart::Form::new();
        for (name, part) in &self.parts {
            form = match part {
                FormPart::Text(value) => form.text(name.clone(), value.clone()),
                FormPart::File(file) => {
                    let part = multipart::Part::bytes(file.bytes.clone())
                        .file_name(file.file_name.clone())
                        .mime_str(&file.content_type)?;
                    form.part(name.clone(), part)
                }
            };
        }
        Ok(form)
    }
}

/// Request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Form(FormData),
}

/// Options for a single call to [`ApiClient::request`](super::ApiClient::request).
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub payload: Option<Payload>,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::with_method(Method::GET)
    }
}

impl RequestOptions {
    pub fn with_method(method: Method) -> Self {
        Self {
            method,
            payload: None,
            headers: Vec::new(),
            query: Vec::new(),
        }
    }

    pub fn get() -> Self {
        Self::with_method(Method::GET)
    }

    pub fn post() -> Self {
        Self::with_method(Method::POST)
    }

    pub fn put() -> Self {
        Self::with_method(Method::PUT)
    }

    pub fn delete() -> Self {
        Self::with_method(Method::DELETE)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.payload = Some(Payload::Json(body));
        self
    }

    pub fn form(mut self, form: FormData) -> Self {
        self.payload = Some(Payload::Form(form));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub(crate) fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    pub(crate) fn remove_header(&mut self, name: &str) {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }
}

/// Successful response: HTTP status plus the parsed JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

impl ApiResponse {
    /// The `message` field of the envelope, if any.
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }

    /// Decode the envelope's `data` field into the endpoint's canonical
    /// schema. A mismatch is a backend contract violation: it is logged and
    /// reported as `InvalidFormat`.
    pub fn data<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        match serde_json::from_value::<Envelope<T>>(self.body.clone()) {
            Ok(Envelope { data: Some(data) }) => Ok(data),
            Ok(Envelope { data: None }) => {
                warn!(path = path, status = self.status, "Response envelope has no data field");
                Err(ApiError::unexpected_schema(self.status, path, "missing data"))
            }
            Err(e) => {
                warn!(
                    path = path,
                    status = self.status,
                    error = %e,
                    body = %ApiError::truncate_body(&self.body.to_string()),
                    "Response does not match expected schema"
                );
                Err(ApiError::unexpected_schema(self.status, path, &e.to_string()))
            }
        }
    }
}
