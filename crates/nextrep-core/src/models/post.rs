use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{de_id, de_opt_id, Visibility};
use crate::api::{FileUpload, FormData};

/// The backend accepts at most this many attachments per post.
pub const MAX_ATTACHMENTS: usize = 3;

/// Number of posts the feed asks for unless told otherwise.
pub const DEFAULT_FEED_LIMIT: u32 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Post {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub author_id: Option<String>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Post {
    /// The post list also carries replies, which have no title.
    pub fn is_post(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Only the author may delete a post.
    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.author_id.as_deref() == Some(user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Attachment {
    #[serde(deserialize_with = "de_id")]
    pub asset_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ascending",
            SortOrder::Descending => "descending",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ascending" | "asc" => Ok(SortOrder::Ascending),
            "descending" | "desc" => Ok(SortOrder::Descending),
            other => Err(format!("unknown order '{}' (expected ascending or descending)", other)),
        }
    }
}

/// Filters for listing the feed. Unset fields are left out of the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    pub search_term: Option<String>,
    pub order: Option<SortOrder>,
    pub limit: Option<u32>,
}

impl PostQuery {
    /// Newest first, up to `DEFAULT_FEED_LIMIT` posts.
    pub fn feed() -> Self {
        Self {
            search_term: None,
            order: Some(SortOrder::Descending),
            limit: Some(DEFAULT_FEED_LIMIT),
        }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(ref term) = self.search_term {
            if !term.is_empty() {
                pairs.push(("search_term", term.clone()));
            }
        }
        if let Some(order) = self.order {
            pairs.push(("order", order.as_str().to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

/// A post to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub attachments: Vec<FileUpload>,
    pub visibility: Visibility,
}

impl NewPost {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            attachments: Vec::new(),
            visibility: Visibility::Private,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_attachment(mut self, file: FileUpload) -> Self {
        self.attachments.push(file);
        self
    }

    /// Multipart form for the create endpoint. Attachments past
    /// `MAX_ATTACHMENTS` are dropped.
    pub fn to_form(&self) -> FormData {
        if self.attachments.len() > MAX_ATTACHMENTS {
            warn!(
                given = self.attachments.len(),
                kept = MAX_ATTACHMENTS,
                "Too many attachments, extra files dropped"
            );
        }
        let mut form = FormData::new()
            .text("title", self.title.as_str())
            .text("body", self.body.as_str())
            .text("visibility", self.visibility.as_str());
        for file in self.attachments.iter().take(MAX_ATTACHMENTS) {
            form = form.file("attachments", file.clone());
        }
        form
    }
}

// ===== Response payloads =====

#[derive(Debug, Clone, Deserialize)]
pub struct PostsData {
    pub posts: Vec<Post>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostData {
    pub post: Post,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentsData {
    pub attachments: Vec<Attachment>,
}
