use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{de_id, de_opt_id};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Reply {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub post_id: Option<String>,
    /// Set when this reply answers another reply rather than the post
    #[serde(default, deserialize_with = "de_opt_id")]
    pub parent_id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub author_id: Option<String>,
    pub body: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Reply {
    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.author_id.as_deref() == Some(user_id)
    }
}

/// Replies to a post, arranged as top-level replies plus their children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplyThread {
    pub top_level: Vec<Reply>,
    pub nested: HashMap<String, Vec<Reply>>,
}

impl ReplyThread {
    /// Build a thread from the flat list the server returns. Duplicate ids
    /// keep their first occurrence; server order is kept within each level.
    pub fn build(replies: Vec<Reply>) -> Self {
        let mut seen = HashSet::new();
        let mut thread = ReplyThread::default();

        for reply in replies {
            if !seen.insert(reply.id.clone()) {
                continue;
            }
            match reply.parent_id.clone() {
                Some(parent) => thread.nested.entry(parent).or_default().push(reply),
                None => thread.top_level.push(reply),
            }
        }
        thread
    }

    pub fn children(&self, reply_id: &str) -> &[Reply] {
        self.nested.get(reply_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.top_level.len() + self.nested.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every reply in the thread, parents before their children
    pub fn iter(&self) -> impl Iterator<Item = &Reply> {
        self.top_level
            .iter()
            .flat_map(move |r| std::iter::once(r).chain(self.children(&r.id).iter()))
    }
}

// ===== Response payloads =====

#[derive(Debug, Clone, Deserialize)]
pub struct ReplyData {
    pub reply: Reply,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepliesData {
    pub replies: Vec<Reply>,
}
