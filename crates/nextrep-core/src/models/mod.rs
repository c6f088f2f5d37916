//! Data models for Nextrep entities.
//!
//! Each endpoint decodes one of these canonical schemas from the `data`
//! field of the response envelope:
//!
//! - `User`, `Profile`: accounts and their public profile
//! - `Post`, `Attachment`, `PostQuery`: feed entries and how to list them
//! - `Reply`, `ReplyThread`: replies and their two-level tree
//! - `Asset`: uploaded file metadata
//!
//! Identifiers arrive as either JSON strings or integers and are kept as
//! strings.

pub mod asset;
pub mod post;
pub mod reply;
pub mod user;

pub use asset::{Asset, AssetData, SignedUrlData};
pub use post::{
    Attachment, AttachmentsData, NewPost, Post, PostData, PostQuery, PostsData, SortOrder,
    DEFAULT_FEED_LIMIT, MAX_ATTACHMENTS,
};
pub use reply::{RepliesData, Reply, ReplyData, ReplyThread};
pub use user::{
    AuthData, FollowersCountData, FollowersData, FollowingCountData, FollowingData, Profile,
    ProfileData, ProfileSummary, User, UserData, UsersData, Visibility,
};

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Int(n) => n.to_string(),
        }
    }
}

pub(crate) fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

pub(crate) fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawId>::deserialize(deserializer).map(|id| id.map(String::from))
}
