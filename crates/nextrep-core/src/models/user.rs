use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{de_id, de_opt_id};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            other => Err(format!("unknown visibility '{}' (expected public or private)", other)),
        }
    }
}

/// An account as returned by the `/user/auth` endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct User {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
}

impl User {
    /// Name to show for this user: display name if set, else username.
    pub fn display_label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Profile {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub pronouns: Option<String>,
    /// Asset id of the profile picture
    #[serde(default, deserialize_with = "de_opt_id")]
    pub profile_picture: Option<String>,
}

/// Everything shown on a user's profile page.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSummary {
    pub user: User,
    pub profile: Option<Profile>,
    pub followers_count: u64,
    pub following_count: u64,
}

impl ProfileSummary {
    pub fn display_label(&self) -> &str {
        self.profile
            .as_ref()
            .and_then(|p| p.display_name.as_deref())
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| self.user.display_label())
    }
}

// ===== Response payloads =====

#[derive(Debug, Clone, Deserialize)]
pub struct AuthData {
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserData {
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsersData {
    pub users: Vec<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileData {
    pub profile: Profile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FollowersData {
    pub followers: Vec<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FollowingData {
    pub following: Vec<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FollowersCountData {
    #[serde(rename = "followersCount")]
    pub followers_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FollowingCountData {
    #[serde(rename = "followingCount")]
    pub following_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(display_name: Option<&str>) -> User {
        User {
            id: "1".to_string(),
            username: "ada".to_string(),
            email: None,
            display_name: display_name.map(String::from),
            visibility: None,
        }
    }

    #[test]
    fn test_display_label_prefers_display_name() {
        assert_eq!(user(Some("Ada L.")).display_label(), "Ada L.");
        assert_eq!(user(None).display_label(), "ada");
        assert_eq!(user(Some("  ")).display_label(), "ada");
    }

    #[test]
    fn test_summary_label_prefers_profile() {
        let summary = ProfileSummary {
            user: user(Some("Ada L.")),
            profile: Some(Profile {
                display_name: Some("Countess".to_string()),
                ..Profile::default()
            }),
            followers_count: 0,
            following_count: 0,
        };
        assert_eq!(summary.display_label(), "Countess");

        let summary = ProfileSummary {
            profile: None,
            ..summary
        };
        assert_eq!(summary.display_label(), "Ada L.");
    }

    #[test]
    fn test_visibility_parse() {
        assert_eq!("Public".parse::<Visibility>(), Ok(Visibility::Public));
        assert_eq!("private".parse::<Visibility>(), Ok(Visibility::Private));
        assert!("friends".parse::<Visibility>().is_err());
    }

    #[test]
    fn test_parse_user_with_numeric_id() {
        let json = r#"{"id": 12, "username": "ada", "visibility": "private", "created_at": "x"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, "12");
        assert_eq!(user.visibility, Some(Visibility::Private));
    }

    #[test]
    fn test_parse_counts() {
        let data: FollowersCountData = serde_json::from_str(r#"{"followersCount": 3}"#).unwrap();
        assert_eq!(data.followers_count, 3);
        let data: FollowingCountData = serde_json::from_str(r#"{"followingCount": 0}"#).unwrap();
        assert_eq!(data.following_count, 0);
    }
}
