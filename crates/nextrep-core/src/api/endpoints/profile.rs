use serde_json::json;
use tracing::debug;

use super::segment;
use crate::api::{ApiClient, ApiError, FileUpload, FormData, RequestOptions};
use crate::models::{Profile, ProfileData, ProfileSummary};

impl ApiClient {
    pub async fn get_self_profile(&self) -> Result<Profile, ApiError> {
        let data: ProfileData = self.get_data("/user/profile/self").await?;
        Ok(data.profile)
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<Profile, ApiError> {
        let path = format!("/user/profile/{}", segment(user_id));
        let data: ProfileData = self.get_data(&path).await?;
        Ok(data.profile)
    }

    pub async fn update_bio(&self, bio: &str) -> Result<Profile, ApiError> {
        self.update_profile_field("/user/profile/bio", json!({ "bio": bio }))
            .await
    }

    pub async fn update_pronouns(&self, pronouns: &str) -> Result<Profile, ApiError> {
        self.update_profile_field("/user/profile/pronouns", json!({ "pronouns": pronouns }))
            .await
    }

    pub async fn update_display_name(&self, display_name: &str) -> Result<Profile, ApiError> {
        self.update_profile_field(
            "/user/profile/display-name",
            json!({ "display_name": display_name }),
        )
        .await
    }

    pub async fn update_profile_picture(&self, picture: FileUpload) -> Result<Profile, ApiError> {
        let path = "/user/profile/picture";
        let form = FormData::new().file("profile_picture", picture);
        let data: ProfileData = self.send_data(path, RequestOptions::put().form(form)).await?;
        Ok(data.profile)
    }

    async fn update_profile_field(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<Profile, ApiError> {
        let data: ProfileData = self.send_data(path, RequestOptions::put().json(body)).await?;
        Ok(data.profile)
    }

    /// Signed URL of a user's profile picture, or `None` if they have none
    /// or it cannot be accessed. A rejected session is still reported.
    pub async fn profile_picture_url(&self, user_id: &str) -> Result<Option<String>, ApiError> {
        let profile = self.get_profile(user_id).await?;
        let Some(asset_id) = profile.profile_picture else {
            return Ok(None);
        };

        let lookup = match self.get_asset(&asset_id).await {
            Ok(_) => self.asset_url(&asset_id).await,
            Err(e) => Err(e),
        };
        optional_part(lookup, user_id, "Profile picture not accessible")
    }

    /// User, profile and follow counts for a profile page. The user is
    /// looked up first and is required; the rest are fetched concurrently,
    /// and a missing profile or count is shown as empty.
    pub async fn profile_summary(&self, user_id: &str) -> Result<ProfileSummary, ApiError> {
        let user = self.get_user(user_id).await?;
        let (profile, followers, following) = futures::join!(
            self.get_profile(user_id),
            self.followers_count(user_id),
            self.following_count(user_id),
        );

        let profile = optional_part(profile, user_id, "Profile unavailable")?;
        let followers_count =
            optional_part(followers, user_id, "Followers count unavailable")?.unwrap_or(0);
        let following_count =
            optional_part(following, user_id, "Following count unavailable")?.unwrap_or(0);

        Ok(ProfileSummary {
            user,
            profile,
            followers_count,
            following_count,
        })
    }
}

/// Treat a failed secondary lookup as missing, except a rejected session.
fn optional_part<T>(
    result: Result<T, ApiError>,
    user_id: &str,
    what: &str,
) -> Result<Option<T>, ApiError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_unauthorized() => Err(e),
        Err(e) => {
            debug!(user_id = user_id, error = %e, "{}", what);
            Ok(None)
        }
    }
}
