use super::segment;
use crate::api::{ApiClient, ApiError, ApiResponse, RequestOptions};
use crate::models::{FollowersCountData, FollowersData, FollowingCountData, FollowingData, User};

impl ApiClient {
    pub async fn follow(&self, user_id: &str) -> Result<ApiResponse, ApiError> {
        let path = format!("/user/follow/follow/{}", segment(user_id));
        self.request(&path, RequestOptions::post()).await
    }

    pub async fn unfollow(&self, user_id: &str) -> Result<ApiResponse, ApiError> {
        let path = format!("/user/follow/unfollow/{}", segment(user_id));
        self.request(&path, RequestOptions::post()).await
    }

    pub async fn followers(&self, user_id: &str) -> Result<Vec<User>, ApiError> {
        let path = format!("/user/follow/followers/{}", segment(user_id));
        let data: FollowersData = self.get_data(&path).await?;
        Ok(data.followers)
    }

    pub async fn following(&self, user_id: &str) -> Result<Vec<User>, ApiError> {
        let path = format!("/user/follow/following/{}", segment(user_id));
        let data: FollowingData = self.get_data(&path).await?;
        Ok(data.following)
    }

    pub async fn followers_count(&self, user_id: &str) -> Result<u64, ApiError> {
        let path = format!("/user/follow/followers/count/{}", segment(user_id));
        let data: FollowersCountData = self.get_data(&path).await?;
        Ok(data.followers_count)
    }

    pub async fn following_count(&self, user_id: &str) -> Result<u64, ApiError> {
        let path = format!("/user/follow/following/count/{}", segment(user_id));
        let data: FollowingCountData = self.get_data(&path).await?;
        Ok(data.following_count)
    }

    /// Whether `follower_id` appears among `user_id`'s followers
    pub async fn is_following(&self, user_id: &str, follower_id: &str) -> Result<bool, ApiError> {
        if user_id == follower_id {
            return Ok(false);
        }
        let followers = self.followers(user_id).await?;
        Ok(followers.iter().any(|f| f.id == follower_id))
    }
}
