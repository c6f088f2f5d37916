use serde_json::json;
use tracing::{debug, info};

use super::segment;
use crate::api::{ApiClient, ApiError, ApiResponse, RequestOptions};
use crate::models::{AuthData, User, UserData, UsersData, Visibility};

impl ApiClient {
    /// Create an account and start a session with the returned token.
    pub async fn sign_up(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<String, ApiError> {
        let path = "/user/auth/sign-up";
        let options = RequestOptions::post().json(json!({
            "username": username,
            "email": email,
            "password": password,
        }));
        let auth: AuthData = self.send_data(path, options).await?;
        self.start_session(&auth.token)?;
        info!(username = username, "Signed up");
        Ok(auth.token)
    }

    /// Log in with a username or email (`key`) and start a session.
    pub async fn login(&self, key: &str, password: &str) -> Result<String, ApiError> {
        let path = "/user/auth/login";
        let options = RequestOptions::post().json(json!({
            "key": key,
            "password": password,
        }));
        let auth: AuthData = self.send_data(path, options).await?;
        self.start_session(&auth.token)?;
        info!(key = key, "Logged in");
        Ok(auth.token)
    }

    pub async fn get_user(&self, id: &str) -> Result<User, ApiError> {
        let path = format!("/user/auth/{}", segment(id));
        let data: UserData = self.get_data(&path).await?;
        Ok(data.user)
    }

    /// The account that owns the current session
    pub async fn get_self_user(&self) -> Result<User, ApiError> {
        let data: UserData = self.get_data("/user/auth/self").await?;
        Ok(data.user)
    }

    /// Search users by username or display name
    pub async fn search_users(&self, term: &str) -> Result<Vec<User>, ApiError> {
        let path = format!("/user/auth/search/{}", segment(term));
        let data: UsersData = self.get_data(&path).await?;
        debug!(term = term, results = data.users.len(), "User search complete");
        Ok(data.users)
    }

    pub async fn update_visibility(&self, visibility: Visibility) -> Result<ApiResponse, ApiError> {
        self.request(
            "/user/auth/visibility",
            RequestOptions::put().json(json!({ "visibility": visibility })),
        )
        .await
    }
}
