use serde_json::json;

use super::segment;
use crate::api::{ApiClient, ApiError, ApiResponse, RequestOptions};
use crate::models::{Reply, ReplyData};

impl ApiClient {
    /// Answer another reply; the new reply's `parent_id` is `reply_id`.
    pub async fn reply_to_reply(&self, reply_id: &str, body: &str) -> Result<Reply, ApiError> {
        let path = format!("/feed/replies/{}/reply", segment(reply_id));
        let data: ReplyData = self
            .send_data(&path, RequestOptions::post().json(json!({ "body": body })))
            .await?;
        Ok(data.reply)
    }

    pub async fn delete_reply(&self, reply_id: &str) -> Result<ApiResponse, ApiError> {
        let path = format!("/feed/replies/{}", segment(reply_id));
        self.request(&path, RequestOptions::delete()).await
    }
}
