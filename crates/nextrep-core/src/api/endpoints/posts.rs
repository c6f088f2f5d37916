use futures::future::join_all;
use serde_json::json;
use tracing::{debug, warn};

use super::segment;
use crate::api::{ApiClient, ApiError, ApiResponse, RequestOptions};
use crate::models::{
    Attachment, AttachmentsData, NewPost, Post, PostData, PostQuery, PostsData, RepliesData,
    Reply, ReplyData, ReplyThread,
};

/// Create and list share one path; `id` switches it to single-post lookup.
const POSTS_PATH: &str = "/feed/posts/post";

impl ApiClient {
    /// Publish a post with up to three attachments.
    pub async fn create_post(&self, post: &NewPost) -> Result<ApiResponse, ApiError> {
        let response = self
            .request(POSTS_PATH, RequestOptions::post().form(post.to_form()))
            .await?;
        debug!(title = %post.title, attachments = post.attachments.len(), "Post created");
        Ok(response)
    }

    /// List the feed, optionally filtered, ordered and limited. Untitled
    /// items the server mixes into the list are left out.
    pub async fn list_posts(&self, query: &PostQuery) -> Result<Vec<Post>, ApiError> {
        let mut options = RequestOptions::get();
        for (name, value) in query.query_pairs() {
            options = options.query(name, value);
        }
        let data: PostsData = self.send_data(POSTS_PATH, options).await?;
        let total = data.posts.len();
        let posts: Vec<Post> = data.posts.into_iter().filter(Post::is_post).collect();
        if posts.len() < total {
            debug!(skipped = total - posts.len(), "Dropped untitled feed items");
        }
        Ok(posts)
    }

    pub async fn get_post(&self, post_id: &str) -> Result<Post, ApiError> {
        let options = RequestOptions::get().query("id", post_id);
        let data: PostData = self.send_data(POSTS_PATH, options).await?;
        Ok(data.post)
    }

    pub async fn post_attachments(&self, post_id: &str) -> Result<Vec<Attachment>, ApiError> {
        let path = format!("/feed/posts/{}/attachments", segment(post_id));
        let data: AttachmentsData = self.get_data(&path).await?;
        Ok(data.attachments)
    }

    /// Signed URLs for a post's attachments, in attachment order. An
    /// attachment whose URL cannot be fetched is skipped.
    pub async fn attachment_urls(&self, post_id: &str) -> Result<Vec<String>, ApiError> {
        let attachments = self.post_attachments(post_id).await?;
        let lookups = attachments.iter().map(|a| self.asset_url(&a.asset_id));
        let results = join_all(lookups).await;

        let mut urls = Vec::with_capacity(results.len());
        for (attachment, result) in attachments.iter().zip(results) {
            match result {
                Ok(url) => urls.push(url),
                Err(e) if e.is_unauthorized() => return Err(e),
                Err(e) => {
                    warn!(post_id = post_id, asset_id = %attachment.asset_id, error = %e, "Skipping attachment");
                }
            }
        }
        Ok(urls)
    }

    pub async fn delete_post(&self, post_id: &str) -> Result<ApiResponse, ApiError> {
        let path = format!("/feed/posts/{}", segment(post_id));
        self.request(&path, RequestOptions::delete()).await
    }

    pub async fn reply_to_post(&self, post_id: &str, body: &str) -> Result<Reply, ApiError> {
        let path = format!("/feed/posts/{}/reply", segment(post_id));
        let data: ReplyData = self
            .send_data(&path, RequestOptions::post().json(json!({ "body": body })))
            .await?;
        Ok(data.reply)
    }

    /// All replies to a post, flat, as the server returns them
    pub async fn post_replies(&self, post_id: &str) -> Result<Vec<Reply>, ApiError> {
        let path = format!("/feed/posts/{}/reply", segment(post_id));
        let data: RepliesData = self.get_data(&path).await?;
        Ok(data.replies)
    }

    pub async fn reply_thread(&self, post_id: &str) -> Result<ReplyThread, ApiError> {
        let replies = self.post_replies(post_id).await?;
        Ok(ReplyThread::build(replies))
    }
}
