//! Resource operations on posts and comments.
//!
//! AUTHENTICATION
//! ==============
//! Every request asks the session store for the current bearer token at send
//! time; anonymous sessions send none. A 401 is returned to the caller as
//! [`ApiError::Unauthorized`] without retrying. Deciding whether to drop the
//! session is the caller's job (see `pages::report`).

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use reqwest::Method;
use reqwest::multipart::{Form, Part};

use super::error::ApiError;
use super::http::Transport;
use super::types::{Comment, NewComment, NewPost, Post, PostDetail};
use crate::state::session::SessionStore;

pub const LIST_POSTS_FAILED: &str = "Failed to load posts.";
pub const GET_POST_FAILED: &str = "Failed to load the post.";
pub const CREATE_POST_FAILED: &str = "Failed to create the post.";
pub const DELETE_POST_FAILED: &str = "Failed to delete the post.";
pub const CREATE_COMMENT_FAILED: &str = "Failed to publish the comment.";

#[derive(Clone)]
pub struct ApiClient {
    session: SessionStore,
}

impl ApiClient {
    /// Client sharing `session`'s transport and credential.
    #[must_use]
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn transport(&self) -> &Transport {
        self.session.transport()
    }

    async fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let token = self.session.bearer().await;
        self.transport().request(method, path, token.as_deref())
    }

    /// `GET /api/posts`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, a non-success status or a malformed body.
    pub async fn list_posts(&self) -> Result<Vec<Post>, ApiError> {
        let request = self.request(Method::GET, "/api/posts").await;
        self.transport().send_json(request, LIST_POSTS_FAILED).await
    }

    /// `GET /api/posts/{id}`, including comments.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, a non-success status or a malformed body.
    pub async fn get_post(&self, id: i64) -> Result<PostDetail, ApiError> {
        let request = self.request(Method::GET, &format!("/api/posts/{id}")).await;
        self.transport().send_json(request, GET_POST_FAILED).await
    }

    /// `POST /api/posts` as multipart with `title`, `content` and optional `media`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, a non-success status or a malformed body.
    pub async fn create_post(&self, new_post: NewPost) -> Result<Post, ApiError> {
        let mut form = Form::new().text("title", new_post.title).text("content", new_post.content);
        if let Some(media) = new_post.media {
            let part = Part::bytes(media.bytes)
                .file_name(media.file_name)
                .mime_str(&media.content_type)
                .map_err(|e| ApiError::InvalidRequest(format!("media type {e}")))?;
            form = form.part("media", part);
        }

        let request = self.request(Method::POST, "/api/posts").await.multipart(form);
        let post: Post = self.transport().send_json(request, CREATE_POST_FAILED).await?;
        tracing::info!(post_id = post.id, "post created");
        Ok(post)
    }

    /// `DELETE /api/posts/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn delete_post(&self, id: i64) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, &format!("/api/posts/{id}")).await;
        self.transport().send(request, DELETE_POST_FAILED).await?;
        tracing::info!(post_id = id, "post deleted");
        Ok(())
    }

    /// `POST /api/posts/{post_id}/comments`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, a non-success status or a malformed body.
    pub async fn create_comment(&self, post_id: i64, content: &str) -> Result<Comment, ApiError> {
        let request = self
            .request(Method::POST, &format!("/api/posts/{post_id}/comments"))
            .await
            .json(&NewComment { content });
        self.transport().send_json(request, CREATE_COMMENT_FAILED).await
    }
}
