//! New-post form with optional image/video attachment.

use std::path::Path;

use super::{FieldErrors, Notification, SubmitError, report};
use crate::net::api::ApiClient;
use crate::net::types::{MediaUpload, NewPost, Post};

/// Upload limit enforced before sending.
pub const MAX_MEDIA_BYTES: usize = 4 * 1024 * 1024;

pub const ALLOWED_MEDIA_TYPES: [&str; 6] = ["image/jpeg", "image/png", "image/gif", "video/mp4", "video/mov", "video/avi"];

pub const POST_CREATED: &str = "Post created!";
pub const LOGIN_TO_POST: &str = "Please log in to create a post.";

#[derive(Clone, Debug, Default)]
pub struct CreatePostForm {
    title: String,
    content: String,
    media: Option<MediaUpload>,
    errors: FieldErrors,
    submitting: bool,
}

impl CreatePostForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_title(&mut self, title: &str) {
        title.clone_into(&mut self.title);
        self.errors.remove("title");
    }

    pub fn set_content(&mut self, content: &str) {
        content.clone_into(&mut self.content);
        self.errors.remove("content");
    }

    pub fn set_media(&mut self, media: Option<MediaUpload>) {
        self.media = media;
        self.errors.remove("media");
    }

    #[must_use]
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    #[must_use]
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Check required fields and the attachment's type and size.
    pub fn validate(&mut self) -> bool {
        let mut errors = FieldErrors::new();
        if self.title.is_empty() {
            errors.insert("title", "Title is required".to_owned());
        }
        if self.content.is_empty() {
            errors.insert("content", "Content is required".to_owned());
        }
        if let Some(media) = &self.media {
            if !ALLOWED_MEDIA_TYPES.contains(&media.content_type.as_str()) {
                errors.insert("media", "The file must be an image or a video (jpg, png, gif, mp4, mov, avi)".to_owned());
            }
            if media.bytes.len() > MAX_MEDIA_BYTES {
                errors.insert("media", "The file must not exceed 4 MB".to_owned());
            }
        }
        self.errors = errors;
        self.errors.is_empty()
    }

    /// Validate, then send the post.
    ///
    /// # Errors
    ///
    /// [`SubmitError::Invalid`] when validation fails, [`SubmitError::LoginRequired`]
    /// without a session, [`SubmitError::Failed`] when the backend refuses. The
    /// backend message is also kept as the form's `api` error.
    pub async fn submit(&mut self, api: &ApiClient) -> Result<(Post, Notification), SubmitError> {
        if !self.validate() {
            return Err(SubmitError::Invalid);
        }
        if api.session().user().await.is_none() {
            return Err(SubmitError::LoginRequired(Notification::error(LOGIN_TO_POST)));
        }

        let new_post = NewPost { title: self.title.clone(), content: self.content.clone(), media: self.media.clone() };
        self.submitting = true;
        let result = api.create_post(new_post).await;
        self.submitting = false;

        match result {
            Ok(post) => Ok((post, Notification::success(POST_CREATED))),
            Err(e) => {
                let notice = report(api.session(), &e).await;
                self.errors.insert("api", notice.message.clone());
                Err(SubmitError::Failed(notice))
            }
        }
    }
}

/// MIME type implied by a file extension, as the upload form would report it.
#[must_use]
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/mov",
        Some("avi") => "video/avi",
        _ => "application/octet-stream",
    }
}

/// Read a file from disk into an upload.
///
/// # Errors
///
/// Returns the underlying I/O error if the file cannot be read.
pub fn media_from_file(path: &Path) -> std::io::Result<MediaUpload> {
    let bytes = std::fs::read(path)?;
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("upload").to_owned();
    Ok(MediaUpload { file_name, content_type: content_type_for(path).to_owned(), bytes })
}

#[cfg(test)]
#[path = "create_post_test.rs"]
mod tests;
