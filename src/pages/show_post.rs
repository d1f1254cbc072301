//! Post detail page with its comment thread.

use super::{Notification, report};
use crate::net::api::{ApiClient, GET_POST_FAILED};
use crate::net::types::{Comment, Post};
use crate::state::session::{Gate, Session};

pub const LOGIN_TO_COMMENT: &str = "Please log in to comment.";
pub const COMMENT_PUBLISHED: &str = "Comment published!";

/// What the page can render right now.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShowPostView<'a> {
    Loading,
    /// The post could not be loaded.
    Unavailable(&'a str),
    Ready { post: &'a Post, comments: &'a [Comment] },
}

#[derive(Clone, Debug)]
pub struct ShowPostPage {
    post_id: i64,
    post: Option<Post>,
    comments: Vec<Comment>,
    draft: String,
    loading: bool,
    submitting: bool,
    error: Option<String>,
}

impl ShowPostPage {
    #[must_use]
    pub fn new(post_id: i64) -> Self {
        Self {
            post_id,
            post: None,
            comments: Vec::new(),
            draft: String::new(),
            loading: true,
            submitting: false,
            error: None,
        }
    }

    pub async fn load(&mut self, api: &ApiClient) -> Option<Notification> {
        let result = api.get_post(self.post_id).await;
        self.loading = false;
        match result {
            Ok(detail) => {
                self.post = Some(detail.post);
                self.comments = detail.comments;
                self.error = None;
                None
            }
            Err(e) => {
                let notice = report(api.session(), &e).await;
                self.error = Some(notice.message.clone());
                Some(notice)
            }
        }
    }

    #[must_use]
    pub fn view<'a>(&'a self, session: &Session) -> ShowPostView<'a> {
        if self.loading || session.gate() == Gate::Pending {
            return ShowPostView::Loading;
        }
        match (&self.post, &self.error) {
            (Some(post), None) => ShowPostView::Ready { post, comments: &self.comments },
            (_, Some(error)) => ShowPostView::Unavailable(error),
            (None, None) => ShowPostView::Unavailable(GET_POST_FAILED),
        }
    }

    pub fn set_draft(&mut self, text: &str) {
        text.clone_into(&mut self.draft);
    }

    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    #[must_use]
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Publish the draft as a comment.
    ///
    /// Blank drafts are ignored. On success exactly one comment (backend id,
    /// trimmed text, current user) is appended and the draft is cleared; on
    /// failure the draft is kept.
    pub async fn submit_comment(&mut self, api: &ApiClient) -> Option<Notification> {
        let content = self.draft.trim().to_owned();
        if content.is_empty() {
            return None;
        }
        let Some(user) = api.session().user().await else {
            return Some(Notification::error(LOGIN_TO_COMMENT));
        };

        self.submitting = true;
        let result = api.create_comment(self.post_id, &content).await;
        self.submitting = false;

        match result {
            Ok(created) => {
                self.comments.push(Comment { id: created.id, content, user: Some(user.as_author()) });
                self.draft.clear();
                Some(Notification::success(COMMENT_PUBLISHED))
            }
            Err(e) => Some(report(api.session(), &e).await),
        }
    }
}

#[cfg(test)]
#[path = "show_post_test.rs"]
mod tests;
