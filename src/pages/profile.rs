//! Profile page: the signed-in user's own posts.

use time::OffsetDateTime;

use super::{Notification, report};
use crate::net::api::ApiClient;
use crate::net::types::{Post, User};
use crate::state::session::{Gate, Session};

pub const POST_DELETED: &str = "Post deleted.";

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProfileView<'a> {
    Loading,
    /// No session: ask the visitor to log in.
    Anonymous,
    /// The post list could not be loaded.
    Unavailable(&'a str),
    Ready { user: &'a User, posts: &'a [Post] },
}

#[derive(Clone, Debug)]
pub struct ProfilePage {
    posts: Vec<Post>,
    loading: bool,
    error: Option<String>,
}

impl Default for ProfilePage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfilePage {
    #[must_use]
    pub fn new() -> Self {
        Self { posts: Vec::new(), loading: true, error: None }
    }

    /// Fetch all posts and keep the ones owned by the current user.
    ///
    /// Without a session nothing is fetched.
    pub async fn load(&mut self, api: &ApiClient) -> Option<Notification> {
        let Some(user) = api.session().user().await else {
            self.loading = false;
            return None;
        };
        let result = api.list_posts().await;
        self.loading = false;
        match result {
            Ok(posts) => {
                self.posts = owned_posts(posts, &user);
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
    pub fn view<'a>(&'a self, session: &'a Session) -> ProfileView<'a> {
        match session.gate() {
            Gate::Pending => ProfileView::Loading,
            Gate::Anonymous => ProfileView::Anonymous,
            Gate::Authenticated(_) if self.loading => ProfileView::Loading,
            Gate::Authenticated(user) => match &self.error {
                Some(error) => ProfileView::Unavailable(error),
                None => ProfileView::Ready { user, posts: &self.posts },
            },
        }
    }

    #[must_use]
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Posts created in the same calendar month (and year) as `now`.
    #[must_use]
    pub fn posts_this_month(&self, now: OffsetDateTime) -> usize {
        self.posts
            .iter()
            .filter(|p| p.created_at.year() == now.year() && p.created_at.month() == now.month())
            .count()
    }

    /// Delete one of the user's posts; it leaves the list only once the
    /// backend confirms.
    pub async fn delete(&mut self, api: &ApiClient, post_id: i64) -> Notification {
        match api.delete_post(post_id).await {
            Ok(()) => {
                self.posts.retain(|p| p.id != post_id);
                Notification::success(POST_DELETED)
            }
            Err(e) => report(api.session(), &e).await,
        }
    }
}

/// Keep only posts whose owner is `user`.
#[must_use]
pub fn owned_posts(posts: Vec<Post>, user: &User) -> Vec<Post> {
    posts.into_iter().filter(|p| p.is_owned_by(user)).collect()
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
