//! Home page: all posts, filtered by category and a free-text search.

use super::{Notification, report};
use crate::net::api::ApiClient;
use crate::net::types::Post;

/// Category entry that disables category filtering.
pub const ALL_CATEGORIES: &str = "All";

#[derive(Clone, Debug)]
pub struct HomePage {
    posts: Vec<Post>,
    categories: Vec<String>,
    selected_category: String,
    search_query: String,
    loading: bool,
}

impl Default for HomePage {
    fn default() -> Self {
        Self::new()
    }
}

impl HomePage {
    #[must_use]
    pub fn new() -> Self {
        Self {
            posts: Vec::new(),
            categories: vec![ALL_CATEGORIES.to_owned()],
            selected_category: ALL_CATEGORIES.to_owned(),
            search_query: String::new(),
            loading: true,
        }
    }

    /// Fetch every post. On failure the list stays empty and an error
    /// notification is returned.
    pub async fn load(&mut self, api: &ApiClient) -> Option<Notification> {
        let result = api.list_posts().await;
        self.loading = false;
        match result {
            Ok(posts) => {
                self.set_posts(posts);
                None
            }
            Err(e) => Some(report(api.session(), &e).await),
        }
    }

    pub fn set_posts(&mut self, posts: Vec<Post>) {
        let mut categories = vec![ALL_CATEGORIES.to_owned()];
        for name in posts.iter().filter_map(Post::category_name) {
            if !categories.iter().skip(1).any(|c| c == name) {
                categories.push(name.to_owned());
            }
        }
        self.categories = categories;
        self.posts = posts;
        self.loading = false;
    }

    pub fn select_category(&mut self, name: &str) {
        name.clone_into(&mut self.selected_category);
    }

    pub fn set_search(&mut self, query: &str) {
        query.clone_into(&mut self.search_query);
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// `"All"` followed by each category name in first-seen order.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    #[must_use]
    pub fn selected_category(&self) -> &str {
        &self.selected_category
    }

    #[must_use]
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Posts in the selected category whose title or content contains the
    /// search query, ignoring case.
    #[must_use]
    pub fn filtered(&self) -> Vec<&Post> {
        let query = self.search_query.to_lowercase();
        self.posts
            .iter()
            .filter(|post| {
                self.selected_category == ALL_CATEGORIES || post.category_name() == Some(self.selected_category.as_str())
            })
            .filter(|post| post.title.to_lowercase().contains(&query) || post.content.to_lowercase().contains(&query))
            .collect()
    }
}

#[cfg(test)]
#[path = "home_test.rs"]
mod tests;
