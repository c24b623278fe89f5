//! Article model
//!
//! - `Article` is a news story, joined with its category, state and author names
//! - `ArticleStatus` is the publication state
//! - `ArticleFilter` narrows list queries for both the desk and the public site

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// News article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Unique identifier
    pub id: i64,
    /// Headline
    pub title: String,
    /// URL-friendly slug (unique)
    pub slug: String,
    /// Standfirst shown on cards
    pub summary: Option<String>,
    /// Story body
    pub content: String,
    /// Lead image
    pub featured_image_url: Option<String>,
    /// Publication status
    pub status: ArticleStatus,
    /// Shown in the breaking ticker
    pub is_breaking: bool,
    /// Eligible for the featured block on the front page
    pub is_featured: bool,
    pub category_id: Option<i64>,
    pub state_id: Option<i64>,
    /// Author user ID
    pub author_id: i64,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    /// Set when the article first goes live, cleared when it is pulled
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Joined category name
    #[serde(default)]
    pub category_name: Option<String>,
    /// Joined state name
    #[serde(default)]
    pub state_name: Option<String>,
    /// Joined author display name
    #[serde(default)]
    pub author_name: Option<String>,
}

impl Article {
    pub fn is_published(&self) -> bool {
        self.status == ArticleStatus::Published
    }
}

/// Article publication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    /// Not visible to the public
    #[default]
    Draft,
    /// Visible to the public
    Published,
    /// Hidden but kept
    Archived,
}

impl ArticleStatus {
    /// Database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Published => "published",
            ArticleStatus::Archived => "archived",
        }
    }

    /// Parse from the database string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(ArticleStatus::Draft),
            "published" => Some(ArticleStatus::Published),
            "archived" => Some(ArticleStatus::Archived),
            _ => None,
        }
    }
}

impl std::fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input for creating an article. The slug is already resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateArticleInput {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub author_id: i64,
    pub summary: Option<String>,
    pub featured_image_url: Option<String>,
    pub status: ArticleStatus,
    pub is_breaking: bool,
    pub is_featured: bool,
    pub category_id: Option<i64>,
    pub state_id: Option<i64>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
}

impl CreateArticleInput {
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        content: impl Into<String>,
        author_id: i64,
    ) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            content: content.into(),
            author_id,
            summary: None,
            featured_image_url: None,
            status: ArticleStatus::Draft,
            is_breaking: false,
            is_featured: false,
            category_id: None,
            state_id: None,
            meta_title: None,
            meta_description: None,
            meta_keywords: None,
        }
    }

    pub fn with_status(mut self, status: ArticleStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_state(mut self, state_id: i64) -> Self {
        self.state_id = Some(state_id);
        self
    }

    pub fn breaking(mut self) -> Self {
        self.is_breaking = true;
        self
    }

    pub fn featured(mut self) -> Self {
        self.is_featured = true;
        self
    }
}

/// Partial update. `None` leaves a field unchanged; for the nullable
/// references `Some(None)` clears them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateArticleInput {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub featured_image_url: Option<String>,
    pub status: Option<ArticleStatus>,
    pub is_breaking: Option<bool>,
    pub is_featured: Option<bool>,
    pub category_id: Option<Option<i64>>,
    pub state_id: Option<Option<i64>>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
}

impl UpdateArticleInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_status(mut self, status: ArticleStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_breaking(mut self, is_breaking: bool) -> Self {
        self.is_breaking = Some(is_breaking);
        self
    }

    pub fn with_featured(mut self, is_featured: bool) -> Self {
        self.is_featured = Some(is_featured);
        self
    }

    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.slug.is_some()
            || self.summary.is_some()
            || self.content.is_some()
            || self.featured_image_url.is_some()
            || self.status.is_some()
            || self.is_breaking.is_some()
            || self.is_featured.is_some()
            || self.category_id.is_some()
            || self.state_id.is_some()
            || self.meta_title.is_some()
            || self.meta_description.is_some()
            || self.meta_keywords.is_some()
    }
}

/// Filters for article listings. Unset fields do not restrict the query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleFilter {
    pub status: Option<ArticleStatus>,
    pub category_id: Option<i64>,
    pub category_slug: Option<String>,
    pub state_id: Option<i64>,
    pub state_slug: Option<String>,
    pub is_breaking: Option<bool>,
    pub is_featured: Option<bool>,
    /// Substring match on title and summary
    pub search: Option<String>,
}

impl ArticleFilter {
    /// Only what readers may see
    pub fn published() -> Self {
        Self {
            status: Some(ArticleStatus::Published),
            ..Default::default()
        }
    }

    pub fn breaking(mut self) -> Self {
        self.is_breaking = Some(true);
        self
    }

    pub fn featured(mut self) -> Self {
        self.is_featured = Some(true);
        self
    }

    pub fn in_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing() {
        assert_eq!(ArticleStatus::from_str("Published"), Some(ArticleStatus::Published));
        assert_eq!(ArticleStatus::from_str("archived"), Some(ArticleStatus::Archived));
        assert_eq!(ArticleStatus::from_str("pending"), None);
        assert_eq!(ArticleStatus::default(), ArticleStatus::Draft);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&ArticleStatus::Published).unwrap();
        assert_eq!(json, "\"published\"");
    }

    #[test]
    fn test_update_has_changes() {
        assert!(!UpdateArticleInput::new().has_changes());
        assert!(UpdateArticleInput::new().with_breaking(true).has_changes());

        let clear_category = UpdateArticleInput {
            category_id: Some(None),
            ..Default::default()
        };
        assert!(clear_category.has_changes());
    }

    #[test]
    fn test_published_filter() {
        let filter = ArticleFilter::published().breaking().in_category(3);
        assert_eq!(filter.status, Some(ArticleStatus::Published));
        assert_eq!(filter.is_breaking, Some(true));
        assert_eq!(filter.category_id, Some(3));
        assert_eq!(filter.search, None);
    }
}
