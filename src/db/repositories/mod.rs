//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles the queries for a specific entity.

pub mod analytics;
pub mod article;
pub mod category;
pub mod live_stream;
pub mod newsletter;
pub mod region;
pub mod session;
pub mod user;
pub mod video;

pub use analytics::{AnalyticsRepository, SqlxAnalyticsRepository};
pub use article::{ArticleRepository, SqlxArticleRepository};
pub use category::{CategoryRepository, SqlxCategoryRepository};
pub use live_stream::{LiveStreamRepository, SqlxLiveStreamRepository};
pub use newsletter::{NewsletterRepository, SqlxNewsletterRepository};
pub use region::{RegionRepository, SqlxRegionRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use user::{SqlxUserRepository, UserRepository};
pub use video::{SqlxVideoRepository, VideoRepository};

/// Resolve an optional text field of a partial update.
///
/// `None` keeps the stored value, a blank string clears it.
pub(crate) fn merge_text(update: &Option<String>, current: Option<String>) -> Option<String> {
    match update {
        Some(value) if value.trim().is_empty() => None,
        Some(value) => Some(value.clone()),
        None => current,
    }
}
