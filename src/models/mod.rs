//! Data models
//!
//! Database entities for the newsroom (articles, videos, live streams,
//! categories, states, newsletter subscribers, analytics events, users and
//! sessions) plus the input and report types the services exchange.

mod analytics;
mod article;
mod category;
mod live_stream;
mod newsletter;
mod pagination;
mod session;
mod user;
mod video;

pub use analytics::{
    AnalyticsEvent, AnalyticsSummary, DailyViews, DashboardStats, EventTarget, EventType,
    TopArticle,
};
pub use article::{
    Article, ArticleFilter, ArticleStatus, CreateArticleInput, UpdateArticleInput,
};
pub use category::{Category, CreateCategoryInput, Region, UpdateCategoryInput};
pub use live_stream::{CreateLiveStreamInput, LiveStream, UpdateLiveStreamInput};
pub use newsletter::NewsletterSubscription;
pub use pagination::{ListParams, PagedResult, MAX_PER_PAGE};
pub use session::Session;
pub use user::{CreateUserInput, User, UserRole, UserStatus};
pub use video::{CreateVideoInput, UpdateVideoInput, Video, VideoType};
