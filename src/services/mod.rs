//! Services layer - Business logic
//!
//! Services sit between the HTTP handlers and the repositories. They:
//! - validate and normalize input
//! - enforce uniqueness, references and publishing rules
//! - map storage failures into per-service error enums

pub mod analytics;
pub mod article;
pub mod category;
pub mod home;
pub mod i18n;
pub mod live_stream;
pub mod newsletter;
pub mod password;
pub mod rate_limiter;
pub mod region;
pub mod user;
pub mod video;

pub use analytics::{bucket_by_weekday, AnalyticsService};
pub use article::{generate_slug, ArticleService, ArticleServiceError};
pub use category::{CategoryService, CategoryServiceError};
pub use home::{HomePage, HomeService};
pub use i18n::I18nService;
pub use live_stream::{LiveStreamService, LiveStreamServiceError};
pub use newsletter::{is_valid_email, NewsletterService, NewsletterServiceError};
pub use password::{hash_password, verify_password};
pub use rate_limiter::LoginRateLimiter;
pub use region::RegionService;
pub use user::{LoginInput, RegisterInput, UserService, UserServiceError};
pub use video::{youtube_thumbnail, VideoService, VideoServiceError};
