//! Video model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Embedded video clip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    /// Watch URL on the hosting platform
    pub video_url: String,
    pub video_type: VideoType,
    pub thumbnail_url: Option<String>,
    pub category_id: Option<i64>,
    pub state_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Hosting platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoType {
    #[default]
    Youtube,
    Facebook,
}

impl VideoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoType::Youtube => "youtube",
            VideoType::Facebook => "facebook",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "youtube" => Some(VideoType::Youtube),
            "facebook" => Some(VideoType::Facebook),
            _ => None,
        }
    }
}

impl std::fmt::Display for VideoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for creating a video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVideoInput {
    pub title: String,
    pub description: Option<String>,
    pub video_url: String,
    pub video_type: VideoType,
    pub thumbnail_url: Option<String>,
    pub category_id: Option<i64>,
    pub state_id: Option<i64>,
}

impl CreateVideoInput {
    pub fn new(title: impl Into<String>, video_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            video_url: video_url.into(),
            video_type: VideoType::default(),
            thumbnail_url: None,
            category_id: None,
            state_id: None,
        }
    }

    pub fn with_type(mut self, video_type: VideoType) -> Self {
        self.video_type = video_type;
        self
    }

    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }
}

/// Partial update; `Some(None)` clears a nullable reference
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateVideoInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub video_type: Option<VideoType>,
    pub thumbnail_url: Option<String>,
    pub category_id: Option<Option<i64>>,
    pub state_id: Option<Option<i64>>,
}
