//! Live stream model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A live broadcast the site can embed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveStream {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub stream_url: String,
    pub thumbnail_url: Option<String>,
    /// On air; only active streams are shown publicly
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLiveStreamInput {
    pub title: String,
    pub description: Option<String>,
    pub stream_url: String,
    pub thumbnail_url: Option<String>,
    pub is_active: bool,
}

impl CreateLiveStreamInput {
    pub fn new(title: impl Into<String>, stream_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            stream_url: stream_url.into(),
            thumbnail_url: None,
            is_active: false,
        }
    }

    pub fn active(mut self) -> Self {
        self.is_active = true;
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLiveStreamInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub stream_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub is_active: Option<bool>,
}
