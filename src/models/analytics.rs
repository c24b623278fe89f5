//! Analytics event and report models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single recorded event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub id: i64,
    pub event_type: EventType,
    pub article_id: Option<i64>,
    pub video_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    View,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::View => "view",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "view" => Some(EventType::View),
            _ => None,
        }
    }
}

/// What an event is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTarget {
    Article(i64),
    Video(i64),
}

/// Views on one weekday within the last seven days
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyViews {
    /// Short weekday label, Sun..Sat
    pub day: String,
    pub views: i64,
}

/// View count for one article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopArticle {
    pub article_id: i64,
    pub title: String,
    pub views: i64,
}

/// Analytics dashboard report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub total_views: i64,
    pub today_views: i64,
    pub weekly_views: Vec<DailyViews>,
    pub top_articles: Vec<TopArticle>,
}

/// Headline counters for the admin dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_articles: i64,
    pub published_articles: i64,
    pub total_videos: i64,
    pub active_live_streams: i64,
    pub active_subscribers: i64,
    pub total_views: i64,
}
