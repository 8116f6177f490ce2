use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::FunnelError;

/// Content lifecycle status.
///
/// Advances `pending` → `generated` → `posted` and never regresses.
/// `Pending` is reserved for a scheduling step; the generator creates rows
/// directly in `Generated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ContentStatus {
    Pending,
    Generated,
    Posted,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Generated => "generated",
            Self::Posted => "posted",
        }
    }

    /// Whether moving from `self` to `next` is a legal single step.
    pub fn can_advance_to(&self, next: ContentStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Generated) | (Self::Generated, Self::Posted)
        )
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentStatus {
    type Err = FunnelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "generated" => Ok(Self::Generated),
            "posted" => Ok(Self::Posted),
            other => Err(FunnelError::InvalidState(format!(
                "content status '{other}'"
            ))),
        }
    }
}

/// One promotional media item for one platform.
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    pub id: i64,
    pub tool_id: i64,
    pub platform: String,
    pub video_path: Option<String>,
    pub caption: String,
    pub hashtags: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Set if and only if `status` is `Posted`.
    pub posted_at: Option<DateTime<Utc>>,
    /// Where the social adapter published the item.
    pub posted_url: Option<String>,
    pub status: ContentStatus,
}

impl Content {
    /// Hashtags as bare tags, without the leading `#`.
    pub fn tags(&self) -> Vec<String> {
        self.hashtags
            .split_whitespace()
            .map(|tag| tag.trim_start_matches('#'))
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct NewContent {
    pub tool_id: i64,
    pub platform: String,
    pub video_path: String,
    pub caption: String,
    pub hashtags: String,
}
