use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::FunnelError;

/// Niche assigned when the caller gives none.
pub const DEFAULT_NICHE: &str = "general";

/// Tool lifecycle status. Only ever moves `draft` → `built`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStatus {
    Draft,
    Built,
}

impl ToolStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Built => "built",
        }
    }
}

impl fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolStatus {
    type Err = FunnelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "built" => Ok(Self::Built),
            other => Err(FunnelError::InvalidState(format!("tool status '{other}'"))),
        }
    }
}

/// Templates a tool can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    RoiCalculator,
    BudgetPlanner,
    FlipProfit,
}

impl Template {
    pub const ALL: [Template; 3] = [
        Template::RoiCalculator,
        Template::BudgetPlanner,
        Template::FlipProfit,
    ];

    /// Directory name under the templates folder.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoiCalculator => "roi_calculator",
            Self::BudgetPlanner => "budget_planner",
            Self::FlipProfit => "flip_profit",
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Template {
    type Err = FunnelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(Template::as_str).collect();
                FunnelError::not_found(
                    "template",
                    format!("{s} (available: {})", known.join(", ")),
                )
            })
    }
}

/// A buildable product unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Tool {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub niche: String,
    /// Starts at 1; reserved for rebuild tracking.
    pub version: i64,
    pub build_path: Option<PathBuf>,
    pub landing_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub status: ToolStatus,
}

/// Values for inserting a new tool row.
#[derive(Debug, Clone)]
pub struct NewTool {
    pub slug: String,
    pub name: String,
    pub niche: String,
    pub build_path: PathBuf,
    pub status: ToolStatus,
}
