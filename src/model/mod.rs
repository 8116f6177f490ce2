//! Funnel entities.
//!
//! `Tool` is the root; `Product`, `Content` and `Metric` rows each belong to
//! exactly one tool.

mod content;
mod metric;
mod product;
mod tool;

pub use content::{Content, ContentStatus, NewContent};
pub use metric::{Metric, NewMetric, ToolRevenue};
pub use product::{NewProduct, Product};
pub use tool::{NewTool, Template, Tool, ToolStatus, DEFAULT_NICHE};

/// Title-case a slug into a display name (`roi-calc` → `Roi Calc`).
pub fn display_name(slug: &str) -> String {
    slug.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Validate a user-supplied slug.
///
/// Slugs are lowercase ASCII letters, digits and single dashes, and may not
/// start or end with a dash.
pub fn validate_slug(slug: &str) -> crate::Result<()> {
    let invalid = |reason: &str| {
        Err(crate::FunnelError::InvalidInput(format!(
            "slug '{slug}' {reason}"
        )))
    };

    if slug.is_empty() {
        return invalid("is empty");
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return invalid("may only contain lowercase letters, digits and '-'");
    }
    if slug.starts_with('-') || slug.ends_with('-') || slug.contains("--") {
        return invalid("has a leading, trailing or doubled '-'");
    }
    Ok(())
}
