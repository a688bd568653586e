//! Draft search
//!
//! Filtering, sorting, and truncation over draft metadata for listing UIs.
//! Filters compose as logical AND; within the free-text query and the tag
//! set, matching is logical OR across terms.

use chrono::{DateTime, Utc};

use crate::models::DraftMetadata;

/// Field to sort search results by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    CreatedAt,
    #[default]
    UpdatedAt,
    Title,
    Progress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

/// Search criteria. All filters are optional and compose as AND.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Free-text query; whitespace-separated terms are matched
    /// case-insensitively as substrings of title, description, and tags
    /// (any term matching is enough).
    pub query: Option<String>,
    /// Tag filter; a draft matches when it carries any of these tags.
    pub tags: Vec<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub min_progress: Option<u8>,
    pub max_progress: Option<u8>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub limit: Option<usize>,
}

/// Check whether a draft's metadata satisfies the filter portion of
/// `options`.
pub fn matches(metadata: &DraftMetadata, options: &SearchOptions) -> bool {
    if let Some(query) = &options.query
        && !matches_query(metadata, query)
    {
        return false;
    }
    if !options.tags.is_empty() {
        let any_tag = options.tags.iter().any(|wanted| {
            metadata
                .tags
                .iter()
                .any(|t| t.eq_ignore_ascii_case(wanted))
        });
        if !any_tag {
            return false;
        }
    }
    if let Some(after) = options.created_after
        && metadata.created_at < after
    {
        return false;
    }
    if let Some(before) = options.created_before
        && metadata.created_at > before
    {
        return false;
    }
    if let Some(min) = options.min_progress
        && metadata.progress < min
    {
        return false;
    }
    if let Some(max) = options.max_progress
        && metadata.progress > max
    {
        return false;
    }
    true
}

fn matches_query(metadata: &DraftMetadata, query: &str) -> bool {
    let terms: Vec<String> = query
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();
    if terms.is_empty() {
        return true;
    }

    let title = metadata.title.to_lowercase();
    let description = metadata
        .description
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();
    let tags: Vec<String> = metadata.tags.iter().map(|t| t.to_lowercase()).collect();

    terms.iter().any(|term| {
        title.contains(term)
            || description.contains(term)
            || tags.iter().any(|t| t.contains(term))
    })
}

/// Sort results in place by the requested field and order.
pub fn sort(results: &mut [DraftMetadata], field: SortField, order: SortOrder) {
    results.sort_by(|a, b| {
        let ordering = match field {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortField::Progress => a.progress.cmp(&b.progress),
        };
        match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DraftVersion, NavigationState};
    use serde_json::json;

    fn metadata(title: &str, tags: &[&str], progress: u8) -> DraftMetadata {
        let version = DraftVersion::new(
            "d",
            json!({}),
            NavigationState {
                current_step: 1,
                total_steps: 9,
            },
        );
        let mut meta = DraftMetadata::new("d".to_string(), title.to_string(), version);
        meta.tags = tags.iter().map(|t| t.to_string()).collect();
        meta.progress = progress;
        meta
    }

    #[test]
    fn test_query_is_case_insensitive_substring() {
        let meta = metadata("Orders API", &[], 0);
        let options = SearchOptions {
            query: Some("orders".to_string()),
            ..Default::default()
        };
        assert!(matches(&meta, &options));

        let options = SearchOptions {
            query: Some("payments".to_string()),
            ..Default::default()
        };
        assert!(!matches(&meta, &options));
    }

    #[test]
    fn test_query_terms_are_or() {
        let meta = metadata("Orders API", &[], 0);
        let options = SearchOptions {
            query: Some("payments orders".to_string()),
            ..Default::default()
        };
        assert!(matches(&meta, &options));
    }

    #[test]
    fn test_query_matches_tags_and_description() {
        let mut meta = metadata("untitled", &["billing"], 0);
        meta.description = Some("Quarterly revenue export".to_string());

        let by_tag = SearchOptions {
            query: Some("billing".to_string()),
            ..Default::default()
        };
        assert!(matches(&meta, &by_tag));

        let by_description = SearchOptions {
            query: Some("revenue".to_string()),
            ..Default::default()
        };
        assert!(matches(&meta, &by_description));
    }

    #[test]
    fn test_tag_filter_is_any_match() {
        let meta = metadata("t", &["alpha", "beta"], 0);
        let options = SearchOptions {
            tags: vec!["beta".to_string(), "gamma".to_string()],
            ..Default::default()
        };
        assert!(matches(&meta, &options));

        let options = SearchOptions {
            tags: vec!["gamma".to_string()],
            ..Default::default()
        };
        assert!(!matches(&meta, &options));
    }

    #[test]
    fn test_progress_range() {
        let meta = metadata("t", &[], 40);
        let options = SearchOptions {
            min_progress: Some(30),
            max_progress: Some(50),
            ..Default::default()
        };
        assert!(matches(&meta, &options));

        let options = SearchOptions {
            min_progress: Some(41),
            ..Default::default()
        };
        assert!(!matches(&meta, &options));
    }

    #[test]
    fn test_filters_compose_as_and() {
        let meta = metadata("Orders API", &["billing"], 40);
        // Query matches but tag filter does not
        let options = SearchOptions {
            query: Some("orders".to_string()),
            tags: vec!["payments".to_string()],
            ..Default::default()
        };
        assert!(!matches(&meta, &options));
    }

    #[test]
    fn test_sort_by_title_and_progress() {
        let mut results = vec![
            metadata("beta", &[], 10),
            metadata("Alpha", &[], 30),
            metadata("gamma", &[], 20),
        ];

        sort(&mut results, SortField::Title, SortOrder::Ascending);
        assert_eq!(results[0].title, "Alpha");
        assert_eq!(results[2].title, "gamma");

        sort(&mut results, SortField::Progress, SortOrder::Descending);
        assert_eq!(results[0].progress, 30);
        assert_eq!(results[2].progress, 10);
    }
}
