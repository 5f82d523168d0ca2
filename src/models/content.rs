//! Content items as stored by the site.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A news item. Read-only to the exporter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    #[serde(default)]
    pub id: i64,

    /// Locale the item is written in
    pub lang: String,

    #[serde(default)]
    pub title: String,

    /// Unique per locale
    pub slug: String,

    #[serde(default)]
    pub html: String,

    #[serde(default = "default_published")]
    pub is_published: bool,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_published() -> bool {
    true
}

/// Distinct slugs of published items for `locale`, in first-seen order.
///
/// Empty slugs cannot form a detail route and are skipped.
pub fn published_slugs<'a>(
    items: impl IntoIterator<Item = &'a ContentItem>,
    locale: &str,
) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut slugs = Vec::new();
    for item in items {
        if !item.is_published || item.lang != locale {
            continue;
        }
        if item.slug.trim().is_empty() {
            log::warn!("Skipping published item {} ({}) without a slug", item.id, locale);
            continue;
        }
        if seen.insert(item.slug.as_str()) {
            slugs.push(item.slug.clone());
        }
    }
    slugs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(lang: &str, slug: &str, is_published: bool) -> ContentItem {
        ContentItem {
            id: 0,
            lang: lang.to_string(),
            title: String::new(),
            slug: slug.to_string(),
            html: String::new(),
            is_published,
            created_at: None,
        }
    }

    #[test]
    fn filters_by_locale_and_published() {
        let items = vec![
            item("zh-TW", "site-launched", true),
            item("en-US", "site-launched", true),
            item("en-US", "draft", false),
            item("en-US", "second", true),
        ];
        assert_eq!(published_slugs(&items, "en-US"), vec!["site-launched", "second"]);
        assert_eq!(published_slugs(&items, "zh-TW"), vec!["site-launched"]);
        assert!(published_slugs(&items, "ja-JP").is_empty());
    }

    #[test]
    fn dedups_and_skips_empty_slugs() {
        let items = vec![
            item("en-US", "a", true),
            item("en-US", "", true),
            item("en-US", "a", true),
        ];
        assert_eq!(published_slugs(&items, "en-US"), vec!["a"]);
    }

    #[test]
    fn deserializes_store_records() {
        let items: Vec<ContentItem> = serde_json::from_str(
            r#"[{ "id": 1, "lang": "zh-TW", "title": "網站啟動！", "slug": "site-launched",
                  "html": "<p>Hello</p>", "isPublished": true,
                  "createdAt": "2025-01-01T00:00:00Z" },
                { "lang": "en-US", "slug": "site-launched" }]"#,
        )
        .unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[1].is_published);
        assert!(items[0].created_at.is_some());
    }
}
