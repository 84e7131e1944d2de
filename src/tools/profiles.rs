//! Default argument profiles and the override merge shared by every search function.

use crate::config::SearchSettings;
use serde_json::{json, Map, Value};

/// Flat keyword arguments forwarded to the search service
pub type SearchArgs = Map<String, Value>;

/// Default argument profiles derived once from [`SearchSettings`].
///
/// Layers are applied left to right, so a key written by a later layer replaces
/// the same key from an earlier one.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultProfiles {
    /// Shared search defaults, used as-is for question answering
    pub base: SearchArgs,
    /// `max_tokens` layered under the base defaults
    pub context: SearchArgs,
    /// Answer/raw-content/image flags and time range layered under the base defaults
    pub full_search: SearchArgs,
    /// Extraction defaults; independent of the search keys
    pub extract: SearchArgs,
}

impl DefaultProfiles {
    pub fn from_settings(settings: &SearchSettings) -> Self {
        let base = object(json!({
            "search_depth": settings.search_depth(),
            "topic": settings.topic(),
            "days": settings.days(),
            "max_results": settings.max_results(),
            "include_domains": settings.include_domains(),
            "exclude_domains": settings.exclude_domains(),
            "timeout": settings.timeout(),
        }));

        let context = merge_args(
            &object(json!({
                "max_tokens": settings.max_tokens(),
            })),
            &base,
        );

        let full_search = merge_args(
            &object(json!({
                "time_range": settings.time_range(),
                "include_answer": settings.include_answer(),
                "include_raw_content": settings.include_raw_content(),
                "include_images": settings.include_images(),
            })),
            &base,
        );

        let extract = object(json!({
            "include_images": settings.include_images(),
            "extract_depth": settings.extract_depth(),
            "timeout": settings.timeout(),
        }));

        Self {
            base,
            context,
            full_search,
            extract,
        }
    }
}

/// Overlay `overrides` on `defaults`.
///
/// The merge is flat: every key in `overrides` replaces the default wholesale,
/// including list and object values. Keys absent from `overrides` keep their default.
pub fn merge_args(defaults: &SearchArgs, overrides: &SearchArgs) -> SearchArgs {
    let mut merged = defaults.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

fn object(value: Value) -> SearchArgs {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(value: Value) -> SearchArgs {
        object(value)
    }

    #[test]
    fn test_full_search_profile_defaults() {
        let profiles = DefaultProfiles::from_settings(&SearchSettings::with_api_key("k"));
        let expected = args(json!({
            "search_depth": "basic",
            "topic": "general",
            "days": 7,
            "max_results": 5,
            "include_domains": [],
            "exclude_domains": [],
            "timeout": 60,
            "time_range": null,
            "include_answer": false,
            "include_raw_content": false,
            "include_images": false,
        }));
        assert_eq!(profiles.full_search, expected);
    }

    #[test]
    fn test_context_and_base_profiles() {
        let profiles = DefaultProfiles::from_settings(&SearchSettings::with_api_key("k"));

        assert_eq!(profiles.base.len(), 7);
        assert!(!profiles.base.contains_key("max_tokens"));

        assert_eq!(profiles.context.len(), 8);
        assert_eq!(profiles.context["max_tokens"], json!(4000));
        for (key, value) in &profiles.base {
            assert_eq!(&profiles.context[key], value);
        }
    }

    #[test]
    fn test_extract_profile_does_not_inherit_search_keys() {
        let settings = SearchSettings {
            include_images: Some(true),
            extract_depth: Some("advanced".to_string()),
            timeout: Some(15),
            max_results: Some(9),
            ..SearchSettings::with_api_key("k")
        };
        let profiles = DefaultProfiles::from_settings(&settings);
        assert_eq!(
            profiles.extract,
            args(json!({
                "include_images": true,
                "extract_depth": "advanced",
                "timeout": 15,
            }))
        );
    }

    #[test]
    fn test_settings_flow_into_every_profile() {
        let settings = SearchSettings {
            topic: Some("news".to_string()),
            days: Some(1),
            include_domains: Some(vec!["rust-lang.org".to_string()]),
            time_range: Some("week".to_string()),
            max_tokens: Some(500),
            ..SearchSettings::with_api_key("k")
        };
        let profiles = DefaultProfiles::from_settings(&settings);

        for profile in [&profiles.base, &profiles.context, &profiles.full_search] {
            assert_eq!(profile["topic"], json!("news"));
            assert_eq!(profile["days"], json!(1));
            assert_eq!(profile["include_domains"], json!(["rust-lang.org"]));
        }
        assert_eq!(profiles.full_search["time_range"], json!("week"));
        assert_eq!(profiles.context["max_tokens"], json!(500));
    }

    #[test]
    fn test_merge_overrides_win() {
        let defaults = args(json!({"max_results": 5, "topic": "general"}));
        let overrides = args(json!({"max_results": 10, "extra": true}));
        let merged = merge_args(&defaults, &overrides);
        assert_eq!(
            merged,
            args(json!({"max_results": 10, "topic": "general", "extra": true}))
        );
    }

    #[test]
    fn test_merge_replaces_lists() {
        let defaults = args(json!({"include_domains": ["a.com", "b.com"]}));
        let overrides = args(json!({"include_domains": ["c.com"]}));
        let merged = merge_args(&defaults, &overrides);
        assert_eq!(merged["include_domains"], json!(["c.com"]));
    }

    #[test]
    fn test_merge_empty_overrides_is_identity() {
        let profiles = DefaultProfiles::from_settings(&SearchSettings::with_api_key("k"));
        assert_eq!(merge_args(&profiles.extract, &Map::new()), profiles.extract);
    }

    #[test]
    fn test_merge_null_override_is_kept() {
        let defaults = args(json!({"time_range": "day"}));
        let overrides = args(json!({"time_range": null}));
        assert_eq!(merge_args(&defaults, &overrides)["time_range"], Value::Null);
    }
}
