//! Common types used across CLI modules

use butler_client::{BuildNumber, QueueItem};

/// Parse a `key=value` build parameter
///
/// Used as a clap value parser; the value may itself contain `=`.
pub fn parse_param(input: &str) -> Result<(String, String), String> {
    match input.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", input)),
    }
}

/// Turn a build URL such as `http://host/job/app/42/` into a [`QueueItem`]
///
/// The build number is taken from the last path segment when it is numeric,
/// otherwise it stays unassigned. Only the URL is needed to query the build.
pub fn build_item_from_url(url: &str) -> QueueItem {
    let number = url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse::<u32>().ok())
        .unwrap_or_default();

    QueueItem::new(BuildNumber(number), url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param() {
        assert_eq!(
            parse_param("branch=main").unwrap(),
            ("branch".to_string(), "main".to_string())
        );
    }

    #[test]
    fn test_parse_param_keeps_equals_in_value() {
        assert_eq!(
            parse_param("flags=a=b").unwrap(),
            ("flags".to_string(), "a=b".to_string())
        );
    }

    #[test]
    fn test_parse_param_allows_empty_value() {
        assert_eq!(
            parse_param("message=").unwrap(),
            ("message".to_string(), String::new())
        );
    }

    #[test]
    fn test_parse_param_rejects_missing_key() {
        assert!(parse_param("=main").is_err());
        assert!(parse_param("main").is_err());
    }

    #[test]
    fn test_build_item_from_url() {
        let item = build_item_from_url("http://host/job/app/42/");
        assert_eq!(item.number, BuildNumber(42));
        assert_eq!(item.url, "http://host/job/app/42/");
    }

    #[test]
    fn test_build_item_from_url_without_number() {
        let item = build_item_from_url("http://host/job/app/lastBuild");
        assert!(!item.number.is_assigned());
    }
}
