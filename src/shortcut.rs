//! Resolution of `.url` internet-shortcut pointer files to their targets.

use regex::Regex;
use std::sync::LazyLock;

use crate::client::GraphClient;

/// Matches the `URL=<target>` line of a shortcut file. The key is
/// case-insensitive; the captured value runs to the end of the line.
static URL_LINE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)URL=(.*)").expect("Invalid URL line regex"));

/// Extract the target URL from the raw content of a shortcut file.
///
/// The first `URL=` line wins and its value is trimmed. Returns `None` when
/// no such line exists.
///
/// # Examples
///
/// ```
/// use drive_links::shortcut::parse_target_url;
///
/// let content = "[InternetShortcut]\r\nURL=https://example/b\r\n";
/// assert_eq!(parse_target_url(content), Some("https://example/b".to_string()));
///
/// assert_eq!(parse_target_url("[InternetShortcut]\r\n"), None);
/// ```
pub fn parse_target_url(content: &str) -> Option<String> {
    URL_LINE_REGEX
        .captures(content)
        .and_then(|captures| captures.get(1))
        .map(|value| value.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Resolve a shortcut item to its target URL.
///
/// Fetches the item's direct download location, downloads the pointer file
/// and extracts its `URL=` line. Any failure along the way is non-fatal for
/// the batch: the item is logged and reported as `None`, and the caller
/// omits it from the result.
pub async fn resolve(client: &GraphClient, drive_id: &str, item_id: &str) -> Option<String> {
    let download_url = match client.download_url(drive_id, item_id).await {
        Ok(Some(url)) => url,
        Ok(None) => {
            tracing::warn!(item_id, "shortcut item has no download URL");
            return None;
        }
        Err(e) => {
            tracing::warn!(item_id, error = %e, "failed to fetch shortcut download URL");
            return None;
        }
    };

    let content = match client.fetch_content(&download_url).await {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(item_id, error = %e, "failed to download shortcut content");
            return None;
        }
    };

    let target = parse_target_url(&content);
    if target.is_none() {
        tracing::warn!(item_id, "URL= line not found in shortcut content");
    }
    target
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_standard_shortcut() {
        let content = "[InternetShortcut]\r\nURL=https://example.com/target\r\nIconIndex=0\r\n";
        assert_eq!(
            parse_target_url(content),
            Some("https://example.com/target".to_string())
        );
    }

    #[test]
    fn test_parse_key_is_case_insensitive() {
        assert_eq!(
            parse_target_url("url=https://example.com/a"),
            Some("https://example.com/a".to_string())
        );
        assert_eq!(
            parse_target_url("Url=https://example.com/a"),
            Some("https://example.com/a".to_string())
        );
    }

    #[test]
    fn test_parse_first_match_wins() {
        let content = "URL=https://example.com/first\nURL=https://example.com/second\n";
        assert_eq!(
            parse_target_url(content),
            Some("https://example.com/first".to_string())
        );
    }

    #[test]
    fn test_parse_value_is_trimmed() {
        assert_eq!(
            parse_target_url("URL=  https://example.com/padded  \r\n"),
            Some("https://example.com/padded".to_string())
        );
    }

    #[test]
    fn test_parse_missing_url_line() {
        assert_eq!(parse_target_url("[InternetShortcut]\nIconIndex=0\n"), None);
        assert_eq!(parse_target_url(""), None);
    }

    #[test]
    fn test_parse_empty_value() {
        assert_eq!(parse_target_url("URL=\n"), None);
        assert_eq!(parse_target_url("URL=   \n"), None);
    }
}
