//! Continuation cursor extraction
//!
//! Sentry advertises further pages through the `Link` header:
//!
//! ```text
//! <https://sentry.io/api/0/...&cursor=0:100:0>; rel="next"; results="true"; cursor="0:100:0",
//! <https://sentry.io/api/0/...&cursor=0:0:1>; rel="previous"; results="false"; cursor="0:0:1"
//! ```
//!
//! Only the `rel="next"` entry that also reports `results="true"` yields a cursor.

/// Name of the response header carrying the continuation signal
pub const LINK_HEADER: &str = "link";

/// Extract the next-page cursor from a `Link` header value
pub fn extract_next_cursor(link_header: Option<&str>) -> Option<String> {
    let header = link_header?;

    header
        .split(',')
        .map(LinkEntry::parse)
        .find(|entry| entry.rel == Some("next") && entry.results == Some("true"))
        .and_then(|entry| entry.cursor)
        .filter(|cursor| !cursor.is_empty())
        .map(str::to_string)
}

/// One relation of a `Link` header
#[derive(Debug, Default, PartialEq, Eq)]
struct LinkEntry<'a> {
    rel: Option<&'a str>,
    results: Option<&'a str>,
    cursor: Option<&'a str>,
}

impl<'a> LinkEntry<'a> {
    fn parse(part: &'a str) -> Self {
        let mut entry = Self::default();

        for segment in part.split(';') {
            let segment = segment.trim();
            // The target URL may carry its own `cursor=` query parameter
            if segment.starts_with('<') {
                continue;
            }

            let Some((key, value)) = segment.split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches('"').trim_matches('\'');
            match key.trim() {
                "rel" => entry.rel = Some(value),
                "results" => entry.results = Some(value),
                "cursor" => entry.cursor = Some(value),
                _ => {}
            }
        }

        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_entry_parse() {
        let entry = LinkEntry::parse(
            r#" <https://sentry.io/api/0/issues/?cursor=0:100:0>; rel="next"; results="true"; cursor="0:100:0""#,
        );
        assert_eq!(
            entry,
            LinkEntry {
                rel: Some("next"),
                results: Some("true"),
                cursor: Some("0:100:0"),
            }
        );
    }

    #[test]
    fn test_link_entry_ignores_unknown_attributes() {
        let entry = LinkEntry::parse(r#"<u>; rel="next"; title="x"; results="false""#);
        assert_eq!(entry.rel, Some("next"));
        assert_eq!(entry.results, Some("false"));
        assert!(entry.cursor.is_none());
    }
}
