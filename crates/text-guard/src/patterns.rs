//! Script-like payload detection.

use regex::Regex;
use std::sync::LazyLock;

/// Case-insensitive patterns that mark text as unsafe to encode.
static DANGEROUS_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("javascript_uri", r"(?i)javascript:"),
        ("html_data_uri", r"(?i)data:text/html"),
        ("vbscript_uri", r"(?i)vbscript:"),
        ("script_tag", r"(?i)<script"),
        ("event_handler", r"(?i)on[a-z0-9_]+\s*="),
        ("iframe_tag", r"(?i)<iframe"),
        ("object_tag", r"(?i)<object"),
        ("embed_tag", r"(?i)<embed"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).unwrap()))
    .collect()
});

/// Name of the first dangerous pattern found in `text`, if any.
pub fn find_dangerous(text: &str) -> Option<&'static str> {
    DANGEROUS_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::find_dangerous;

    #[test]
    fn detects_script_uris_in_any_case() {
        assert_eq!(find_dangerous("javascript:alert(1)"), Some("javascript_uri"));
        assert_eq!(find_dangerous("go to JaVaScRiPt:void(0)"), Some("javascript_uri"));
        assert_eq!(find_dangerous("VBScript:msgbox"), Some("vbscript_uri"));
        assert_eq!(
            find_dangerous("data:TEXT/HTML;base64,PHNjcmlwdD4="),
            Some("html_data_uri")
        );
    }

    #[test]
    fn detects_event_handler_attributes() {
        assert_eq!(find_dangerous("img onerror=alert(1)"), Some("event_handler"));
        assert_eq!(find_dangerous("x ONCLICK  = y"), Some("event_handler"));
    }

    #[test]
    fn detects_unterminated_tags() {
        assert_eq!(find_dangerous("<script src=x"), Some("script_tag"));
        assert_eq!(find_dangerous("<IFRAME src=x"), Some("iframe_tag"));
        assert_eq!(find_dangerous("<object data=x"), Some("object_tag"));
        assert_eq!(find_dangerous("<embed src=x"), Some("embed_tag"));
    }

    #[test]
    fn plain_text_and_urls_pass() {
        assert_eq!(find_dangerous("Hello World"), None);
        assert_eq!(find_dangerous("https://example.com/path?q=1"), None);
        assert_eq!(find_dangerous("data:image/png;base64,AAAA"), None);
        assert_eq!(find_dangerous("on the table"), None);
    }
}
