//! File names for downloaded images.

use chrono::{DateTime, Utc};

const PREFIX: &str = "qr-code-";
const EXTENSION: &str = ".png";

/// `qr-code-<millis>.png`, keeping only `[A-Za-z0-9.-]`.
pub fn filename(timestamp_millis: i64) -> String {
    sanitize_filename(&format!("{PREFIX}{timestamp_millis}{EXTENSION}"))
}

/// Download name for an image generated at `at`.
pub fn filename_at(at: DateTime<Utc>) -> String {
    filename(at.timestamp_millis())
}

/// Drop every character outside `[A-Za-z0-9.-]`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_timestamped_name() {
        assert_eq!(filename(1_700_000_000_123), "qr-code-1700000000123.png");
    }

    #[test]
    fn strips_unsafe_characters() {
        assert_eq!(sanitize_filename("../etc/pass wd?.png"), "..etcpasswd.png");
        assert_eq!(sanitize_filename("qr_code:1\"2.png"), "qrcode12.png");
        assert_eq!(sanitize_filename("ünï"), "n");
    }

    #[test]
    fn negative_timestamp_keeps_hyphen() {
        assert_eq!(filename(-5), "qr-code--5.png");
    }

    #[test]
    fn name_from_datetime_uses_millis() {
        let at = Utc.timestamp_millis_opt(1_000).single().unwrap();
        assert_eq!(filename_at(at), "qr-code-1000.png");
    }
}
