use chrono::{DateTime, SecondsFormat, Utc};

use crate::notification::Severity;

/// Longest message body carried by a notification
pub const MAX_MESSAGE_LEN: usize = 200;

/// First `max` characters of `message`. Never splits a character.
pub fn truncate(message: &str, max: usize) -> String {
    match message.char_indices().nth(max) {
        Some((idx, _)) => message[..idx].to_string(),
        None => message.to_string(),
    }
}

/// ISO-8601 stamp with millisecond precision, eg `2021-03-04T05:06:07.089Z`
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn diagnostic_line(kind: &str, stamp: &str, message: &str) -> String {
    format!("{}: {stamp} [{message}]", kind.to_uppercase())
}

/// Logs a collaborator or rendering fault with a wall-clock stamp
pub fn dev_log(severity: Severity, message: &str) {
    let line = diagnostic_line(
        &severity.to_string(),
        &iso_timestamp(Utc::now()),
        message,
    );
    match severity {
        Severity::Warning => tracing::warn!("{line}"),
        Severity::Error => tracing::error!("{line}"),
    }
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn truncate_keeps_short_messages() {
        assert_eq!(truncate("short", MAX_MESSAGE_LEN), "short");
        assert_eq!(truncate("", 3), "");
    }

    #[test]
    fn truncate_cuts_at_limit() {
        let long = "x".repeat(300);
        let cut = truncate(&long, MAX_MESSAGE_LEN);
        assert_eq!(cut.len(), 200);
        assert_eq!(cut, long[..200]);
    }

    #[test]
    fn truncate_counts_characters() {
        let message = "é".repeat(250);
        let cut = truncate(&message, MAX_MESSAGE_LEN);
        assert_eq!(cut.chars().count(), 200);
        assert_eq!(cut.len(), 400);
    }

    #[test]
    fn diagnostic_line_format() {
        let at = Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap();
        let stamp = iso_timestamp(at);
        assert_eq!(stamp, "2021-03-04T05:06:07.000Z");
        assert_eq!(
            diagnostic_line("Warning", &stamp, "104"),
            "WARNING: 2021-03-04T05:06:07.000Z [104]"
        );
    }
}
