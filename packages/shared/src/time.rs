use chrono::{DateTime, SecondsFormat, Utc};

/// Get current Unix timestamp in UTC (milliseconds)
pub fn get_utc_timestamp() -> i64 {
    Utc::now().timestamp_millis()
}

/// Format a Unix millisecond timestamp as RFC 3339 (UTC).
///
/// Out-of-range values fall back to the Unix epoch.
pub fn timestamp_to_rfc3339(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_to_rfc3339() {
        // テスト項目: ミリ秒タイムスタンプが RFC 3339 形式に変換される
        // given (前提条件):
        let millis = 1_700_000_000_123;

        // when (操作):
        let formatted = timestamp_to_rfc3339(millis);

        // then (期待する結果):
        assert_eq!(formatted, "2023-11-14T22:13:20.123Z");
    }

    #[test]
    fn test_get_utc_timestamp_is_monotonic_enough() {
        // テスト項目: 連続で取得したタイムスタンプが減少しない
        let first = get_utc_timestamp();
        let second = get_utc_timestamp();
        assert!(second >= first);
    }
}
