use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Custom deserializer for Duration from milliseconds
pub fn deserialize_duration_from_ms<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let ms = u64::deserialize(deserializer)?;
    Ok(Duration::from_millis(ms))
}

/// Custom deserializer for Duration from seconds
pub fn deserialize_duration_from_seconds<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = u64::deserialize(deserializer)?;
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct DedupWindow {
        #[serde(deserialize_with = "deserialize_duration_from_seconds")]
        window: Duration,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct ConnectTimeout {
        #[serde(deserialize_with = "deserialize_duration_from_ms")]
        timeout: Duration,
    }

    #[test]
    fn test_duration_from_seconds() {
        let actual: DedupWindow = serde_json::from_str(r#"{"window": 300}"#).unwrap();
        assert_eq!(actual, DedupWindow { window: Duration::from_secs(300) });
    }

    #[test]
    fn test_duration_from_ms() {
        let actual: ConnectTimeout = serde_json::from_str(r#"{"timeout": 1500}"#).unwrap();
        assert_eq!(actual, ConnectTimeout { timeout: Duration::from_millis(1500) });
    }

    #[test]
    fn test_negative_duration_is_rejected() {
        let result: Result<DedupWindow, _> = serde_json::from_str(r#"{"window": -1}"#);
        assert!(result.is_err());
    }
}
