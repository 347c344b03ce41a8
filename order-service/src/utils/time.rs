//! Time helpers shared by the request DTOs and the Midtrans integration.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

/// Format Midtrans uses for `expiry_time` and `transaction_time`.
pub const GATEWAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Midtrans reports local times in Western Indonesia Time (UTC+7).
const GATEWAY_UTC_OFFSET_SECS: i32 = 7 * 3600;

/// Parse a Midtrans timestamp. Returns `None` for anything malformed.
pub fn parse_gateway_time(value: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(value.trim(), GATEWAY_TIME_FORMAT).ok()?;
    let offset = FixedOffset::east_opt(GATEWAY_UTC_OFFSET_SECS)?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Render a UTC instant the way Midtrans writes it.
pub fn format_gateway_time(value: DateTime<Utc>) -> String {
    match FixedOffset::east_opt(GATEWAY_UTC_OFFSET_SECS) {
        Some(offset) => value
            .with_timezone(&offset)
            .format(GATEWAY_TIME_FORMAT)
            .to_string(),
        None => value.format(GATEWAY_TIME_FORMAT).to_string(),
    }
}

/// Serde support for timestamps sent either as epoch milliseconds or RFC 3339.
pub mod flexible_time {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{de, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTime {
        Millis(i64),
        Text(String),
    }

    fn resolve(raw: RawTime) -> Result<DateTime<Utc>, String> {
        let millis = match raw {
            RawTime::Millis(ms) => ms,
            RawTime::Text(text) => match text.trim().parse::<i64>() {
                Ok(ms) => ms,
                Err(_) => {
                    return DateTime::parse_from_rfc3339(text.trim())
                        .map(|dt| dt.with_timezone(&Utc))
                        .map_err(|e| format!("invalid timestamp '{}': {}", text, e));
                }
            },
        };
        Utc.timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| format!("timestamp out of range: {}", millis))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        resolve(RawTime::deserialize(deserializer)?).map_err(de::Error::custom)
    }

    pub mod option {
        use super::{resolve, RawTime};
        use chrono::{DateTime, Utc};
        use serde::{de, Deserialize, Deserializer};

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<RawTime>::deserialize(deserializer)?
                .map(resolve)
                .transpose()
                .map_err(de::Error::custom)
        }
    }
}
