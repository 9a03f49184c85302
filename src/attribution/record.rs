//! Attribution record and its wire format
//!
//! The same JSON object is used for the visitor cookie and for the snapshot
//! stored on a submission:
//!
//! ```json
//! {
//!   "utm_source": "google", "utm_medium": "cpc", "utm_campaign": null,
//!   "utm_term": null, "utm_content": null,
//!   "referrer": "https://www.google.com/", "landing_url": "https://example.com/?utm_source=google",
//!   "first_seen_at": "2026-10-01T09:30:00Z", "last_seen_at": "2026-10-03T14:02:11Z",
//!   "attribution_version": 1
//! }
//! ```
//!
//! Reading is lenient: missing keys, `null` and `""` are all absent, scalar
//! numbers are taken as text and a broken timestamp is dropped rather than
//! failing the whole record.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use strum::{AsRefStr, EnumIter, IntoEnumIterator};

/// Current payload schema version
pub const ATTRIBUTION_VERSION: u32 = 1;

/// One visitor's attribution state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributionRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub utm_source: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub utm_medium: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub utm_campaign: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub utm_term: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub utm_content: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub referrer: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub landing_url: Option<String>,
    #[serde(default, with = "timestamp")]
    pub first_seen_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp")]
    pub last_seen_at: Option<DateTime<Utc>>,
    #[serde(
        rename = "attribution_version",
        default = "current_version",
        deserialize_with = "lenient_version"
    )]
    pub version: u32,
}

impl Default for AttributionRecord {
    fn default() -> Self {
        Self {
            utm_source: None,
            utm_medium: None,
            utm_campaign: None,
            utm_term: None,
            utm_content: None,
            referrer: None,
            landing_url: None,
            first_seen_at: None,
            last_seen_at: None,
            version: ATTRIBUTION_VERSION,
        }
    }
}

impl AttributionRecord {
    /// Build a record from a decoded JSON value.
    ///
    /// Returns `None` when the value is not a JSON object.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    /// Serialize to the JSON object stored in cookies and submissions.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Decode a cookie value (percent-encoded or raw JSON).
    ///
    /// Anything that does not decode to a JSON object is treated as no record.
    pub fn from_cookie_value(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let json = if raw.starts_with('{') {
            std::borrow::Cow::Borrowed(raw)
        } else {
            urlencoding::decode(raw).ok()?
        };

        let value: Value = serde_json::from_str(&json).ok()?;
        Self::from_value(&value)
    }

    /// Encode for the `Set-Cookie` value.
    pub fn to_cookie_value(&self) -> String {
        let json = self.to_value().to_string();
        urlencoding::encode(&json).into_owned()
    }

}

/// Anything carrying the five UTM parameters
pub trait UtmValues {
    fn utm(&self, field: UtmField) -> Option<&str>;

    /// At least one of the five UTM fields is present
    fn has_utm(&self) -> bool {
        UtmField::iter().any(|field| self.utm(field).is_some())
    }
}

impl UtmValues for AttributionRecord {
    fn utm(&self, field: UtmField) -> Option<&str> {
        match field {
            UtmField::Source => self.utm_source.as_deref(),
            UtmField::Medium => self.utm_medium.as_deref(),
            UtmField::Campaign => self.utm_campaign.as_deref(),
            UtmField::Term => self.utm_term.as_deref(),
            UtmField::Content => self.utm_content.as_deref(),
        }
    }
}

/// UTM parameter selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, AsRefStr)]
pub enum UtmField {
    #[strum(serialize = "utm_source")]
    Source,
    #[strum(serialize = "utm_medium")]
    Medium,
    #[strum(serialize = "utm_campaign")]
    Campaign,
    #[strum(serialize = "utm_term")]
    Term,
    #[strum(serialize = "utm_content")]
    Content,
}

impl UtmField {
    pub fn value_of<'a, T: UtmValues>(&self, source: &'a T) -> Option<&'a str> {
        source.utm(*self)
    }
}

impl std::str::FromStr for UtmField {
    type Err = String;

    /// Accepts both `source` and `utm_source`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let name = name.strip_prefix("utm_").unwrap_or(&name);
        match name {
            "source" => Ok(Self::Source),
            "medium" => Ok(Self::Medium),
            "campaign" => Ok(Self::Campaign),
            "term" => Ok(Self::Term),
            "content" => Ok(Self::Content),
            _ => Err(format!(
                "Invalid UTM field: '{}'. Valid: source, medium, campaign, term, content",
                s
            )),
        }
    }
}

/// Empty text is absent
pub fn normalize(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_owned)
}

fn current_version() -> u32 {
    ATTRIBUTION_VERSION
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(true)) => Some("1".to_string()),
        _ => None,
    })
}

fn lenient_version<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let version = match value {
        Some(Value::Number(n)) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(version.unwrap_or(ATTRIBUTION_VERSION))
}

/// RFC 3339 text on the wire, sub-second digits kept when present
mod timestamp {
    use super::*;

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_some(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(s)) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample() -> AttributionRecord {
        AttributionRecord {
            utm_source: Some("google".into()),
            utm_medium: Some("cpc".into()),
            utm_campaign: Some("spring".into()),
            utm_term: None,
            utm_content: None,
            referrer: Some("https://www.google.com/".into()),
            landing_url: Some("https://example.com/?utm_source=google".into()),
            first_seen_at: Some(Utc.with_ymd_and_hms(2026, 10, 1, 9, 30, 0).unwrap()),
            last_seen_at: Some(Utc.with_ymd_and_hms(2026, 10, 3, 14, 2, 11).unwrap()),
            version: ATTRIBUTION_VERSION,
        }
    }

    #[test]
    fn test_payload_round_trip() {
        let record = sample();
        assert_eq!(AttributionRecord::from_value(&record.to_value()), Some(record));
    }

    #[test]
    fn test_round_trip_keeps_subsecond_precision() {
        let mut record = sample();
        record.last_seen_at = Some(Utc.timestamp_opt(1_790_000_000, 123_456_789).unwrap());
        assert_eq!(AttributionRecord::from_value(&record.to_value()), Some(record));
    }

    #[test]
    fn test_payload_keys() {
        let value = sample().to_value();
        let obj = value.as_object().unwrap();
        for key in [
            "utm_source",
            "utm_medium",
            "utm_campaign",
            "utm_term",
            "utm_content",
            "referrer",
            "landing_url",
            "first_seen_at",
            "last_seen_at",
            "attribution_version",
        ] {
            assert!(obj.contains_key(key), "missing key {}", key);
        }
        assert_eq!(obj["utm_term"], Value::Null);
        assert_eq!(obj["first_seen_at"], json!("2026-10-01T09:30:00Z"));
        assert_eq!(obj["attribution_version"], json!(1));
    }

    #[test]
    fn test_empty_strings_normalize_to_absent() {
        let value = json!({
            "utm_source": "",
            "utm_medium": "",
            "utm_campaign": "",
            "utm_term": "",
            "utm_content": "",
            "referrer": "",
            "landing_url": "",
            "first_seen_at": "",
            "last_seen_at": "",
        });
        let record = AttributionRecord::from_value(&value).unwrap();
        assert_eq!(record, AttributionRecord::default());
    }

    #[test]
    fn test_each_field_normalizes_independently() {
        let value = json!({ "utm_source": "google", "utm_medium": "" });
        let record = AttributionRecord::from_value(&value).unwrap();
        assert_eq!(record.utm_source.as_deref(), Some("google"));
        assert!(record.utm_medium.is_none());
    }

    #[test]
    fn test_missing_and_unknown_keys() {
        let value = json!({ "utm_campaign": "launch", "something_else": 42 });
        let record = AttributionRecord::from_value(&value).unwrap();
        assert_eq!(record.utm_campaign.as_deref(), Some("launch"));
        assert!(record.utm_source.is_none());
        assert_eq!(record.version, ATTRIBUTION_VERSION);
    }

    #[test]
    fn test_lenient_scalars() {
        let value = json!({
            "utm_term": 2026,
            "first_seen_at": "not a date",
            "attribution_version": "1",
        });
        let record = AttributionRecord::from_value(&value).unwrap();
        assert_eq!(record.utm_term.as_deref(), Some("2026"));
        assert!(record.first_seen_at.is_none());
        assert_eq!(record.version, 1);
    }

    #[test]
    fn test_non_object_is_absent() {
        assert!(AttributionRecord::from_value(&json!("google")).is_none());
        assert!(AttributionRecord::from_value(&json!([1, 2])).is_none());
        assert!(AttributionRecord::from_value(&Value::Null).is_none());
    }

    #[test]
    fn test_cookie_value_round_trip() {
        let record = sample();
        let encoded = record.to_cookie_value();
        assert!(!encoded.contains('"'));
        assert_eq!(AttributionRecord::from_cookie_value(&encoded), Some(record));
    }

    #[test]
    fn test_cookie_value_accepts_raw_json() {
        let record = AttributionRecord::from_cookie_value(r#"{"utm_source":"newsletter"}"#).unwrap();
        assert_eq!(record.utm_source.as_deref(), Some("newsletter"));
    }

    #[test]
    fn test_garbage_cookie_is_absent() {
        assert!(AttributionRecord::from_cookie_value("").is_none());
        assert!(AttributionRecord::from_cookie_value("not-json").is_none());
        assert!(AttributionRecord::from_cookie_value("%7Bbroken").is_none());
        assert!(AttributionRecord::from_cookie_value("[1,2,3]").is_none());
    }

    #[test]
    fn test_has_utm() {
        assert!(!AttributionRecord::default().has_utm());
        let record = AttributionRecord {
            utm_content: Some("banner".into()),
            ..Default::default()
        };
        assert!(record.has_utm());
        let record = AttributionRecord {
            referrer: Some("https://example.org".into()),
            landing_url: Some("https://example.com".into()),
            ..Default::default()
        };
        assert!(!record.has_utm());
    }

    #[test]
    fn test_utm_field_parsing() {
        assert_eq!("source".parse::<UtmField>(), Ok(UtmField::Source));
        assert_eq!("utm_campaign".parse::<UtmField>(), Ok(UtmField::Campaign));
        assert_eq!("UTM_Term".parse::<UtmField>(), Ok(UtmField::Term));
        assert!("gclid".parse::<UtmField>().is_err());
        let name: &str = UtmField::Medium.as_ref();
        assert_eq!(name, "utm_medium");
    }
}
