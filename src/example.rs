//! Literal example values embedded in parameter and body documentation.
//!
//! Examples are JSON-like, but may also hold raw bytes and date/time values.
//! Those serialize with a fixed encoding so any JSON consumer can read them:
//!
//! - bytes become UTF-8 text
//! - date-times and dates become integer epoch milliseconds
//! - durations become a `{days, seconds, microseconds}` object

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

const MICROS_PER_SECOND: i128 = 1_000_000;
const MICROS_PER_DAY: i128 = 86_400 * MICROS_PER_SECOND;

/// A literal example value.
#[derive(Debug, Clone, PartialEq)]
pub enum Example {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Bytes(Vec<u8>),
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
    Duration(TimeDelta),
    List(Vec<Example>),
    Map(IndexMap<String, Example>),
}

impl Example {
    /// Build an ordered map example from `(key, value)` pairs.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Example>,
        I: IntoIterator<Item = (K, V)>,
    {
        Example::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Example::Null)
    }

    /// Look up a key of a map example.
    pub fn get(&self, key: &str) -> Option<&Example> {
        match self {
            Example::Map(entries) => entries.get(key),
            _ => None,
        }
    }

    /// The example that documents a single field of a group.
    ///
    /// Map examples are keyed by field name; any other example applies to
    /// every field as a whole. Null results are dropped.
    pub fn for_field(&self, field: &str) -> Option<&Example> {
        let example = match self {
            Example::Map(_) => self.get(field)?,
            other => other,
        };
        (!example.is_null()).then_some(example)
    }
}

fn date_millis(date: &NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

/// Split a duration into normalized `(days, seconds, microseconds)`, with
/// `0 <= seconds < 86400` and `0 <= microseconds < 1_000_000`.
fn duration_parts(delta: &TimeDelta) -> (i64, i64, i64) {
    let total = i128::from(delta.num_seconds()) * MICROS_PER_SECOND
        + i128::from(delta.subsec_nanos() / 1_000);
    let days = total.div_euclid(MICROS_PER_DAY);
    let rest = total.rem_euclid(MICROS_PER_DAY);
    (
        days as i64,
        (rest / MICROS_PER_SECOND) as i64,
        (rest % MICROS_PER_SECOND) as i64,
    )
}

impl Serialize for Example {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Example::Null => serializer.serialize_unit(),
            Example::Bool(b) => serializer.serialize_bool(*b),
            Example::Number(n) => n.serialize(serializer),
            Example::String(s) => serializer.serialize_str(s),
            Example::Bytes(bytes) => serializer.serialize_str(&String::from_utf8_lossy(bytes)),
            Example::DateTime(dt) => serializer.serialize_i64(dt.timestamp_millis()),
            Example::Date(date) => serializer.serialize_i64(date_millis(date)),
            Example::Duration(delta) => {
                let (days, seconds, micros) = duration_parts(delta);
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("days", &days)?;
                map.serialize_entry("seconds", &seconds)?;
                map.serialize_entry("microseconds", &micros)?;
                map.end()
            }
            Example::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Example::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Example {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Example::from)
    }
}

impl From<Value> for Example {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Example::Null,
            Value::Bool(b) => Example::Bool(b),
            Value::Number(n) => Example::Number(n),
            Value::String(s) => Example::String(s),
            Value::Array(items) => Example::List(items.into_iter().map(Example::from).collect()),
            Value::Object(entries) => Example::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Example::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Example {
    fn from(s: &str) -> Self {
        Example::String(s.to_string())
    }
}

impl From<String> for Example {
    fn from(s: String) -> Self {
        Example::String(s)
    }
}

impl From<bool> for Example {
    fn from(b: bool) -> Self {
        Example::Bool(b)
    }
}

impl From<i64> for Example {
    fn from(n: i64) -> Self {
        Example::Number(n.into())
    }
}

impl From<i32> for Example {
    fn from(n: i32) -> Self {
        Example::Number(n.into())
    }
}

impl From<f64> for Example {
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n)
            .map(Example::Number)
            .unwrap_or(Example::Null)
    }
}

impl From<&[u8]> for Example {
    fn from(bytes: &[u8]) -> Self {
        Example::Bytes(bytes.to_vec())
    }
}

impl From<DateTime<Utc>> for Example {
    fn from(dt: DateTime<Utc>) -> Self {
        Example::DateTime(dt)
    }
}

impl From<NaiveDate> for Example {
    fn from(date: NaiveDate) -> Self {
        Example::Date(date)
    }
}

impl From<TimeDelta> for Example {
    fn from(delta: TimeDelta) -> Self {
        Example::Duration(delta)
    }
}

impl<T: Into<Example>> From<Vec<T>> for Example {
    fn from(items: Vec<T>) -> Self {
        Example::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_bytes_serialize_as_text() {
        let example = Example::map([("name", Example::from(&b"abc"[..]))]);
        let json = serde_json::to_value(&example).unwrap();
        assert_eq!(json, json!({"name": "abc"}));
    }

    #[test]
    fn test_datetime_serializes_as_epoch_millis() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let json = serde_json::to_value(Example::from(dt)).unwrap();
        assert_eq!(json, json!(1_704_164_645_000_i64));
    }

    #[test]
    fn test_date_serializes_as_midnight_utc() {
        let date = NaiveDate::from_ymd_opt(1970, 1, 2).unwrap();
        let json = serde_json::to_value(Example::from(date)).unwrap();
        assert_eq!(json, json!(86_400_000));
    }

    #[test]
    fn test_duration_serializes_as_triple() {
        let delta = TimeDelta::days(2) + TimeDelta::seconds(30) + TimeDelta::microseconds(7);
        let json = serde_json::to_value(Example::from(delta)).unwrap();
        assert_eq!(json, json!({"days": 2, "seconds": 30, "microseconds": 7}));
    }

    #[test]
    fn test_negative_duration_is_normalized() {
        let json = serde_json::to_value(Example::from(TimeDelta::seconds(-1))).unwrap();
        assert_eq!(
            json,
            json!({"days": -1, "seconds": 86_399, "microseconds": 0})
        );
    }

    #[test]
    fn test_map_preserves_insertion_order() {
        let example = Example::from(json!({"z": 1, "a": 2, "m": 3}));
        let text = serde_json::to_string(&example).unwrap();
        assert_eq!(text, r#"{"z":1,"a":2,"m":3}"#);
    }

    #[test]
    fn test_for_field_on_map() {
        let example = Example::from(json!({"id": 123, "gone": null}));
        assert_eq!(example.for_field("id"), Some(&Example::from(123)));
        assert_eq!(example.for_field("missing"), None);
        assert_eq!(example.for_field("gone"), None);
    }

    #[test]
    fn test_for_field_on_scalar_applies_whole() {
        let example = Example::from("token");
        assert_eq!(example.for_field("anything"), Some(&example));
        assert_eq!(Example::Null.for_field("anything"), None);
    }

    #[test]
    fn test_deserialize_from_yaml() {
        let example: Example = serde_yaml::from_str("limit: 10\noffset: 20\n").unwrap();
        assert_eq!(example.get("limit"), Some(&Example::from(10)));
    }
}
