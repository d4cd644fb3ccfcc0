//! SDMX-JSON wire model of the Norges Bank `EXR` response
//!
//! Only the subset of SDMX-JSON this dataset uses is modelled. Unknown fields
//! are ignored and purely descriptive fields default when absent, so the same
//! types read live responses, cached datasets and the bundled fixture.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Europe::Oslo;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Observation dimension holding the period of each observation
pub const TIME_PERIOD: &str = "TIME_PERIOD";

/// Local date-time form used by the API, interpreted in Europe/Oslo
pub const LOCAL_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Top-level response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRatesResponse {
    pub meta: ResponseMeta,
    pub data: ResponseData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMeta {
    #[serde(default)]
    pub id: String,
    #[serde(with = "oslo_datetime")]
    pub prepared: DateTime<Utc>,
    #[serde(default)]
    pub test: bool,
    #[serde(default)]
    pub sender: Endpoint,
    #[serde(default)]
    pub receiver: Endpoint,
    #[serde(default)]
    pub links: Vec<MetaLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaLink {
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub rel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseData {
    #[serde(default)]
    pub data_sets: Vec<DataSet>,
    pub structure: Structure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSet {
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub action: String,
    /// Sparse series map keyed by colon-joined dimension value indices, e.g. `0:12:0:0`
    #[serde(default)]
    pub series: BTreeMap<String, RawSeries>,
}

/// One entry of [`DataSet::series`].
///
/// Read leniently so one bad entry cannot fail the whole response: numeric
/// observation values are taken as text, attribute slots that are not
/// non-negative integers become `None`, and anything the decoder cannot use is
/// described in `malformed`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct RawSeries {
    /// Attribute value indices by slot; `null` when the attribute is not set
    pub attributes: Vec<Option<usize>>,
    /// Time dimension index -> `[value, ...]`
    pub observations: BTreeMap<String, Vec<Option<String>>>,
    /// Why the entry is unusable, when it is
    #[serde(skip)]
    pub malformed: Option<String>,
}

impl RawSeries {
    fn malformed(reason: String) -> Self {
        Self {
            malformed: Some(reason),
            ..Self::default()
        }
    }
}

impl From<Value> for RawSeries {
    fn from(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            return Self::malformed(format!("entry is not an object: {}", value));
        };
        let mut problems = Vec::new();

        let attributes = match fields.remove("attributes") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(slots)) => slots
                .into_iter()
                .enumerate()
                .map(|(slot, v)| match v {
                    Value::Null => None,
                    other => {
                        let index = other.as_u64().and_then(|i| usize::try_from(i).ok());
                        if index.is_none() {
                            problems.push(format!("attribute slot {} is {}", slot, other));
                        }
                        index
                    }
                })
                .collect(),
            Some(other) => {
                problems.push(format!("attributes is not an array: {}", other));
                Vec::new()
            }
        };

        let mut observations = BTreeMap::new();
        match fields.remove("observations") {
            None | Some(Value::Null) => {}
            Some(Value::Object(entries)) => {
                for (key, values) in entries {
                    match values {
                        Value::Array(values) => {
                            observations.insert(key, values.into_iter().map(observation_value).collect());
                        }
                        other => problems.push(format!("observation {} is not an array: {}", key, other)),
                    }
                }
            }
            Some(other) => problems.push(format!("observations is not an object: {}", other)),
        }

        Self {
            attributes,
            observations,
            malformed: (!problems.is_empty()).then(|| problems.join("; ")),
        }
    }
}

/// Text of one observation value; numbers are accepted as published
fn observation_value(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default)]
    pub rel: String,
    #[serde(default)]
    pub urn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub names: BTreeMap<String, String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub descriptions: BTreeMap<String, String>,
    pub dimensions: Dimensions,
    #[serde(default)]
    pub attributes: Attributes,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    #[serde(default)]
    pub series: Vec<SeriesDimension>,
    #[serde(default)]
    pub observation: Vec<ObservationDimension>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesDimension {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub key_position: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub values: Vec<CodeValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationDimension {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub key_position: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub values: Vec<TimeValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(default)]
    pub series: Vec<SeriesAttribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesAttribute {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub relationship: AttributeRelationship,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub values: Vec<CodeValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeRelationship {
    #[serde(default)]
    pub dimensions: Vec<String>,
}

/// Code and display name of one dimension or attribute value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeValue {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// One period of the time dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeValue {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(with = "oslo_datetime")]
    pub start: DateTime<Utc>,
    #[serde(with = "oslo_datetime")]
    pub end: DateTime<Utc>,
}

impl ExchangeRatesResponse {
    /// Parse a response body
    pub fn from_json(text: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Total number of raw series across data sets
    pub fn series_count(&self) -> usize {
        self.data.data_sets.iter().map(|ds| ds.series.len()).sum()
    }
}

/// Interpret a naive Europe/Oslo wall-clock time as an instant.
///
/// Ambiguous times (autumn fold) resolve to the earlier instant; times inside
/// the spring gap are shifted forward by an hour.
pub fn oslo_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    Oslo.from_local_datetime(&naive)
        .earliest()
        .or_else(|| Oslo.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse `yyyy-MM-ddTHH:mm:ss` in Europe/Oslo time. Strings carrying an explicit
/// offset (RFC 3339) are accepted as well.
pub fn parse_local_datetime(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(text, LOCAL_DATETIME_FORMAT).ok()?;
    oslo_to_utc(naive)
}

/// Format an instant in the API's Europe/Oslo local form
pub fn format_local_datetime(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&Oslo).format(LOCAL_DATETIME_FORMAT).to_string()
}

/// serde codec for Europe/Oslo local date-times
pub mod oslo_datetime {
    use super::{format_local_datetime, parse_local_datetime};
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_local_datetime(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_local_datetime(&text).ok_or_else(|| {
            de::Error::custom(format!(
                "Failed to parse date {:?}, expected yyyy-MM-ddTHH:mm:ss",
                text
            ))
        })
    }
}
