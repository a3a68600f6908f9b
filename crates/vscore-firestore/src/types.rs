//! Firestore REST API types.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Firestore document value types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    NullValue(()),
    BooleanValue(bool),
    IntegerValue(String), // Firestore sends integers as strings
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    pub values: Option<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
    pub fields: Option<HashMap<String, Value>>,
}

/// Firestore document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub fields: Option<HashMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

impl Document {
    pub fn new(fields: HashMap<String, Value>) -> Self {
        Self {
            name: None,
            fields: Some(fields),
            create_time: None,
            update_time: None,
        }
    }

    /// Last path segment of the resource name.
    pub fn doc_id(&self) -> Option<&str> {
        self.name.as_deref().and_then(|n| n.rsplit('/').next())
    }

    /// Read a typed field.
    pub fn get<T: FromFirestoreValue>(&self, field: &str) -> Option<T> {
        self.fields
            .as_ref()
            .and_then(|f| f.get(field))
            .and_then(T::from_firestore_value)
    }
}

// ============================================================================
// Structured query types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredQuery {
    pub from: Vec<CollectionSelector>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub r#where: Option<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<Vec<Order>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
}

impl StructuredQuery {
    /// Query over a single collection with no filter, ordering or limit.
    pub fn collection(collection_id: impl Into<String>) -> Self {
        Self {
            from: vec![CollectionSelector {
                collection_id: collection_id.into(),
                all_descendants: None,
            }],
            r#where: None,
            order_by: None,
            limit: None,
        }
    }

    pub fn filter_eq(mut self, field_path: impl Into<String>, value: Value) -> Self {
        self.r#where = Some(Filter {
            field_filter: Some(FieldFilter {
                field: FieldReference {
                    field_path: field_path.into(),
                },
                op: "EQUAL".to_string(),
                value,
            }),
        });
        self
    }

    pub fn order_desc(mut self, field_path: impl Into<String>) -> Self {
        self.order_by.get_or_insert_with(Vec::new).push(Order {
            field: FieldReference {
                field_path: field_path.into(),
            },
            direction: "DESCENDING".to_string(),
        });
        self
    }

    pub fn limit(mut self, limit: i32) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSelector {
    pub collection_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_descendants: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_filter: Option<FieldFilter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldFilter {
    pub field: FieldReference,
    pub op: String,
    pub value: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReference {
    pub field_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub field: FieldReference,
    pub direction: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryRequest {
    pub structured_query: StructuredQuery,
}

/// One element of the runQuery response stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryResponse {
    pub document: Option<Document>,
    pub read_time: Option<String>,
}

// ============================================================================
// Value conversion
// ============================================================================

/// Encode a Rust value as a Firestore field.
pub trait ToFirestoreValue {
    fn to_firestore_value(&self) -> Value;
}

/// Decode a Firestore field. `None` when the variant does not match.
pub trait FromFirestoreValue: Sized {
    fn from_firestore_value(value: &Value) -> Option<Self>;
}

macro_rules! firestore_scalar {
    ($ty:ty, $variant:ident, |$v:ident| $encode:expr) => {
        impl ToFirestoreValue for $ty {
            fn to_firestore_value(&self) -> Value {
                let $v = self;
                Value::$variant($encode)
            }
        }
    };
}

firestore_scalar!(String, StringValue, |v| v.clone());
firestore_scalar!(&str, StringValue, |v| v.to_string());
firestore_scalar!(f64, DoubleValue, |v| *v);
firestore_scalar!(bool, BooleanValue, |v| *v);
firestore_scalar!(DateTime<Utc>, TimestampValue, |v| v
    .to_rfc3339_opts(SecondsFormat::Micros, true));

impl<T: ToFirestoreValue> ToFirestoreValue for Option<T> {
    fn to_firestore_value(&self) -> Value {
        self.as_ref()
            .map_or(Value::NullValue(()), ToFirestoreValue::to_firestore_value)
    }
}

impl FromFirestoreValue for String {
    fn from_firestore_value(value: &Value) -> Option<Self> {
        match value {
            Value::StringValue(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromFirestoreValue for f64 {
    /// Integers widen; Firestore stores whole-number doubles either way.
    fn from_firestore_value(value: &Value) -> Option<Self> {
        match value {
            Value::DoubleValue(f) => Some(*f),
            Value::IntegerValue(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl FromFirestoreValue for bool {
    fn from_firestore_value(value: &Value) -> Option<Self> {
        match value {
            Value::BooleanValue(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromFirestoreValue for DateTime<Utc> {
    fn from_firestore_value(value: &Value) -> Option<Self> {
        match value {
            Value::TimestampValue(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_encode_as_null() {
        assert_eq!(None::<f64>.to_firestore_value(), Value::NullValue(()));
        assert_eq!(Some(72.5).to_firestore_value(), Value::DoubleValue(72.5));
    }

    #[test]
    fn test_timestamp_round_trips_at_microsecond_precision() {
        let at = DateTime::from_timestamp(1_700_000_000, 123_456_000).unwrap();
        let encoded = at.to_firestore_value();
        assert_eq!(DateTime::<Utc>::from_firestore_value(&encoded), Some(at));
    }

    #[test]
    fn test_double_accepts_integer_encoding() {
        let v = Value::IntegerValue("80".into());
        assert_eq!(f64::from_firestore_value(&v), Some(80.0));
        assert_eq!(bool::from_firestore_value(&v), None);
    }
}
