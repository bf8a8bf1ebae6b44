use crate::error::{Result, RiskError};
use crate::utils::generate_record_id_str;
use ahash::{AHashMap, AHashSet};
use serde::de::{self, Deserializer, Visitor};
use serde::ser::{SerializeMap, SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A scalar cell value.
///
/// Grouping equality is value-exact: no trimming or case-folding of text.
/// Numbers compare by numeric value, so `25` and `25.0` are equal while
/// integers keep full 64-bit precision.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

static NULL: Value = Value::Null;

#[derive(PartialEq, Eq, Hash)]
enum NumberKey {
    Integer(i128),
    Bits(u64),
}

impl Value {
    // integral floats share the integer key so 25 == 25.0
    fn number_key(&self) -> Option<NumberKey> {
        match *self {
            Value::Int(n) => Some(NumberKey::Integer(i128::from(n))),
            Value::UInt(n) => Some(NumberKey::Integer(i128::from(n))),
            Value::Float(n) if n.is_nan() => Some(NumberKey::Bits(f64::NAN.to_bits())),
            Value::Float(n) if n.fract() == 0.0 && n.abs() < 1e38 => {
                Some(NumberKey::Integer(n as i128))
            }
            Value::Float(n) => Some(NumberKey::Bits(n.to_bits())),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => match (self.number_key(), other.number_key()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => 0u8.hash(state),
            Value::Bool(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            Value::Text(s) => {
                2u8.hash(state);
                s.hash(state);
            }
            Value::Int(_) | Value::UInt(_) | Value::Float(_) => {
                3u8.hash(state);
                self.number_key().hash(state);
            }
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("null, a boolean, a number or a string")
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> std::result::Result<Value, D::Error> {
        d.deserialize_any(ValueVisitor)
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> std::result::Result<Value, E> {
        Ok(Value::Bool(b))
    }

    fn visit_i64<E: de::Error>(self, n: i64) -> std::result::Result<Value, E> {
        Ok(Value::Int(n))
    }

    fn visit_u64<E: de::Error>(self, n: u64) -> std::result::Result<Value, E> {
        Ok(i64::try_from(n).map_or(Value::UInt(n), Value::Int))
    }

    fn visit_f64<E: de::Error>(self, n: f64) -> std::result::Result<Value, E> {
        Ok(Value::Float(n))
    }

    fn visit_str<E: de::Error>(self, s: &str) -> std::result::Result<Value, E> {
        Ok(Value::Text(s.to_owned()))
    }

    fn visit_string<E: de::Error>(self, s: String) -> std::result::Result<Value, E> {
        Ok(Value::Text(s))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::UInt(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        i64::try_from(n).map_or(Value::UInt(n), Value::Int)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Caller-assigned, stable record identifier. Never derived from row position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

// above this, f64 no longer holds every integer
const MAX_EXACT_FLOAT_ID: f64 = 9_007_199_254_740_992.0;

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Non-empty text and non-negative integers only.
    pub fn from_value(value: &Value) -> Option<Self> {
        match *value {
            Value::Text(ref s) if !s.is_empty() => Some(Self(s.clone())),
            Value::Int(n) => u64::try_from(n).ok().map(Self::from),
            Value::UInt(n) => Some(Self::from(n)),
            Value::Float(n) if n.fract() == 0.0 && (0.0..=MAX_EXACT_FLOAT_ID).contains(&n) => {
                Some(Self::from(n as u64))
            }
            _ => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(generate_record_id_str(id))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub(crate) id: RecordId,
    pub(crate) values: AHashMap<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            values: AHashMap::new(),
        }
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(column.into(), value.into());
        self
    }

    /// The id column stays in the row values.
    pub fn from_row(values: AHashMap<String, Value>, id_column: &str, row: usize) -> Result<Self> {
        let id = row_values_id(&values, id_column).ok_or_else(|| RiskError::MissingRecordId {
            row,
            column: id_column.to_owned(),
        })?;
        Ok(Self { id, values })
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    /// Absent columns read as `null`.
    pub fn get(&self, column: &str) -> &Value {
        self.values.get(column).unwrap_or(&NULL)
    }

    pub fn values(&self) -> &AHashMap<String, Value> {
        &self.values
    }

    pub fn in_column_order<'a>(&'a self, columns: &'a [String]) -> OrderedRecord<'a> {
        OrderedRecord {
            record: self,
            columns,
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut columns: Vec<String> = self.values.keys().cloned().collect();
        columns.sort_unstable();
        self.in_column_order(&columns).serialize(serializer)
    }
}

pub struct OrderedRecord<'a> {
    record: &'a Record,
    columns: &'a [String],
}

struct OrderedValues<'a>(&'a OrderedRecord<'a>);

impl Serialize for OrderedRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Record", 2)?;
        state.serialize_field("id", &self.record.id)?;
        state.serialize_field("values", &OrderedValues(self))?;
        state.end()
    }
}

impl Serialize for OrderedValues<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let OrderedRecord { record, columns } = self.0;
        let mut map = serializer.serialize_map(None)?;
        for column in columns.iter() {
            if let Some(value) = record.values.get(column) {
                map.serialize_entry(column, value)?;
            }
        }
        map.end()
    }
}

#[inline]
fn row_values_id(row: &AHashMap<String, Value>, id_column: &str) -> Option<RecordId> {
    row.get(id_column).and_then(RecordId::from_value)
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    /// Rejects duplicate record ids and record columns outside `columns`.
    pub fn new(mut columns: Vec<String>, records: Vec<Record>) -> Result<Self> {
        {
            let schema: AHashSet<&str> = columns.iter().map(String::as_str).collect();
            let mut seen = AHashSet::with_capacity(records.len());
            for record in &records {
                if !seen.insert(&record.id) {
                    return Err(RiskError::DuplicateRecordId(record.id.clone()));
                }
                if let Some(column) = record.values.keys().find(|c| !schema.contains(c.as_str())) {
                    return Err(RiskError::UnknownColumn {
                        record: record.id.clone(),
                        column: column.clone(),
                    });
                }
            }
        }
        let mut unique = AHashSet::with_capacity(columns.len());
        columns.retain(|c| unique.insert(c.clone()));
        Ok(Self { columns, records })
    }

    pub fn from_records(records: Vec<Record>) -> Result<Self> {
        let mut columns: Vec<String> = records
            .iter()
            .flat_map(|r| r.values.keys().cloned())
            .collect::<AHashSet<_>>()
            .into_iter()
            .collect();
        columns.sort_unstable();
        Self::new(columns, records)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub(crate) fn validate_qi_set(&self, qi_set: &QuasiIdentifierSet) -> Result<()> {
        let missing: Vec<String> = qi_set
            .columns()
            .iter()
            .filter(|c| !self.has_column(c))
            .cloned()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(RiskError::MissingColumns {
                qi_set: qi_set.to_string(),
                columns: missing,
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct QuasiIdentifierSet(Vec<String>);

impl QuasiIdentifierSet {
    pub fn new<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(RiskError::EmptyQuasiIdentifierSet);
        }
        let duplicate = {
            let mut seen = AHashSet::with_capacity(columns.len());
            columns.iter().find(|c| !seen.insert(c.as_str())).cloned()
        };
        match duplicate {
            Some(column) => Err(RiskError::DuplicateQuasiIdentifier(column)),
            None => Ok(Self(columns)),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for QuasiIdentifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_grouping_equality() {
        assert_eq!(Value::Null, Value::Null);
        assert_eq!(Value::from(25), Value::from(25.0));
        assert_eq!(Value::from(-0.0), Value::from(0.0));
        assert_eq!(Value::from(f64::NAN), Value::from(f64::NAN));
        assert_eq!(Value::from(7u64), Value::from(7));
        assert_ne!(Value::from(true), Value::from(1));
        assert_ne!(Value::from("Boston"), Value::from("boston"));
        assert_ne!(Value::from("25"), Value::from(25));
        assert_ne!(Value::Null, Value::from(""));
    }

    #[test]
    fn test_value_deserializes_json_scalars() {
        let row: AHashMap<String, Value> =
            serde_json::from_str(r#"{"age": 25, "zip": "10001", "city": null}"#).unwrap();
        assert_eq!(row["age"], Value::from(25));
        assert_eq!(row["zip"], Value::from("10001"));
        assert!(row["city"].is_null());
    }

    #[test]
    fn test_large_integers_stay_distinct() {
        let row: AHashMap<String, Value> = serde_json::from_str(
            r#"{"a": 9007199254740992, "b": 9007199254740993, "c": 18446744073709551615}"#,
        )
        .unwrap();
        assert_eq!(row["a"], Value::Int(9_007_199_254_740_992));
        assert_eq!(row["b"], Value::Int(9_007_199_254_740_993));
        assert_ne!(row["a"], row["b"]);
        assert_eq!(row["c"], Value::UInt(u64::MAX));
        assert_eq!(
            RecordId::from_value(&row["b"]),
            Some(RecordId::new("9007199254740993"))
        );
        assert_eq!(
            RecordId::from_value(&row["c"]),
            Some(RecordId::new("18446744073709551615"))
        );
    }

    #[test]
    fn test_booleans_deserialize() {
        let row: AHashMap<String, Value> =
            serde_json::from_str(r#"{"active": true, "vip": false}"#).unwrap();
        assert_eq!(row["active"], Value::Bool(true));
        assert_eq!(row["vip"], Value::Bool(false));
        assert_eq!(RecordId::from_value(&row["active"]), None);
    }

    #[test]
    fn test_record_serializes_in_column_order() {
        let record = Record::new("r1")
            .with("zip", "02138")
            .with("age", 34)
            .with("city", "Cambridge");
        let columns = vec!["zip".to_string(), "city".to_string(), "age".to_string()];
        let json = serde_json::to_string(&record.in_column_order(&columns)).unwrap();
        assert_eq!(
            json,
            r#"{"id":"r1","values":{"zip":"02138","city":"Cambridge","age":34}}"#
        );
        let sorted = serde_json::to_string(&record).unwrap();
        assert_eq!(
            sorted,
            r#"{"id":"r1","values":{"age":34,"city":"Cambridge","zip":"02138"}}"#
        );
    }

    #[test]
    fn test_record_id_from_value() {
        assert_eq!(
            RecordId::from_value(&Value::from(42)),
            Some(RecordId::new("42"))
        );
        assert_eq!(
            RecordId::from_value(&Value::from("C-001")),
            Some(RecordId::new("C-001"))
        );
        assert_eq!(RecordId::from_value(&Value::from(1.5)), None);
        assert_eq!(RecordId::from_value(&Value::from(-3)), None);
        assert_eq!(RecordId::from_value(&Value::Null), None);
        assert_eq!(RecordId::from_value(&Value::from("")), None);
    }

    #[test]
    fn test_record_from_row_requires_id() {
        let mut row = AHashMap::new();
        row.insert("age".to_string(), Value::from(30));
        let err = Record::from_row(row.clone(), "id", 7).unwrap_err();
        assert!(matches!(err, RiskError::MissingRecordId { row: 7, .. }));

        row.insert("id".to_string(), Value::from(3));
        let record = Record::from_row(row, "id", 7).unwrap();
        assert_eq!(record.id().as_str(), "3");
        assert_eq!(record.get("age"), &Value::from(30));
        assert!(record.get("zip").is_null());
    }

    #[test]
    fn test_dataset_rejects_duplicate_ids() {
        let records = vec![Record::new("a").with("age", 1), Record::new("a").with("age", 2)];
        let err = Dataset::from_records(records).unwrap_err();
        assert!(matches!(err, RiskError::DuplicateRecordId(id) if id.as_str() == "a"));
    }

    #[test]
    fn test_dataset_rejects_unknown_columns() {
        let records = vec![Record::new("a").with("age", 1).with("zip", "1")];
        let err = Dataset::new(vec!["age".to_string()], records).unwrap_err();
        assert!(matches!(err, RiskError::UnknownColumn { column, .. } if column == "zip"));
    }

    #[test]
    fn test_dataset_schema_from_records() {
        let records = vec![
            Record::new("a").with("zip", "1"),
            Record::new("b").with("age", 2),
        ];
        let dataset = Dataset::from_records(records).unwrap();
        assert_eq!(dataset.columns(), &["age".to_string(), "zip".to_string()]);
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_qi_set_validation() {
        assert!(matches!(
            QuasiIdentifierSet::new(Vec::<String>::new()),
            Err(RiskError::EmptyQuasiIdentifierSet)
        ));
        assert!(matches!(
            QuasiIdentifierSet::new(["age", "zip", "age"]),
            Err(RiskError::DuplicateQuasiIdentifier(c)) if c == "age"
        ));
        let qi = QuasiIdentifierSet::new(["age", "zip"]).unwrap();
        assert_eq!(qi.to_string(), "[age, zip]");
    }

    #[test]
    fn test_validate_qi_set_reports_missing_columns() {
        let dataset = Dataset::from_records(vec![Record::new("a").with("age", 1)]).unwrap();
        let qi = QuasiIdentifierSet::new(["age", "zip", "gender"]).unwrap();
        match dataset.validate_qi_set(&qi) {
            Err(RiskError::MissingColumns { columns, .. }) => {
                assert_eq!(columns, vec!["zip".to_string(), "gender".to_string()]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
