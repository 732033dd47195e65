// ABOUTME: Setting value model and its text encoding
// ABOUTME: Values are stored as text plus a type tag and cast back on read

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Type tag persisted next to every setting's text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingType {
    String,
    Int,
    Float,
    Bool,
    Array,
    Null,
}

impl SettingType {
    pub const ALL: [SettingType; 6] = [
        SettingType::String,
        SettingType::Int,
        SettingType::Float,
        SettingType::Bool,
        SettingType::Array,
        SettingType::Null,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingType::String => "string",
            SettingType::Int => "int",
            SettingType::Float => "float",
            SettingType::Bool => "bool",
            SettingType::Array => "array",
            SettingType::Null => "null",
        }
    }

    /// Parse a stored tag. Unknown tags fall back to `String` so the raw
    /// text is still readable.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "int" => SettingType::Int,
            "float" => SettingType::Float,
            "bool" => SettingType::Bool,
            "array" => SettingType::Array,
            "null" => SettingType::Null,
            _ => SettingType::String,
        }
    }
}

impl fmt::Display for SettingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded setting value.
///
/// `Array` holds a JSON array or object: an ordered or keyed collection. A
/// scalar placed in `Array` is written as a one-element list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Array(JsonValue),
    Null,
}

impl SettingValue {
    pub fn empty_array() -> Self {
        SettingValue::Array(JsonValue::Array(Vec::new()))
    }

    /// The tag inferred from the value's shape
    pub fn setting_type(&self) -> SettingType {
        match self {
            SettingValue::String(_) => SettingType::String,
            SettingValue::Int(_) => SettingType::Int,
            SettingValue::Float(_) => SettingType::Float,
            SettingValue::Bool(_) => SettingType::Bool,
            SettingValue::Array(_) => SettingType::Array,
            SettingValue::Null => SettingType::Null,
        }
    }

    /// Encode using the inferred tag
    pub fn encode(&self) -> String {
        self.encode_as(self.setting_type())
    }

    /// Encode as `setting_type`, coercing the value when its shape differs
    pub fn encode_as(&self, setting_type: SettingType) -> String {
        match setting_type {
            SettingType::String => self.display_text(),
            SettingType::Int => self.to_i64_lossy().to_string(),
            SettingType::Float => self.to_f64_lossy().to_string(),
            SettingType::Bool => {
                if self.is_truthy() {
                    "1".to_string()
                } else {
                    "0".to_string()
                }
            }
            SettingType::Array => self.to_collection().to_string(),
            SettingType::Null => String::new(),
        }
    }

    /// Decode stored text. Never fails: unparsable numbers become zero and
    /// malformed array text becomes an empty collection.
    pub fn decode(text: &str, setting_type: SettingType) -> Self {
        match setting_type {
            SettingType::String => SettingValue::String(text.to_string()),
            SettingType::Int => SettingValue::Int(parse_i64_lossy(text)),
            SettingType::Float => SettingValue::Float(text.trim().parse::<f64>().unwrap_or(0.0)),
            SettingType::Bool => SettingValue::Bool(text == "1" || text == "true"),
            SettingType::Array => match serde_json::from_str::<JsonValue>(text) {
                Ok(collection @ (JsonValue::Array(_) | JsonValue::Object(_))) => {
                    SettingValue::Array(collection)
                }
                _ => SettingValue::empty_array(),
            },
            SettingType::Null => SettingValue::Null,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SettingValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Floats, and integers widened to float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SettingValue::Float(f) => Some(*f),
            SettingValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&JsonValue> {
        match self {
            SettingValue::Array(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SettingValue::Null)
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            SettingValue::String(s) => JsonValue::String(s.clone()),
            SettingValue::Int(i) => JsonValue::from(*i),
            SettingValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            SettingValue::Bool(b) => JsonValue::Bool(*b),
            SettingValue::Array(c) => c.clone(),
            SettingValue::Null => JsonValue::Null,
        }
    }

    fn display_text(&self) -> String {
        match self {
            SettingValue::String(s) => s.clone(),
            SettingValue::Int(i) => i.to_string(),
            SettingValue::Float(f) => f.to_string(),
            SettingValue::Bool(true) => "1".to_string(),
            SettingValue::Bool(false) => "0".to_string(),
            SettingValue::Array(c) => c.to_string(),
            SettingValue::Null => String::new(),
        }
    }

    fn is_truthy(&self) -> bool {
        match self {
            SettingValue::String(s) => !(s.is_empty() || s == "0"),
            SettingValue::Int(i) => *i != 0,
            SettingValue::Float(f) => *f != 0.0,
            SettingValue::Bool(b) => *b,
            SettingValue::Array(c) => !collection_is_empty(c),
            SettingValue::Null => false,
        }
    }

    fn to_i64_lossy(&self) -> i64 {
        match self {
            SettingValue::String(s) => parse_i64_lossy(s),
            SettingValue::Int(i) => *i,
            SettingValue::Float(f) if f.is_finite() => f.trunc() as i64,
            SettingValue::Float(_) => 0,
            SettingValue::Bool(b) => i64::from(*b),
            SettingValue::Array(c) => i64::from(!collection_is_empty(c)),
            SettingValue::Null => 0,
        }
    }

    fn to_f64_lossy(&self) -> f64 {
        match self {
            SettingValue::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            SettingValue::Int(i) => *i as f64,
            SettingValue::Float(f) => *f,
            SettingValue::Bool(b) => f64::from(u8::from(*b)),
            SettingValue::Array(c) => f64::from(u8::from(!collection_is_empty(c))),
            SettingValue::Null => 0.0,
        }
    }

    fn to_collection(&self) -> JsonValue {
        match self {
            SettingValue::Array(c @ (JsonValue::Array(_) | JsonValue::Object(_))) => c.clone(),
            SettingValue::Array(JsonValue::Null) | SettingValue::Null => {
                JsonValue::Array(Vec::new())
            }
            SettingValue::Array(item) => JsonValue::Array(vec![item.clone()]),
            scalar => JsonValue::Array(vec![scalar.to_json()]),
        }
    }
}

fn collection_is_empty(collection: &JsonValue) -> bool {
    match collection {
        JsonValue::Array(items) => items.is_empty(),
        JsonValue::Object(entries) => entries.is_empty(),
        JsonValue::Null => true,
        _ => false,
    }
}

/// Integer text, or float text truncated toward zero; anything else is 0
fn parse_i64_lossy(text: &str) -> i64 {
    let trimmed = text.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return i;
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() => f.trunc() as i64,
        _ => 0,
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::String(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::String(value.to_string())
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for SettingValue {
                fn from(value: $t) -> Self {
                    SettingValue::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for SettingValue {
    fn from(value: f32) -> Self {
        SettingValue::Float(f64::from(value))
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        SettingValue::Float(value)
    }
}

impl<T: Into<SettingValue>> From<Option<T>> for SettingValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SettingValue::Null)
    }
}

impl<T: Into<SettingValue>> From<Vec<T>> for SettingValue {
    fn from(items: Vec<T>) -> Self {
        SettingValue::Array(JsonValue::Array(
            items.into_iter().map(|item| item.into().to_json()).collect(),
        ))
    }
}

impl<T: Into<SettingValue>> From<BTreeMap<String, T>> for SettingValue {
    fn from(entries: BTreeMap<String, T>) -> Self {
        SettingValue::Array(JsonValue::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k, v.into().to_json()))
                .collect(),
        ))
    }
}

impl<T: Into<SettingValue>> From<HashMap<String, T>> for SettingValue {
    fn from(entries: HashMap<String, T>) -> Self {
        SettingValue::Array(JsonValue::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k, v.into().to_json()))
                .collect(),
        ))
    }
}

impl From<JsonValue> for SettingValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => SettingValue::Null,
            JsonValue::Bool(b) => SettingValue::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => SettingValue::Int(i),
                None => SettingValue::Float(n.as_f64().unwrap_or(0.0)),
            },
            JsonValue::String(s) => SettingValue::String(s),
            collection => SettingValue::Array(collection),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(SettingValue::from("smtp.example.com"))]
    #[case(SettingValue::from(""))]
    #[case(SettingValue::from(587))]
    #[case(SettingValue::from(-42i64))]
    #[case(SettingValue::from(3.14))]
    #[case(SettingValue::from(true))]
    #[case(SettingValue::from(false))]
    #[case(SettingValue::from(vec!["a", "b"]))]
    #[case(SettingValue::Array(json!({"retries": 3, "hosts": ["a", "b"]})))]
    #[case(SettingValue::Null)]
    fn test_round_trip(#[case] value: SettingValue) {
        let setting_type = value.setting_type();
        let decoded = SettingValue::decode(&value.encode(), setting_type);
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_encoding_table() {
        assert_eq!(SettingValue::from(587).encode(), "587");
        assert_eq!(SettingValue::from(2.5).encode(), "2.5");
        assert_eq!(SettingValue::from(true).encode(), "1");
        assert_eq!(SettingValue::from(false).encode(), "0");
        assert_eq!(SettingValue::from(vec!["a", "b"]).encode(), r#"["a","b"]"#);
        assert_eq!(SettingValue::Null.encode(), "");
    }

    #[rstest]
    #[case("1", true)]
    #[case("true", true)]
    #[case("0", false)]
    #[case("false", false)]
    #[case("TRUE", false)]
    #[case("yes", false)]
    #[case("", false)]
    fn test_bool_decode_accepts_one_or_true(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(
            SettingValue::decode(text, SettingType::Bool),
            SettingValue::Bool(expected)
        );
    }

    #[rstest]
    #[case("not valid json")]
    #[case("")]
    #[case("\"just a string\"")]
    #[case("42")]
    fn test_malformed_array_decodes_to_empty_collection(#[case] text: &str) {
        assert_eq!(
            SettingValue::decode(text, SettingType::Array),
            SettingValue::empty_array()
        );
    }

    #[test]
    fn test_null_ignores_stored_text() {
        assert_eq!(
            SettingValue::decode("anything", SettingType::Null),
            SettingValue::Null
        );
    }

    #[test]
    fn test_unparsable_numbers_decode_to_zero() {
        assert_eq!(SettingValue::decode("abc", SettingType::Int), SettingValue::Int(0));
        assert_eq!(SettingValue::decode("7.9", SettingType::Int), SettingValue::Int(7));
        assert_eq!(
            SettingValue::decode("abc", SettingType::Float),
            SettingValue::Float(0.0)
        );
    }

    #[test]
    fn test_type_inference() {
        assert_eq!(SettingValue::from(true).setting_type(), SettingType::Bool);
        assert_eq!(SettingValue::from(42).setting_type(), SettingType::Int);
        assert_eq!(SettingValue::from(3.14).setting_type(), SettingType::Float);
        assert_eq!(
            SettingValue::from(vec!["a", "b"]).setting_type(),
            SettingType::Array
        );
        assert_eq!(
            SettingValue::from(None::<String>).setting_type(),
            SettingType::Null
        );
        assert_eq!(SettingValue::from("x").setting_type(), SettingType::String);
    }

    #[test]
    fn test_explicit_type_coerces_value() {
        assert_eq!(SettingValue::from("42").encode_as(SettingType::Int), "42");
        assert_eq!(SettingValue::from(3.9).encode_as(SettingType::Int), "3");
        assert_eq!(SettingValue::from("0").encode_as(SettingType::Bool), "0");
        assert_eq!(SettingValue::from("yes").encode_as(SettingType::Bool), "1");
        assert_eq!(SettingValue::from(7).encode_as(SettingType::String), "7");
        assert_eq!(SettingValue::from("x").encode_as(SettingType::Array), r#"["x"]"#);
        assert_eq!(SettingValue::Null.encode_as(SettingType::Array), "[]");
        assert_eq!(SettingValue::from("x").encode_as(SettingType::Null), "");
    }

    #[rstest]
    #[case(SettingValue::Array(json!(5)), "[5]")]
    #[case(SettingValue::Array(json!("solo")), r#"["solo"]"#)]
    #[case(SettingValue::Array(JsonValue::Null), "[]")]
    fn test_scalar_array_payload_is_wrapped(#[case] value: SettingValue, #[case] text: &str) {
        assert_eq!(value.encode(), text);
        assert_eq!(
            SettingValue::decode(&value.encode(), SettingType::Array),
            SettingValue::Array(serde_json::from_str(text).unwrap())
        );
    }

    #[test]
    fn test_unknown_tag_falls_back_to_string() {
        assert_eq!(SettingType::from_tag("datetime"), SettingType::String);
        for setting_type in SettingType::ALL {
            assert_eq!(SettingType::from_tag(setting_type.as_str()), setting_type);
        }
    }

    #[test]
    fn test_json_conversion() {
        assert_eq!(SettingValue::from(json!(587)), SettingValue::Int(587));
        assert_eq!(SettingValue::from(json!(1.5)), SettingValue::Float(1.5));
        assert_eq!(SettingValue::from(json!(null)), SettingValue::Null);
        assert_eq!(
            SettingValue::from(json!({"a": 1})),
            SettingValue::Array(json!({"a": 1}))
        );
    }

    #[test]
    fn test_keyed_collection_from_map() {
        let mut limits = BTreeMap::new();
        limits.insert("daily".to_string(), 100);
        limits.insert("hourly".to_string(), 10);

        let value = SettingValue::from(limits);
        assert_eq!(value, SettingValue::Array(json!({"daily": 100, "hourly": 10})));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(SettingValue::from("a").as_str(), Some("a"));
        assert_eq!(SettingValue::from(5).as_i64(), Some(5));
        assert_eq!(SettingValue::from(5).as_f64(), Some(5.0));
        assert_eq!(SettingValue::from(true).as_bool(), Some(true));
        assert!(SettingValue::Null.is_null());
        assert_eq!(SettingValue::from(5).as_str(), None);
    }

    #[test]
    fn test_serializes_as_plain_json() {
        let value = serde_json::to_value(SettingValue::from(587)).unwrap();
        assert_eq!(value, json!(587));
        let value = serde_json::to_value(SettingValue::Null).unwrap();
        assert_eq!(value, json!(null));
    }
}
