//! Various basic types for decoded documents
//!

use doc_comment::doc_comment;
use hashlink::LinkedHashMap;
use std::fmt::{self, Display};
use std::ops::{Deref, DerefMut};
use yaml_rust::Yaml as YamlNode;

/// A marker for a position in the input
///
/// Every token knows which line it came from and how far that line was
/// indented.  Diagnostics carry a marker so you can find the culprit.
///
/// ```
/// use yamlet::{decode, Marker};
/// let err = decode("a: 1\nb: ]\n").unwrap_err();
/// assert_eq!(err.marker(), Marker::new(2, 0));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Marker {
    line: usize,
    indent: usize,
}

impl Marker {
    /// Create a new Marker
    ///
    /// This will typically not be used because markers will come from
    /// tokenizing input, however it is provided for completeness and in case
    /// you need it for your own tests.
    ///
    /// ```
    /// # use yamlet::Marker;
    /// let marker = Marker::new(3, 2);
    /// # assert_eq!(marker.line(), 3);
    /// # assert_eq!(marker.indent(), 2);
    /// ```
    pub fn new(line: usize, indent: usize) -> Self {
        Self { line, indent }
    }

    /// The line number on which this marker resides, 1-indexed
    ///
    /// ```
    /// # use yamlet::Marker;
    /// # let marker = Marker::new(3, 2);
    /// assert_eq!(marker.line(), 3);
    /// ```
    pub fn line(&self) -> usize {
        self.line
    }

    /// The number of leading spaces on the line this marker resides on
    ///
    /// Tabs are not counted, only space characters.
    ///
    /// ```
    /// # use yamlet::Marker;
    /// # let marker = Marker::new(3, 2);
    /// assert_eq!(marker.indent(), 2);
    /// ```
    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Set the line number for this marker
    ///
    /// ```
    /// # use yamlet::Marker;
    /// # let mut marker = Marker::new(1, 0);
    /// marker.set_line(7);
    /// assert_eq!(marker.line(), 7);
    /// ```
    pub fn set_line(&mut self, line: usize) {
        self.line = line;
    }

    /// Set the indentation for this marker
    ///
    /// ```
    /// # use yamlet::Marker;
    /// # let mut marker = Marker::new(1, 0);
    /// marker.set_indent(4);
    /// assert_eq!(marker.indent(), 4);
    /// ```
    pub fn set_indent(&mut self, indent: usize) {
        self.indent = indent;
    }
}

impl Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}", self.line)
    }
}

/// A decoded value
///
/// Documents decode into a tree of these.  The top level of a decoded
/// document is always a [`Value::Mapping`].
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// An ordered mapping from string keys to values
    Mapping(Mapping),
    /// An ordered list of values
    Sequence(Sequence),
    /// A string scalar
    String(String),
    /// An integer scalar, whichever base it was written in
    Integer(i64),
    /// A floating point scalar
    Float(f64),
    /// A boolean scalar
    Bool(bool),
    /// The null scalar
    Null,
}

/// The hash table used to back mappings
pub type MappingHash = LinkedHashMap<String, Value>;

/// A mapping of string keys to values
///
/// Keys keep the order in which they were first inserted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mapping {
    value: MappingHash,
}

/// A sequence of values
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sequence {
    value: Vec<Value>,
}

impl Value {
    /// Retrieve the mapping from this value if there is one
    ///
    /// ```
    /// # use yamlet::*;
    /// let value = decode("{foobar: baz}").unwrap();
    /// let mapping = value.as_mapping();
    /// assert!(mapping.is_some());
    /// ```
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Retrieve the sequence from this value if there is one
    ///
    /// ```
    /// # use yamlet::types::*;
    /// let value: Value = vec!["foobar"].into();
    /// let sequence = value.as_sequence();
    /// assert!(sequence.is_some());
    /// ```
    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Value::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    /// Retrieve the mapping from this value if there is one, mutably
    ///
    /// ```
    /// # use yamlet::*;
    /// let mut value = decode("{foobar: baz}").unwrap();
    /// let mapping = value.as_mapping_mut().unwrap();
    /// mapping.insert("extra".to_string(), 1.into());
    /// assert_eq!(mapping.len(), 2);
    /// ```
    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Retrieve the sequence from this value if there is one, mutably
    ///
    /// ```
    /// # use yamlet::types::*;
    /// let mut value: Value = vec!["foobar"].into();
    /// value.as_sequence_mut().unwrap().push("baz".into());
    /// assert_eq!(value.as_sequence().unwrap().len(), 2);
    /// ```
    pub fn as_sequence_mut(&mut self) -> Option<&mut Sequence> {
        match self {
            Value::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    /// Treat the value as a string
    ///
    /// Only string scalars are returned, numbers and other scalars are
    /// not stringified.
    ///
    /// ```
    /// # use yamlet::types::*;
    /// let value: Value = "foobar".into();
    /// assert_eq!(value.as_str(), Some("foobar"));
    /// assert_eq!(Value::from(42).as_str(), None);
    /// ```
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Treat the value as a floating point number
    ///
    /// Integers widen to floating point.
    ///
    /// ```
    /// # use yamlet::types::*;
    /// assert_eq!(Value::Float(2.5).as_f64(), Some(2.5));
    /// assert_eq!(Value::Integer(2).as_f64(), Some(2.0));
    /// assert_eq!(Value::Null.as_f64(), None);
    /// ```
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Treat the value as a boolean
    ///
    /// ```
    /// # use yamlet::types::*;
    /// assert_eq!(Value::Bool(true).as_bool(), Some(true));
    /// assert_eq!(Value::from("true").as_bool(), None);
    /// ```
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Whether this value is null
    ///
    /// ```
    /// # use yamlet::*;
    /// let value = decode("nothing: ~\nreally: NULL").unwrap();
    /// let map = value.as_mapping().unwrap();
    /// assert!(!map.get_value("nothing").unwrap().is_null());
    /// assert!(map.get_value("really").unwrap().is_null());
    /// ```
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl<'a> From<&'a str> for Value {
    /// Convert from a string slice into a value
    ///
    /// ```
    /// # use yamlet::types::*;
    /// let value = Value::from("foobar");
    /// assert_eq!(value.as_str(), Some("foobar"));
    /// ```
    fn from(value: &'a str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

macro_rules! value_from_to_integer {
    (@as $t:ident, $as:ident) => {
        impl Value {
            doc_comment!(
                concat!(
                    "Treat the value as ",
                    stringify!($t),
                    r#".

If this value is an integer which fits in the requested type then
return it, otherwise return None.  Floats are never truncated.

```
# use yamlet::types::*;
let value = Value::Integer(42);
assert_eq!(value.as_"#,
                    stringify!($t),
                    r#"(), Some(42"#,
                    stringify!($t),
                    r#"));
assert_eq!(Value::Float(42.0).as_"#,
                    stringify!($t),
                    r#"(), None);
```"#
                ),
                pub fn $as(&self) -> Option<$t> {
                    match self {
                        Value::Integer(i) => $t::try_from(*i).ok(),
                        _ => None,
                    }
                }
            );
        }
    };

    ($t:ident, $as:ident) => {
        impl From<$t> for Value {
            doc_comment!(
                concat!(
                    "Convert from ",
                    stringify!($t),
                    r#" into an integer value

```
# use yamlet::types::*;
let value: "#,
                    stringify!($t),
                    r#" = 42;
assert_eq!(Value::from(value), Value::Integer(42));
```"#
                ),
                fn from(value: $t) -> Self {
                    Value::Integer(i64::from(value))
                }
            );
        }

        value_from_to_integer!(@as $t, $as);
    };
}

value_from_to_integer!(i8, as_i8);
value_from_to_integer!(i16, as_i16);
value_from_to_integer!(i32, as_i32);
value_from_to_integer!(i64, as_i64);
value_from_to_integer!(u8, as_u8);
value_from_to_integer!(u16, as_u16);
value_from_to_integer!(u32, as_u32);
value_from_to_integer!(@as u64, as_u64);
value_from_to_integer!(@as usize, as_usize);

impl From<Mapping> for Value {
    fn from(value: Mapping) -> Self {
        Value::Mapping(value)
    }
}

impl From<MappingHash> for Value {
    fn from(value: MappingHash) -> Self {
        Value::Mapping(value.into())
    }
}

impl From<Sequence> for Value {
    fn from(value: Sequence) -> Self {
        Value::Sequence(value)
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Vec<T>) -> Self {
        Value::Sequence(value.into())
    }
}

impl Sequence {
    /// Create a new empty sequence
    ///
    /// ```
    /// # use yamlet::types::*;
    /// let seq = Sequence::new();
    /// assert!(seq.is_empty());
    /// ```
    pub fn new() -> Self {
        Self { value: Vec::new() }
    }

    /// Get the value at the given index
    ///
    /// If the index is invalid then None will be returned
    ///
    /// ```
    /// # use yamlet::types::*;
    /// let seq: Sequence = vec!["foobar"].into_iter().collect();
    /// assert_eq!(seq.get_value(0).and_then(Value::as_str), Some("foobar"));
    /// assert_eq!(seq.get_value(1), None);
    /// ```
    pub fn get_value(&self, index: usize) -> Option<&Value> {
        self.value.get(index)
    }

    /// Get the string at the given index
    ///
    /// If the index is invalid, or the value at that index is not a string,
    /// then None will be returned.
    pub fn get_str(&self, index: usize) -> Option<&str> {
        self.get_value(index).and_then(Value::as_str)
    }

    /// Get the integer at the given index
    pub fn get_i64(&self, index: usize) -> Option<i64> {
        self.get_value(index).and_then(Value::as_i64)
    }

    /// Get the sequence at the given index
    ///
    /// If the index is invalid, or the value at that index is not a sequence
    /// then None will be returned.
    ///
    /// ```
    /// # use yamlet::types::*;
    /// let seq: Sequence = vec![vec!["foobar"]].into_iter().collect();
    /// assert_eq!(seq.get_sequence(0)
    ///     .and_then(|s| s.get_str(0))
    ///     .unwrap(),
    ///     "foobar");
    /// ```
    pub fn get_sequence(&self, index: usize) -> Option<&Sequence> {
        self.get_value(index).and_then(Value::as_sequence)
    }

    /// Get the mapping at the given index
    ///
    /// If the index is invalid, or the value at that index is not a mapping
    /// then None will be returned.
    pub fn get_mapping(&self, index: usize) -> Option<&Mapping> {
        self.get_value(index).and_then(Value::as_mapping)
    }
}

impl Deref for Sequence {
    type Target = Vec<Value>;
    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl DerefMut for Sequence {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.value
    }
}

impl<T> FromIterator<T> for Sequence
where
    T: Into<Value>,
{
    /// Allow collecting things into a sequence
    ///
    /// ```
    /// # use yamlet::types::*;
    /// let seq: Sequence = vec!["hello", "world"].into_iter().collect();
    /// assert_eq!(seq.len(), 2);
    /// ```
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            value: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<T> From<Vec<T>> for Sequence
where
    T: Into<Value>,
{
    fn from(value: Vec<T>) -> Self {
        value.into_iter().collect()
    }
}

impl Mapping {
    /// Create a new empty mapping
    ///
    /// ```
    /// # use yamlet::types::*;
    /// let map = Mapping::new();
    /// assert!(map.is_empty());
    /// ```
    pub fn new() -> Self {
        Self {
            value: LinkedHashMap::new(),
        }
    }

    /// Get the value for the given string key
    ///
    /// If the key is not found then None is returned.
    ///
    /// ```
    /// # use yamlet::*;
    /// let value = decode("{foo: bar}").unwrap();
    /// let map = value.as_mapping().unwrap();
    /// assert_eq!(map.get_value("foo").and_then(Value::as_str), Some("bar"));
    /// assert_eq!(map.get_value("bar"), None);
    /// ```
    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.value.get(key)
    }

    /// Get the string for the given key
    ///
    /// If the key is not found, or the value is not a string, then
    /// None is returned.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get_value(key).and_then(Value::as_str)
    }

    /// Get the integer for the given key
    ///
    /// ```
    /// # use yamlet::*;
    /// let value = decode("answer: 0x2A").unwrap();
    /// assert_eq!(value.as_mapping().unwrap().get_i64("answer"), Some(42));
    /// ```
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get_value(key).and_then(Value::as_i64)
    }

    /// Get the floating point number for the given key
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get_value(key).and_then(Value::as_f64)
    }

    /// Get the boolean for the given key
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get_value(key).and_then(Value::as_bool)
    }

    /// Get the sequence for the given key
    ///
    /// If the key is not found, or the value is not a sequence, then
    /// None is returned.
    ///
    /// ```
    /// # use yamlet::*;
    /// let value = decode("items:\n  - 1\n  - 2\n").unwrap();
    /// let items = value.as_mapping().unwrap().get_sequence("items").unwrap();
    /// assert_eq!(items.get_i64(1), Some(2));
    /// ```
    pub fn get_sequence(&self, key: &str) -> Option<&Sequence> {
        self.get_value(key).and_then(Value::as_sequence)
    }

    /// Get the mapping for the given key
    ///
    /// If the key is not found, or the value is not a mapping, then
    /// None is returned.
    pub fn get_mapping(&self, key: &str) -> Option<&Mapping> {
        self.get_value(key).and_then(Value::as_mapping)
    }
}

impl Deref for Mapping {
    type Target = MappingHash;
    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl DerefMut for Mapping {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.value
    }
}

impl From<MappingHash> for Mapping {
    fn from(value: MappingHash) -> Self {
        Self { value }
    }
}

impl<T, U> FromIterator<(T, U)> for Mapping
where
    T: Into<String>,
    U: Into<Value>,
{
    /// Allow collecting things into a mapping
    ///
    /// Later pairs replace the values of earlier pairs with the same key.
    ///
    /// ```
    /// # use yamlet::types::*;
    /// let map: Mapping = vec![("hello", "world"), ("hello", "again")]
    ///     .into_iter()
    ///     .collect();
    /// assert_eq!(map.len(), 1);
    /// assert_eq!(map.get_str("hello"), Some("again"));
    /// ```
    fn from_iter<I: IntoIterator<Item = (T, U)>>(iter: I) -> Self {
        Self {
            value: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Errors which could be encountered while converting from a `yaml_rust::Yaml`
#[derive(Debug, PartialEq, Eq)]
pub enum YamlConversionError {
    /// An alias was encountered while converting
    Alias,
    /// A BadValue was encountered while converting
    BadValue,
    /// A real number which could not be parsed
    BadReal(String),
    /// A mapping or sequence was used as a mapping key
    NonScalarKey,
}

impl Display for YamlConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use YamlConversionError::*;
        match self {
            Alias => write!(f, "Aliases cannot be converted"),
            BadValue => write!(f, "Bad values cannot be converted"),
            BadReal(s) => write!(f, "Unable to convert real number {s:?}"),
            NonScalarKey => write!(f, "Keys in mappings must be scalar"),
        }
    }
}

impl std::error::Error for YamlConversionError {}

fn yaml_key(key: YamlNode) -> Result<String, YamlConversionError> {
    match key {
        YamlNode::String(s) | YamlNode::Real(s) => Ok(s),
        YamlNode::Integer(i) => Ok(i.to_string()),
        YamlNode::Boolean(b) => Ok(b.to_string()),
        YamlNode::Null => Ok("null".to_string()),
        YamlNode::Alias(_) => Err(YamlConversionError::Alias),
        YamlNode::BadValue => Err(YamlConversionError::BadValue),
        YamlNode::Array(_) | YamlNode::Hash(_) => Err(YamlConversionError::NonScalarKey),
    }
}

impl TryFrom<YamlNode> for Value {
    type Error = YamlConversionError;

    /// Convert from any `yaml_rust::Yaml` to a Value
    ///
    /// Scalar keys are turned into strings.
    ///
    /// ```
    /// # use yaml_rust::YamlLoader;
    /// # use yamlet::types::*;
    /// # use std::convert::TryFrom;
    /// let docs = YamlLoader::load_from_str("[1, 2]").unwrap();
    /// let yaml = docs.into_iter().next().unwrap();
    /// let value = Value::try_from(yaml).unwrap();
    /// assert_eq!(value, Value::from(vec![1, 2]));
    /// ```
    fn try_from(value: YamlNode) -> Result<Self, Self::Error> {
        match value {
            YamlNode::Array(arr) => Ok(Value::Sequence(
                arr.into_iter()
                    .map(Value::try_from)
                    .collect::<Result<Sequence, Self::Error>>()?,
            )),
            YamlNode::Hash(h) => Ok(Value::Mapping(
                h.into_iter()
                    .map(|(k, v)| Ok((yaml_key(k)?, Value::try_from(v)?)))
                    .collect::<Result<Mapping, Self::Error>>()?,
            )),
            YamlNode::String(s) => Ok(Value::String(s)),
            YamlNode::Integer(i) => Ok(Value::Integer(i)),
            YamlNode::Real(s) => s
                .parse()
                .map(Value::Float)
                .map_err(|_| YamlConversionError::BadReal(s)),
            YamlNode::Boolean(b) => Ok(Value::Bool(b)),
            YamlNode::Null => Ok(Value::Null),
            YamlNode::Alias(_) => Err(YamlConversionError::Alias),
            YamlNode::BadValue => Err(YamlConversionError::BadValue),
        }
    }
}

impl From<Sequence> for YamlNode {
    fn from(value: Sequence) -> Self {
        YamlNode::Array(value.value.into_iter().map(Into::into).collect())
    }
}

impl From<Mapping> for YamlNode {
    fn from(value: Mapping) -> Self {
        YamlNode::Hash(
            value
                .value
                .into_iter()
                .map(|(k, v)| (YamlNode::String(k), v.into()))
                .collect(),
        )
    }
}

impl From<Value> for YamlNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Mapping(map) => map.into(),
            Value::Sequence(seq) => seq.into(),
            Value::String(s) => YamlNode::String(s),
            Value::Integer(i) => YamlNode::Integer(i),
            // Debug formatting keeps the `.0` on whole numbers
            Value::Float(f) => YamlNode::Real(format!("{f:?}")),
            Value::Bool(b) => YamlNode::Boolean(b),
            Value::Null => YamlNode::Null,
        }
    }
}
