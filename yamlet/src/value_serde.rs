//! Serde support for decoded values
//!

use std::fmt;

use serde::{
    de::{
        value::BorrowedStrDeserializer, EnumAccess, IntoDeserializer, MapAccess, SeqAccess,
        Unexpected, VariantAccess, Visitor,
    },
    forward_to_deserialize_any, Deserialize, Deserializer,
};

use crate::{decode_with_options, LoadError, LoaderOptions, Mapping, Sequence, Value};

/// Errors which can occur when deserialising from a [`Value`]
#[non_exhaustive]
#[derive(Debug)]
pub enum Error {
    /// An integer did not fit the type requested of it
    IntegerOutOfRange(i64, &'static str),
    /// The value contained a field which was not expected
    UnknownFieldError(String, &'static [&'static str]),
    /// Some other error occurred
    Other(Box<dyn std::error::Error>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IntegerOutOfRange(value, target) => {
                write!(f, "Integer {value} does not fit in {target}")
            }
            Error::UnknownFieldError(field, expected) => match expected.len() {
                0 => write!(f, "Unknown field `{field}`, there are no fields"),
                1 => write!(f, "Unknown field `{field}`, expected `{}`", expected[0]),
                2 => write!(
                    f,
                    "Unknown field `{field}`, expected `{}` or `{}`",
                    expected[0], expected[1]
                ),
                _ => {
                    write!(f, "Unknown field `{field}`, expected one of ")?;
                    let last = expected.len() - 1;
                    for (n, name) in expected.iter().enumerate() {
                        match n {
                            0 => write!(f, "`{name}`")?,
                            n if n == last => write!(f, ", or `{name}`")?,
                            _ => write!(f, ", `{name}`")?,
                        }
                    }
                    Ok(())
                }
            },
            Error::Other(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for Error {}

impl serde::de::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: fmt::Display,
    {
        Error::Other(msg.to_string().into())
    }

    fn unknown_field(field: &str, expected: &'static [&'static str]) -> Self {
        Error::UnknownFieldError(field.to_string(), expected)
    }
}

/// The error returned by [`from_value`]
///
/// When the `serde-path` feature is enabled this carries the path within
/// the value at which deserialisation failed, such as `numbers[3]`.
#[derive(Debug)]
pub struct FromValueError {
    error: Error,
    path: Option<String>,
}

impl FromValueError {
    /// The path to the value which failed, if it is known
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Discard the path and retrieve the underlying error
    pub fn into_inner(self) -> Error {
        self.error
    }
}

impl std::ops::Deref for FromValueError {
    type Target = Error;

    fn deref(&self) -> &Self::Target {
        &self.error
    }
}

impl fmt::Display for FromValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{path}: {}", self.error),
            None => self.error.fmt(f),
        }
    }
}

impl std::error::Error for FromValueError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// The error returned by [`from_yaml`] and [`from_yaml_with_options`]
#[derive(Debug)]
pub enum FromYamlError {
    /// The text could not be decoded
    Decode(LoadError),
    /// The decoded value did not fit the requested type
    FromValue(FromValueError),
}

impl fmt::Display for FromYamlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FromYamlError::Decode(e) => write!(f, "{e}"),
            FromYamlError::FromValue(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for FromYamlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FromYamlError::Decode(e) => Some(e),
            FromYamlError::FromValue(e) => Some(e),
        }
    }
}

impl From<LoadError> for FromYamlError {
    fn from(value: LoadError) -> Self {
        FromYamlError::Decode(value)
    }
}

impl From<FromValueError> for FromYamlError {
    fn from(value: FromValueError) -> Self {
        FromYamlError::FromValue(value)
    }
}

/// Deserialise some text into a type
///
/// ```
/// # use yamlet::from_yaml;
/// # use serde::Deserialize;
/// #[derive(Deserialize)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let point: Point = from_yaml("x: 3\ny: -4").unwrap();
/// assert_eq!((point.x, point.y), (3, -4));
/// ```
#[allow(clippy::result_large_err)]
pub fn from_yaml<T>(text: &str) -> Result<T, FromYamlError>
where
    T: for<'de> Deserialize<'de>,
{
    from_yaml_with_options(text, LoaderOptions::default())
}

/// Deserialise some text into a type, decoding it with the given options
#[allow(clippy::result_large_err)]
pub fn from_yaml_with_options<T>(text: &str, options: LoaderOptions) -> Result<T, FromYamlError>
where
    T: for<'de> Deserialize<'de>,
{
    let value = decode_with_options(text, options)?;
    Ok(from_value(&value)?)
}

/// Deserialise an already decoded value into a type
///
/// Strings may be borrowed from the value.
///
/// ```
/// # use yamlet::{decode, from_value};
/// let value = decode("name: yamlet\nsizes: [1, 2, 3]").unwrap();
/// #[derive(serde::Deserialize)]
/// struct Doc<'a> {
///     name: &'a str,
///     sizes: Vec<u8>,
/// }
/// let doc: Doc<'_> = from_value(&value).unwrap();
/// assert_eq!(doc.name, "yamlet");
/// assert_eq!(doc.sizes, [1, 2, 3]);
/// ```
pub fn from_value<'de, T>(value: &'de Value) -> Result<T, FromValueError>
where
    T: Deserialize<'de>,
{
    inner_from_value(value)
}

#[cfg(not(feature = "serde-path"))]
fn inner_from_value<'de, T>(value: &'de Value) -> Result<T, FromValueError>
where
    T: Deserialize<'de>,
{
    T::deserialize(ValueDeserializer::new(value)).map_err(|error| FromValueError { error, path: None })
}

#[cfg(feature = "serde-path")]
fn inner_from_value<'de, T>(value: &'de Value) -> Result<T, FromValueError>
where
    T: Deserialize<'de>,
{
    serde_path_to_error::deserialize(ValueDeserializer::new(value)).map_err(|e| {
        let path = render_path(e.path());
        FromValueError {
            error: e.into_inner(),
            path: Some(path).filter(|p| !p.is_empty()),
        }
    })
}

#[cfg(feature = "serde-path")]
fn render_path(path: &serde_path_to_error::Path) -> String {
    use serde_path_to_error::Segment;
    let mut ret = String::new();
    for segment in path.iter() {
        if !ret.is_empty() && !matches!(segment, Segment::Seq { .. }) {
            ret.push('.');
        }
        ret.push_str(&segment.to_string());
    }
    ret
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Mapping(_) => Unexpected::Map,
        Value::Sequence(_) => Unexpected::Seq,
        Value::String(s) => Unexpected::Str(s),
        Value::Integer(i) => Unexpected::Signed(*i),
        Value::Float(f) => Unexpected::Float(*f),
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Null => Unexpected::Unit,
    }
}

/// Deserializer over a borrowed [`Value`]
pub struct ValueDeserializer<'de> {
    value: &'de Value,
}

impl<'de> ValueDeserializer<'de> {
    /// Wrap a value so that it can be deserialised
    pub fn new(value: &'de Value) -> Self {
        Self { value }
    }
}

impl<'de> IntoDeserializer<'de, Error> for &'de Value {
    type Deserializer = ValueDeserializer<'de>;

    fn into_deserializer(self) -> Self::Deserializer {
        ValueDeserializer::new(self)
    }
}

macro_rules! deserialize_integer {
    ($($meth:ident => $visit:ident($t:ty)),* $(,)?) => {
        $(
            fn $meth<V>(self, visitor: V) -> Result<V::Value, Self::Error>
            where
                V: Visitor<'de>,
            {
                match self.value {
                    Value::Integer(i) => match <$t>::try_from(*i) {
                        Ok(n) => visitor.$visit(n),
                        Err(_) => Err(Error::IntegerOutOfRange(*i, stringify!($t))),
                    },
                    _ => self.deserialize_any(visitor),
                }
            }
        )*
    };
}

impl<'de> Deserializer<'de> for ValueDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Mapping(map) => visitor.visit_map(MappingAccess::new(map)),
            Value::Sequence(seq) => visitor.visit_seq(SequenceAccess::new(seq)),
            Value::String(s) => visitor.visit_borrowed_str(s),
            Value::Integer(i) => visitor.visit_i64(*i),
            Value::Float(f) => visitor.visit_f64(*f),
            Value::Bool(b) => visitor.visit_bool(*b),
            Value::Null => visitor.visit_unit(),
        }
    }

    deserialize_integer! {
        deserialize_i8 => visit_i8(i8),
        deserialize_i16 => visit_i16(i16),
        deserialize_i32 => visit_i32(i32),
        deserialize_u8 => visit_u8(u8),
        deserialize_u16 => visit_u16(u16),
        deserialize_u32 => visit_u32(u32),
        deserialize_u64 => visit_u64(u64),
        deserialize_u128 => visit_u128(u128),
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::String(s) => visitor.visit_enum(BorrowedStrDeserializer::<Error>::new(s)),
            Value::Mapping(map) => match (map.len(), map.iter().next()) {
                (1, Some((key, value))) => visitor.visit_enum(MappingEnumAccess { key, value }),
                (n, _) => Err(serde::de::Error::invalid_length(
                    n,
                    &"a mapping with exactly one entry",
                )),
            },
            other => Err(serde::de::Error::invalid_type(
                unexpected(other),
                &"a string or a mapping with one entry",
            )),
        }
    }

    forward_to_deserialize_any! [
        bool i64 i128 f32 f64 char str string bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    ];
}

struct MappingAccess<'de> {
    items: std::iter::Peekable<hashlink::linked_hash_map::Iter<'de, String, Value>>,
}

impl<'de> MappingAccess<'de> {
    fn new(map: &'de Mapping) -> Self {
        Self {
            items: map.iter().peekable(),
        }
    }
}

impl<'de> MapAccess<'de> for MappingAccess<'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: serde::de::DeserializeSeed<'de>,
    {
        match self.items.peek() {
            Some(&(key, _)) => seed
                .deserialize(BorrowedStrDeserializer::<Error>::new(key))
                .map(Some),
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::DeserializeSeed<'de>,
    {
        match self.items.next() {
            Some((_, value)) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(serde::de::Error::custom("value requested past end of mapping")),
        }
    }
}

struct MappingEnumAccess<'de> {
    key: &'de str,
    value: &'de Value,
}

impl<'de> EnumAccess<'de> for MappingEnumAccess<'de> {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant), Self::Error>
    where
        V: serde::de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(BorrowedStrDeserializer::<Error>::new(self.key))?;
        Ok((variant, self))
    }
}

impl<'de> VariantAccess<'de> for MappingEnumAccess<'de> {
    type Error = Error;

    fn unit_variant(self) -> Result<(), Self::Error> {
        match self.value {
            Value::Null => Ok(()),
            other => Err(serde::de::Error::invalid_type(
                unexpected(other),
                &"a unit variant",
            )),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value, Self::Error>
    where
        T: serde::de::DeserializeSeed<'de>,
    {
        seed.deserialize(ValueDeserializer::new(self.value))
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        ValueDeserializer::new(self.value).deserialize_seq(visitor)
    }

    fn struct_variant<V>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        ValueDeserializer::new(self.value).deserialize_map(visitor)
    }
}

struct SequenceAccess<'de> {
    items: std::slice::Iter<'de, Value>,
}

impl<'de> SequenceAccess<'de> {
    fn new(seq: &'de Sequence) -> Self {
        Self { items: seq.iter() }
    }
}

impl<'de> SeqAccess<'de> for SequenceAccess<'de> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: serde::de::DeserializeSeed<'de>,
    {
        self.items
            .next()
            .map(|value| seed.deserialize(ValueDeserializer::new(value)))
            .transpose()
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}
