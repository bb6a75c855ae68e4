//! Yamlet
//! ======
//!
//! A small decoder for an indentation-sensitive subset of YAML.  You hand
//! it text and get back a tree of typed [`Value`]s which you can walk
//! without any further parsing.
//!
//! To decode a document you simply need to:
//!
//! ```
//! let value = yamlet::decode(r#"
//! toplevel: is always a mapping
//! numbers:
//!   - 42
//!   - 0x2A
//!   - 3.14
//! flags: {on: true, off: FALSE}
//! "#).unwrap();
//! let map = value.as_mapping().unwrap();
//! assert_eq!(map.get_sequence("numbers").unwrap().get_i64(1), Some(42));
//! assert_eq!(map.get_mapping("flags").unwrap().get_bool("off"), Some(false));
//! ```
//!
//! Decoding happens in two stages which are also available on their own:
//! [`tokenize`] splits the text into classified [`Token`]s, and
//! [`assemble`] builds the tree from those tokens.
//!
//! A few rules to be aware of:
//!
//! * The result is always a mapping.  A document which is a bare sequence
//!   is placed under the key `root`.
//! * Anchors, aliases and tags are recognised but **MAY NOT** be used.
//! * Scalars are typed when they are scanned.  Integers may be written in
//!   decimal, hexadecimal (`0x`), octal (`0o`) or binary (`0b`).
//! * Later duplicate keys replace earlier ones unless you ask for them to
//!   be rejected with [`LoaderOptions`].
//!
//! In addition, you can convert between [`Value`] and `yaml_rust::Yaml`, and
//! [`render`] a value back into text.
#![cfg_attr(
    feature = "serde",
    doc = r#"

Should you so choose, you may use serde to deserialise documents
directly into structures.

```
# use yamlet::from_yaml;
# use std::collections::HashMap;
let YAML = "Daniel: Author\nUser: Not Author\n";
let roles: HashMap<String, String> = from_yaml(YAML).unwrap();

assert_eq!(roles["Daniel"], "Author");
```

You can deserialize from an already decoded value with [`from_value`] instead.
"#
)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod emitter;
pub mod loader;
pub mod scanner;
pub mod types;

#[doc(inline)]
pub use emitter::render;
#[doc(inline)]
pub use loader::{assemble, assemble_with_options, LoadError, LoaderOptions};
#[doc(inline)]
pub use scanner::{tokenize, ScanError, Token, TokenKind};
#[doc(inline)]
pub use types::{Mapping, Marker, Sequence, Value};

#[cfg(feature = "serde")]
#[doc(hidden)]
pub mod value_serde;

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
#[doc(inline)]
pub use value_serde::{
    from_value, from_yaml, from_yaml_with_options, Error, FromValueError, FromYamlError,
};

/// Decode a document into a value
///
/// The returned value is always a [`Value::Mapping`].
///
/// ```
/// # use yamlet::*;
/// let value = decode("a: 1\nb: 2\n").unwrap();
/// let keys: Vec<_> = value.as_mapping().unwrap().keys().cloned().collect();
/// assert_eq!(keys, ["a", "b"]);
/// ```
pub fn decode<S>(text: S) -> Result<Value, LoadError>
where
    S: AsRef<str>,
{
    decode_with_options(text, LoaderOptions::default())
}

/// Decode a document into a value with the given options
///
/// ```
/// # use yamlet::*;
/// let options = LoaderOptions::default().skip_stray_tokens(true);
/// let value = decode_with_options("a: 1\n) b: 2", options).unwrap();
/// assert_eq!(value.as_mapping().unwrap().len(), 2);
/// ```
pub fn decode_with_options<S>(text: S, options: LoaderOptions) -> Result<Value, LoadError>
where
    S: AsRef<str>,
{
    let text = text.as_ref();
    let tokens = tokenize(text)?;
    tracing::trace!(bytes = text.len(), tokens = tokens.len(), "tokenized document");
    assemble_with_options(&tokens, options)
}
