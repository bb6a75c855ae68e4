#![cfg(feature = "serde")]
//! All these tests require serde
//!

use std::collections::HashMap;

use serde::Deserialize;
use yamlet::{decode, from_value, from_yaml, from_yaml_with_options, FromYamlError, LoaderOptions};

const TEST_DOC: &str = r#"# Line one is a comment
top:
  - level
  - is always
  - two
  - strings
u8s: [ 0, 1, 2, 255 ]
i8s: [ -128, 0, 127 ]
u32s: [ 0x10001 ]
thingy: blue
outcome:
    bad: stuff
looksee: { ugly: [ first, second ] }
known: { unknown: { name: Jeff, age: 14 } }
kvs:
    first: one
    second: two
    third: banana
falsy: false
truthy: TRUE
ratio: 0.25
nothing: null
"#;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct FullTest {
    top: Vec<String>,
    u8s: Vec<u8>,
    i8s: Vec<i8>,
    u32s: Vec<u32>,
    missing: Option<String>,
    nothing: Option<String>,
    thingy: Colour,
    outcome: EnumCheck,
    looksee: EnumCheck,
    known: EnumCheck,
    kvs: HashMap<String, String>,
    falsy: bool,
    truthy: bool,
    ratio: f64,
}

#[derive(Deserialize, Debug, PartialEq)]
enum EnumCheck {
    #[serde(alias = "good")]
    Good(String),
    #[serde(alias = "bad")]
    Bad(String),
    #[serde(alias = "ugly")]
    Ugly(String, String),
    #[serde(alias = "unknown")]
    Unknown { name: String, age: i64 },
}

#[derive(Deserialize, Debug, PartialEq)]
enum Colour {
    #[serde(alias = "blue")]
    Blue,
    #[serde(alias = "red")]
    Red,
}

#[test]
fn read_everything() {
    let value = decode(TEST_DOC).unwrap();
    let doc: FullTest = from_value(&value).unwrap();
    assert_eq!(doc.top[1], "is always");
    assert_eq!(doc.u8s, [0, 1, 2, 255]);
    assert_eq!(doc.i8s, [-128, 0, 127]);
    assert_eq!(doc.u32s, [65537]);
    assert_eq!(doc.missing, None);
    assert_eq!(doc.nothing, None);
    assert_eq!(doc.thingy, Colour::Blue);
    assert_eq!(doc.outcome, EnumCheck::Bad("stuff".into()));
    assert_eq!(doc.looksee, EnumCheck::Ugly("first".into(), "second".into()));
    assert_eq!(
        doc.known,
        EnumCheck::Unknown {
            name: "Jeff".into(),
            age: 14
        }
    );
    assert_eq!(doc.kvs["third"], "banana");
    assert!(!doc.falsy);
    assert!(doc.truthy);
    assert_eq!(doc.ratio, 0.25);
}

#[test]
fn ergonomics() {
    let doc: FullTest = from_yaml(TEST_DOC).unwrap();
    assert_eq!(doc.kvs.get("first").map(String::as_str), Some("one"));
}

#[test]
fn parse_fails() {
    let err = from_yaml::<FullTest>("hello world").err().unwrap();
    assert!(matches!(err, FromYamlError::Decode(_)));
    let err = from_yaml::<FullTest>("hello: world").err().unwrap();
    assert!(matches!(err, FromYamlError::FromValue(_)));
    let s = format!("{err}");
    assert!(s.contains("missing field"));
}

#[test]
fn options_reach_the_decoder() {
    let text = "a: 1\na: 2\n";
    let map: HashMap<String, u8> = from_yaml(text).unwrap();
    assert_eq!(map["a"], 2);
    let strict = LoaderOptions::default().error_on_duplicate_keys(true);
    let err = from_yaml_with_options::<HashMap<String, u8>>(text, strict).unwrap_err();
    assert!(matches!(err, FromYamlError::Decode(_)));
}
