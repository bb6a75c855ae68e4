//! Check that documents inside the supported subset decode the same way
//! they do with yaml-rust2.

use rstest::rstest;
use yaml_rust::YamlLoader;
use yamlet::{decode, Value};

fn reference(text: &str) -> Value {
    let mut docs = YamlLoader::load_from_str(text).unwrap();
    assert_eq!(docs.len(), 1);
    Value::try_from(docs.remove(0)).unwrap()
}

#[test]
fn everything_agrees() {
    let text = include_str!("fixtures/everything.yaml");
    assert_eq!(decode(text).unwrap(), reference(text));
}

#[rstest]
#[case("a: 1\nb: 2\n")]
#[case("a:\n  b:\n    c: deep\n  d: 0x10\n")]
#[case("list:\n  - one\n  - two words here\n  - 0o17\n")]
#[case("list:\n- flush\n- left\n")]
#[case("pairs:\n  - a: 1\n    b: 2\n  - a: 3\n")]
#[case("flow: [1, 2.5, true, null, text]\n")]
#[case("flow: {x: 1, y: [a, b], z: {w: v}}\n")]
#[case("quoted: 'false'\nother: \"12\"\n")]
#[case("kept: |\n  one\n  two\nstripped: |-\n  three\n")]
#[case("neg: -5\nfloat: -2.25\n")]
#[case("# comment\nkey: value # trailing\n")]
fn subset_agrees(#[case] text: &str) {
    assert_eq!(decode(text).unwrap(), reference(text));
}

#[test]
fn top_level_sequence_is_wrapped() {
    let text = "- a\n- b\n";
    let value = decode(text).unwrap();
    let root = value.as_mapping().unwrap().get_value("root").unwrap();
    let expected = reference(text);
    assert_eq!(root, &expected);
}

#[test]
fn rendered_output_is_standard() {
    let original = decode(include_str!("fixtures/everything.yaml")).unwrap();
    let rendered = yamlet::render(&original);
    assert_eq!(reference(&rendered), original);
}
