//! Rendering values back to text
//!
//! The output is block style with two spaces of indentation per level,
//! written so that decoding it gives back an equal tree.  Only the values
//! the decoder itself can produce are guaranteed to survive that round
//! trip: strings with blank lines in them, keys which contain structural
//! characters, and non-finite floats do not.

use crate::scanner::{self, TokenKind};
use crate::types::*;

use std::fmt::{self, Display};

const STEP: usize = 2;

fn pad(out: &mut String, indent: usize) {
    out.extend(std::iter::repeat(' ').take(indent));
}

fn starts_and_ends_in_word(text: &str) -> bool {
    let word = |c: char| c.is_alphanumeric();
    text.chars().next().is_some_and(word) && text.chars().last().is_some_and(word)
}

/// Write a multi-line (or otherwise awkward) string as a literal block
fn write_block(out: &mut String, text: &str, indent: usize) {
    let (header, body) = match text.strip_suffix('\n') {
        Some(body) => ("|", body),
        None => ("|-", text),
    };
    out.push_str(header);
    out.push('\n');
    for line in body.split('\n') {
        pad(out, indent);
        out.push_str(line);
        out.push('\n');
    }
}

/// Write a scalar which sits after `key: ` or `- `
fn write_scalar(out: &mut String, value: &Value, indent: usize) {
    match value {
        Value::String(s) if s.is_empty() => out.push_str("''\n"),
        Value::String(s) if s.contains('\n') => write_block(out, s, indent),
        Value::String(s) if scanner::classify(s) != TokenKind::String => {
            if starts_and_ends_in_word(s) {
                out.push('\'');
                out.push_str(s);
                out.push_str("'\n");
            } else {
                write_block(out, s, indent);
            }
        }
        Value::String(s) => {
            out.push_str(s);
            out.push('\n');
        }
        Value::Integer(i) => {
            out.push_str(&i.to_string());
            out.push('\n');
        }
        // Debug formatting keeps the `.0` on whole numbers
        Value::Float(f) => {
            out.push_str(&format!("{f:?}"));
            out.push('\n');
        }
        Value::Bool(b) => out.push_str(if *b { "true\n" } else { "false\n" }),
        Value::Null => out.push_str("null\n"),
        Value::Mapping(_) => out.push_str("{}\n"),
        Value::Sequence(_) => out.push_str("[]\n"),
    }
}

/// Write the value belonging to a key whose entries sit at `indent`
fn write_entry_value(out: &mut String, value: &Value, indent: usize) {
    match value {
        Value::Mapping(map) if !map.is_empty() => {
            out.push('\n');
            write_mapping(out, map, indent + STEP, false);
        }
        Value::Sequence(seq) if !seq.is_empty() => {
            out.push('\n');
            write_sequence(out, seq, indent + STEP);
        }
        scalar => {
            out.push(' ');
            write_scalar(out, scalar, indent + STEP);
        }
    }
}

/// Write the entries of a mapping at `indent`.  When `inline_first` is set
/// the first entry continues a `- ` line which has already been written.
fn write_mapping(out: &mut String, map: &Mapping, indent: usize, inline_first: bool) {
    for (n, (key, value)) in map.iter().enumerate() {
        if n > 0 || !inline_first {
            pad(out, indent);
        }
        out.push_str(key);
        out.push(':');
        write_entry_value(out, value, indent);
    }
}

fn write_sequence(out: &mut String, seq: &Sequence, indent: usize) {
    for item in seq.iter() {
        pad(out, indent);
        match item {
            Value::Mapping(map) if !map.is_empty() => {
                out.push_str("- ");
                write_mapping(out, map, indent + STEP, true);
            }
            Value::Sequence(inner) if !inner.is_empty() => {
                out.push_str("-\n");
                write_sequence(out, inner, indent + STEP);
            }
            scalar => {
                out.push_str("- ");
                write_scalar(out, scalar, indent + STEP);
            }
        }
    }
}

/// Render a value as block style text
///
/// ```
/// # use yamlet::*;
/// let value = decode("b: [1, 0x2A]\na: {c: text}").unwrap();
/// assert_eq!(render(&value), "b:\n  - 1\n  - 42\na:\n  c: text\n");
/// assert_eq!(decode(render(&value)).unwrap(), value);
/// ```
pub fn render(value: &Value) -> String {
    let mut out = String::new();
    match value {
        Value::Mapping(map) if !map.is_empty() => write_mapping(&mut out, map, 0, false),
        Value::Sequence(seq) if !seq.is_empty() => write_sequence(&mut out, seq, 0),
        scalar => write_scalar(&mut out, scalar, STEP),
    }
    out
}

impl Display for Value {
    /// Values display as their rendered text
    ///
    /// ```
    /// # use yamlet::types::*;
    /// let value: Value = vec![("a", 1)].into_iter().collect::<Mapping>().into();
    /// assert_eq!(value.to_string(), "a: 1\n");
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::decode;

    fn round_trip(text: &str) {
        let value = decode(text).unwrap();
        let rendered = render(&value);
        assert_eq!(decode(&rendered).unwrap(), value, "rendered as:\n{rendered}");
    }

    #[test]
    fn scalars() {
        let map: Mapping = vec![
            ("s", Value::from("plain words")),
            ("i", Value::from(-7)),
            ("f", Value::from(2.0)),
            ("b", Value::from(false)),
            ("n", Value::Null),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            render(&map.into()),
            "s: plain words\ni: -7\nf: 2.0\nb: false\nn: null\n"
        );
    }

    #[test]
    fn retypable_strings_are_protected() {
        let map: Mapping = vec![("a", "42"), ("b", "true"), ("c", "-5"), ("d", "")]
            .into_iter()
            .collect();
        let value = Value::from(map);
        assert_eq!(render(&value), "a: '42'\nb: 'true'\nc: |-\n  -5\nd: ''\n");
        assert_eq!(decode(render(&value)).unwrap(), value);
    }

    #[test]
    fn multi_line_strings() {
        let map: Mapping = vec![("kept", "one\ntwo\n"), ("stripped", "one\ntwo")]
            .into_iter()
            .collect();
        let value = Value::from(map);
        assert_eq!(
            render(&value),
            "kept: |\n  one\n  two\nstripped: |-\n  one\n  two\n"
        );
        assert_eq!(decode(render(&value)).unwrap(), value);
    }

    #[test]
    fn empty_containers() {
        round_trip("a: {}\nb: []\nc:\n  - []\n  - {}\n");
    }

    #[test]
    fn sequences_of_mappings() {
        let text = "list:\n  - a: 1\n    b:\n      - x\n    c: |\n      block\n  - d: 2\n";
        let value = decode(text).unwrap();
        assert_eq!(render(&value), text);
        round_trip(text);
    }

    #[test]
    fn nested_sequences() {
        let text = "root:\n  -\n    - a\n    - b\n  - c\n";
        assert_eq!(render(&decode(text).unwrap()), text);
        round_trip("- - a\n  - b\n");
    }

    #[test]
    fn everything_round_trips() {
        round_trip(include_str!("../tests/fixtures/everything.yaml"));
    }

    #[test]
    fn bare_scalars_render_alone() {
        assert_eq!(render(&Value::from(42)), "42\n");
        assert_eq!(render(&Value::Mapping(Mapping::new())), "{}\n");
    }
}
