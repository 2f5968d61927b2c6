//! Text format tests.

use oxibin_protobuf::{AnyValue, OxiBinError, TextReader};
use pretty_assertions::assert_eq;
use std::collections::HashMap;

#[test]
fn test_scalar_fields() {
    let mut reader = TextReader::new(r#"field: 1.5 other: "abc""#);
    assert_eq!(reader.tag().unwrap(), "field");
    assert_eq!(reader.float().unwrap(), 1.5);
    assert_eq!(reader.tag().unwrap(), "other");
    assert_eq!(reader.string().unwrap(), "abc");
    assert!(reader.end().unwrap());
}

#[test]
fn test_special_floats() {
    let mut reader = TextReader::new("x: nan\ny: -inf\nz: inf\nw: 2.5f");
    assert_eq!(reader.tag().unwrap(), "x");
    assert!(reader.float().unwrap().is_nan());
    assert_eq!(reader.tag().unwrap(), "y");
    assert_eq!(reader.float().unwrap(), f64::NEG_INFINITY);
    assert_eq!(reader.tag().unwrap(), "z");
    assert_eq!(reader.float().unwrap(), f64::INFINITY);
    assert_eq!(reader.tag().unwrap(), "w");
    assert_eq!(reader.float().unwrap(), 2.5);
}

#[test]
fn test_booleans_and_semicolons() {
    let mut reader = TextReader::new("a: true; b: False; c: 1 d: 0");
    let mut values = Vec::new();
    reader.start().unwrap();
    while !reader.end().unwrap() {
        reader.tag().unwrap();
        values.push(reader.boolean().unwrap());
    }
    assert_eq!(values, vec![true, false, true, false]);

    let mut reader = TextReader::new("a: yes");
    reader.tag().unwrap();
    assert!(matches!(
        reader.boolean(),
        Err(OxiBinError::TextSyntax { .. })
    ));
}

#[test]
fn test_bytes_escapes() {
    let mut reader = TextReader::new(r#"raw_data: "\x00\001\n'\"z""#);
    reader.tag().unwrap();
    assert_eq!(reader.bytes().unwrap(), vec![0x00, 0x01, b'\n', b'\'', b'"', b'z']);
}

#[test]
fn test_enum_lookup() {
    let names: HashMap<&str, i32> = [("FLOAT", 1), ("INT64", 7)].into_iter().collect();
    let mut reader = TextReader::new("data_type: INT64 elem_type: 3 bad: NOPE");
    let mut values = Vec::new();
    for _ in 0..2 {
        reader.tag().unwrap();
        values.push(reader.enum_value(|name| names.get(name).copied()).unwrap());
    }
    assert_eq!(values, vec![7, 3]);

    reader.tag().unwrap();
    let err = reader
        .enum_value(|name| names.get(name).copied())
        .unwrap_err();
    assert_eq!(err.to_string(), "Couldn't parse enum 'NOPE' at 1:40");
}

#[test]
fn test_arrays() {
    let mut reader = TextReader::new("dims: [1, 2, 3] dims: 4 names: []");
    let mut dims: Vec<i64> = Vec::new();
    let mut names: Vec<String> = Vec::new();
    reader.start().unwrap();
    while !reader.end().unwrap() {
        match reader.tag().unwrap() {
            "dims" => reader.array(&mut dims, |r| r.integer()).unwrap(),
            "names" => reader
                .array(&mut names, |r| Ok(r.string()?.to_string()))
                .unwrap(),
            other => panic!("unexpected field {other}"),
        }
    }
    assert_eq!(dims, vec![1, 2, 3, 4]);
    assert!(names.is_empty());
}

#[test]
fn test_array_missing_comma() {
    let mut reader = TextReader::new("dims: [1 2]");
    let mut dims: Vec<i32> = Vec::new();
    reader.tag().unwrap();
    let err = reader.array(&mut dims, |r| r.integer()).unwrap_err();
    assert_eq!(err.to_string(), "Unexpected token '2' at 1:10");
}

#[test]
fn test_nested_messages_and_map_entries() {
    let text = r#"
        # A graph with one node.
        node {
          name: "relu"
          attribute { key: "alpha" value: 0.1 }
          attribute { key: "beta" value: 2 }
        }
    "#;
    let mut reader = TextReader::new(text);
    let mut name = "";
    let mut attributes: HashMap<String, f64> = HashMap::new();

    reader.start().unwrap();
    while !reader.end().unwrap() {
        assert_eq!(reader.tag().unwrap(), "node");
        reader.start().unwrap();
        while !reader.end().unwrap() {
            match reader.tag().unwrap() {
                "name" => name = reader.string().unwrap(),
                "attribute" => reader
                    .entry(
                        &mut attributes,
                        |r| Ok(r.string()?.to_string()),
                        |r| r.float(),
                    )
                    .unwrap(),
                other => panic!("{}", reader.unknown_field(other)),
            }
        }
    }

    assert_eq!(name, "relu");
    assert_eq!(attributes.len(), 2);
    assert_eq!(attributes["alpha"], 0.1);
    assert_eq!(attributes["beta"], 2.0);
    assert_eq!(reader.depth(), 1);
}

#[test]
fn test_skip_captures_raw_source() {
    let text = "a: 12 b { c: [1, 2] d { e: 'x' } } f: [{ g: 1 }, { g: 2 }] h: \"s\"";
    let mut reader = TextReader::new(text);
    let mut captured = Vec::new();
    while !reader.end().unwrap() {
        let name = reader.tag().unwrap();
        captured.push((name, reader.skip().unwrap()));
    }
    assert_eq!(
        captured,
        vec![
            ("a", "12"),
            ("b", "{ c: [1, 2] d { e: 'x' } }"),
            ("f", "[{ g: 1 }, { g: 2 }]"),
            ("h", "\"s\""),
        ]
    );
}

#[test]
fn test_skip_unterminated_message() {
    let mut reader = TextReader::new("b { c: 1");
    reader.tag().unwrap();
    assert!(matches!(
        reader.skip(),
        Err(OxiBinError::TextSyntax { line: 1, .. })
    ));
}

#[test]
fn test_expanded_any() {
    let text = "value {\n  [type.googleapis.com/pkg.Shape] { dim: 3 }\n}\nnext: 1";
    let mut reader = TextReader::new(text);
    reader.start().unwrap();
    assert_eq!(reader.tag().unwrap(), "value");
    reader.start().unwrap();
    let any = reader.any().unwrap();
    assert_eq!(
        any,
        Some(AnyValue {
            type_url: "type.googleapis.com/pkg.Shape",
            value: " dim: 3 ",
        })
    );
    assert_eq!(reader.depth(), 1);
    assert_eq!(reader.tag().unwrap(), "next");
    assert_eq!(reader.integer::<u32>().unwrap(), 1);
}

#[test]
fn test_any_not_expanded() {
    let mut reader = TextReader::new("value { type_url: \"x\" }");
    reader.start().unwrap();
    reader.tag().unwrap();
    reader.start().unwrap();
    assert_eq!(reader.any().unwrap(), None);
    assert_eq!(reader.tag().unwrap(), "type_url");
}

#[test]
fn test_errors_carry_location() {
    let mut reader = TextReader::new("a: 1\nb: \"x\"\nc 5");
    for _ in 0..2 {
        reader.tag().unwrap();
        reader.skip().unwrap();
    }
    let err = reader.tag().unwrap_err();
    assert!(matches!(
        err,
        OxiBinError::TextSyntax {
            line: 3,
            column: 3,
            ..
        }
    ));
    assert_eq!(reader.location().line, 3);
}

#[test]
fn test_unexpected_character() {
    let mut reader = TextReader::new("a: @");
    reader.tag().unwrap();
    let err = reader.skip().unwrap_err();
    assert_eq!(err.to_string(), "Unexpected token '@' at 1:4");
}
