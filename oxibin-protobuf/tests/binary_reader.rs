//! Binary wire format tests against hand-encoded messages.

use oxibin_protobuf::{DecodeLimits, FieldValue, OxiBinError, Reader, WireType};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;

fn varint(mut value: u64, out: &mut Vec<u8>) {
    while value >= 0x80 {
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

fn key(field: u32, wire_type: WireType, out: &mut Vec<u8>) {
    varint(u64::from((field << 3) | wire_type.as_u32()), out);
}

#[test]
fn test_varint_round_trips() {
    for value in [0u64, 1, 127, 128, 300, 16_383, 16_384, u64::from(u32::MAX)] {
        let mut data = Vec::new();
        varint(value, &mut data);
        assert_eq!(Reader::new(&data).uint32().unwrap() as u64, value);
        assert_eq!(Reader::new(&data).uint64().unwrap(), value);
    }
    for value in [1u64 << 32, 1 << 49, 1 << 63, u64::MAX] {
        let mut data = Vec::new();
        varint(value, &mut data);
        assert_eq!(Reader::new(&data).uint64().unwrap(), value);
    }
}

#[test]
fn test_zigzag_values() {
    for (encoded, expected) in [(0u64, 0i64), (1, -1), (2, 1), (3, -2), (4_294_967_294, 2_147_483_647)] {
        let mut data = Vec::new();
        varint(encoded, &mut data);
        assert_eq!(Reader::new(&data).sint64().unwrap(), expected);
        assert_eq!(Reader::new(&data).sint32().unwrap() as i64, expected);
    }
}

/// One field of each skippable wire type, each followed by a marker field.
#[test]
fn test_skip_type_lands_on_marker() {
    let payloads: [(WireType, Vec<u8>); 4] = [
        (WireType::Varint, vec![0xFF, 0xFF, 0x03]),
        (WireType::Fixed64, vec![1, 2, 3, 4, 5, 6, 7, 8]),
        (WireType::LengthDelimited, vec![3, b'a', b'b', b'c']),
        (WireType::Fixed32, vec![9, 9, 9, 9]),
    ];

    for (wire_type, payload) in payloads {
        let mut data = Vec::new();
        key(7, wire_type, &mut data);
        data.extend_from_slice(&payload);
        key(15, WireType::Varint, &mut data);
        data.push(0x2A);

        let mut reader = Reader::new(&data);
        let tag = reader.tag().unwrap();
        assert_eq!(tag.wire_type, wire_type);
        reader.skip_type(tag.wire_type).unwrap();

        let marker = reader.tag().unwrap();
        assert_eq!(marker.field_number, 15, "after skipping {wire_type}");
        assert_eq!(reader.uint32().unwrap(), 42);
        assert!(reader.is_at_end());
    }
}

#[test]
fn test_packed_floats_bit_exact() {
    let values = [1.5f32, -0.0, f32::from_bits(0x7FC0_0001)];
    let mut data = Vec::new();
    key(1, WireType::LengthDelimited, &mut data);
    data.push(12);
    for value in values {
        data.extend_from_slice(&value.to_le_bytes());
    }

    let mut reader = Reader::new(&data);
    let tag = reader.tag().unwrap();
    let mut out = Vec::new();
    reader.floats(tag.wire_type, &mut out).unwrap();

    let bits: Vec<u32> = out.iter().map(|v| v.to_bits()).collect();
    let expected: Vec<u32> = values.iter().map(|v| v.to_bits()).collect();
    assert_eq!(bits, expected);
}

#[test]
fn test_non_packed_doubles() {
    let mut data = Vec::new();
    for value in [0.25f64, 8.0] {
        key(2, WireType::Fixed64, &mut data);
        data.extend_from_slice(&value.to_le_bytes());
    }

    let mut reader = Reader::new(&data);
    let mut out = Vec::new();
    while !reader.is_at_end() {
        let tag = reader.tag().unwrap();
        reader.doubles(tag.wire_type, &mut out).unwrap();
    }
    assert_eq!(out, vec![0.25, 8.0]);
}

#[test]
fn test_non_packed_limit() {
    let mut data = Vec::new();
    for _ in 0..4 {
        key(2, WireType::Fixed32, &mut data);
        data.extend_from_slice(&1.0f32.to_le_bytes());
    }

    let limits = DecodeLimits::default().with_max_repeated_elements(3);
    let mut reader = Reader::with_limits(&data, limits);
    let mut out = Vec::new();
    let result = (0..4).try_for_each(|_| {
        let tag = reader.tag()?;
        reader.floats(tag.wire_type, &mut out)
    });
    assert!(matches!(
        result,
        Err(OxiBinError::LimitExceeded { limit: 3, .. })
    ));
    assert_eq!(out.len(), 3);
}

#[test]
fn test_map_field_into_btree() {
    // map<int32, string> labels = 4;
    let mut data = Vec::new();
    for (k, v) in [(2u64, "two"), (1, "one")] {
        let mut entry = Vec::new();
        key(1, WireType::Varint, &mut entry);
        varint(k, &mut entry);
        key(2, WireType::LengthDelimited, &mut entry);
        entry.push(v.len() as u8);
        entry.extend_from_slice(v.as_bytes());

        key(4, WireType::LengthDelimited, &mut data);
        entry.insert(0, entry.len() as u8);
        data.extend_from_slice(&entry);
    }

    let mut labels = BTreeMap::new();
    let mut reader = Reader::new(&data);
    while !reader.is_at_end() {
        reader.tag().unwrap();
        reader
            .entry(&mut labels, |r| r.int32(), |r| Ok(r.string()?.into_owned()))
            .unwrap();
    }
    assert_eq!(
        labels.into_iter().collect::<Vec<_>>(),
        vec![(1, "one".to_string()), (2, "two".to_string())]
    );
}

#[test]
fn test_field_walk_of_nested_message() {
    // 1: "node", 2: { 1: 7 }
    let data = [0x0A, 0x04, b'n', b'o', b'd', b'e', 0x12, 0x02, 0x08, 0x07];
    let mut reader = Reader::new(&data);
    let fields: Vec<_> = reader.fields().collect::<Result<_, _>>().unwrap();
    assert_eq!(fields.len(), 2);

    let FieldValue::LengthDelimited(inner) = fields[1].value else {
        panic!("expected a length-delimited field");
    };
    let mut inner = Reader::new(inner);
    let nested = inner.field().unwrap();
    assert_eq!(nested.tag.field_number, 1);
    assert_eq!(nested.value, FieldValue::Varint(7));
}

#[test]
fn test_truncated_inputs_fail() {
    let cases: [&[u8]; 4] = [
        &[0x08, 0x80],             // varint cut short
        &[0x0A, 0x05, b'a'],       // length past the end
        &[0x0D, 0x00, 0x00],       // fixed32 cut short
        &[0x0B, 0x08, 0x01],       // group without end
    ];
    for data in cases {
        let mut reader = Reader::new(data);
        let result = reader
            .tag()
            .and_then(|tag| reader.skip_type(tag.wire_type));
        assert!(
            matches!(result, Err(OxiBinError::OutOfRange { .. })),
            "{data:02x?} gave {result:?}"
        );
    }
}

#[test]
fn test_invalid_wire_types() {
    for raw in [0x0E, 0x0F] {
        assert!(matches!(
            Reader::new(&[raw]).tag(),
            Err(OxiBinError::InvalidWireType { .. })
        ));
    }
}
