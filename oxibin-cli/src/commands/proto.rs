//! Proto command implementation.
//!
//! Binary input is walked without a schema: every length-delimited payload
//! is tried as a nested message, then as text, and falls back to a hex
//! preview. Text-format input is split into its top-level fields.

use crate::utils::load_input;
use oxibin_protobuf::{FieldValue, LongBits, OxiBinError, RawField, Reader, TextReader};
use serde::Serialize;
use std::path::Path;

/// Bytes shown before a payload preview is cut off.
const PREVIEW_LEN: usize = 32;

/// Options for dumping a protobuf message.
pub struct ProtoOptions {
    pub text: bool,
    pub json: bool,
    pub max_depth: usize,
}

/// How the input is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DumpMode {
    Binary { max_depth: usize },
    Text,
}

/// Decoding choices, fixed once per invocation.
#[derive(Debug, Clone, Copy)]
struct DumpContext {
    mode: DumpMode,
    json: bool,
}

impl DumpContext {
    fn new(options: &ProtoOptions) -> Self {
        let mode = if options.text {
            DumpMode::Text
        } else {
            DumpMode::Binary {
                max_depth: options.max_depth,
            }
        };
        Self {
            mode,
            json: options.json,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
struct FieldNode {
    field: u32,
    wire_type: &'static str,
    offset: usize,
    value: NodeValue,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
enum NodeValue {
    Varint { unsigned: u64, zigzag: i64 },
    Fixed64 { bits: u64, double: f64 },
    Fixed32 { bits: u32, float: f32 },
    Message(Vec<FieldNode>),
    Group(Vec<FieldNode>),
    String(String),
    Bytes { length: usize, preview: String },
}

#[derive(Debug, Serialize, PartialEq)]
struct TextField<'a> {
    name: &'a str,
    value: &'a str,
}

pub fn cmd_proto(file: &Path, options: &ProtoOptions) -> Result<(), Box<dyn std::error::Error>> {
    let data = load_input(file)?;
    let context = DumpContext::new(options);
    tracing::info!(file = %file.display(), bytes = data.len(), mode = ?context.mode, "dumping message");

    match context.mode {
        DumpMode::Binary { max_depth } => {
            let nodes = decode_message(&data, 0, max_depth)?;
            if context.json {
                println!("{}", serde_json::to_string_pretty(&nodes)?);
            } else {
                print_nodes(&nodes, 0);
            }
        }
        DumpMode::Text => {
            let fields = split_text(&data)?;
            if context.json {
                println!("{}", serde_json::to_string_pretty(&fields)?);
            } else {
                for field in &fields {
                    println!("{}: {}", field.name, field.value);
                }
            }
        }
    }
    Ok(())
}

fn decode_message(
    data: &[u8],
    depth: usize,
    max_depth: usize,
) -> Result<Vec<FieldNode>, OxiBinError> {
    let mut reader = Reader::new(data);
    reader
        .fields()
        .map(|field| field.map(|field| to_node(field, depth, max_depth)))
        .collect()
}

fn to_node(field: RawField<'_>, depth: usize, max_depth: usize) -> FieldNode {
    let value = match field.value {
        FieldValue::Varint(bits) => NodeValue::Varint {
            unsigned: bits,
            zigzag: LongBits::from_u64(bits).zz_decode().to_i64(),
        },
        FieldValue::Fixed64(bits) => NodeValue::Fixed64 {
            bits,
            double: f64::from_bits(bits),
        },
        FieldValue::Fixed32(bits) => NodeValue::Fixed32 {
            bits,
            float: f32::from_bits(bits),
        },
        FieldValue::LengthDelimited(payload) => interpret_payload(payload, depth, max_depth),
        FieldValue::Group(body) => match nested(body, depth, max_depth) {
            Some(nodes) => NodeValue::Group(nodes),
            None => bytes_preview(body),
        },
    };
    FieldNode {
        field: field.tag.field_number,
        wire_type: field.tag.wire_type.name(),
        offset: field.offset,
        value,
    }
}

fn interpret_payload(payload: &[u8], depth: usize, max_depth: usize) -> NodeValue {
    if !payload.is_empty() {
        if let Some(nodes) = nested(payload, depth, max_depth) {
            return NodeValue::Message(nodes);
        }
    }
    match std::str::from_utf8(payload) {
        Ok(text) if text.chars().all(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t')) => {
            NodeValue::String(text.to_string())
        }
        _ => bytes_preview(payload),
    }
}

fn nested(body: &[u8], depth: usize, max_depth: usize) -> Option<Vec<FieldNode>> {
    if depth >= max_depth {
        return None;
    }
    decode_message(body, depth + 1, max_depth).ok()
}

fn bytes_preview(payload: &[u8]) -> NodeValue {
    let mut preview: String = payload
        .iter()
        .take(PREVIEW_LEN)
        .map(|b| format!("{b:02x}"))
        .collect();
    if payload.len() > PREVIEW_LEN {
        preview.push_str("...");
    }
    NodeValue::Bytes {
        length: payload.len(),
        preview,
    }
}

fn print_nodes(nodes: &[FieldNode], indent: usize) {
    let pad = "  ".repeat(indent);
    for node in nodes {
        match &node.value {
            NodeValue::Varint { unsigned, zigzag } => {
                println!("{pad}{}: {unsigned} (varint, zigzag {zigzag})", node.field);
            }
            NodeValue::Fixed64 { bits, double } => {
                println!("{pad}{}: 0x{bits:016x} (fixed64, double {double})", node.field);
            }
            NodeValue::Fixed32 { bits, float } => {
                println!("{pad}{}: 0x{bits:08x} (fixed32, float {float})", node.field);
            }
            NodeValue::Message(children) | NodeValue::Group(children) => {
                println!("{pad}{} {{", node.field);
                print_nodes(children, indent + 1);
                println!("{pad}}}");
            }
            NodeValue::String(text) => println!("{pad}{}: {text:?}", node.field),
            NodeValue::Bytes { length, preview } => {
                println!("{pad}{}: <{length} bytes> {preview}", node.field);
            }
        }
    }
}

fn split_text(data: &[u8]) -> Result<Vec<TextField<'_>>, OxiBinError> {
    let mut reader = TextReader::from_bytes(data)?;
    reader.start()?;
    let mut fields = Vec::new();
    while !reader.end()? {
        let name = reader.tag()?;
        let value = reader.skip()?;
        reader.match_token(",")?;
        fields.push(TextField { name, value });
    }
    Ok(fields)
}
