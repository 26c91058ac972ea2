//! Byte encoding of records: the outline file and the clipboard payload.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::record::Record;

/// Parses JSON without the default nesting limit; deep human-written
/// outlines must load. The stacker grows the stack on the heap while
/// serde_json descends.
fn parse(bytes: &[u8]) -> DomainResult<Value> {
    let mut json = serde_json::Deserializer::from_slice(bytes);
    json.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut json))?;
    json.end()?;
    Ok(value)
}

/// Drops a parsed value with an explicit stack; the derived drop of a
/// deeply nested `Value` recurses.
fn release(value: Value) {
    let mut stack = vec![value];
    while let Some(value) = stack.pop() {
        match value {
            Value::Array(items) => stack.extend(items),
            Value::Object(map) => stack.extend(map.into_iter().map(|(_, v)| v)),
            _ => {}
        }
    }
}

/// Decodes an outline file: a top-level array of records.
pub fn decode_records(bytes: &[u8]) -> DomainResult<Vec<Record>> {
    let value = parse(bytes)?;
    let records = Record::many_from_value(&value);
    release(value);
    records
}

/// Decodes a clipboard payload: an array of records or a single record.
pub fn decode_payload(text: &str) -> DomainResult<Vec<Record>> {
    let value = parse(text.as_bytes())?;
    let records = match value {
        Value::Array(_) => Record::many_from_value(&value),
        Value::Object(_) => Record::from_value(&value).map(|r| vec![r]),
        _ => Err(DomainError::shape(
            "clipboard payload is neither a record nor a list of records",
        )),
    };
    release(value);
    records
}

/// Compact encoding, no inserted whitespace. Deterministic for equal input.
pub fn encode_records(records: &[Record]) -> DomainResult<Vec<u8>> {
    let mut out = Vec::new();
    write_records(&mut out, records)?;
    Ok(out)
}

pub fn encode_payload(records: &[Record]) -> DomainResult<String> {
    let bytes = encode_records(records)?;
    // serde_json escapes and ASCII punctuation only; always valid UTF-8
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Writes `[{"t":..,"s":[..]},..]` walking the records with an explicit
/// stack. Leaves omit `s`.
fn write_records(out: &mut Vec<u8>, records: &[Record]) -> DomainResult<()> {
    struct Frame<'a> {
        pending: std::slice::Iter<'a, Record>,
        first: bool,
    }

    out.push(b'[');
    let mut stack = vec![Frame {
        pending: records.iter(),
        first: true,
    }];

    while let Some(frame) = stack.last_mut() {
        let Some(record) = frame.pending.next() else {
            stack.pop();
            out.push(b']');
            if !stack.is_empty() {
                out.push(b'}');
            }
            continue;
        };
        if !std::mem::replace(&mut frame.first, false) {
            out.push(b',');
        }
        out.extend_from_slice(br#"{"t":"#);
        serde_json::to_writer(&mut *out, record.text.as_str())?;
        if record.children.is_empty() {
            out.push(b'}');
        } else {
            out.extend_from_slice(br#","s":["#);
            stack.push(Frame {
                pending: record.children.iter(),
                first: true,
            });
        }
    }
    Ok(())
}
