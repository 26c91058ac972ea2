//! Record: the persisted and clipboard shape of an item.
//!
//! Written as `{"t": text, "s": [children]}` with `s` omitted for leaves.
//! Read with an explicit two-key lookup so files from the older
//! `{"text": .., "subitems": [..]}` shape still load.

use serde_json::{Map, Value};

use crate::domain::error::{DomainError, DomainResult};

pub const TEXT_KEY: &str = "t";
pub const LEGACY_TEXT_KEY: &str = "text";
pub const CHILDREN_KEY: &str = "s";
pub const LEGACY_CHILDREN_KEY: &str = "subitems";

/// Disconnected value copy of an item and its subtree.
///
/// Clone, equality and drop walk the subtree with explicit stacks.
#[derive(Debug, Default)]
pub struct Record {
    pub text: String,
    pub children: Vec<Record>,
}

impl Clone for Record {
    fn clone(&self) -> Self {
        struct Frame<'a> {
            text: String,
            pending: std::slice::Iter<'a, Record>,
            built: Vec<Record>,
        }
        impl<'a> Frame<'a> {
            fn of(record: &'a Record) -> Self {
                Frame {
                    text: record.text.clone(),
                    pending: record.children.iter(),
                    built: Vec::with_capacity(record.children.len()),
                }
            }
        }

        let mut stack = vec![Frame::of(self)];
        while let Some(frame) = stack.last_mut() {
            if let Some(child) = frame.pending.next() {
                stack.push(Frame::of(child));
                continue;
            }
            let Some(done) = stack.pop() else { break };
            let record = Record {
                text: done.text,
                children: done.built,
            };
            match stack.last_mut() {
                Some(parent) => parent.built.push(record),
                None => return record,
            }
        }
        Record::default()
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((a, b)) = stack.pop() {
            if a.text != b.text || a.children.len() != b.children.len() {
                return false;
            }
            stack.extend(a.children.iter().zip(b.children.iter()));
        }
        true
    }
}

impl Eq for Record {}

impl Drop for Record {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut record) = pending.pop() {
            pending.append(&mut record.children);
        }
    }
}

impl Record {
    pub fn leaf(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(text: impl Into<String>, children: Vec<Record>) -> Self {
        Self {
            text: text.into(),
            children,
        }
    }

    /// Number of records in this subtree, self included.
    pub fn count(&self) -> usize {
        let mut total = 0;
        let mut stack = vec![self];
        while let Some(record) = stack.pop() {
            total += 1;
            stack.extend(record.children.iter());
        }
        total
    }

    /// Decodes one record-like JSON object.
    ///
    /// Iterative, so nesting depth is limited by memory only.
    pub fn from_value(value: &Value) -> DomainResult<Record> {
        struct Frame<'a> {
            text: String,
            pending: std::slice::Iter<'a, Value>,
            built: Vec<Record>,
        }

        let (text, children) = split_object(value)?;
        let mut stack = vec![Frame {
            text,
            pending: children.iter(),
            built: Vec::new(),
        }];

        loop {
            let next = match stack.last_mut() {
                Some(top) => top.pending.next(),
                None => return Err(DomainError::shape("empty record stack")),
            };
            if let Some(child) = next {
                let (text, children) = split_object(child)?;
                stack.push(Frame {
                    text,
                    pending: children.iter(),
                    built: Vec::new(),
                });
                continue;
            }
            let Some(done) = stack.pop() else {
                return Err(DomainError::shape("empty record stack"));
            };
            let record = Record {
                text: done.text,
                children: done.built,
            };
            match stack.last_mut() {
                Some(parent) => parent.built.push(record),
                None => return Ok(record),
            }
        }
    }

    /// Decodes a top-level array of records.
    pub fn many_from_value(value: &Value) -> DomainResult<Vec<Record>> {
        let items = value.as_array().ok_or_else(|| {
            DomainError::shape(format!("expected an array of records, found {}", kind(value)))
        })?;
        items.iter().map(Record::from_value).collect()
    }
}

/// Text and child values of one object, legacy keys resolved.
fn split_object(value: &Value) -> DomainResult<(String, &[Value])> {
    let object = value.as_object().ok_or_else(|| {
        DomainError::shape(format!("expected a record object, found {}", kind(value)))
    })?;

    let text = match lookup(object, TEXT_KEY, LEGACY_TEXT_KEY) {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            return Err(DomainError::shape(format!(
                "record text must be a string, found {}",
                kind(other)
            )))
        }
    };

    let children: &[Value] = match lookup(object, CHILDREN_KEY, LEGACY_CHILDREN_KEY) {
        None => &[],
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(DomainError::shape(format!(
                "record children must be an array, found {}",
                kind(other)
            )))
        }
    };

    Ok((text, children))
}

/// Short key first, legacy key second. `null` counts as absent.
fn lookup<'a>(object: &'a Map<String, Value>, key: &str, legacy: &str) -> Option<&'a Value> {
    object
        .get(key)
        .filter(|v| !v.is_null())
        .or_else(|| object.get(legacy).filter(|v| !v.is_null()))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
