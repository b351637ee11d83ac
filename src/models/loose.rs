//! Request values in the loose forms browsers and scripts send: numbers as
//! strings, flags as `1`/`on`, blank strings for "nothing".

use serde::Deserialize;

use crate::error::FieldErrors;

/// Outcome of reading a loose value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed<T> {
    /// Blank text
    Missing,
    Value(T),
    /// Present but not of the expected type
    Invalid,
}

/// Integer sent as a JSON number or as text
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LooseInt {
    Int(i64),
    Text(String),
}

impl LooseInt {
    pub fn parse(&self) -> Parsed<i64> {
        match self {
            LooseInt::Int(v) => Parsed::Value(*v),
            LooseInt::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Parsed::Missing;
                }
                text.parse().map(Parsed::Value).unwrap_or(Parsed::Invalid)
            }
        }
    }
}

/// Boolean sent as a JSON bool, a number or text
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LooseFlag {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl LooseFlag {
    pub fn parse(&self) -> Parsed<bool> {
        match self {
            LooseFlag::Bool(b) => Parsed::Value(*b),
            LooseFlag::Int(i) => Parsed::Value(*i != 0),
            LooseFlag::Text(text) if text.trim().is_empty() => Parsed::Missing,
            LooseFlag::Text(text) => parse_flag(text).map(Parsed::Value).unwrap_or(Parsed::Invalid),
        }
    }
}

/// Accepts `true`/`false`, `1`/`0`, `on`/`off` and `yes`/`no`
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

fn record<T>(parsed: Parsed<T>, field: &str, message: &str, errors: &mut FieldErrors) -> Option<T> {
    match parsed {
        Parsed::Value(v) => Some(v),
        Parsed::Missing => None,
        Parsed::Invalid => {
            errors.add(field, message);
            None
        }
    }
}

/// Read an optional integer, recording `message` under `field` when it is not one
pub fn int_field(value: Option<LooseInt>, field: &str, message: &str, errors: &mut FieldErrors) -> Option<i64> {
    value.and_then(|v| record(v.parse(), field, message, errors))
}

pub fn flag_field(value: Option<LooseFlag>, field: &str, message: &str, errors: &mut FieldErrors) -> Option<bool> {
    value.and_then(|v| record(v.parse(), field, message, errors))
}

/// Blank entries are dropped; the message is recorded once however many entries are bad
pub fn int_list_field(
    values: Option<Vec<LooseInt>>,
    field: &str,
    message: &str,
    errors: &mut FieldErrors,
) -> Option<Vec<i64>> {
    let values = values?;
    let mut ids = Vec::with_capacity(values.len());
    let mut invalid = false;

    for value in values {
        match value.parse() {
            Parsed::Value(id) => ids.push(id),
            Parsed::Missing => {}
            Parsed::Invalid => invalid = true,
        }
    }

    if invalid {
        errors.add(field, message);
    }
    Some(ids)
}
