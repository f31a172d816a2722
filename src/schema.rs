//! Field rules for a single `[[class_<N>]]` record.
//!
//! The loader first parses the whole file into an untyped [`toml::Table`];
//! the functions here then check one record at a time and turn it into a
//! typed `(name, ClassEntry)` pair.

use std::path::Path;

use toml::{Table, Value};

use crate::colormap::{ClassEntry, Rgb};
use crate::error::{ColormapError, Result};

pub const NAME_FIELD: &str = "Classes";
pub const RED_FIELD: &str = "R";
pub const GREEN_FIELD: &str = "G";
pub const BLUE_FIELD: &str = "B";
pub const ID_FIELD: &str = "Id";

/// Checked in this order; the first absent one is reported.
pub const REQUIRED_FIELDS: [&str; 5] = [NAME_FIELD, RED_FIELD, GREEN_FIELD, BLUE_FIELD, ID_FIELD];

const CHANNEL_EXPECTED: &str = "an integer (R, G and B must all be integer-valued)";

/// Where a record lives, for error messages.
#[derive(Debug, Clone, Copy)]
pub struct RecordContext<'a> {
    pub path: &'a Path,
    pub section: &'a str,
    pub index: usize,
}

impl RecordContext<'_> {
    fn invalid_type(
        &self,
        field: &str,
        expected: &'static str,
        actual: &Value,
        record: &Value,
    ) -> ColormapError {
        ColormapError::InvalidType {
            path: self.path.to_path_buf(),
            section: self.section.to_string(),
            index: self.index,
            field: field.to_string(),
            expected,
            actual: actual.type_str().to_string(),
            record: record.to_string(),
        }
    }
}

/// Validates one element of a section and converts it.
pub fn validate_record(ctx: RecordContext<'_>, value: &Value) -> Result<(String, ClassEntry)> {
    let Value::Table(record) = value else {
        return Err(ctx.invalid_type("entry", "a table", value, value));
    };

    require_fields(ctx, record)?;

    let name = match &record[NAME_FIELD] {
        Value::String(name) => name.clone(),
        other => return Err(ctx.invalid_type(NAME_FIELD, "a string", other, value)),
    };

    let mut channels = [0i64; 3];
    for (slot, field) in channels.iter_mut().zip([RED_FIELD, GREEN_FIELD, BLUE_FIELD]) {
        let raw = &record[field];
        *slot = coerce_channel(raw)
            .ok_or_else(|| ctx.invalid_type(field, CHANNEL_EXPECTED, raw, value))?;
    }

    let id = match &record[ID_FIELD] {
        Value::Integer(id) => *id,
        other => return Err(ctx.invalid_type(ID_FIELD, "an integer", other, value)),
    };

    let [r, g, b] = channels;
    Ok((name, ClassEntry::new(Rgb(r, g, b), id)))
}

fn require_fields(ctx: RecordContext<'_>, record: &Table) -> Result<()> {
    match REQUIRED_FIELDS.iter().find(|field| !record.contains_key(**field)) {
        Some(&field) => Err(ColormapError::MissingField {
            path: ctx.path.to_path_buf(),
            section: ctx.section.to_string(),
            index: ctx.index,
            field,
            record: Value::Table(record.clone()).to_string(),
        }),
        None => Ok(()),
    }
}

/// Integer conversion for color channels.
///
/// Integers pass through, finite floats truncate toward zero, booleans become
/// 0/1 and strings are parsed after trimming (`_` digit separators allowed).
/// Everything else is rejected.
pub fn coerce_channel(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(v) => Some(*v),
        Value::Float(v) => {
            let t = v.trunc();
            // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound
            (t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64).then_some(t as i64)
        }
        Value::Boolean(v) => Some(i64::from(*v)),
        Value::String(s) => parse_integer_text(s.trim()),
        Value::Datetime(_) | Value::Array(_) | Value::Table(_) => None,
    }
}

/// Signed base-10 integer, allowing single `_` separators between digits
/// (`"1_000"`) the same way integer literals do.
fn parse_integer_text(text: &str) -> Option<i64> {
    if !text.contains('_') {
        return text.parse().ok();
    }
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    let well_placed = !digits.starts_with('_') && !digits.ends_with('_') && !digits.contains("__");
    if !well_placed {
        return None;
    }
    text.replace('_', "").parse().ok()
}
