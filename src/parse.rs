//! Parsing of rustdoc `sidebar-items.js` files.
//!
//! Three envelopes are understood:
//! - `initSidebarItems({...});` written by older rustdoc, with `[name, desc]` pairs
//! - `window.SIDEBAR_ITEMS = {...};` written by current rustdoc, with bare names
//! - a bare JSON object

use crate::model::{Category, SidebarEntry, SidebarItems, UnknownCategory};
use serde_json::Value;

const LEGACY_CALL: &str = "initSidebarItems(";
const WINDOW_ASSIGN: &str = "window.SIDEBAR_ITEMS";

/// Error returned when a sidebar file cannot be understood.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("sidebar file is empty")]
    Empty,
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON object mapping categories to entries")]
    NotAnObject,
    #[error(transparent)]
    UnknownCategory(#[from] UnknownCategory),
    #[error("category '{category}' does not map to an array")]
    CategoryNotArray { category: Category },
    #[error("malformed entry #{index} in category '{category}': {found}")]
    MalformedEntry {
        category: Category,
        index: usize,
        found: String,
    },
    #[error("expected '{expected}' at byte {offset}")]
    Expected { expected: &'static str, offset: usize },
    #[error("unexpected trailing input at byte {offset}")]
    TrailingInput { offset: usize },
}

/// Parse a single sidebar file in any supported envelope.
pub fn parse_sidebar_items(source: &str) -> Result<SidebarItems, ParseError> {
    let mut cursor = Cursor::new(source);
    cursor.skip_ws();
    if cursor.at_end() {
        return Err(ParseError::Empty);
    }

    let payload = if cursor.eat(LEGACY_CALL) {
        cursor.legacy_call_body()?
    } else if cursor.eat(WINDOW_ASSIGN) {
        cursor.skip_ws();
        cursor.expect("=")?;
        let value = cursor.json_value()?;
        cursor.skip_ws();
        cursor.eat(";");
        value
    } else {
        cursor.json_value()?
    };

    cursor.skip_ws();
    if !cursor.at_end() {
        return Err(ParseError::TrailingInput {
            offset: cursor.offset,
        });
    }

    items_from_value(payload)
}

/// Parse a file made of one or more concatenated `initSidebarItems(...)` calls.
///
/// Returns one table per call, in source order.
pub fn parse_sidebar_items_multi(source: &str) -> Result<Vec<SidebarItems>, ParseError> {
    let mut cursor = Cursor::new(source);
    let mut tables = Vec::new();

    loop {
        cursor.skip_ws();
        if cursor.at_end() {
            break;
        }
        cursor.expect(LEGACY_CALL)?;
        let payload = cursor.legacy_call_body()?;
        tables.push(items_from_value(payload)?);
    }

    if tables.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(tables)
}

/// Convert a decoded JSON object into a sidebar table.
pub fn items_from_value(value: Value) -> Result<SidebarItems, ParseError> {
    let Value::Object(map) = value else {
        return Err(ParseError::NotAnObject);
    };

    let mut items = SidebarItems::new();
    for (key, entries) in map {
        let category: Category = key.parse()?;
        let Value::Array(entries) = entries else {
            return Err(ParseError::CategoryNotArray { category });
        };

        let section = items.ensure_category(category);
        for (index, raw) in entries.into_iter().enumerate() {
            section.push(entry_from_value(category, index, raw)?);
        }
    }

    Ok(items)
}

fn entry_from_value(category: Category, index: usize, raw: Value) -> Result<SidebarEntry, ParseError> {
    let malformed = |found: &Value| ParseError::MalformedEntry {
        category,
        index,
        found: found.to_string(),
    };

    match raw {
        Value::String(name) => Ok(SidebarEntry::new(name, String::new())),
        Value::Array(ref parts) => match parts.as_slice() {
            [Value::String(name)] => Ok(SidebarEntry::new(name.clone(), String::new())),
            [Value::String(name), Value::String(desc)] => {
                Ok(SidebarEntry::new(name.clone(), desc.clone()))
            }
            [Value::String(name), Value::Null] => {
                Ok(SidebarEntry::new(name.clone(), String::new()))
            }
            _ => Err(malformed(&raw)),
        },
        other => Err(malformed(&other)),
    }
}

/// Byte cursor over the JavaScript envelope.
struct Cursor<'a> {
    source: &'a str,
    offset: usize,
}

impl<'a> Cursor<'a> {
    const fn new(source: &'a str) -> Self {
        Self { source, offset: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.offset..]
    }

    fn at_end(&self) -> bool {
        self.offset >= self.source.len()
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.offset += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.offset += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &'static str) -> Result<(), ParseError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(ParseError::Expected {
                expected: token,
                offset: self.offset,
            })
        }
    }

    /// Decode exactly one JSON value starting at the cursor.
    fn json_value(&mut self) -> Result<Value, ParseError> {
        self.skip_ws();
        let mut stream = serde_json::Deserializer::from_str(self.rest()).into_iter::<Value>();
        let value = match stream.next() {
            Some(value) => value?,
            None => return Err(ParseError::Empty),
        };
        self.offset += stream.byte_offset();
        Ok(value)
    }

    /// The remainder of `initSidebarItems(` up to and including `)` and an optional `;`.
    fn legacy_call_body(&mut self) -> Result<Value, ParseError> {
        let value = self.json_value()?;
        self.skip_ws();
        self.expect(")")?;
        self.skip_ws();
        self.eat(";");
        Ok(value)
    }
}
