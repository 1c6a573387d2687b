// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration document type.
//!
//! A [`Document`] is a schema-less JSON object keyed at the top level by
//! arbitrary strings. Values are ordinary [`serde_json::Value`] trees, so a
//! document can hold nulls, booleans, numbers, strings, ordered sequences and
//! ordered mappings at any depth.

use crate::domain::errors::{ConfigError, Result};
use crate::domain::merge;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Reserved key holding a template's merge weight.
pub const WEIGHT_KEY: &str = "hstoday.weight";

/// Separator between segments of a key path.
pub const KEY_PATH_SEPARATOR: char = '/';

/// A configuration document: a JSON object with arbitrary nesting.
///
/// # Examples
///
/// ```
/// use hsconfig::domain::Document;
///
/// let mut doc = Document::from_json_str(r#"{"theme": "custom"}"#).unwrap();
/// let defaults = Document::from_json_str(r#"{"theme": "dark", "brand": "x"}"#).unwrap();
///
/// doc.fill_missing_from(&defaults);
/// assert_eq!(doc.to_json_string().unwrap(), r#"{"theme":"custom","brand":"x"}"#);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Document(Map::new())
    }

    /// Parses a document from JSON text. The text must hold a JSON object.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| ConfigError::from_json_error("Failed to parse document as JSON", e))?;
        Self::from_value(value)
    }

    /// Converts a JSON value into a document. Only objects are accepted.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Document(map)),
            other => Err(ConfigError::InvalidDocument {
                message: format!("expected a JSON object, found {}", kind_of(&other)),
                source: None,
            }),
        }
    }

    /// Serializes the document as compact JSON text.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(&self.0)
            .map_err(|e| ConfigError::from_json_error("Failed to serialize document", e))
    }

    /// Returns the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the document and returns the underlying map.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Returns the value stored under a top-level key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Stores a value under a top-level key, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Removes a top-level key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Returns `true` if the document has no keys.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of top-level keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the merge weight stored under [`WEIGHT_KEY`].
    ///
    /// Absent or non-numeric weights count as `0`.
    pub fn weight(&self) -> f64 {
        self.0.get(WEIGHT_KEY).and_then(Value::as_f64).unwrap_or(0.0)
    }

    /// Returns `true` if a weight key is present but does not hold a number.
    pub fn has_invalid_weight(&self) -> bool {
        self.0.get(WEIGHT_KEY).is_some_and(|v| !v.is_number())
    }

    /// Returns this document with the reserved weight key removed.
    pub fn without_weight(mut self) -> Self {
        self.0.remove(WEIGHT_KEY);
        self
    }

    /// Fills every key this document lacks from `defaults`, recursively.
    ///
    /// Keys already present here always win.
    pub fn fill_missing_from(&mut self, defaults: &Document) {
        for (key, default_value) in &defaults.0 {
            match self.0.get_mut(key) {
                Some(existing) => merge::fill_missing(existing, default_value),
                None => {
                    self.0.insert(key.clone(), default_value.clone());
                }
            }
        }
    }

    /// Overlays `patch` onto this document; values in the patch win.
    pub fn overwrite_from(&mut self, patch: &Document) {
        let mut target = Value::Object(std::mem::take(&mut self.0));
        merge::overwrite(&mut target, &Value::Object(patch.0.clone()));
        if let Value::Object(map) = target {
            self.0 = map;
        }
    }

    /// Looks up a `/`-separated key path.
    ///
    /// An empty path addresses the whole document. A `null` target counts as
    /// missing.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::NotAnObject`] if a segment is applied to a non-object
    /// * [`ConfigError::KeyPathNotFound`] if the target is missing or `null`
    pub fn lookup_path(&self, key_path: &str) -> Result<Value> {
        if key_path.is_empty() {
            return Ok(Value::Object(self.0.clone()));
        }

        let mut current: Option<&Value> = None;
        let mut walked = String::new();
        for segment in key_path.split(KEY_PATH_SEPARATOR) {
            let map = match current {
                None => &self.0,
                Some(Value::Object(map)) => map,
                Some(_) => {
                    return Err(ConfigError::NotAnObject { path: walked });
                }
            };

            match map.get(segment) {
                Some(Value::Null) | None => {
                    return Err(ConfigError::KeyPathNotFound {
                        path: key_path.to_string(),
                    });
                }
                Some(value) => current = Some(value),
            }

            if !walked.is_empty() {
                walked.push(KEY_PATH_SEPARATOR);
            }
            walked.push_str(segment);
        }

        current.cloned().ok_or_else(|| ConfigError::KeyPathNotFound {
            path: key_path.to_string(),
        })
    }

    /// Builds a document holding `value` at the nested location `key_path`.
    ///
    /// `"a/b/c"` with value `1` becomes `{"a": {"b": {"c": 1}}}`. An empty path
    /// requires `value` to be an object and returns it as the document.
    pub fn from_key_path(key_path: &str, value: Value) -> Result<Self> {
        if key_path.is_empty() {
            return match value {
                Value::Object(map) => Ok(Document(map)),
                _ => Err(ConfigError::NotAnObject {
                    path: String::new(),
                }),
            };
        }

        let mut nested = value;
        for segment in key_path.rsplit(KEY_PATH_SEPARATOR) {
            let mut map = Map::new();
            map.insert(segment.to_string(), nested);
            nested = Value::Object(map);
        }

        Self::from_value(nested)
    }
}

/// Interprets a raw request body as a configuration value.
///
/// Numbers are tried first (integers keep their integer form), then the
/// case-insensitive literals `true` and `false`. Anything else is parsed as JSON
/// when `is_json` is set and kept as a plain string otherwise.
///
/// # Examples
///
/// ```
/// use hsconfig::domain::document::infer_value;
/// use serde_json::json;
///
/// assert_eq!(infer_value("42", false).unwrap(), json!(42));
/// assert_eq!(infer_value("TRUE", false).unwrap(), json!(true));
/// assert_eq!(infer_value("dark", false).unwrap(), json!("dark"));
/// assert_eq!(infer_value(r#"{"a":1}"#, true).unwrap(), json!({"a": 1}));
/// ```
pub fn infer_value(body: &str, is_json: bool) -> Result<Value> {
    if let Ok(n) = body.parse::<i64>() {
        return Ok(Value::Number(n.into()));
    }
    if let Some(n) = body.parse::<f64>().ok().and_then(Number::from_f64) {
        return Ok(Value::Number(n));
    }

    match body.to_lowercase().as_str() {
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        _ => {}
    }

    if is_json {
        serde_json::from_str(body)
            .map_err(|e| ConfigError::from_json_error("Body is not valid JSON", e))
    } else {
        Ok(Value::String(body.to_string()))
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Document(map)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Value::Object(doc.0)
    }
}

impl TryFrom<Value> for Document {
    type Error = ConfigError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(&self.0) {
            Ok(text) => f.write_str(&text),
            Err(_) => Err(fmt::Error),
        }
    }
}
