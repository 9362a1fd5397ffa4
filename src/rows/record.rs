use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use serde_json::Value;

/// A single column value handed to the row store
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    /// printf-style placeholder the row store binds this value with
    pub fn placeholder(&self) -> &'static str {
        match self {
            SqlValue::Integer(_) => "%d",
            SqlValue::Real(_) => "%f",
            SqlValue::Null | SqlValue::Text(_) => "%s",
        }
    }

    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => SqlValue::Null,
            Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(SqlValue::Integer)
                .or_else(|| n.as_f64().map(SqlValue::Real))
                .unwrap_or(SqlValue::Null),
            Value::String(s) => SqlValue::Text(s.clone()),
            // Nested structures are stored as JSON text
            other => SqlValue::Text(other.to_string()),
        }
    }
}

/// Column -> value map in column order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowData {
    pub values: IndexMap<String, SqlValue>,
}

impl RowData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: SqlValue) -> Self {
        self.values.insert(column.into(), value);
        self
    }

    /// Parse a JSON object into a row
    pub fn from_json(line: &str) -> Result<Self> {
        let json: Value = serde_json::from_str(line).context("Failed to parse JSON")?;
        Self::from_value(&json)
    }

    pub fn from_value(json: &Value) -> Result<Self> {
        let Some(object) = json.as_object() else {
            bail!("Row must be a JSON object");
        };

        let values = object
            .iter()
            .map(|(column, value)| (column.clone(), SqlValue::from_json(value)))
            .collect();

        Ok(Self { values })
    }

    /// Placeholders for every column, in column order
    pub fn formats(&self) -> Vec<&'static str> {
        self.values.values().map(SqlValue::placeholder).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
