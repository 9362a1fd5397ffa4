use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Sentinel default meaning "no default, column accepts NULL"
pub const NULL_SENTINEL: &str = "NULL";

/// Physical table topology a logical table is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentMode {
    /// Plain single-site install
    SingleSite,
    /// One table per site of a multisite network
    #[serde(rename = "per_site")]
    PerSiteMultisite,
    /// One table shared by the whole network
    #[serde(rename = "global")]
    GlobalMultisite,
}

impl DeploymentMode {
    pub const ALL: [DeploymentMode; 3] = [
        DeploymentMode::SingleSite,
        DeploymentMode::PerSiteMultisite,
        DeploymentMode::GlobalMultisite,
    ];
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentMode::SingleSite => write!(f, "single-site"),
            DeploymentMode::PerSiteMultisite => write!(f, "per-site"),
            DeploymentMode::GlobalMultisite => write!(f, "global"),
        }
    }
}

/// Column length / precision
///
/// All three forms render as a parenthesized, comma-joined list of integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Length {
    /// `VARCHAR(255)`
    Precision(u32),
    /// `DECIMAL(10,2)` given positionally
    Positional(Vec<u32>),
    /// `DECIMAL(10,2)` given by name
    Scaled { digits: u32, decimals: u32 },
}

impl Length {
    /// Integers in render order
    pub fn parts(&self) -> Vec<u32> {
        match self {
            Length::Precision(n) => vec![*n],
            Length::Positional(parts) => parts.clone(),
            Length::Scaled { digits, decimals } => vec![*digits, *decimals],
        }
    }
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Column identifier; falls back to the field's key in the schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub sql_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<Length>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_set: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<String>,
    #[serde(default)]
    pub nullable: bool,
}

impl FieldSpec {
    /// Create a NOT NULL column of the given SQL type
    pub fn new(sql_type: impl Into<String>) -> Self {
        Self {
            sql_type: sql_type.into(),
            ..Self::default()
        }
    }

    /// Override the column identifier
    pub fn named(self, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..self
        }
    }

    pub fn length(self, length: Length) -> Self {
        Self {
            length: Some(length),
            ..self
        }
    }

    /// Shorthand for a single precision value, e.g. `VARCHAR(255)`
    pub fn precision(self, precision: u32) -> Self {
        self.length(Length::Precision(precision))
    }

    pub fn character_set(self, charset: impl Into<String>) -> Self {
        Self {
            character_set: Some(charset.into()),
            ..self
        }
    }

    /// Default value; pass `"NULL"` to make the column nullable without a default
    pub fn default_value(self, value: impl Into<String>) -> Self {
        Self {
            default: Some(value.into()),
            ..self
        }
    }

    pub fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }

    /// True when the default is the `NULL` sentinel (any case)
    pub fn has_null_default(&self) -> bool {
        self.default
            .as_deref()
            .is_some_and(|value| value.eq_ignore_ascii_case(NULL_SENTINEL))
    }

    /// Effective nullability after the `NULL` sentinel is taken into account
    pub fn is_nullable(&self) -> bool {
        self.nullable || self.has_null_default()
    }
}

/// Index definition
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeySpec {
    /// Required for unique keys, ignored otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub primary: bool,
}

impl KeySpec {
    /// Create a plain (non-unique) index
    pub fn index<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Create a named unique index
    pub fn unique<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: Some(name.into()),
            unique: true,
            ..Self::index(columns)
        }
    }

    /// Create a primary key
    pub fn primary<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            primary: true,
            ..Self::index(columns)
        }
    }
}

/// Full table descriptor for one deployment mode
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableSchema {
    /// Field key -> column; insertion order is column order
    pub fields: IndexMap<String, FieldSpec>,
    /// Shorthand primary key, appended after the explicit keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<KeySpec>,
}

impl TableSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.insert(key.into(), spec);
        self
    }

    pub fn primary_key<I, S>(self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            primary_key: Some(columns.into_iter().map(Into::into).collect()),
            ..self
        }
    }

    pub fn key(mut self, key: KeySpec) -> Self {
        self.keys.push(key);
        self
    }
}

/// Accept `"0"` as well as `0` for defaults in schema files
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
        Bool(bool),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
        Raw::Bool(flag) => u8::from(flag).to_string(),
    }))
}
