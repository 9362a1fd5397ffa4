//! Table definitions: the capability the renderer consumes, and the
//! declarative variant loaded from schema files

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::types::{DeploymentMode, TableSchema};

/// A logical table that can describe itself for every deployment mode
pub trait TableDefinition {
    /// Unprefixed table name, e.g. `widgets`
    fn base_name(&self) -> &str;

    /// Schema for the given mode; built fresh on every call
    fn schema_for(&self, mode: DeploymentMode) -> TableSchema;

    fn single_site_enabled(&self) -> bool {
        true
    }

    fn multisite_enabled(&self) -> bool {
        false
    }

    /// One network-wide table instead of one table per site
    fn uses_global_table(&self) -> bool {
        false
    }

    /// Whether a table is built at all for the mode
    fn applies_to(&self, mode: DeploymentMode) -> bool {
        match mode {
            DeploymentMode::SingleSite => self.single_site_enabled(),
            DeploymentMode::PerSiteMultisite => {
                self.multisite_enabled() && !self.uses_global_table()
            }
            DeploymentMode::GlobalMultisite => {
                self.multisite_enabled() && self.uses_global_table()
            }
        }
    }
}

fn default_true() -> bool {
    true
}

/// Table declared in a JSON schema file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclaredTable {
    pub name: String,
    #[serde(default = "default_true")]
    pub single_site: bool,
    #[serde(default)]
    pub multisite: bool,
    /// Multisite storage is a single shared table
    #[serde(default)]
    pub global: bool,
    /// Schema used for every mode without an override
    pub schema: TableSchema,
    /// Per-mode overrides, keyed `single_site`, `per_site` or `global`
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub schemas: HashMap<DeploymentMode, TableSchema>,
}

impl TableDefinition for DeclaredTable {
    fn base_name(&self) -> &str {
        &self.name
    }

    fn schema_for(&self, mode: DeploymentMode) -> TableSchema {
        self.schemas
            .get(&mode)
            .unwrap_or(&self.schema)
            .clone()
    }

    fn single_site_enabled(&self) -> bool {
        self.single_site
    }

    fn multisite_enabled(&self) -> bool {
        self.multisite
    }

    fn uses_global_table(&self) -> bool {
        self.global
    }
}

/// All tables declared in one schema file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaFile {
    pub tables: Vec<DeclaredTable>,
}

impl SchemaFile {
    /// Load and check a schema file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema file: {:?}", path))?;
        Self::from_json(&text).with_context(|| format!("Invalid schema file: {:?}", path))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let file: SchemaFile = serde_json::from_str(text).context("Failed to parse schema JSON")?;

        let mut seen = HashSet::new();
        for table in &file.tables {
            if table.name.trim().is_empty() {
                bail!("Table with an empty name");
            }
            if !seen.insert(table.name.as_str()) {
                bail!("Duplicate table: {}", table.name);
            }
        }

        Ok(file)
    }

    /// Look up a table by name
    pub fn get_table(&self, name: &str) -> Option<&DeclaredTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Table names in declaration order
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }
}
