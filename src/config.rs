//! Host environment settings: table prefixes, known sites and the
//! charset/collation clause appended to every CREATE TABLE

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::writer::Prefixes;

/// Id of the main site of a network
pub const MAIN_SITE_ID: u64 = 1;

fn default_base_prefix() -> String {
    "wp_".to_string()
}

fn default_sites() -> Vec<u64> {
    vec![MAIN_SITE_ID]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default = "default_base_prefix")]
    pub base_prefix: String,
    #[serde(default)]
    pub multisite: bool,
    /// Known site ids of the network
    #[serde(default = "default_sites")]
    pub sites: Vec<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collate: Option<String>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            base_prefix: default_base_prefix(),
            multisite: false,
            sites: default_sites(),
            charset: None,
            collate: None,
        }
    }
}

impl HostConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        serde_json::from_str(&text).with_context(|| format!("Invalid config file: {:?}", path))
    }

    /// Load from a path if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// Table prefix of one site; the main site uses the bare base prefix
    pub fn site_prefix(&self, site_id: u64) -> String {
        if site_id <= MAIN_SITE_ID {
            self.base_prefix.clone()
        } else {
            format!("{}{}_", self.base_prefix, site_id)
        }
    }

    /// Clause appended after the closing parenthesis of CREATE TABLE
    pub fn charset_collate(&self) -> String {
        let charset = self
            .charset
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map(|c| format!("DEFAULT CHARACTER SET {}", c.trim()));
        let collate = self
            .collate
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map(|c| format!("COLLATE {}", c.trim()));

        charset.into_iter().chain(collate).collect::<Vec<_>>().join(" ")
    }

    /// Explicit naming context for one site
    pub fn context_for(&self, site_id: u64) -> SiteContext {
        SiteContext {
            site_id,
            prefixes: Prefixes::new(self.site_prefix(site_id), self.base_prefix.clone()),
            charset_collate: self.charset_collate(),
        }
    }

    pub fn main_site(&self) -> SiteContext {
        self.context_for(MAIN_SITE_ID)
    }
}

/// Everything needed to name and render tables for one site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteContext {
    pub site_id: u64,
    pub prefixes: Prefixes,
    pub charset_collate: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let config: HostConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, HostConfig::default());
        assert_eq!(config.charset_collate(), "");
    }

    #[test]
    fn test_site_prefix() {
        let config = HostConfig::default();
        assert_eq!(config.site_prefix(1), "wp_");
        assert_eq!(config.site_prefix(3), "wp_3_");
    }

    #[test]
    fn test_charset_collate() {
        let config = HostConfig {
            charset: Some("utf8mb4".into()),
            collate: Some("utf8mb4_unicode_ci".into()),
            ..HostConfig::default()
        };
        assert_eq!(
            config.charset_collate(),
            "DEFAULT CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci"
        );

        let config = HostConfig {
            collate: Some("utf8mb4_unicode_ci".into()),
            ..HostConfig::default()
        };
        assert_eq!(config.charset_collate(), "COLLATE utf8mb4_unicode_ci");
    }

    #[test]
    fn test_context_for_site() {
        let config = HostConfig {
            base_prefix: "net_".into(),
            ..HostConfig::default()
        };
        let ctx = config.context_for(4);
        assert_eq!(ctx.site_id, 4);
        assert_eq!(ctx.prefixes, Prefixes::new("net_4_", "net_"));
    }
}
