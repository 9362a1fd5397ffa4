use crate::schema::DeploymentMode;

/// Table name prefixes for one site of an install
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Prefixes {
    /// Prefix of the current site (`wp_`, `wp_3_`, ...)
    pub site_local: String,
    /// Network-wide prefix shared by every site
    pub global: String,
}

impl Prefixes {
    pub fn new(site_local: impl Into<String>, global: impl Into<String>) -> Self {
        Self {
            site_local: site_local.into(),
            global: global.into(),
        }
    }
}

/// Resolve the physical table name for a deployment mode
pub fn resolve_table_name(base_name: &str, mode: DeploymentMode, prefixes: &Prefixes) -> String {
    let prefix = match mode {
        DeploymentMode::SingleSite | DeploymentMode::PerSiteMultisite => &prefixes.site_local,
        DeploymentMode::GlobalMultisite => &prefixes.global,
    };
    format!("{}{}", prefix, base_name)
}
