//! Host lifecycle hooks: plugin activation, new site provisioning and site
//! teardown
//!
//! Every (table, mode, site) combination is an independent unit of work.
//! A failing unit is recorded in the [`ActivationReport`] and the remaining
//! units still run.

use tracing::{debug, info, warn};

use crate::config::{HostConfig, SiteContext};
use crate::error::BuildError;
use crate::schema::{DeploymentMode, TableDefinition};
use crate::writer::{generate_create_table, resolve_table_name, MigrationExecutor};

/// One unit of work that did not complete
#[derive(Debug)]
pub struct UnitFailure {
    pub table: String,
    pub mode: DeploymentMode,
    pub site_id: u64,
    pub error: BuildError,
}

/// Outcome of running a lifecycle hook
#[derive(Debug, Default)]
pub struct ActivationReport {
    /// Physical tables handed to the executor successfully
    pub applied: Vec<String>,
    pub failures: Vec<UnitFailure>,
}

impl ActivationReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn merge(&mut self, other: ActivationReport) {
        self.applied.extend(other.applied);
        self.failures.extend(other.failures);
    }
}

/// Render and execute one table for one mode and site
fn build_unit<T, E>(
    table: &T,
    mode: DeploymentMode,
    ctx: &SiteContext,
    executor: &mut E,
    report: &mut ActivationReport,
) where
    T: TableDefinition + ?Sized,
    E: MigrationExecutor + ?Sized,
{
    let table_name = resolve_table_name(table.base_name(), mode, &ctx.prefixes);

    let result = generate_create_table(table, mode, &ctx.prefixes, &ctx.charset_collate)
        .map_err(BuildError::from)
        .and_then(|ddl| {
            executor
                .execute(&ddl)
                .map_err(|source| BuildError::ExecutorFailure {
                    table: table_name.clone(),
                    source,
                })
        });

    match result {
        Ok(()) => {
            debug!(table = %table_name, %mode, site = ctx.site_id, "table built");
            report.applied.push(table_name);
        }
        Err(error) => {
            warn!(table = %table_name, %mode, site = ctx.site_id, %error, "table build failed");
            report.failures.push(UnitFailure {
                table: table.base_name().to_string(),
                mode,
                site_id: ctx.site_id,
                error,
            });
        }
    }
}

/// Activation hook: build a table for every mode it applies to
///
/// Per-site and global tables are only built for network-wide activation on
/// a multisite host.
pub fn build<T, E>(
    table: &T,
    host: &HostConfig,
    executor: &mut E,
    network_wide: bool,
) -> ActivationReport
where
    T: TableDefinition + ?Sized,
    E: MigrationExecutor + ?Sized,
{
    let mut report = ActivationReport::default();

    if table.applies_to(DeploymentMode::SingleSite) {
        build_unit(
            table,
            DeploymentMode::SingleSite,
            &host.main_site(),
            executor,
            &mut report,
        );
    }

    if network_wide && !host.multisite {
        warn!(table = table.base_name(), "network-wide activation on a single-site host");
        return report;
    }
    if !network_wide {
        return report;
    }

    if table.applies_to(DeploymentMode::PerSiteMultisite) {
        for &site_id in &host.sites {
            build_unit(
                table,
                DeploymentMode::PerSiteMultisite,
                &host.context_for(site_id),
                executor,
                &mut report,
            );
        }
    }

    if table.applies_to(DeploymentMode::GlobalMultisite) {
        build_unit(
            table,
            DeploymentMode::GlobalMultisite,
            &host.main_site(),
            executor,
            &mut report,
        );
    }

    report
}

/// Activation hook over several tables
pub fn build_tables<'a, T, E, I>(
    tables: I,
    host: &HostConfig,
    executor: &mut E,
    network_wide: bool,
) -> ActivationReport
where
    T: TableDefinition + ?Sized + 'a,
    E: MigrationExecutor + ?Sized,
    I: IntoIterator<Item = &'a T>,
{
    let mut report = ActivationReport::default();
    for table in tables {
        report.merge(build(table, host, executor, network_wide));
    }
    info!(
        applied = report.applied.len(),
        failed = report.failures.len(),
        "activation finished"
    );
    report
}

/// New-site hook: build the per-site table for a freshly provisioned site
pub fn build_new_site<T, E>(
    table: &T,
    host: &HostConfig,
    site_id: u64,
    executor: &mut E,
) -> ActivationReport
where
    T: TableDefinition + ?Sized,
    E: MigrationExecutor + ?Sized,
{
    let mut report = ActivationReport::default();
    if !table.applies_to(DeploymentMode::PerSiteMultisite) {
        debug!(table = table.base_name(), site = site_id, "no per-site table");
        return report;
    }

    build_unit(
        table,
        DeploymentMode::PerSiteMultisite,
        &host.context_for(site_id),
        executor,
        &mut report,
    );
    report
}

/// Site teardown hook: add this crate's per-site tables to the drop list
pub fn tables_to_drop<'a, T, I>(
    tables: I,
    host: &HostConfig,
    site_id: u64,
    mut existing: Vec<String>,
) -> Vec<String>
where
    T: TableDefinition + ?Sized + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let prefix = host.site_prefix(site_id);
    for table in tables {
        if table.applies_to(DeploymentMode::PerSiteMultisite) {
            existing.push(format!("{}{}", prefix, table.base_name()));
        }
    }
    existing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, TableSchema};
    use anyhow::{bail, Result};

    struct Counters {
        global: bool,
    }

    impl TableDefinition for Counters {
        fn base_name(&self) -> &str {
            "counters"
        }

        fn schema_for(&self, mode: DeploymentMode) -> TableSchema {
            let schema = TableSchema::new().field("id", FieldSpec::new("BIGINT").precision(20));
            match mode {
                DeploymentMode::GlobalMultisite => schema
                    .field("blog_id", FieldSpec::new("BIGINT").precision(20))
                    .primary_key(["blog_id", "id"]),
                _ => schema.primary_key(["id"]),
            }
        }

        fn multisite_enabled(&self) -> bool {
            true
        }

        fn uses_global_table(&self) -> bool {
            self.global
        }
    }

    /// Collects statements, failing for any statement mentioning `fail_on`
    #[derive(Default)]
    struct Recorder {
        statements: Vec<String>,
        fail_on: Option<&'static str>,
    }

    impl MigrationExecutor for Recorder {
        fn execute(&mut self, ddl: &str) -> Result<()> {
            if let Some(needle) = self.fail_on {
                if ddl.contains(needle) {
                    bail!("table is locked");
                }
            }
            self.statements.push(ddl.to_string());
            Ok(())
        }
    }

    fn network() -> HostConfig {
        HostConfig {
            multisite: true,
            sites: vec![1, 2, 3],
            ..HostConfig::default()
        }
    }

    #[test]
    fn test_single_site_activation() {
        let mut recorder = Recorder::default();
        let report = build(&Counters { global: false }, &network(), &mut recorder, false);

        assert!(report.is_success());
        assert_eq!(report.applied, vec!["wp_counters"]);
    }

    #[test]
    fn test_network_activation_builds_every_site() {
        let mut recorder = Recorder::default();
        let report = build(&Counters { global: false }, &network(), &mut recorder, true);

        assert_eq!(
            report.applied,
            vec!["wp_counters", "wp_counters", "wp_2_counters", "wp_3_counters"]
        );
        assert_eq!(recorder.statements.len(), 4);
    }

    #[test]
    fn test_network_activation_global_table() {
        let mut recorder = Recorder::default();
        let report = build(&Counters { global: true }, &network(), &mut recorder, true);

        assert_eq!(report.applied, vec!["wp_counters", "wp_counters"]);
        assert!(recorder.statements[1].contains("PRIMARY KEY (blog_id,id)"));
    }

    #[test]
    fn test_failed_site_does_not_stop_others() {
        let mut recorder = Recorder {
            fail_on: Some("wp_2_counters"),
            ..Recorder::default()
        };
        let report = build(&Counters { global: false }, &network(), &mut recorder, true);

        assert_eq!(report.applied.len(), 3);
        assert_eq!(report.failures.len(), 1);

        let failure = &report.failures[0];
        assert_eq!(failure.site_id, 2);
        assert_eq!(failure.mode, DeploymentMode::PerSiteMultisite);
        assert!(matches!(
            &failure.error,
            BuildError::ExecutorFailure { table, .. } if table == "wp_2_counters"
        ));
    }

    #[test]
    fn test_network_wide_on_single_site_host() {
        let mut recorder = Recorder::default();
        let report = build(
            &Counters { global: false },
            &HostConfig::default(),
            &mut recorder,
            true,
        );
        assert_eq!(report.applied, vec!["wp_counters"]);
    }

    #[test]
    fn test_build_new_site() {
        let mut recorder = Recorder::default();
        let report = build_new_site(&Counters { global: false }, &network(), 9, &mut recorder);
        assert_eq!(report.applied, vec!["wp_9_counters"]);

        let report = build_new_site(&Counters { global: true }, &network(), 9, &mut recorder);
        assert!(report.applied.is_empty());
    }

    #[test]
    fn test_tables_to_drop() {
        let tables = [Counters { global: false }, Counters { global: true }];
        let dropped = tables_to_drop(&tables, &network(), 5, vec!["wp_5_posts".into()]);
        assert_eq!(dropped, vec!["wp_5_posts", "wp_5_counters"]);
    }
}
