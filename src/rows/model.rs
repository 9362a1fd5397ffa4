use anyhow::{bail, Result};
use std::fmt;
use tracing::debug;

use super::record::RowData;
use crate::config::SiteContext;
use crate::schema::{DeploymentMode, TableDefinition};
use crate::writer::resolve_table_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOperation {
    Insert,
    Update,
    Replace,
    Delete,
}

/// Which prefix a row operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowScope {
    /// Table of the current site
    Site,
    /// Network-wide table
    Network,
}

impl RowOperation {
    /// Map a host-facing call name (`insert`, `update_multisite`, ...) to an
    /// operation and scope
    pub fn parse_call(name: &str) -> Option<(RowOperation, RowScope)> {
        let (op, scope) = match name.strip_suffix("_multisite") {
            Some(op) => (op, RowScope::Network),
            None => (name, RowScope::Site),
        };
        let op = match op {
            "insert" => RowOperation::Insert,
            "update" => RowOperation::Update,
            "replace" => RowOperation::Replace,
            "delete" => RowOperation::Delete,
            _ => return None,
        };
        Some((op, scope))
    }
}

impl fmt::Display for RowOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowOperation::Insert => write!(f, "insert"),
            RowOperation::Update => write!(f, "update"),
            RowOperation::Replace => write!(f, "replace"),
            RowOperation::Delete => write!(f, "delete"),
        }
    }
}

/// Row payload: `data` for insert/update/replace, `conditions` for update/delete
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowRequest {
    pub data: RowData,
    pub conditions: RowData,
}

/// Generic data-access facility supplied by the host
///
/// Each method returns the number of affected rows.
pub trait RowStore {
    fn insert(&mut self, table: &str, data: &RowData) -> Result<u64>;
    fn update(&mut self, table: &str, data: &RowData, conditions: &RowData) -> Result<u64>;
    fn replace(&mut self, table: &str, data: &RowData) -> Result<u64>;
    fn delete(&mut self, table: &str, conditions: &RowData) -> Result<u64>;
}

/// Forwards row operations for one table to a row store under its resolved name
pub struct TableModel<'a, T: TableDefinition + ?Sized> {
    table: &'a T,
    ctx: &'a SiteContext,
}

impl<'a, T: TableDefinition + ?Sized> TableModel<'a, T> {
    pub fn new(table: &'a T, ctx: &'a SiteContext) -> Self {
        Self { table, ctx }
    }

    pub fn table_name(&self, scope: RowScope) -> String {
        let mode = match scope {
            RowScope::Site => DeploymentMode::SingleSite,
            RowScope::Network => DeploymentMode::GlobalMultisite,
        };
        resolve_table_name(self.table.base_name(), mode, &self.ctx.prefixes)
    }

    pub fn dispatch<S: RowStore + ?Sized>(
        &self,
        store: &mut S,
        op: RowOperation,
        scope: RowScope,
        request: &RowRequest,
    ) -> Result<u64> {
        let table = self.table_name(scope);
        debug!(%table, %op, columns = request.data.values.len(), "row operation");

        match op {
            RowOperation::Insert => store.insert(&table, &request.data),
            RowOperation::Replace => store.replace(&table, &request.data),
            RowOperation::Update => {
                if request.conditions.is_empty() {
                    bail!("Refusing to update {} without conditions", table);
                }
                store.update(&table, &request.data, &request.conditions)
            }
            RowOperation::Delete => {
                if request.conditions.is_empty() {
                    bail!("Refusing to delete from {} without conditions", table);
                }
                store.delete(&table, &request.conditions)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HostConfig;
    use crate::rows::SqlValue;
    use crate::schema::{FieldSpec, TableSchema};

    struct Notes;

    impl TableDefinition for Notes {
        fn base_name(&self) -> &str {
            "notes"
        }

        fn schema_for(&self, _mode: DeploymentMode) -> TableSchema {
            TableSchema::new().field("id", FieldSpec::new("INT"))
        }
    }

    #[derive(Default)]
    struct Journal {
        calls: Vec<String>,
    }

    impl RowStore for Journal {
        fn insert(&mut self, table: &str, data: &RowData) -> Result<u64> {
            self.calls.push(format!("insert {} {:?}", table, data.formats()));
            Ok(1)
        }

        fn update(&mut self, table: &str, _data: &RowData, conditions: &RowData) -> Result<u64> {
            self.calls
                .push(format!("update {} where {:?}", table, conditions.formats()));
            Ok(2)
        }

        fn replace(&mut self, table: &str, _data: &RowData) -> Result<u64> {
            self.calls.push(format!("replace {}", table));
            Ok(1)
        }

        fn delete(&mut self, table: &str, _conditions: &RowData) -> Result<u64> {
            self.calls.push(format!("delete {}", table));
            Ok(3)
        }
    }

    #[test]
    fn test_parse_call() {
        assert_eq!(
            RowOperation::parse_call("insert"),
            Some((RowOperation::Insert, RowScope::Site))
        );
        assert_eq!(
            RowOperation::parse_call("delete_multisite"),
            Some((RowOperation::Delete, RowScope::Network))
        );
        assert_eq!(RowOperation::parse_call("select"), None);
        assert_eq!(RowOperation::parse_call("_multisite"), None);
    }

    #[test]
    fn test_dispatch_uses_scoped_table_name() {
        let ctx = HostConfig::default().context_for(4);
        let model = TableModel::new(&Notes, &ctx);
        let mut journal = Journal::default();

        let request = RowRequest {
            data: RowData::new().with("body", SqlValue::Text("hi".into())),
            conditions: RowData::new().with("id", SqlValue::Integer(1)),
        };

        assert_eq!(
            model
                .dispatch(&mut journal, RowOperation::Insert, RowScope::Site, &request)
                .unwrap(),
            1
        );
        assert_eq!(
            model
                .dispatch(&mut journal, RowOperation::Update, RowScope::Network, &request)
                .unwrap(),
            2
        );

        assert_eq!(
            journal.calls,
            vec![
                r#"insert wp_4_notes ["%s"]"#,
                r#"update wp_notes where ["%d"]"#,
            ]
        );
    }

    #[test]
    fn test_delete_requires_conditions() {
        let ctx = HostConfig::default().main_site();
        let model = TableModel::new(&Notes, &ctx);
        let mut journal = Journal::default();

        let result = model.dispatch(
            &mut journal,
            RowOperation::Delete,
            RowScope::Site,
            &RowRequest::default(),
        );
        assert!(result.is_err());
        assert!(journal.calls.is_empty());
    }
}
