use crate::schema::{DeclaredTable, SchemaFile};
use anyhow::{bail, Result};
use tracing::info;

/// Resolves which tables to process based on include/exclude filters
pub fn resolve_tables<'a>(
    schema: &'a SchemaFile,
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
) -> Result<Vec<&'a DeclaredTable>> {
    match (include, exclude) {
        (Some(_), Some(_)) => {
            bail!("Cannot use both --include and --exclude at the same time");
        }
        (Some(include_list), None) => {
            check_known(schema, &include_list)?;
            let tables: Vec<_> = schema
                .tables
                .iter()
                .filter(|t| include_list.contains(&t.name))
                .collect();
            info!(tables = ?include_list, "including {} tables", tables.len());
            Ok(tables)
        }
        (None, Some(exclude_list)) => {
            check_known(schema, &exclude_list)?;
            let tables: Vec<_> = schema
                .tables
                .iter()
                .filter(|t| !exclude_list.contains(&t.name))
                .collect();
            info!(excluded = ?exclude_list, "including {} tables (after exclusions)", tables.len());
            Ok(tables)
        }
        (None, None) => {
            info!("including all {} tables", schema.tables.len());
            Ok(schema.tables.iter().collect())
        }
    }
}

fn check_known(schema: &SchemaFile, names: &[String]) -> Result<()> {
    for name in names {
        if schema.get_table(name).is_none() {
            bail!("Unknown table: {}", name);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> SchemaFile {
        SchemaFile::from_json(
            r#"{"tables": [
                {"name": "widgets", "schema": {"fields": {"id": {"type": "INT"}}}},
                {"name": "gadgets", "schema": {"fields": {"id": {"type": "INT"}}}}
            ]}"#,
        )
        .unwrap()
    }

    fn names(tables: &[&DeclaredTable]) -> Vec<String> {
        tables.iter().map(|t| t.name.clone()).collect()
    }

    #[test]
    fn test_include_and_exclude() {
        let schema = schema();

        let included = resolve_tables(&schema, Some(vec!["gadgets".into()]), None).unwrap();
        assert_eq!(names(&included), vec!["gadgets"]);

        let remaining = resolve_tables(&schema, None, Some(vec!["gadgets".into()])).unwrap();
        assert_eq!(names(&remaining), vec!["widgets"]);

        assert_eq!(resolve_tables(&schema, None, None).unwrap().len(), 2);
    }

    #[test]
    fn test_unknown_table_error() {
        let schema = schema();
        let err = resolve_tables(&schema, Some(vec!["nonexistent".into()]), None).unwrap_err();
        assert_eq!(err.to_string(), "Unknown table: nonexistent");
    }

    #[test]
    fn test_include_with_exclude_rejected() {
        let schema = schema();
        assert!(resolve_tables(&schema, Some(vec![]), Some(vec![])).is_err());
    }
}
