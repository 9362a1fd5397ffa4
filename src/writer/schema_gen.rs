use tracing::debug;

use super::naming::{resolve_table_name, Prefixes};
use crate::error::SchemaError;
use crate::schema::{DeploymentMode, FieldSpec, KeySpec, Length, TableDefinition, TableSchema};

/// Render the CREATE TABLE statement of a table definition for one deployment mode
pub fn generate_create_table<T>(
    table: &T,
    mode: DeploymentMode,
    prefixes: &Prefixes,
    charset_collate: &str,
) -> Result<String, SchemaError>
where
    T: TableDefinition + ?Sized,
{
    let table_name = resolve_table_name(table.base_name(), mode, prefixes);
    let schema = table.schema_for(mode);
    debug!(table = %table_name, %mode, fields = schema.fields.len(), "rendering schema");

    render(&table_name, &schema, charset_collate)
}

/// Compose field and key clauses into a complete CREATE TABLE statement
///
/// The descriptor is fully validated before any text is produced.
pub fn render(
    table_name: &str,
    schema: &TableSchema,
    charset_collate: &str,
) -> Result<String, SchemaError> {
    if schema.fields.is_empty() {
        return Err(SchemaError::EmptyTable {
            table: table_name.to_string(),
        });
    }

    let mut lines = schema
        .fields
        .iter()
        .map(|(key, field)| build_field_clause(key, field))
        .collect::<Result<Vec<_>, _>>()?;
    lines.extend(build_key_clauses(schema)?);

    let mut sql = format!("CREATE TABLE {} (\n", table_name);
    sql.push_str(&lines.join(",\n"));
    sql.push_str("\n)");
    if !charset_collate.trim().is_empty() {
        sql.push(' ');
        sql.push_str(charset_collate.trim());
    }
    sql.push(';');

    Ok(sql)
}

/// Turn one field descriptor into one column definition
pub fn build_field_clause(key: &str, field: &FieldSpec) -> Result<String, SchemaError> {
    let name = match field.name.as_deref() {
        Some(name) if !name.trim().is_empty() => name,
        _ => key,
    };
    if name.trim().is_empty() {
        return Err(SchemaError::field(key, "column name is empty"));
    }
    if field.sql_type.trim().is_empty() {
        return Err(SchemaError::field(name, "SQL type is empty"));
    }

    let mut line = format!("{} {}", name, field.sql_type);

    if let Some(length) = &field.length {
        let parts = length.parts();
        if parts.is_empty() {
            return Err(SchemaError::field(name, "length has no values"));
        }
        // `decimals` is the only part allowed to be zero
        let leading = match length {
            Length::Scaled { .. } => &parts[..1],
            _ => &parts[..],
        };
        if leading.contains(&0) {
            return Err(SchemaError::field(name, "length must be positive"));
        }
        let joined: Vec<String> = parts.iter().map(u32::to_string).collect();
        line.push_str(&format!("({})", joined.join(",")));
    }
    line.push(' ');

    if let Some(charset) = field.character_set.as_deref().filter(|c| !c.trim().is_empty()) {
        line.push_str(&format!("CHARACTER SET {} ", charset.trim()));
    }

    match field.default.as_deref() {
        Some(_) if field.has_null_default() => {}
        Some(value) if is_numeric(value) => line.push_str(&format!("DEFAULT {} ", value.trim())),
        Some(value) => line.push_str(&format!("DEFAULT '{}' ", quote_literal(value))),
        None => {}
    }

    if !field.is_nullable() {
        line.push_str("NOT NULL");
    }

    Ok(line.trim_end().to_string())
}

/// Build the KEY / UNIQUE KEY / PRIMARY KEY clauses of a table
///
/// The `primary_key` shorthand is appended after the explicit keys, and only
/// the first primary key encountered is emitted. An empty shorthand is ignored.
pub fn build_key_clauses(schema: &TableSchema) -> Result<Vec<String>, SchemaError> {
    let shorthand = schema
        .primary_key
        .as_ref()
        .filter(|columns| !columns.is_empty())
        .map(KeySpec::primary);
    let keys: Vec<&KeySpec> = schema.keys.iter().chain(shorthand.as_ref()).collect();

    for key in &keys {
        validate_key(key)?;
    }

    let mut clauses = Vec::with_capacity(keys.len());
    let mut primary_used = false;

    for key in keys {
        if key.primary && primary_used {
            debug!(columns = ?key.columns, "dropping duplicate primary key");
            continue;
        }

        let mut line = String::new();
        if key.unique {
            line.push_str("UNIQUE ");
        } else if key.primary {
            line.push_str("PRIMARY ");
        }
        line.push_str("KEY ");
        if key.unique {
            if let Some(name) = &key.name {
                line.push_str(&format!("{} ", name.trim()));
            }
        }
        line.push_str(&format!("({})", key.columns.join(",")));

        if key.primary {
            primary_used = true;
        }
        clauses.push(line.trim_end().to_string());
    }

    Ok(clauses)
}

fn validate_key(key: &KeySpec) -> Result<(), SchemaError> {
    let label = || {
        key.name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| format!("({})", key.columns.join(",")))
    };

    if key.columns.is_empty() {
        return Err(SchemaError::key(label(), "key has no columns"));
    }
    if key.columns.iter().any(|column| column.trim().is_empty()) {
        return Err(SchemaError::key(label(), "key references an empty column name"));
    }
    if key.unique && key.name.as_deref().map_or(true, |name| name.trim().is_empty()) {
        return Err(SchemaError::key(label(), "unique key requires a name"));
    }

    Ok(())
}

/// Numeric string check: optional sign, digits with an optional fraction,
/// optional exponent, surrounding whitespace allowed
pub fn is_numeric(value: &str) -> bool {
    let trimmed = value.trim_matches(|c: char| c.is_ascii_whitespace() || c == '\x0b');
    let unsigned = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);

    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(idx) => (&unsigned[..idx], Some(&unsigned[idx + 1..])),
        None => (unsigned, None),
    };
    let (integer, fraction) = match mantissa.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (mantissa, None),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    let has_digits = !integer.is_empty() || fraction.is_some_and(|f| !f.is_empty());
    let mantissa_ok = has_digits && all_digits(integer) && fraction.map_or(true, all_digits);
    let exponent_ok = exponent.map_or(true, |exp| {
        let exp = exp.strip_prefix(['+', '-']).unwrap_or(exp);
        !exp.is_empty() && all_digits(exp)
    });

    mantissa_ok && exponent_ok
}

/// Escape a value for use inside a single-quoted SQL literal
fn quote_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "''")
}
