use anyhow::{bail, Result};
use std::io;
use table_ddl::{
    cli::{Cli, Commands},
    config::HostConfig,
    filter::resolve_tables,
    lifecycle::{build_tables, tables_to_drop},
    schema::{DeploymentMode, SchemaFile, TableDefinition},
    writer::{generate_create_table, PrintExecutor},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// `outer: inner: root` rendering of an error and its sources
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(&format!(": {}", cause));
        source = cause.source();
    }
    message
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Render {
            schema,
            config,
            mode,
            site,
            include,
            exclude,
        } => {
            let schema = SchemaFile::load(&schema)?;
            let host = HostConfig::load_or_default(config.as_deref())?;
            let tables = resolve_tables(&schema, include, exclude)?;
            let mode = DeploymentMode::from(mode);
            let ctx = host.context_for(site);

            for table in tables.into_iter().filter(|t| t.applies_to(mode)) {
                let sql = generate_create_table(table, mode, &ctx.prefixes, &ctx.charset_collate)?;
                println!("{}\n", sql);
            }
        }

        Commands::Activate {
            schema,
            config,
            network_wide,
        } => {
            let schema = SchemaFile::load(&schema)?;
            let host = HostConfig::load_or_default(config.as_deref())?;
            let mut executor = PrintExecutor::new(io::stdout().lock());

            let report = build_tables(&schema.tables, &host, &mut executor, network_wide);
            for failure in &report.failures {
                error!(
                    table = %failure.table,
                    mode = %failure.mode,
                    site = failure.site_id,
                    "{}",
                    error_chain(&failure.error)
                );
            }
            if !report.is_success() {
                bail!("{} table build(s) failed", report.failures.len());
            }
            info!("{} table(s) built", report.applied.len());
        }

        Commands::DropTables {
            schema,
            site,
            config,
        } => {
            let schema = SchemaFile::load(&schema)?;
            let host = HostConfig::load_or_default(config.as_deref())?;

            for name in tables_to_drop(&schema.tables, &host, site, Vec::new()) {
                println!("{}", name);
            }
        }

        Commands::ListTables { schema } => {
            let schema = SchemaFile::load(&schema)?;
            println!("Declared tables:\n");
            for name in schema.table_names() {
                println!("  {}", name);
            }
        }
    }

    Ok(())
}
