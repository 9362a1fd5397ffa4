pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod lifecycle;
pub mod rows;
pub mod schema;
pub mod writer;

pub use cli::{Cli, Commands};
pub use config::{HostConfig, SiteContext};
pub use error::{BuildError, SchemaError};
pub use schema::{DeploymentMode, FieldSpec, KeySpec, Length, TableDefinition, TableSchema};
pub use writer::{render, resolve_table_name, MigrationExecutor, Prefixes};
