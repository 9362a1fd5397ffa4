use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::schema::DeploymentMode;

#[derive(Parser, Debug)]
#[command(name = "table-ddl")]
#[command(version, about = "Render declarative table schemas into CREATE TABLE statements")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    SingleSite,
    PerSite,
    Global,
}

impl From<ModeArg> for DeploymentMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::SingleSite => DeploymentMode::SingleSite,
            ModeArg::PerSite => DeploymentMode::PerSiteMultisite,
            ModeArg::Global => DeploymentMode::GlobalMultisite,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print CREATE TABLE statements for one deployment mode
    Render {
        /// JSON schema file declaring the tables
        schema: PathBuf,

        /// JSON host config (prefixes, sites, charset)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Deployment mode to render for
        #[arg(short, long, value_enum, default_value = "single-site")]
        mode: ModeArg,

        /// Site whose prefix is used
        #[arg(short, long, default_value_t = crate::config::MAIN_SITE_ID)]
        site: u64,

        /// Only include these tables (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        include: Option<Vec<String>>,

        /// Exclude these tables (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        exclude: Option<Vec<String>>,
    },

    /// Run the activation hook against a printing executor
    Activate {
        /// JSON schema file declaring the tables
        schema: PathBuf,

        /// JSON host config (prefixes, sites, charset)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Also build per-site and global multisite tables
        #[arg(short, long)]
        network_wide: bool,
    },

    /// List per-site tables to drop when a site is deleted
    DropTables {
        /// JSON schema file declaring the tables
        schema: PathBuf,

        /// Site being deleted
        #[arg(short, long)]
        site: u64,

        /// JSON host config (prefixes, sites, charset)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List all declared table names
    ListTables {
        /// JSON schema file declaring the tables
        schema: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_render_args() {
        let cli = Cli::try_parse_from([
            "table-ddl", "render", "tables.json", "--mode", "per-site", "--site", "3", "-i", "a,b",
        ])
        .unwrap();

        match cli.command {
            Commands::Render {
                mode, site, include, ..
            } => {
                assert_eq!(DeploymentMode::from(mode), DeploymentMode::PerSiteMultisite);
                assert_eq!(site, 3);
                assert_eq!(include, Some(vec!["a".to_string(), "b".to_string()]));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
