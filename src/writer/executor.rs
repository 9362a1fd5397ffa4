use anyhow::{Context, Result};
use std::io::Write;
use tracing::info;

/// Idempotent create-or-reconcile runner for CREATE TABLE statements
///
/// Implementations create the table when absent and reconcile its columns
/// and keys when present, without destroying data.
pub trait MigrationExecutor {
    fn execute(&mut self, ddl: &str) -> Result<()>;
}

/// Dry-run executor that writes each statement to an output stream
pub struct PrintExecutor<W: Write> {
    out: W,
    statements: usize,
}

impl<W: Write> PrintExecutor<W> {
    pub fn new(out: W) -> Self {
        Self { out, statements: 0 }
    }

    /// Number of statements written so far
    pub fn statements(&self) -> usize {
        self.statements
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> MigrationExecutor for PrintExecutor<W> {
    fn execute(&mut self, ddl: &str) -> Result<()> {
        writeln!(self.out, "{}\n", ddl).context("Failed to write statement")?;
        self.statements += 1;
        info!(statement = self.statements, "statement emitted");
        Ok(())
    }
}
