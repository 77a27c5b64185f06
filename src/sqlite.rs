use std::{cell::Cell, path::Path, rc::Rc};

use log::{debug, info};
use rusqlite::{params_from_iter, Connection, Statement};
use serde::{Deserialize, Serialize};

use crate::{error::Result, value::Value};

const IN_MEMORY: &str = ":memory:";

/// Store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite database file, or `:memory:`
    pub db_path: String,
    /// Enforce referential integrity on the connection
    #[serde(default = "default_foreign_keys")]
    pub foreign_keys: bool,
}

fn default_foreign_keys() -> bool {
    true
}

impl StoreConfig {
    /// Create a config for a database file, foreign keys enforced
    pub fn new(db_path: impl AsRef<Path>) -> Self {
        Self {
            db_path: db_path.as_ref().to_string_lossy().into_owned(),
            foreign_keys: default_foreign_keys(),
        }
    }

    /// Create a config for a private in-memory database
    pub fn in_memory() -> Self {
        Self::new(IN_MEMORY)
    }

    pub fn with_foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }
}

/// Handle to the one connection every model instance shares.
///
/// Cloning the handle shares the connection. The handle is single-threaded;
/// callers serialise access to it.
#[derive(Debug, Clone)]
pub struct Store {
    inner: Rc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    connection: Connection,
    statements: Cell<u64>,
}

impl Store {
    pub fn open(config: &StoreConfig) -> Result<Self> {
        info!("opening sqlite store at path: {}", config.db_path);
        let connection = Connection::open(&config.db_path)?;
        let store = Self {
            inner: Rc::new(StoreInner {
                connection,
                statements: Cell::new(0),
            }),
        };
        store.set_foreign_keys(config.foreign_keys)?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::open(&StoreConfig::in_memory())
    }

    /// The underlying connection, for work outside the mapper.
    pub fn connection(&self) -> &Connection {
        &self.inner.connection
    }

    /// Runs a script of `;`-separated statements, e.g. fixtures.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.inner.connection.execute_batch(sql)?;
        Ok(())
    }

    /// Current state of `PRAGMA foreign_keys`.
    pub fn foreign_keys(&self) -> Result<bool> {
        let enabled = self
            .inner
            .connection
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))?;
        Ok(enabled)
    }

    pub fn enable_foreign_keys(&self) -> Result<bool> {
        self.set_foreign_keys(true)
    }

    pub fn disable_foreign_keys(&self) -> Result<bool> {
        self.set_foreign_keys(false)
    }

    fn set_foreign_keys(&self, enabled: bool) -> Result<bool> {
        self.inner
            .connection
            .pragma_update(None, "foreign_keys", enabled)?;
        let current = self.foreign_keys()?;
        info!("foreign key enforcement: {}", if current { "ON" } else { "OFF" });
        Ok(current)
    }

    /// Executes one statement and returns the number of changed rows.
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<usize> {
        self.record_statement(sql, params.len());
        let changed = self
            .inner
            .connection
            .execute(sql, params_from_iter(params))?;
        Ok(changed)
    }

    /// Rowid of the most recent successful INSERT on this connection.
    pub fn last_insert_rowid(&self) -> i64 {
        self.inner.connection.last_insert_rowid()
    }

    /// Number of statements issued through [`Store::execute`] and model
    /// selects since the store was opened.
    pub fn statement_count(&self) -> u64 {
        self.inner.statements.get()
    }

    pub(crate) fn prepare(&self, sql: &str) -> Result<Statement<'_>> {
        debug!("prepare: {sql}");
        Ok(self.inner.connection.prepare(sql)?)
    }

    pub(crate) fn record_statement(&self, sql: &str, param_count: usize) {
        self.inner.statements.set(self.inner.statements.get() + 1);
        debug!("execute: {sql} ({param_count} params)");
    }
}
