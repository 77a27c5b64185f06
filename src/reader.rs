//! Streaming `SELECT *` results into model instances.

use std::marker::PhantomData;

use log::trace;
use rusqlite::{params_from_iter, Row, Rows, Statement};

use crate::{error::Result, model::Model, sqlite::Store, value::Value};

/// A prepared `SELECT * FROM <table> WHERE <predicate>` for model `M`.
///
/// Every call to [`Select::iter`] runs the query again from the first row.
pub struct Select<'s, M> {
    store: &'s Store,
    sql: String,
    statement: Statement<'s>,
    columns: Vec<String>,
    params: Vec<Value>,
    _model: PhantomData<fn() -> M>,
}

impl<'s, M: Model> Select<'s, M> {
    pub(crate) fn prepare(
        store: &'s Store,
        predicate: &str,
        params: impl IntoIterator<Item = Value>,
    ) -> Result<Self> {
        let sql = format!("SELECT * FROM {} WHERE {predicate}", M::table_name());
        let statement = store.prepare(&sql)?;
        let columns = statement
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        Ok(Self {
            store,
            sql,
            statement,
            columns,
            params: params.into_iter().collect(),
            _model: PhantomData,
        })
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Runs the query and returns a cursor over its rows. Rows are fetched
    /// one at a time as the cursor is advanced.
    pub fn iter(&mut self) -> Result<Cursor<'_, M>> {
        self.store.record_statement(&self.sql, self.params.len());
        let rows = self.statement.query(params_from_iter(self.params.iter()))?;
        Ok(Cursor {
            store: self.store,
            columns: &self.columns,
            rows,
            _model: PhantomData,
        })
    }

    /// Collects every matching row.
    pub fn all(&mut self) -> Result<Vec<M>> {
        self.iter()?.collect()
    }

    /// The first matching row, if any. Remaining rows are never fetched.
    pub fn first(&mut self) -> Result<Option<M>> {
        self.iter()?.next().transpose()
    }
}

/// Forward-only iterator over one execution of a [`Select`].
///
/// The underlying statement is reset once the last row has been read or the
/// cursor is dropped, whichever comes first.
pub struct Cursor<'a, M> {
    store: &'a Store,
    columns: &'a [String],
    rows: Rows<'a>,
    _model: PhantomData<fn() -> M>,
}

impl<'a, M: Model> Iterator for Cursor<'a, M> {
    type Item = Result<M>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.rows.next() {
            Ok(Some(row)) => Some(read_row(self.store, self.columns, row)),
            Ok(None) => None,
            Err(err) => Some(Err(err.into())),
        }
    }
}

/// Builds a clean instance of `M` from one result row.
///
/// # Panics
///
/// If a column is not a persisted attribute of `M`.
pub fn read_row<M: Model>(store: &Store, columns: &[String], row: &Row<'_>) -> Result<M> {
    let meta = M::meta();
    let mut model = M::new(store);

    for (index, column) in columns.iter().enumerate() {
        assert!(
            meta.is_persisted(column),
            "column '{column}' of '{}' is not a field of {}",
            meta.table_name(),
            meta.name()
        );
        let value: Value = row.get(index)?;
        model.set(column, value);
    }

    model.mark_clean();
    trace!("loaded {} id={:?}", meta.name(), model.id());
    Ok(model)
}
