use thiserror::Error;

use crate::value::Value;

#[derive(Error, Debug)]
pub enum Error {
    /// A lookup that must match a row matched none.
    #[error("no row in '{table}' with {primary_key} = {id}")]
    NotFound {
        table: String,
        primary_key: &'static str,
        id: Value,
    },

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
