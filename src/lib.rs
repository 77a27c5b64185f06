//! Object mapper for SQLite.
//!
//! # Intention
//!
//! - Map one model instance to one table row.
//! - Track which persisted attributes changed and emit the minimal
//!   INSERT / UPDATE / DELETE for them.
//!
//! # Architectural Boundaries
//!
//! - Tables are assumed to exist; no schema management.
//! - Predicates are raw SQL fragments, only parameters are bound.
//! - No relations, no transactions, no pooling.
//!
//! ```no_run
//! use omlite::{model, values, Model, Store};
//!
//! model! {
//!     pub struct Note => "notes" {
//!         title,
//!         body: "TEXT",
//!     }
//! }
//!
//! # fn main() -> omlite::Result<()> {
//! let store = Store::open_in_memory()?;
//! let mut note = Note::new(&store);
//! note.set_title("groceries");
//! note.save()?;
//!
//! for note in Note::select(&store, "title LIKE ?", values!["gro%"])?.iter()? {
//!     println!("{:?}", note?.title());
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod field;
pub mod meta;
pub mod model;
pub mod reader;
pub mod record;
pub mod sqlite;
pub mod tracker;
pub mod value;

pub use error::{Error, Result};
pub use field::Field;
pub use meta::{ModelMeta, ModelMetaBuilder, PRIMARY_KEY};
pub use model::Model;
pub use reader::{Cursor, Select};
pub use record::Record;
pub use sqlite::{Store, StoreConfig};
pub use tracker::{Attributes, CreateHooks, RowIdKeys, Tracker};
pub use value::Value;

#[doc(hidden)]
pub use paste;
