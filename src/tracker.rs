//! Dirty tracking and SQL emission for one model instance.

use std::{
    collections::{BTreeSet, HashMap},
    fmt,
};

use crate::{error::Result, meta::ModelMeta, sqlite::Store, value::Value};

/// Attribute values of one instance, keyed by attribute name.
pub type Attributes = HashMap<String, Value>;

/// Decides the primary key of a row being inserted.
///
/// The default methods leave the key out of the INSERT and adopt the rowid
/// SQLite assigns. Models keyed by application-issued values override
/// [`CreateHooks::before_create`] to supply the key up front.
pub trait CreateHooks: fmt::Debug + Sync {
    /// Key to insert the row with, `None` to let the store choose.
    fn before_create(&self, store: &Store, table: &str) -> Result<Option<Value>> {
        let _ = (store, table);
        Ok(None)
    }

    /// The key of the row just inserted. `key` is the value the INSERT
    /// carried, empty when the store chose.
    fn after_create(&self, store: &Store, key: &Value) -> Result<Value> {
        if key.is_null() {
            Ok(Value::Integer(store.last_insert_rowid()))
        } else {
            Ok(key.clone())
        }
    }
}

/// Integer keys taken from `last_insert_rowid`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowIdKeys;

impl CreateHooks for RowIdKeys {}

/// Records which persisted attributes changed since the instance was last
/// known to match its row, and turns that into INSERT, UPDATE or DELETE.
#[derive(Debug, Clone)]
pub struct Tracker {
    attrs: Vec<&'static str>,
    primary_key: &'static str,
    create_hooks: &'static dyn CreateHooks,
    // indices into `attrs`, so columns come out in declaration order
    dirty: BTreeSet<usize>,
}

impl Default for Tracker {
    fn default() -> Self {
        Self {
            attrs: Vec::new(),
            primary_key: "",
            create_hooks: &RowIdKeys,
            dirty: BTreeSet::new(),
        }
    }
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes over the persisted attributes of `meta` and resets their values
    /// on the instance to empty.
    pub fn bind(&mut self, meta: &ModelMeta, values: &mut Attributes) {
        self.attrs = meta.persisted_attrs().collect();
        self.primary_key = meta.primary_key();
        self.create_hooks = meta.create_hooks();
        for attr in &self.attrs {
            values.insert((*attr).to_string(), Value::Null);
        }
        self.mark_clean();
    }

    pub fn mark_clean(&mut self) {
        self.dirty.clear();
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn dirty_attrs(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.dirty.iter().map(|&index| self.attrs[index])
    }

    /// Called after every attribute write. Writes to attributes that are not
    /// persisted are ignored.
    pub fn notify_changed(&mut self, attr: &str) {
        if let Some(index) = self.position(attr) {
            self.dirty.insert(index);
        }
    }

    pub fn save(&mut self, store: &Store, table: &str, values: &mut Attributes) -> Result<()> {
        if primary_key_value(values, self.primary_key).is_null() {
            self.create(store, table, values)
        } else if self.is_dirty() {
            self.update(store, table, values)
        } else {
            Ok(())
        }
    }

    /// Inserts exactly the dirty attributes and adopts the primary key the
    /// create hooks report.
    ///
    /// With nothing dirty the statement is `INSERT INTO t() VALUES()`, which
    /// SQLite rejects; the error is returned as is.
    pub fn create(&mut self, store: &Store, table: &str, values: &mut Attributes) -> Result<()> {
        if let Some(key) = self.create_hooks.before_create(store, table)? {
            values.insert(self.primary_key.to_string(), key);
            self.notify_changed(self.primary_key);
        }

        let (columns, params) = self.dirty_columns(values);
        let sql = format!(
            "INSERT INTO {table}({}) VALUES({})",
            columns.join(", "),
            vec!["?"; columns.len()].join(", ")
        );

        store.execute(&sql, &params)?;
        let key = self
            .create_hooks
            .after_create(store, primary_key_value(values, self.primary_key))?;
        values.insert(self.primary_key.to_string(), key);
        self.mark_clean();
        Ok(())
    }

    /// Updates exactly the dirty attributes of the row the instance maps to.
    ///
    /// # Panics
    ///
    /// If the primary key itself is dirty.
    pub fn update(&mut self, store: &Store, table: &str, values: &mut Attributes) -> Result<()> {
        assert!(
            self.dirty_attrs().all(|attr| attr != self.primary_key),
            "primary key '{}' of '{table}' changed on a stored row",
            self.primary_key
        );

        let (columns, mut params) = self.dirty_columns(values);
        let assignments: Vec<String> = columns.iter().map(|column| format!("{column} = ?")).collect();
        let sql = format!(
            "UPDATE {table} SET {} WHERE {}=?",
            assignments.join(", "),
            self.primary_key
        );
        params.push(primary_key_value(values, self.primary_key).clone());

        store.execute(&sql, &params)?;
        self.mark_clean();
        Ok(())
    }

    /// Deletes the row, empties the primary key and marks every non-empty
    /// attribute dirty, so a following save inserts a fresh row.
    pub fn delete(&mut self, store: &Store, table: &str, values: &mut Attributes) -> Result<()> {
        let sql = format!("DELETE FROM {table} WHERE {}=?", self.primary_key);
        let id = primary_key_value(values, self.primary_key).clone();

        store.execute(&sql, &[id])?;
        values.insert(self.primary_key.to_string(), Value::Null);

        for (index, attr) in self.attrs.iter().enumerate() {
            if values.get(*attr).is_some_and(|value| !value.is_null()) {
                self.dirty.insert(index);
            }
        }
        Ok(())
    }

    fn position(&self, attr: &str) -> Option<usize> {
        self.attrs.iter().position(|candidate| *candidate == attr)
    }

    fn dirty_columns(&self, values: &Attributes) -> (Vec<&'static str>, Vec<Value>) {
        self.dirty_attrs()
            .map(|attr| (attr, values.get(attr).cloned().unwrap_or_default()))
            .unzip()
    }
}

fn primary_key_value<'a>(values: &'a Attributes, primary_key: &str) -> &'a Value {
    static EMPTY: Value = Value::Null;
    values.get(primary_key).unwrap_or(&EMPTY)
}
