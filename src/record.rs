use crate::{
    error::Result,
    meta::ModelMeta,
    sqlite::Store,
    tracker::{Attributes, Tracker},
    value::Value,
};

static EMPTY: Value = Value::Null;

/// State behind every model instance: attribute values, the tracker that
/// watches them, and the store they persist to.
#[derive(Debug, Clone)]
pub struct Record {
    store: Store,
    meta: &'static ModelMeta,
    values: Attributes,
    tracker: Tracker,
}

impl Record {
    /// A fresh, clean record with every persisted attribute empty.
    pub fn new(store: &Store, meta: &'static ModelMeta) -> Self {
        let mut values = Attributes::new();
        let mut tracker = Tracker::new();
        tracker.bind(meta, &mut values);
        Self {
            store: store.clone(),
            meta,
            values,
            tracker,
        }
    }

    pub fn meta(&self) -> &'static ModelMeta {
        self.meta
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The primary key as an integer, `None` while unassigned or when the
    /// model uses non-integer keys.
    pub fn id(&self) -> Option<i64> {
        self.key().as_integer()
    }

    pub fn key(&self) -> &Value {
        self.value(self.meta.primary_key())
    }

    /// The current value of `attr`, `None` if it was never declared nor
    /// assigned.
    pub fn get(&self, attr: &str) -> Option<&Value> {
        self.values.get(attr)
    }

    /// Like [`Record::get`], reading unknown attributes as empty.
    pub fn value(&self, attr: &str) -> &Value {
        self.get(attr).unwrap_or(&EMPTY)
    }

    pub fn set(&mut self, attr: &str, value: impl Into<Value>) {
        self.values.insert(attr.to_string(), value.into());
        self.tracker.notify_changed(attr);
    }

    pub fn is_dirty(&self) -> bool {
        self.tracker.is_dirty()
    }

    pub fn dirty_attrs(&self) -> Vec<&'static str> {
        self.tracker.dirty_attrs().collect()
    }

    pub fn mark_clean(&mut self) {
        self.tracker.mark_clean();
    }

    pub fn save(&mut self) -> Result<()> {
        self.tracker
            .save(&self.store, self.meta.table_name(), &mut self.values)
    }

    pub fn delete(&mut self) -> Result<()> {
        self.tracker
            .delete(&self.store, self.meta.table_name(), &mut self.values)
    }
}
