//! Per-type persistence metadata.
//!
//! A [`ModelMeta`] is built once per model type and never changes afterwards.
//! It fixes the table a type maps to, its primary key, how that key is issued
//! on insert, and the ordered list of attributes that are written to and read
//! from that table.

use crate::{
    field::Field,
    tracker::{CreateHooks, RowIdKeys},
};

/// Name of the identity attribute unless a model declares its own.
pub const PRIMARY_KEY: &str = "id";

const PRIMARY_KEY_FIELD: Field = Field::typed("INTEGER PRIMARY KEY");

static ROW_ID_KEYS: RowIdKeys = RowIdKeys;

#[derive(Debug, Clone)]
pub struct ModelMeta {
    name: &'static str,
    table_name: String,
    primary_key: &'static str,
    create_hooks: &'static dyn CreateHooks,
    fields: Vec<(&'static str, Field)>,
}

impl ModelMeta {
    pub fn builder(name: &'static str) -> ModelMetaBuilder {
        ModelMetaBuilder {
            name,
            table_name: None,
            primary_key: None,
            create_hooks: None,
            bases: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn primary_key(&self) -> &'static str {
        self.primary_key
    }

    pub fn create_hooks(&self) -> &'static dyn CreateHooks {
        self.create_hooks
    }

    /// Persisted attributes, primary key first, inherited before local.
    pub fn persisted_attrs(&self) -> impl ExactSizeIterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(name, _)| *name)
    }

    /// Looks up a persisted attribute, own or inherited.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|(field_name, _)| *field_name == name)
            .map(|(_, field)| field)
    }

    pub fn is_persisted(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

/// Collects bases and declared fields, then merges them in
/// [`ModelMetaBuilder::build`].
///
/// Primary key and create hooks fall back to those of the first base, then
/// to an integer `id` filled from the rowid.
#[derive(Debug)]
pub struct ModelMetaBuilder {
    name: &'static str,
    table_name: Option<String>,
    primary_key: Option<(&'static str, Field)>,
    create_hooks: Option<&'static dyn CreateHooks>,
    bases: Vec<&'static ModelMeta>,
    fields: Vec<(&'static str, Field)>,
}

impl ModelMetaBuilder {
    /// Overrides the lower-cased type name as table name.
    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    pub fn primary_key(mut self, name: &'static str, field: Field) -> Self {
        self.primary_key = Some((name, field));
        self
    }

    pub fn create_hooks(mut self, hooks: &'static dyn CreateHooks) -> Self {
        self.create_hooks = Some(hooks);
        self
    }

    pub fn base(mut self, base: &'static ModelMeta) -> Self {
        self.bases.push(base);
        self
    }

    pub fn field(mut self, name: &'static str, field: Field) -> Self {
        self.fields.push((name, field));
        self
    }

    pub fn build(self) -> ModelMeta {
        let first_base = self.bases.first();
        let primary_key = self
            .primary_key
            .or_else(|| first_base.map(|base| (base.primary_key, base.fields[0].1)))
            .unwrap_or((PRIMARY_KEY, PRIMARY_KEY_FIELD));
        let create_hooks = self
            .create_hooks
            .or_else(|| first_base.map(|base| base.create_hooks))
            .unwrap_or(&ROW_ID_KEYS);

        let mut fields = vec![primary_key];
        let inherited = self.bases.iter().flat_map(|base| base.fields.iter());
        for (name, field) in inherited.chain(self.fields.iter()) {
            if !fields.iter().any(|(seen, _)| seen == name) {
                fields.push((*name, *field));
            }
        }

        ModelMeta {
            name: self.name,
            table_name: self
                .table_name
                .unwrap_or_else(|| self.name.to_lowercase()),
            primary_key: primary_key.0,
            create_hooks,
            fields,
        }
    }
}
