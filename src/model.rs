use crate::{
    error::{Error, Result},
    meta::ModelMeta,
    reader::Select,
    record::Record,
    sqlite::Store,
    value::Value,
};

/// A type whose instances map to rows of one table.
///
/// Implement it with [`model!`](crate::model!); the required methods only
/// wire the type to its [`ModelMeta`] and [`Record`].
pub trait Model: Sized {
    fn meta() -> &'static ModelMeta;

    fn from_record(record: Record) -> Self;

    fn record(&self) -> &Record;

    fn record_mut(&mut self) -> &mut Record;

    fn table_name() -> &'static str {
        Self::meta().table_name()
    }

    /// A new, unsaved instance: every persisted attribute empty, nothing dirty.
    fn new(store: &Store) -> Self {
        Self::from_record(Record::new(store, Self::meta()))
    }

    /// The primary key, `None` until the instance has been created.
    fn id(&self) -> Option<i64> {
        self.record().id()
    }

    /// The primary key as stored, empty until the instance has been created.
    fn key(&self) -> &Value {
        self.record().key()
    }

    fn get(&self, attr: &str) -> Option<&Value> {
        self.record().get(attr)
    }

    /// Assigns any attribute. Only persisted attributes become dirty.
    fn set(&mut self, attr: &str, value: impl Into<Value>) {
        self.record_mut().set(attr, value);
    }

    fn is_dirty(&self) -> bool {
        self.record().is_dirty()
    }

    fn dirty_attrs(&self) -> Vec<&'static str> {
        self.record().dirty_attrs()
    }

    /// Forgets pending changes without writing them.
    fn mark_clean(&mut self) {
        self.record_mut().mark_clean();
    }

    /// Inserts when the instance has no primary key, updates when it has one
    /// and something changed, and does nothing otherwise.
    fn save(&mut self) -> Result<()> {
        self.record_mut().save()
    }

    fn delete(&mut self) -> Result<()> {
        self.record_mut().delete()
    }

    /// `SELECT * FROM <table> WHERE <predicate>`, with `?` placeholders in
    /// `predicate` bound to `params` in order.
    fn select<'s>(
        store: &'s Store,
        predicate: &str,
        params: impl IntoIterator<Item = Value>,
    ) -> Result<Select<'s, Self>> {
        Select::prepare(store, predicate, params)
    }

    /// The row with the given primary key.
    ///
    /// Fails with [`Error::NotFound`] when there is none.
    fn by_id(store: &Store, id: impl Into<Value>) -> Result<Self> {
        let meta = Self::meta();
        let id = id.into();
        let predicate = format!("{}=?", meta.primary_key());

        Self::select(store, &predicate, [id.clone()])?
            .first()?
            .ok_or_else(|| Error::NotFound {
                table: meta.table_name().to_string(),
                primary_key: meta.primary_key(),
                id,
            })
    }
}

/// Declares a model type.
///
/// ```
/// use omlite::{model, Model, Store};
///
/// model! {
///     /// Rows of `aa`.
///     pub struct A => "aa" {
///         a,
///     }
/// }
///
/// model! {
///     pub struct B {
///         b: "TEXT",
///     }
/// }
///
/// // persisted attributes: id, a, b, x
/// model! {
///     pub struct X: A, B {
///         x,
///     }
/// }
///
/// assert_eq!(X::meta().persisted_attrs().collect::<Vec<_>>(), ["id", "a", "b", "x"]);
/// assert_eq!(B::table_name(), "b");
/// ```
///
/// Each locally declared field gets a getter `field()` and a setter
/// `set_field(value)`. Inherited fields are reached through
/// [`Model::get`] and [`Model::set`].
///
/// A `where` clause names a primary key other than `id` and, optionally, the
/// [`CreateHooks`](crate::CreateHooks) that issue it:
///
/// ```
/// use omlite::{model, CreateHooks, Model};
///
/// #[derive(Debug)]
/// struct Slugs;
///
/// impl CreateHooks for Slugs {}
///
/// static SLUGS: Slugs = Slugs;
///
/// model! {
///     pub struct Page => "pages" where key = slug: "TEXT PRIMARY KEY", hooks = SLUGS {
///         title,
///     }
/// }
///
/// assert_eq!(Page::meta().primary_key(), "slug");
/// assert_eq!(Page::meta().persisted_attrs().collect::<Vec<_>>(), ["slug", "title"]);
/// ```
#[macro_export]
macro_rules! model {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident $(: $($base:path),+)? $(=> $table:literal)?
            $(where key = $key:ident $(: $key_type:literal)? $(, hooks = $hooks:path)?)? {
            $( $field:ident $(: $sql_type:literal)? ),* $(,)?
        }
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone)]
        $vis struct $name {
            record: $crate::Record,
        }

        impl $crate::Model for $name {
            fn meta() -> &'static $crate::ModelMeta {
                static META: ::std::sync::OnceLock<$crate::ModelMeta> = ::std::sync::OnceLock::new();
                META.get_or_init(|| {
                    let builder = $crate::ModelMeta::builder(stringify!($name));
                    $( let builder = builder.table_name($table); )?
                    $(
                        let builder = builder.primary_key(
                            stringify!($key),
                            $crate::Field::new() $(.with_sql_type($key_type))?,
                        );
                        $( let builder = builder.create_hooks(&$hooks); )?
                    )?
                    $($( let builder = builder.base(<$base as $crate::Model>::meta()); )+)?
                    $(
                        let builder = builder.field(
                            stringify!($field),
                            $crate::Field::new() $(.with_sql_type($sql_type))?,
                        );
                    )*
                    builder.build()
                })
            }

            fn from_record(record: $crate::Record) -> Self {
                Self { record }
            }

            fn record(&self) -> &$crate::Record {
                &self.record
            }

            fn record_mut(&mut self) -> &mut $crate::Record {
                &mut self.record
            }
        }

        $crate::paste::paste! {
            impl $name {
                $(
                    pub fn $field(&self) -> &$crate::Value {
                        self.record.value(stringify!($field))
                    }

                    pub fn [<set_ $field>](&mut self, value: impl Into<$crate::Value>) {
                        self.record.set(stringify!($field), value);
                    }
                )*
            }
        }
    };
}
