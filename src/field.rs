/// Marks an attribute of a model as persisted.
///
/// The SQL type is informational only; values are stored and read back
/// exactly as SQLite hands them over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Field {
    sql_type: Option<&'static str>,
}

impl Field {
    pub const fn new() -> Self {
        Self { sql_type: None }
    }

    pub const fn typed(sql_type: &'static str) -> Self {
        Self {
            sql_type: Some(sql_type),
        }
    }

    pub fn with_sql_type(mut self, sql_type: &'static str) -> Self {
        self.sql_type = Some(sql_type);
        self
    }

    pub fn sql_type(&self) -> Option<&'static str> {
        self.sql_type
    }
}
