use omlite::{model, values, Model, Store, StoreConfig, Value};
use tempfile::NamedTempFile;

model! {
    pub struct User => "users" {
        name: "TEXT",
        email: "TEXT",
        age: "INTEGER",
    }
}

model! {
    pub struct Post => "posts" {
        user_id: "INTEGER",
        title: "TEXT",
    }
}

fn initialize_schema(store: &Store) -> omlite::Result<()> {
    store.execute_batch(
        r#"
        CREATE TABLE users (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT UNIQUE NOT NULL,
            age INTEGER
        );
        CREATE INDEX idx_users_email ON users(email);
        CREATE TABLE posts (
            id INTEGER PRIMARY KEY,
            user_id INTEGER REFERENCES users(id),
            title TEXT
        );
        "#,
    )
}

fn create_test_db() -> omlite::Result<Store> {
    let store = Store::open_in_memory()?;
    initialize_schema(&store)?;
    Ok(store)
}

#[test]
fn test_basic_operations() -> anyhow::Result<()> {
    let store = create_test_db()?;

    let mut user = User::new(&store);
    user.set_name("John Doe");
    user.set_email("john@example.com");
    user.set_age(30);
    user.save()?;
    let id = user.id().expect("assigned on insert");

    let loaded = User::by_id(&store, id)?;
    assert_eq!(loaded.name(), &Value::from("John Doe"));
    assert_eq!(loaded.email(), &Value::from("john@example.com"));
    assert_eq!(loaded.age().as_integer(), Some(30));

    user.set_age(31);
    user.save()?;
    let age: Option<i64> = store
        .connection()
        .query_row("SELECT age FROM users WHERE id = ?", [id], |row| row.get(0))?;
    assert_eq!(age, Some(31));

    user.delete()?;
    let remaining: i64 = store
        .connection()
        .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    assert_eq!(remaining, 0);
    Ok(())
}

#[test]
fn test_constraint_violation_propagates() -> anyhow::Result<()> {
    let store = create_test_db()?;

    let mut first = User::new(&store);
    first.set_name("a");
    first.set_email("same@example.com");
    first.save()?;

    let mut second = User::new(&store);
    second.set_name("b");
    second.set_email("same@example.com");
    assert!(matches!(second.save(), Err(omlite::Error::Sqlite(_))));
    assert_eq!(second.id(), None);
    assert!(second.is_dirty());
    Ok(())
}

#[test]
fn test_values_are_read_back_raw() -> anyhow::Result<()> {
    let store = create_test_db()?;

    let mut user = User::new(&store);
    user.set_name("raw");
    user.set_email("raw@example.com");
    user.set_age("not a number");
    user.save()?;

    let loaded = User::select(&store, "email = ?", values!["raw@example.com"])?
        .first()?
        .expect("inserted row");
    assert_eq!(loaded.age(), &Value::from("not a number"));
    Ok(())
}

#[test]
fn test_invalid_utf8_text_is_not_repaired() -> anyhow::Result<()> {
    let store = create_test_db()?;
    store.execute_batch(
        "INSERT INTO users(id, name, email) VALUES (1, CAST(x'ff41' AS TEXT), 'bytes@example.com');",
    )?;

    let err = User::by_id(&store, 1).unwrap_err();
    assert!(
        matches!(
            err,
            omlite::Error::Sqlite(rusqlite::Error::FromSqlConversionFailure(..))
        ),
        "{err}"
    );

    let stored: String = store.connection().query_row(
        "SELECT hex(name) FROM users WHERE id = 1",
        [],
        |row| row.get(0),
    )?;
    assert_eq!(stored, "FF41");
    Ok(())
}

#[test]
fn test_foreign_keys_enabled_by_default() -> anyhow::Result<()> {
    let store = create_test_db()?;
    assert!(store.foreign_keys()?);

    let mut post = Post::new(&store);
    post.set_user_id(42);
    post.set_title("orphan");
    assert!(post.save().is_err());

    assert!(!store.disable_foreign_keys()?);
    post.save()?;
    assert!(post.id().is_some());

    assert!(store.enable_foreign_keys()?);
    Ok(())
}

#[test]
fn test_config_can_disable_foreign_keys() -> anyhow::Result<()> {
    let config = StoreConfig::in_memory().with_foreign_keys(false);
    assert_eq!(config.db_path, ":memory:");

    let store = Store::open(&config)?;
    assert!(!store.foreign_keys()?);
    Ok(())
}

#[test]
fn test_config_from_json() -> anyhow::Result<()> {
    let config: StoreConfig = serde_json::from_str(r#"{"db_path": ":memory:"}"#)?;
    assert_eq!(config, StoreConfig::in_memory());
    assert!(Store::open(&config)?.foreign_keys()?);

    let json = serde_json::to_string(&StoreConfig::new("app.db").with_foreign_keys(false))?;
    let parsed: StoreConfig = serde_json::from_str(&json)?;
    assert_eq!(parsed.db_path, "app.db");
    assert!(!parsed.foreign_keys);
    Ok(())
}

#[test]
fn test_value_from_json() -> anyhow::Result<()> {
    let params: Vec<Value> = serde_json::from_str(r#"[{"Text": "Jane"}, {"Integer": 40}, "Null"]"#)?;
    assert_eq!(params, values!["Jane", 40, None::<i64>]);
    Ok(())
}

#[test]
fn test_file_backed_store() -> anyhow::Result<()> {
    let temp_file = NamedTempFile::new()?;
    let config = StoreConfig::new(temp_file.path());

    let id = {
        let store = Store::open(&config)?;
        initialize_schema(&store)?;
        let mut user = User::new(&store);
        user.set_name("Jane");
        user.set_email("jane@example.com");
        user.save()?;
        user.id()
    };

    let store = Store::open(&config)?;
    let user = User::by_id(&store, id)?;
    assert_eq!(user.name(), &Value::from("Jane"));
    assert_eq!(user.age(), &Value::Null);
    Ok(())
}

#[test]
fn test_instances_share_one_connection() -> anyhow::Result<()> {
    let store = create_test_db()?;
    let before = store.statement_count();

    let mut user = User::new(&store);
    user.set_name("shared");
    user.set_email("shared@example.com");
    user.save()?;
    let _ = User::by_id(&store, user.id())?;

    assert_eq!(store.statement_count(), before + 2);
    Ok(())
}
