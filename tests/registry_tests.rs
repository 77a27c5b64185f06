use omlite::{model, Field, Model, ModelMeta, PRIMARY_KEY};

model! {
    pub struct A => "aa" {
        a,
    }
}

model! {
    pub struct B {
        b: "TEXT",
    }
}

model! {
    pub struct X: A, B {
        x,
    }
}

model! {
    pub struct Y: X, A {
        a,
        y,
        x,
    }
}

model! {
    pub struct Z: B, A {}
}

model! {
    pub struct Keyed {
        id: "TEXT",
        name,
    }
}

fn attrs<M: Model>() -> Vec<&'static str> {
    M::meta().persisted_attrs().collect()
}

#[test]
fn test_primary_key_comes_first() {
    assert_eq!(attrs::<A>(), ["id", "a"]);
    assert_eq!(attrs::<B>(), ["id", "b"]);
    assert_eq!(A::meta().primary_key(), PRIMARY_KEY);
}

#[test]
fn test_bases_merge_in_declaration_order() {
    assert_eq!(attrs::<X>(), ["id", "a", "b", "x"]);
    assert_eq!(attrs::<Z>(), ["id", "b", "a"]);
}

#[test]
fn test_redeclared_fields_are_kept_once() {
    assert_eq!(attrs::<Y>(), ["id", "a", "b", "x", "y"]);
    assert_eq!(attrs::<Keyed>(), ["id", "name"]);
}

#[test]
fn test_meta_is_built_once() {
    assert!(std::ptr::eq(X::meta(), X::meta()));
}

#[test]
fn test_field_lookup_includes_inherited_fields() {
    let meta = X::meta();

    assert_eq!(meta.field("b").and_then(Field::sql_type), Some("TEXT"));
    assert_eq!(meta.field("a").and_then(Field::sql_type), None);
    assert!(meta.is_persisted("x"));
    assert!(!meta.is_persisted("y"));
}

#[test]
fn test_primary_key_field_is_typed() {
    let id = Keyed::meta().field("id").copied();
    assert_eq!(id, Some(Field::typed("INTEGER PRIMARY KEY")));
}

#[test]
fn test_table_name_defaults_to_lowercase_name() {
    assert_eq!(X::table_name(), "x");
    assert_eq!(Keyed::table_name(), "keyed");
    assert_eq!(X::meta().name(), "X");
}

#[test]
fn test_builder_without_macro() {
    let base = Box::leak(Box::new(
        ModelMeta::builder("Person")
            .field("name", Field::new())
            .field("email", Field::typed("TEXT"))
            .build(),
    ));

    let meta = ModelMeta::builder("Employee")
        .table_name("staff")
        .base(base)
        .field("salary", Field::typed("REAL"))
        .field("name", Field::new())
        .build();

    assert_eq!(meta.table_name(), "staff");
    assert_eq!(
        meta.persisted_attrs().collect::<Vec<_>>(),
        ["id", "name", "email", "salary"]
    );
    assert_eq!(meta.field("email").and_then(Field::sql_type), Some("TEXT"));
}
