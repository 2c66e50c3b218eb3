//! Shared blog schema and rows for query unit tests.

use crate::catalog::{EntityDef, FieldDef, RelationDef, ScalarType, SchemaBundle};
use crate::store::{MemoryStore, Row};
use crate::value::Value;

pub(crate) fn blog_schema() -> SchemaBundle {
    let id = || FieldDef::new("id", ScalarType::Int64);
    SchemaBundle::new()
        .with_entity(
            EntityDef::new("Company", "id")
                .with_field(id())
                .with_field(FieldDef::new("name", ScalarType::String)),
        )
        .with_entity(EntityDef::new("User", "id").with_fields([
            id(),
            FieldDef::new("name", ScalarType::String),
            FieldDef::optional("company_id", ScalarType::Int64),
        ]))
        .with_entity(
            EntityDef::new("Category", "id")
                .with_field(id())
                .with_field(FieldDef::new("name", ScalarType::String)),
        )
        .with_entity(EntityDef::new("Post", "id").with_fields([
            id(),
            FieldDef::new("title", ScalarType::String),
            FieldDef::optional("user_id", ScalarType::Int64),
            FieldDef::optional("category_id", ScalarType::Int64),
        ]))
        .with_entity(EntityDef::new("Comment", "id").with_fields([
            id(),
            FieldDef::new("text", ScalarType::String),
            FieldDef::optional("post_id", ScalarType::Int64),
        ]))
        .with_relation(RelationDef::many_to_one("post", "Comment", "post_id", "Post"))
        .with_relation(RelationDef::many_to_one("user", "Post", "user_id", "User"))
        .with_relation(RelationDef::many_to_one(
            "category",
            "Post",
            "category_id",
            "Category",
        ))
        .with_relation(RelationDef::many_to_one(
            "company",
            "User",
            "company_id",
            "Company",
        ))
        .with_relation(RelationDef::one_to_many("comments", "Post", "Comment", "post_id"))
}

fn fk(id: Option<i64>) -> Value {
    Value::from(id)
}

/// Comments 2 and 6 have a null and a dangling post; post 12 points at a
/// missing user; user 2 has no company.
pub(crate) fn blog_store() -> MemoryStore {
    let store = MemoryStore::new();

    store.insert_many(
        "Company",
        [(1, "Acme"), (2, "Globex")]
            .into_iter()
            .map(|(id, name)| Row::new().with("id", id as i64).with("name", name)),
    );
    store.insert_many(
        "User",
        [(1, "alice", Some(1)), (2, "bob", None), (3, "carol", Some(2))]
            .into_iter()
            .map(|(id, name, company)| {
                Row::new()
                    .with("id", id as i64)
                    .with("name", name)
                    .with("company_id", fk(company))
            }),
    );
    store.insert("Category", Row::new().with("id", 1i64).with("name", "news"));
    store.insert_many(
        "Post",
        [
            (10, "T", Some(1), Some(1)),
            (11, "U", Some(2), None),
            (12, "V", Some(99), Some(1)),
        ]
        .into_iter()
        .map(|(id, title, user, category)| {
            Row::new()
                .with("id", id as i64)
                .with("title", title)
                .with("user_id", fk(user))
                .with("category_id", fk(category))
        }),
    );
    store.insert_many(
        "Comment",
        [
            (1, "a", Some(10)),
            (2, "b", None),
            (3, "c", Some(11)),
            (4, "d", Some(12)),
            (5, "e", Some(10)),
            (6, "f", Some(404)),
        ]
        .into_iter()
        .map(|(id, text, post)| {
            Row::new()
                .with("id", id as i64)
                .with("text", text)
                .with("post_id", fk(post))
        }),
    );

    store
}
