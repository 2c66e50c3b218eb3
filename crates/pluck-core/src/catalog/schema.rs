//! Schema bundle: the registered entities and relations.

use super::{EntityDef, RelationDef};
use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A snapshot of the relationship schema used for path resolution.
///
/// Relations are owned by their source entity, so two entities may each
/// declare a relation called `user`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaBundle {
    /// Entity definitions keyed by name.
    #[serde(default)]
    pub entities: HashMap<String, EntityDef>,
    /// Relation definitions.
    #[serde(default)]
    pub relations: Vec<RelationDef>,
}

impl SchemaBundle {
    /// Create an empty schema bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity to the schema.
    pub fn with_entity(mut self, entity: EntityDef) -> Self {
        self.entities.insert(entity.name.clone(), entity);
        self
    }

    /// Add a relation to the schema, replacing one with the same source and name.
    pub fn with_relation(mut self, relation: RelationDef) -> Self {
        self.relations
            .retain(|r| !(r.from_entity == relation.from_entity && r.name == relation.name));
        self.relations.push(relation);
        self
    }

    /// Get an entity by name.
    pub fn get_entity(&self, name: &str) -> Option<&EntityDef> {
        self.entities.get(name)
    }

    /// Get the relation `name` declared on `entity`.
    pub fn relation(&self, entity: &str, name: &str) -> Option<&RelationDef> {
        self.relations
            .iter()
            .find(|r| r.from_entity == entity && r.name == name)
    }

    /// Get all relations for an entity (as source).
    pub fn relations_from(&self, entity: &str) -> Vec<&RelationDef> {
        self.relations
            .iter()
            .filter(|r| r.from_entity == entity)
            .collect()
    }

    /// Name of the primary key field of an entity.
    pub fn primary_key(&self, entity: &str) -> Result<&str, Error> {
        self.get_entity(entity)
            .map(|e| e.identity_field.as_str())
            .ok_or_else(|| Error::UnknownEntity(entity.to_string()))
    }

    /// List all entity names.
    pub fn entity_names(&self) -> Vec<&str> {
        self.entities.keys().map(|s| s.as_str()).collect()
    }

    /// Check that every relation points at registered entities and that every
    /// to-one foreign key is declared on its source entity.
    pub fn validate(&self) -> Result<(), Error> {
        for relation in &self.relations {
            let from = self
                .get_entity(&relation.from_entity)
                .ok_or_else(|| Error::UnknownEntity(relation.from_entity.clone()))?;
            if self.get_entity(&relation.to_entity).is_none() {
                return Err(Error::UnknownEntity(relation.to_entity.clone()));
            }
            if relation.is_to_one() && !from.has_field(&relation.foreign_key) {
                return Err(Error::UnknownField {
                    entity: from.name.clone(),
                    field: relation.foreign_key.clone(),
                });
            }
        }
        Ok(())
    }

    /// Load a schema from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let schema: Self =
            serde_json::from_str(json).map_err(|e| Error::Deserialization(e.to_string()))?;
        schema.validate()?;
        Ok(schema)
    }

    /// Serialize the schema to JSON.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FieldDef, ScalarType};

    fn sample_schema() -> SchemaBundle {
        let user = EntityDef::new("User", "id")
            .with_field(FieldDef::new("id", ScalarType::Int64))
            .with_field(FieldDef::new("name", ScalarType::String));

        let post = EntityDef::new("Post", "id")
            .with_field(FieldDef::new("id", ScalarType::Int64))
            .with_field(FieldDef::new("title", ScalarType::String))
            .with_field(FieldDef::optional("user_id", ScalarType::Int64));

        SchemaBundle::new()
            .with_entity(user)
            .with_entity(post)
            .with_relation(RelationDef::many_to_one("user", "Post", "user_id", "User"))
            .with_relation(RelationDef::one_to_many("posts", "User", "Post", "user_id"))
    }

    #[test]
    fn test_relation_lookup_is_scoped_to_entity() {
        let schema = sample_schema();

        assert!(schema.relation("Post", "user").is_some());
        assert!(schema.relation("User", "user").is_none());
        assert_eq!(schema.relations_from("User").len(), 1);
    }

    #[test]
    fn test_with_relation_replaces_same_name() {
        let relation = RelationDef::one_to_one("user", "Post", "user_id", "User");
        let schema = sample_schema().with_relation(relation);

        assert_eq!(schema.relations_from("Post").len(), 1);
        assert!(schema.relation("Post", "user").unwrap().is_to_one());
    }

    #[test]
    fn test_primary_key() {
        let schema = sample_schema();
        assert_eq!(schema.primary_key("Post").unwrap(), "id");
        assert!(matches!(
            schema.primary_key("Missing"),
            Err(Error::UnknownEntity(_))
        ));
    }

    #[test]
    fn test_validate_rejects_missing_foreign_key() {
        let relation = RelationDef::many_to_one("author", "Post", "author_id", "User");
        let schema = sample_schema().with_relation(relation);
        assert!(matches!(schema.validate(), Err(Error::UnknownField { .. })));
    }

    #[test]
    fn test_json_roundtrip() {
        let schema = sample_schema();
        let json = schema.to_json().unwrap();
        let loaded = SchemaBundle::from_json(&json).unwrap();

        assert_eq!(loaded, schema);
    }

    #[test]
    fn test_from_json_reports_deserialization_error() {
        assert!(matches!(
            SchemaBundle::from_json("{\"entities\": 3}"),
            Err(Error::Deserialization(_))
        ));
        assert!(matches!(
            SchemaBundle::from_json("not json"),
            Err(Error::Deserialization(_))
        ));
    }
}
