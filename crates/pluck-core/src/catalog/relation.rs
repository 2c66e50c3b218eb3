//! Relation definitions between entities.

use serde::{Deserialize, Serialize};

/// Cardinality of a relation, seen from its source entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    /// Many source rows point at one target (foreign key on the source).
    ManyToOne,
    /// One-to-one relation (unique foreign key on the source).
    OneToOne,
    /// One-to-many relation (foreign key on the target).
    OneToMany,
    /// Many-to-many relation (requires edge/join entity).
    ManyToMany,
}

impl Cardinality {
    /// Check whether a source row links to at most one target row.
    pub fn is_to_one(&self) -> bool {
        matches!(self, Cardinality::ManyToOne | Cardinality::OneToOne)
    }
}

/// A relation definition, owned by its source entity.
///
/// For to-one relations `foreign_key` is a field of `from_entity` holding the
/// identity of the target row. For to-many relations it names the field on
/// `to_entity` that points back at the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDef {
    /// Relation name (unique within its source entity).
    pub name: String,
    /// Source entity name.
    pub from_entity: String,
    /// Target entity name.
    pub to_entity: String,
    /// Relation cardinality.
    pub cardinality: Cardinality,
    /// Foreign key field.
    pub foreign_key: String,
    /// Edge entity for many-to-many relations.
    #[serde(default)]
    pub edge_entity: Option<String>,
}

impl RelationDef {
    /// Create a many-to-one ("belongs to") relation.
    pub fn many_to_one(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        foreign_key: impl Into<String>,
        to_entity: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            from_entity: from_entity.into(),
            to_entity: to_entity.into(),
            cardinality: Cardinality::ManyToOne,
            foreign_key: foreign_key.into(),
            edge_entity: None,
        }
    }

    /// Create a one-to-one relation.
    pub fn one_to_one(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        foreign_key: impl Into<String>,
        to_entity: impl Into<String>,
    ) -> Self {
        Self {
            cardinality: Cardinality::OneToOne,
            ..Self::many_to_one(name, from_entity, foreign_key, to_entity)
        }
    }

    /// Create a one-to-many ("has many") relation.
    pub fn one_to_many(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        to_entity: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            from_entity: from_entity.into(),
            to_entity: to_entity.into(),
            cardinality: Cardinality::OneToMany,
            foreign_key: foreign_key.into(),
            edge_entity: None,
        }
    }

    /// Create a many-to-many relation.
    pub fn many_to_many(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        to_entity: impl Into<String>,
        edge_entity: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            from_entity: from_entity.into(),
            to_entity: to_entity.into(),
            cardinality: Cardinality::ManyToMany,
            foreign_key: String::new(),
            edge_entity: Some(edge_entity.into()),
        }
    }

    /// Check if this relation can be traversed by a projection path.
    pub fn is_to_one(&self) -> bool {
        self.cardinality.is_to_one()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_many_to_one_relation() {
        let rel = RelationDef::many_to_one("post", "Comment", "post_id", "Post");

        assert_eq!(rel.cardinality, Cardinality::ManyToOne);
        assert_eq!(rel.from_entity, "Comment");
        assert_eq!(rel.to_entity, "Post");
        assert_eq!(rel.foreign_key, "post_id");
        assert!(rel.is_to_one());
    }

    #[test]
    fn test_one_to_one_relation() {
        let rel = RelationDef::one_to_one("profile", "User", "profile_id", "Profile");
        assert_eq!(rel.cardinality, Cardinality::OneToOne);
        assert!(rel.is_to_one());
    }

    #[test]
    fn test_to_many_relations_are_not_to_one() {
        let posts = RelationDef::one_to_many("posts", "User", "Post", "user_id");
        assert!(!posts.is_to_one());

        let tags = RelationDef::many_to_many("tags", "Post", "Tag", "PostTag");
        assert!(!tags.is_to_one());
        assert_eq!(tags.edge_entity.as_deref(), Some("PostTag"));
    }
}
