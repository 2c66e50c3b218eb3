//! Path parsing and relation resolution.
//!
//! A path such as `post.user.name` starts at a root entity, hops across one
//! to-one relation per non-terminal segment and ends at an attribute of the
//! entity reached. Paths are validated against the [`SchemaBundle`] before any
//! row is fetched.

use std::fmt;

use crate::catalog::{RelationDef, SchemaBundle};
use crate::error::Error;

/// Separator between path segments.
pub const PATH_SEPARATOR: char = '.';

/// A validated attribute path.
///
/// `segments` is never empty. The resolved relation of every hop is kept
/// alongside the segments so that per-level lookups need no further schema
/// access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    root_entity: String,
    segments: Vec<String>,
    hops: Vec<RelationDef>,
}

impl FieldPath {
    /// Entity type the traversal starts from.
    pub fn root_entity(&self) -> &str {
        &self.root_entity
    }

    /// Path segments: relation names followed by the terminal attribute.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of relation hops (0 for a local attribute).
    pub fn depth(&self) -> usize {
        self.segments.len() - 1
    }

    /// True if at least two more segments follow `level`, i.e. the path still
    /// crosses a relation at `level`.
    pub fn is_nested(&self, level: usize) -> bool {
        level + 2 <= self.segments.len()
    }

    /// Key of the relation chain up to and including `level`, e.g.
    /// `post.user` for `post.user.name` at level 1.
    pub fn prefix(&self, level: usize) -> String {
        let end = (level + 1).min(self.segments.len());
        self.segments[..end].join(".")
    }

    /// Resolved relation crossed at `level`.
    pub fn relation_at(&self, level: usize) -> Result<&RelationDef, Error> {
        self.hops.get(level).ok_or_else(|| {
            Error::Internal(format!(
                "path '{}' has no relation at level {}",
                self.spec(),
                level
            ))
        })
    }

    /// Terminal attribute name.
    pub fn terminal(&self) -> &str {
        self.segments
            .last()
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Column the path needs from the root row: the first foreign key for a
    /// nested path, otherwise the attribute itself.
    pub fn root_column(&self) -> &str {
        match self.hops.first() {
            Some(relation) => &relation.foreign_key,
            None => self.terminal(),
        }
    }

    /// Column the path needs from the rows loaded at `level`: the next foreign
    /// key if the path continues past `level + 1`, otherwise the terminal
    /// attribute.
    pub fn column_at(&self, level: usize) -> &str {
        match self.hops.get(level + 1) {
            Some(relation) => &relation.foreign_key,
            None => self.terminal(),
        }
    }

    /// The dotted form of this path.
    pub fn spec(&self) -> String {
        self.segments.join(".")
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.root_entity, self.spec())
    }
}

/// Parses raw path specs against a schema.
pub struct PathResolver<'a> {
    schema: &'a SchemaBundle,
}

impl<'a> PathResolver<'a> {
    /// Create a resolver over a schema.
    pub fn new(schema: &'a SchemaBundle) -> Self {
        Self { schema }
    }

    /// Parse and validate one path.
    ///
    /// Every non-terminal segment must name a to-one relation of the entity
    /// reached so far and the terminal segment must be a field of the last
    /// entity.
    pub fn parse(&self, root_entity: &str, raw: &str) -> Result<FieldPath, Error> {
        let segments = split_segments(raw)?;

        let mut current = self
            .schema
            .get_entity(root_entity)
            .ok_or_else(|| Error::UnknownEntity(root_entity.to_string()))?;
        let mut hops = Vec::with_capacity(segments.len() - 1);

        for name in &segments[..segments.len() - 1] {
            let relation = self.to_one_relation(&current.name, name)?;
            current = self
                .schema
                .get_entity(&relation.to_entity)
                .ok_or_else(|| Error::UnknownEntity(relation.to_entity.clone()))?;
            hops.push(relation.clone());
        }

        let terminal = &segments[segments.len() - 1];
        if !current.has_field(terminal) {
            return Err(Error::UnknownField {
                entity: current.name.clone(),
                field: terminal.clone(),
            });
        }

        Ok(FieldPath {
            root_entity: root_entity.to_string(),
            segments,
            hops,
        })
    }

    /// Parse a list of paths, failing on the first invalid one.
    pub fn parse_all<S: AsRef<str>>(
        &self,
        root_entity: &str,
        raws: &[S],
    ) -> Result<Vec<FieldPath>, Error> {
        raws.iter()
            .map(|raw| self.parse(root_entity, raw.as_ref()))
            .collect()
    }

    /// Re-derive the relation crossed at `level` by walking the path from its
    /// root, re-validating every hop against the schema.
    pub fn relation_at(&self, path: &FieldPath, level: usize) -> Result<RelationDef, Error> {
        if !path.is_nested(level) {
            return Err(Error::InvalidPath(format!(
                "'{}' crosses no relation at level {}",
                path.spec(),
                level
            )));
        }

        let mut entity = path.root_entity().to_string();
        let mut relation = None;
        for name in &path.segments()[..=level] {
            let hop = self.to_one_relation(&entity, name)?;
            entity = hop.to_entity.clone();
            relation = Some(hop);
        }

        relation
            .cloned()
            .ok_or_else(|| Error::Internal(format!("no relation resolved for '{}'", path.spec())))
    }

    fn to_one_relation(&self, entity: &str, name: &str) -> Result<&'a RelationDef, Error> {
        let relation =
            self.schema
                .relation(entity, name)
                .ok_or_else(|| Error::UnknownRelation {
                    entity: entity.to_string(),
                    relation: name.to_string(),
                })?;

        if !relation.is_to_one() {
            return Err(Error::UnsupportedRelationKind {
                entity: entity.to_string(),
                relation: name.to_string(),
                cardinality: relation.cardinality,
            });
        }

        Ok(relation)
    }
}

fn split_segments(raw: &str) -> Result<Vec<String>, Error> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::InvalidPath("empty path".into()));
    }

    let segments: Vec<String> = raw
        .split(PATH_SEPARATOR)
        .map(|s| s.trim().to_string())
        .collect();
    if segments.iter().any(String::is_empty) {
        return Err(Error::InvalidPath(format!("empty segment in '{}'", raw)));
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Cardinality, EntityDef, FieldDef, RelationDef, ScalarType};

    fn schema() -> SchemaBundle {
        let id = || FieldDef::new("id", ScalarType::Int64);
        SchemaBundle::new()
            .with_entity(
                EntityDef::new("Company", "id")
                    .with_field(id())
                    .with_field(FieldDef::new("name", ScalarType::String)),
            )
            .with_entity(
                EntityDef::new("User", "id")
                    .with_field(id())
                    .with_field(FieldDef::new("name", ScalarType::String))
                    .with_field(FieldDef::optional("company_id", ScalarType::Int64)),
            )
            .with_entity(
                EntityDef::new("Post", "id")
                    .with_field(id())
                    .with_field(FieldDef::new("title", ScalarType::String))
                    .with_field(FieldDef::optional("user_id", ScalarType::Int64)),
            )
            .with_entity(
                EntityDef::new("Comment", "id")
                    .with_field(id())
                    .with_field(FieldDef::new("text", ScalarType::String))
                    .with_field(FieldDef::optional("post_id", ScalarType::Int64)),
            )
            .with_relation(RelationDef::many_to_one("post", "Comment", "post_id", "Post"))
            .with_relation(RelationDef::many_to_one("user", "Post", "user_id", "User"))
            .with_relation(RelationDef::many_to_one(
                "company",
                "User",
                "company_id",
                "Company",
            ))
            .with_relation(RelationDef::one_to_many("posts", "User", "Post", "user_id"))
    }

    #[test]
    fn test_parse_local_attribute() {
        let schema = schema();
        let path = PathResolver::new(&schema).parse("Comment", "text").unwrap();

        assert_eq!(path.depth(), 0);
        assert!(!path.is_nested(0));
        assert_eq!(path.root_column(), "text");
        assert_eq!(path.terminal(), "text");
    }

    #[test]
    fn test_parse_nested_path() {
        let schema = schema();
        let path = PathResolver::new(&schema)
            .parse("Comment", "post.user.company.name")
            .unwrap();

        assert_eq!(path.depth(), 3);
        assert!(path.is_nested(0));
        assert!(path.is_nested(2));
        assert!(!path.is_nested(3));
        assert_eq!(path.prefix(0), "post");
        assert_eq!(path.prefix(1), "post.user");
        assert_eq!(path.prefix(2), "post.user.company");
        assert_eq!(path.root_column(), "post_id");
        assert_eq!(path.column_at(0), "user_id");
        assert_eq!(path.column_at(1), "company_id");
        assert_eq!(path.column_at(2), "name");
        assert_eq!(path.relation_at(1).unwrap().to_entity, "User");
    }

    #[test]
    fn test_relation_at_rewalk_matches_memoized() {
        let schema = schema();
        let resolver = PathResolver::new(&schema);
        let path = resolver.parse("Comment", "post.user.company.name").unwrap();

        for level in 0..path.depth() {
            assert_eq!(
                &resolver.relation_at(&path, level).unwrap(),
                path.relation_at(level).unwrap()
            );
        }
        assert!(matches!(
            resolver.relation_at(&path, 3),
            Err(Error::InvalidPath(_))
        ));
    }

    #[test]
    fn test_to_many_hop_is_rejected() {
        let schema = schema();
        let err = PathResolver::new(&schema)
            .parse("Post", "user.posts.title")
            .unwrap_err();

        match err {
            Error::UnsupportedRelationKind {
                entity,
                relation,
                cardinality,
            } => {
                assert_eq!(entity, "User");
                assert_eq!(relation, "posts");
                assert_eq!(cardinality, Cardinality::OneToMany);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_names() {
        let schema = schema();
        let resolver = PathResolver::new(&schema);

        assert!(matches!(
            resolver.parse("Nope", "id"),
            Err(Error::UnknownEntity(_))
        ));
        assert!(matches!(
            resolver.parse("Comment", "author.name"),
            Err(Error::UnknownRelation { .. })
        ));
        assert!(matches!(
            resolver.parse("Comment", "post.body"),
            Err(Error::UnknownField { .. })
        ));
    }

    #[test]
    fn test_malformed_paths() {
        let schema = schema();
        let resolver = PathResolver::new(&schema);

        assert!(matches!(resolver.parse("Comment", ""), Err(Error::InvalidPath(_))));
        assert!(matches!(
            resolver.parse("Comment", "post..title"),
            Err(Error::InvalidPath(_))
        ));
        assert!(matches!(
            resolver.parse("Comment", "post.title."),
            Err(Error::InvalidPath(_))
        ));
    }

    #[test]
    fn test_parse_all_stops_at_first_error() {
        let schema = schema();
        let resolver = PathResolver::new(&schema);

        let paths = resolver.parse_all("Comment", &["text", "post.title"]).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(resolver
            .parse_all("Comment", &["text", "post.user.posts.title"])
            .is_err());
    }
}
