//! Test data generation for benchmarks.
//!
//! Generates a deterministic blog graph: comments belong to posts, posts to
//! users and categories, users to companies. A share of the links is null so
//! that projections exercise short-circuiting.

use pluck_core::catalog::{EntityDef, FieldDef, RelationDef, ScalarType, SchemaBundle};
use pluck_core::store::Row;
use pluck_core::value::Value;
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Scale factor for benchmark data generation.
#[derive(Clone, Copy, Debug, Default)]
pub enum Scale {
    /// ~10 users, for quick iteration.
    Tiny,
    /// ~100 users.
    Small,
    /// ~2,000 users.
    #[default]
    Medium,
    /// ~100,000 users.
    Large,
}

impl Scale {
    /// Number of users at this scale.
    pub fn count(&self) -> usize {
        match self {
            Scale::Tiny => 10,
            Scale::Small => 100,
            Scale::Medium => 2_000,
            Scale::Large => 100_000,
        }
    }

    /// Posts per user.
    pub fn posts_per_user(&self) -> usize {
        match self {
            Scale::Tiny => 2,
            Scale::Small | Scale::Medium => 5,
            Scale::Large => 10,
        }
    }

    /// Comments per post.
    pub fn comments_per_post(&self) -> usize {
        match self {
            Scale::Tiny => 1,
            Scale::Small => 3,
            Scale::Medium => 2,
            Scale::Large => 5,
        }
    }
}

/// Rows for every blog entity.
#[derive(Debug, Default)]
pub struct BlogData {
    pub companies: Vec<Row>,
    pub users: Vec<Row>,
    pub categories: Vec<Row>,
    pub posts: Vec<Row>,
    pub comments: Vec<Row>,
}

impl BlogData {
    /// Entity name and rows, parents first.
    pub fn tables(&self) -> [(&'static str, &[Row]); 5] {
        [
            ("Company", self.companies.as_slice()),
            ("User", self.users.as_slice()),
            ("Category", self.categories.as_slice()),
            ("Post", self.posts.as_slice()),
            ("Comment", self.comments.as_slice()),
        ]
    }

    /// Total number of rows.
    pub fn len(&self) -> usize {
        self.tables().iter().map(|(_, rows)| rows.len()).sum()
    }

    /// Check if no rows were generated.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Generate a random string of specified length.
fn random_string(rng: &mut StdRng, len: usize) -> String {
    (0..len).map(|_| rng.sample(Alphanumeric) as char).collect()
}

/// Foreign key into `0..count`, null with probability `null_ratio`.
fn link(rng: &mut StdRng, count: usize, null_ratio: f64) -> Value {
    if count == 0 || rng.gen_bool(null_ratio) {
        Value::Null
    } else {
        Value::Int64(rng.gen_range(0..count) as i64)
    }
}

/// Generate the blog graph for a scale.
pub fn generate_blog(scale: Scale) -> BlogData {
    const SEED: u64 = 12345;
    let mut rng = StdRng::seed_from_u64(SEED);

    let users = scale.count();
    let companies = (users / 10).max(1);
    let categories = 8;
    let posts = users * scale.posts_per_user();
    let comments = posts * scale.comments_per_post();

    let mut data = BlogData::default();

    data.companies = (0..companies)
        .map(|i| {
            Row::new()
                .with("id", i as i64)
                .with("name", format!("Company {}", i))
        })
        .collect();

    data.users = (0..users)
        .map(|i| {
            Row::new()
                .with("id", i as i64)
                .with("name", format!("user_{}", i))
                .with("company_id", link(&mut rng, companies, 0.1))
        })
        .collect();

    data.categories = (0..categories)
        .map(|i| {
            Row::new()
                .with("id", i as i64)
                .with("name", format!("category {}", i))
        })
        .collect();

    data.posts = (0..posts)
        .map(|i| {
            let title = format!("Post {}: {}", i, random_string(&mut rng, 20));
            Row::new()
                .with("id", i as i64)
                .with("title", title)
                .with("user_id", Value::Int64((i % users) as i64))
                .with("category_id", link(&mut rng, categories, 0.05))
        })
        .collect();

    data.comments = (0..comments)
        .map(|i| {
            Row::new()
                .with("id", i as i64)
                .with("text", random_string(&mut rng, 60))
                .with("post_id", link(&mut rng, posts, 0.02))
        })
        .collect();

    data
}

/// Create the blog schema (Comment -> Post -> User -> Company, Post -> Category).
pub fn blog_schema() -> SchemaBundle {
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
            FieldDef::new("user_id", ScalarType::Int64),
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
        .with_relation(RelationDef::one_to_many("posts", "User", "Post", "user_id"))
        .with_relation(RelationDef::one_to_many("comments", "Post", "Comment", "post_id"))
}

/// Path lists of increasing depth over `Comment`.
pub fn paths_for_depth(depth: usize) -> Vec<&'static str> {
    match depth {
        0 => vec!["id", "text"],
        1 => vec!["text", "post.title"],
        2 => vec!["text", "post.title", "post.user.name"],
        3 => vec![
            "text",
            "post.title",
            "post.user.name",
            "post.user.company.name",
        ],
        _ => vec![
            "text",
            "post.title",
            "post.category.name",
            "post.user.name",
            "post.user.company.name",
        ],
    }
}
