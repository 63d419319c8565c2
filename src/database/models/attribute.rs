use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Tags and ingredients share one shape: a name owned by a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    Tag,
    Ingredient,
}

impl AttributeKind {
    pub fn table(self) -> &'static str {
        match self {
            AttributeKind::Tag => "tags",
            AttributeKind::Ingredient => "ingredients",
        }
    }

    /// Join table linking recipes to this kind
    pub fn link_table(self) -> &'static str {
        match self {
            AttributeKind::Tag => "recipe_tags",
            AttributeKind::Ingredient => "recipe_ingredients",
        }
    }

    pub fn link_column(self) -> &'static str {
        match self {
            AttributeKind::Tag => "tag_id",
            AttributeKind::Ingredient => "ingredient_id",
        }
    }

    /// Request/response field name on a recipe
    pub fn field(self) -> &'static str {
        self.table()
    }

    pub fn label(self) -> &'static str {
        match self {
            AttributeKind::Tag => "Tag",
            AttributeKind::Ingredient => "Ingredient",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Attribute {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
}
