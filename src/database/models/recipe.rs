use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::attribute::AttributeKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub image: Option<String>,
    /// Associated tag ids, ascending
    pub tags: Vec<i64>,
    /// Associated ingredient ids, ascending
    pub ingredients: Vec<i64>,
}

impl Recipe {
    pub fn attribute_ids(&self, kind: AttributeKind) -> &[i64] {
        match kind {
            AttributeKind::Tag => &self.tags,
            AttributeKind::Ingredient => &self.ingredients,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub tags: Vec<i64>,
    pub ingredients: Vec<i64>,
}

/// Partial recipe update. A supplied id list replaces the whole association set.
#[derive(Debug, Clone, Default)]
pub struct RecipeChanges {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub link: Option<String>,
    pub tags: Option<Vec<i64>>,
    pub ingredients: Option<Vec<i64>>,
}

impl RecipeChanges {
    pub fn attribute_ids(&self, kind: AttributeKind) -> Option<&Vec<i64>> {
        match kind {
            AttributeKind::Tag => self.tags.as_ref(),
            AttributeKind::Ingredient => self.ingredients.as_ref(),
        }
    }
}
