//! Public wire representations of stored records

use rust_decimal::Decimal;
use serde::Serialize;

use crate::database::models::{Attribute, Recipe, User};

/// Prices are always rendered with two decimal places, e.g. `"5.00"`
pub fn format_price(price: Decimal) -> Decimal {
    let mut price = price;
    price.rescale(2);
    price
}

/// `{email, name}`; never includes the password
#[derive(Debug, Serialize)]
pub struct UserView {
    pub email: String,
    pub name: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeView {
    pub id: i64,
    pub name: String,
}

impl From<Attribute> for AttributeView {
    fn from(attribute: Attribute) -> Self {
        Self {
            id: attribute.id,
            name: attribute.name,
        }
    }
}

/// List and write representation; associations as id lists
#[derive(Debug, Serialize)]
pub struct RecipeView {
    pub id: i64,
    pub title: String,
    pub ingredients: Vec<i64>,
    pub tags: Vec<i64>,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
}

impl From<Recipe> for RecipeView {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title,
            ingredients: recipe.ingredients,
            tags: recipe.tags,
            time_minutes: recipe.time_minutes,
            price: format_price(recipe.price),
            link: recipe.link,
        }
    }
}

/// Detail representation; associations expanded to `{id, name}`
#[derive(Debug, Serialize)]
pub struct RecipeDetailView {
    pub id: i64,
    pub title: String,
    pub ingredients: Vec<AttributeView>,
    pub tags: Vec<AttributeView>,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub image: Option<String>,
}

impl RecipeDetailView {
    pub fn new(recipe: Recipe, tags: Vec<Attribute>, ingredients: Vec<Attribute>) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title,
            ingredients: ingredients.into_iter().map(AttributeView::from).collect(),
            tags: tags.into_iter().map(AttributeView::from).collect(),
            time_minutes: recipe.time_minutes,
            price: format_price(recipe.price),
            link: recipe.link,
            image: recipe.image,
        }
    }
}

/// Response of the image upload endpoint
#[derive(Debug, Serialize)]
pub struct RecipeImageView {
    pub id: i64,
    pub image: Option<String>,
}

impl From<Recipe> for RecipeImageView {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            image: recipe.image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recipe() -> Recipe {
        Recipe {
            id: 7,
            user_id: 1,
            title: "Thai Curry".to_string(),
            time_minutes: 30,
            price: Decimal::new(55, 1),
            link: String::new(),
            image: None,
            tags: vec![2],
            ingredients: vec![4, 5],
        }
    }

    #[test]
    fn flat_view_serializes_price_as_two_place_string() {
        let value = serde_json::to_value(RecipeView::from(recipe())).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 7,
                "title": "Thai Curry",
                "ingredients": [4, 5],
                "tags": [2],
                "time_minutes": 30,
                "price": "5.50",
                "link": ""
            })
        );
    }

    #[test]
    fn detail_view_expands_associations() {
        let tag = Attribute {
            id: 2,
            name: "Vegan".to_string(),
            user_id: 1,
        };
        let view = RecipeDetailView::new(recipe(), vec![tag], vec![]);
        let value = serde_json::to_value(view).unwrap();
        assert_eq!(value["tags"], json!([{"id": 2, "name": "Vegan"}]));
        assert_eq!(value["ingredients"], json!([]));
        assert!(value["image"].is_null());
        assert!(value.get("user_id").is_none());
    }
}
