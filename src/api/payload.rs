//! Request bodies and their conversion into validated store inputs.
//!
//! Every field is optional at the serde level so that a missing field turns
//! into a field error instead of a JSON rejection.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::api::validation::{self as check, FieldErrors};
use crate::database::models::{normalize_email, NewRecipe, RecipeChanges};
use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct CreateUserPayload {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

/// Registration input after validation, email normalized
#[derive(Debug)]
pub struct ValidUser {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl CreateUserPayload {
    pub fn validate(self, min_password_length: usize) -> Result<ValidUser, ApiError> {
        let mut errors = FieldErrors::new();

        let email = errors.require("email", self.email.map(|e| normalize_email(&e)));
        let password = errors.require("password", self.password);
        let name = errors.require("name", self.name);

        if let Some(email) = &email {
            errors.check("email", check::email(email));
        }
        if let Some(password) = &password {
            errors.check("password", check::password(password, min_password_length));
        }
        if let Some(name) = &name {
            errors.check("name", check::text(name));
        }
        errors.into_result()?;

        match (email, password, name) {
            (Some(email), Some(password), Some(name)) => Ok(ValidUser {
                email,
                password,
                name,
            }),
            _ => Err(ApiError::bad_request("Incomplete user payload")),
        }
    }
}

/// Profile update; with `partial == false` all fields are required
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserPayload {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

/// Validated profile changes; the password is still plain text
#[derive(Debug, Default)]
pub struct ValidUserChanges {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

impl UpdateUserPayload {
    pub fn validate(self, partial: bool, min_password_length: usize) -> Result<ValidUserChanges, ApiError> {
        let mut errors = FieldErrors::new();

        if !partial {
            errors.require("email", self.email.as_ref());
            errors.require("password", self.password.as_ref());
            errors.require("name", self.name.as_ref());
        }

        let email = self.email.map(|e| normalize_email(&e));
        if let Some(email) = &email {
            errors.check("email", check::email(email));
        }
        if let Some(password) = &self.password {
            errors.check("password", check::password(password, min_password_length));
        }
        if let Some(name) = &self.name {
            errors.check("name", check::text(name));
        }
        errors.into_result()?;

        Ok(ValidUserChanges {
            email,
            password: self.password,
            name: self.name,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TokenPayload {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl TokenPayload {
    /// Returns the normalized email and password
    pub fn validate(self) -> Result<(String, String), ApiError> {
        let mut errors = FieldErrors::new();
        let email = errors.require("email", self.email.filter(|e| !e.trim().is_empty()));
        let password = errors.require("password", self.password.filter(|p| !p.is_empty()));
        errors.into_result()?;

        match (email, password) {
            (Some(email), Some(password)) => Ok((normalize_email(&email), password)),
            _ => Err(ApiError::bad_request("Incomplete credentials")),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshPayload {
    pub refresh: Option<String>,
}

impl RefreshPayload {
    pub fn validate(self) -> Result<String, ApiError> {
        let mut errors = FieldErrors::new();
        let refresh = errors.require("refresh", self.refresh.filter(|r| !r.is_empty()));
        errors.into_result()?;
        refresh.ok_or_else(|| ApiError::bad_request("Missing refresh token"))
    }
}

/// Body of `POST /recipe/tags` and `POST /recipe/ingredients`
#[derive(Debug, Default, Deserialize)]
pub struct AttributePayload {
    pub name: Option<String>,
}

impl AttributePayload {
    pub fn validate(self) -> Result<String, ApiError> {
        let mut errors = FieldErrors::new();
        let name = errors.require("name", self.name);
        if let Some(name) = &name {
            errors.check("name", check::text(name));
        }
        errors.into_result()?;
        name.ok_or_else(|| ApiError::bad_request("Missing name"))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RecipePayload {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub link: Option<String>,
    pub tags: Option<Vec<i64>>,
    pub ingredients: Option<Vec<i64>>,
}

impl RecipePayload {
    fn check_fields(&self, errors: &mut FieldErrors) {
        if let Some(title) = &self.title {
            errors.check("title", check::text(title));
        }
        if let Some(minutes) = self.time_minutes {
            errors.check("time_minutes", check::time_minutes(minutes));
        }
        if let Some(price) = self.price {
            errors.check("price", check::price(price));
        }
        if let Some(link) = &self.link {
            errors.check("link", check::max_length(link));
        }
    }

    /// Full representation for create and PUT. Omitted link and id lists
    /// default to empty.
    pub fn into_new_recipe(self) -> Result<NewRecipe, ApiError> {
        let mut errors = FieldErrors::new();
        self.check_fields(&mut errors);
        let title = errors.require("title", self.title);
        let time_minutes = errors.require("time_minutes", self.time_minutes);
        let price = errors.require("price", self.price);
        errors.into_result()?;

        match (title, time_minutes, price) {
            (Some(title), Some(time_minutes), Some(price)) => Ok(NewRecipe {
                title,
                time_minutes,
                price,
                link: self.link.unwrap_or_default(),
                tags: self.tags.unwrap_or_default(),
                ingredients: self.ingredients.unwrap_or_default(),
            }),
            _ => Err(ApiError::bad_request("Incomplete recipe payload")),
        }
    }

    /// PUT semantics expressed as a change set that touches every column
    pub fn into_replacement(self) -> Result<RecipeChanges, ApiError> {
        let recipe = self.into_new_recipe()?;
        Ok(RecipeChanges {
            title: Some(recipe.title),
            time_minutes: Some(recipe.time_minutes),
            price: Some(recipe.price),
            link: Some(recipe.link),
            tags: Some(recipe.tags),
            ingredients: Some(recipe.ingredients),
        })
    }

    pub fn into_changes(self) -> Result<RecipeChanges, ApiError> {
        let mut errors = FieldErrors::new();
        self.check_fields(&mut errors);
        errors.into_result()?;

        Ok(RecipeChanges {
            title: self.title,
            time_minutes: self.time_minutes,
            price: self.price,
            link: self.link,
            tags: self.tags,
            ingredients: self.ingredients,
        })
    }
}
