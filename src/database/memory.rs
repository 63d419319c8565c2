use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::database::models::{
    Attribute, AttributeKind, NewRecipe, NewUser, Recipe, RecipeChanges, User, UserChanges,
};
use crate::database::store::{distinct_ids, ensure_all_found, Store, StoreError};
use crate::filter::{AttributeFilter, RecipeFilter};

/// In-process backend used when no database URL is configured, and by tests
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    sequences: HashMap<&'static str, i64>,
    users: BTreeMap<i64, User>,
    attributes: HashMap<AttributeKind, BTreeMap<i64, Attribute>>,
    recipes: BTreeMap<i64, Recipe>,
}

impl Tables {
    fn next_id(&mut self, table: &'static str) -> i64 {
        let seq = self.sequences.entry(table).or_insert(0);
        *seq += 1;
        *seq
    }

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn owned_ids(&self, kind: AttributeKind, owner: i64, ids: &[i64]) -> Vec<i64> {
        self.attributes
            .get(&kind)
            .map(|rows| {
                ids.iter()
                    .copied()
                    .filter(|id| rows.get(id).is_some_and(|a| a.user_id == owner))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Distinct, owner-checked, ascending id list for an association
    fn resolve_links(
        &self,
        kind: AttributeKind,
        owner: i64,
        requested: &[i64],
    ) -> Result<Vec<i64>, StoreError> {
        let requested = distinct_ids(requested);
        let found = self.owned_ids(kind, owner, &requested);
        ensure_all_found(kind, &requested, &found)?;

        let mut ids = requested;
        ids.sort_unstable();
        Ok(ids)
    }

    fn owned_recipe_mut(&mut self, owner: i64, id: i64) -> Result<&mut Recipe, StoreError> {
        self.recipes
            .get_mut(&id)
            .filter(|r| r.user_id == owner)
            .ok_or(StoreError::NotFound("Recipe"))
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let _tables = self.tables.read().await;
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&user.email, None) {
            return Err(StoreError::DuplicateEmail(user.email));
        }

        let now = Utc::now();
        let id = tables.next_id("users");
        let row = User {
            id,
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(id, row.clone());
        Ok(row)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(email) = &changes.email {
            if tables.email_taken(email, Some(id)) {
                return Err(StoreError::DuplicateEmail(email.clone()));
            }
        }

        let user = tables.users.get_mut(&id).ok_or(StoreError::NotFound("User"))?;
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn list_attributes(
        &self,
        kind: AttributeKind,
        owner: i64,
        filter: AttributeFilter,
    ) -> Result<Vec<Attribute>, StoreError> {
        let tables = self.tables.read().await;
        let Some(rows) = tables.attributes.get(&kind) else {
            return Ok(vec![]);
        };

        let mut list: Vec<Attribute> = rows
            .values()
            .filter(|a| a.user_id == owner)
            .filter(|a| {
                !filter.assigned_only
                    || tables
                        .recipes
                        .values()
                        .any(|r| r.user_id == owner && r.attribute_ids(kind).contains(&a.id))
            })
            .cloned()
            .collect();

        list.sort_by(|a, b| b.name.cmp(&a.name).then(b.id.cmp(&a.id)));
        Ok(list)
    }

    async fn create_attribute(
        &self,
        kind: AttributeKind,
        owner: i64,
        name: &str,
    ) -> Result<Attribute, StoreError> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id(kind.table());
        let row = Attribute {
            id,
            name: name.to_string(),
            user_id: owner,
        };
        tables.attributes.entry(kind).or_default().insert(id, row.clone());
        Ok(row)
    }

    async fn find_attributes(
        &self,
        kind: AttributeKind,
        owner: i64,
        ids: &[i64],
    ) -> Result<Vec<Attribute>, StoreError> {
        let tables = self.tables.read().await;
        let Some(rows) = tables.attributes.get(&kind) else {
            return Ok(vec![]);
        };

        Ok(rows
            .values()
            .filter(|a| a.user_id == owner && ids.contains(&a.id))
            .cloned()
            .collect())
    }

    async fn list_recipes(&self, owner: i64, filter: &RecipeFilter) -> Result<Vec<Recipe>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .recipes
            .values()
            .rev()
            .filter(|r| r.user_id == owner && filter.matches(r))
            .cloned()
            .collect())
    }

    async fn find_recipe(&self, owner: i64, id: i64) -> Result<Option<Recipe>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.recipes.get(&id).filter(|r| r.user_id == owner).cloned())
    }

    async fn create_recipe(&self, owner: i64, recipe: NewRecipe) -> Result<Recipe, StoreError> {
        let mut tables = self.tables.write().await;
        let tags = tables.resolve_links(AttributeKind::Tag, owner, &recipe.tags)?;
        let ingredients = tables.resolve_links(AttributeKind::Ingredient, owner, &recipe.ingredients)?;

        let id = tables.next_id("recipes");
        let row = Recipe {
            id,
            user_id: owner,
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
            image: None,
            tags,
            ingredients,
        };
        tables.recipes.insert(id, row.clone());
        Ok(row)
    }

    async fn update_recipe(
        &self,
        owner: i64,
        id: i64,
        changes: RecipeChanges,
    ) -> Result<Recipe, StoreError> {
        let mut tables = self.tables.write().await;
        tables.owned_recipe_mut(owner, id)?;

        // Resolve every reference before touching the row
        let tags = changes
            .tags
            .as_deref()
            .map(|ids| tables.resolve_links(AttributeKind::Tag, owner, ids))
            .transpose()?;
        let ingredients = changes
            .ingredients
            .as_deref()
            .map(|ids| tables.resolve_links(AttributeKind::Ingredient, owner, ids))
            .transpose()?;

        let recipe = tables.owned_recipe_mut(owner, id)?;
        if let Some(title) = changes.title {
            recipe.title = title;
        }
        if let Some(time_minutes) = changes.time_minutes {
            recipe.time_minutes = time_minutes;
        }
        if let Some(price) = changes.price {
            recipe.price = price;
        }
        if let Some(link) = changes.link {
            recipe.link = link;
        }
        if let Some(tags) = tags {
            recipe.tags = tags;
        }
        if let Some(ingredients) = ingredients {
            recipe.ingredients = ingredients;
        }
        Ok(recipe.clone())
    }

    async fn delete_recipe(&self, owner: i64, id: i64) -> Result<Recipe, StoreError> {
        let mut tables = self.tables.write().await;
        tables.owned_recipe_mut(owner, id)?;
        tables.recipes.remove(&id).ok_or(StoreError::NotFound("Recipe"))
    }

    async fn set_recipe_image(
        &self,
        owner: i64,
        id: i64,
        image: Option<String>,
    ) -> Result<(Recipe, Option<String>), StoreError> {
        let mut tables = self.tables.write().await;
        let recipe = tables.owned_recipe_mut(owner, id)?;
        let previous = std::mem::replace(&mut recipe.image, image);
        Ok((recipe.clone(), previous))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    async fn user(store: &MemoryStore, email: &str) -> User {
        store
            .create_user(NewUser {
                email: email.to_string(),
                name: "Test".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap()
    }

    fn new_recipe(title: &str, tags: Vec<i64>, ingredients: Vec<i64>) -> NewRecipe {
        NewRecipe {
            title: title.to_string(),
            time_minutes: 10,
            price: Decimal::new(500, 2),
            link: String::new(),
            tags,
            ingredients,
        }
    }

    #[tokio::test]
    async fn rejects_duplicate_email() {
        let store = MemoryStore::new();
        user(&store, "test@test.com").await;
        let err = store
            .create_user(NewUser {
                email: "test@test.com".to_string(),
                name: "Other".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail(_)));
    }

    #[tokio::test]
    async fn attributes_are_scoped_and_ordered() {
        let store = MemoryStore::new();
        let joe = user(&store, "joe@test.com").await;
        let ann = user(&store, "ann@test.com").await;

        store.create_attribute(AttributeKind::Tag, joe.id, "Dessert").await.unwrap();
        store.create_attribute(AttributeKind::Tag, joe.id, "Vegan").await.unwrap();
        store.create_attribute(AttributeKind::Tag, ann.id, "Fruity").await.unwrap();

        let names: Vec<String> = store
            .list_attributes(AttributeKind::Tag, joe.id, AttributeFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["Vegan", "Dessert"]);

        let ingredients = store
            .list_attributes(AttributeKind::Ingredient, joe.id, AttributeFilter::default())
            .await
            .unwrap();
        assert!(ingredients.is_empty());
    }

    #[tokio::test]
    async fn assigned_only_lists_attached_once() {
        let store = MemoryStore::new();
        let joe = user(&store, "joe@test.com").await;
        let beef = store.create_attribute(AttributeKind::Ingredient, joe.id, "Beef").await.unwrap();
        store.create_attribute(AttributeKind::Ingredient, joe.id, "Salt").await.unwrap();

        store.create_recipe(joe.id, new_recipe("Stew", vec![], vec![beef.id])).await.unwrap();
        store.create_recipe(joe.id, new_recipe("Roast", vec![], vec![beef.id])).await.unwrap();

        let assigned = store
            .list_attributes(
                AttributeKind::Ingredient,
                joe.id,
                AttributeFilter { assigned_only: true },
            )
            .await
            .unwrap();
        assert_eq!(assigned, vec![beef]);
    }

    #[tokio::test]
    async fn recipe_links_are_distinct_and_owner_checked() {
        let store = MemoryStore::new();
        let joe = user(&store, "joe@test.com").await;
        let ann = user(&store, "ann@test.com").await;
        let vegan = store.create_attribute(AttributeKind::Tag, joe.id, "Vegan").await.unwrap();
        let dessert = store.create_attribute(AttributeKind::Tag, joe.id, "Dessert").await.unwrap();
        let foreign = store.create_attribute(AttributeKind::Tag, ann.id, "Foreign").await.unwrap();

        let recipe = store
            .create_recipe(
                joe.id,
                new_recipe("Cake", vec![dessert.id, vegan.id, dessert.id], vec![]),
            )
            .await
            .unwrap();
        assert_eq!(recipe.tags, vec![vegan.id, dessert.id]);

        let err = store
            .create_recipe(joe.id, new_recipe("Stolen", vec![foreign.id], vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownReference { field: "tags", .. }));
        assert_eq!(store.list_recipes(joe.id, &RecipeFilter::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn other_owner_cannot_touch_recipe() {
        let store = MemoryStore::new();
        let joe = user(&store, "joe@test.com").await;
        let ann = user(&store, "ann@test.com").await;
        let recipe = store.create_recipe(joe.id, new_recipe("Soup", vec![], vec![])).await.unwrap();

        assert!(store.find_recipe(ann.id, recipe.id).await.unwrap().is_none());
        assert!(matches!(
            store.update_recipe(ann.id, recipe.id, RecipeChanges::default()).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_recipe(ann.id, recipe.id).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(store.find_recipe(joe.id, recipe.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn partial_update_keeps_untouched_fields() {
        let store = MemoryStore::new();
        let joe = user(&store, "joe@test.com").await;
        let tag = store.create_attribute(AttributeKind::Tag, joe.id, "Curry").await.unwrap();
        let recipe = store
            .create_recipe(joe.id, new_recipe("Curry", vec![tag.id], vec![]))
            .await
            .unwrap();

        let updated = store
            .update_recipe(
                joe.id,
                recipe.id,
                RecipeChanges {
                    title: Some("Thai curry".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Thai curry");
        assert_eq!(updated.tags, vec![tag.id]);
        assert_eq!(updated.price, recipe.price);

        let cleared = store
            .update_recipe(
                joe.id,
                recipe.id,
                RecipeChanges {
                    tags: Some(vec![]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(cleared.tags.is_empty());
    }

    #[tokio::test]
    async fn image_swap_returns_replaced_reference() {
        let store = MemoryStore::new();
        let joe = user(&store, "joe@test.com").await;
        let ann = user(&store, "ann@test.com").await;
        let recipe = store.create_recipe(joe.id, new_recipe("Pie", vec![], vec![])).await.unwrap();

        let (first, previous) = store
            .set_recipe_image(joe.id, recipe.id, Some("/media/a.png".to_string()))
            .await
            .unwrap();
        assert_eq!(first.image.as_deref(), Some("/media/a.png"));
        assert!(previous.is_none());

        let (second, previous) = store
            .set_recipe_image(joe.id, recipe.id, Some("/media/b.png".to_string()))
            .await
            .unwrap();
        assert_eq!(second.image.as_deref(), Some("/media/b.png"));
        assert_eq!(previous.as_deref(), Some("/media/a.png"));

        assert!(matches!(
            store.set_recipe_image(ann.id, recipe.id, None).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn attribute_names_sort_by_byte_order() {
        let store = MemoryStore::new();
        let joe = user(&store, "joe@test.com").await;
        store.create_attribute(AttributeKind::Tag, joe.id, "Banana").await.unwrap();
        store.create_attribute(AttributeKind::Tag, joe.id, "apple").await.unwrap();

        let names: Vec<String> = store
            .list_attributes(AttributeKind::Tag, joe.id, AttributeFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["apple", "Banana"]);
    }
}
