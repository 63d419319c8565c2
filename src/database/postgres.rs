use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use std::collections::HashMap;

use crate::database::models::{
    Attribute, AttributeKind, NewRecipe, NewUser, Recipe, RecipeChanges, User, UserChanges,
};
use crate::database::store::{distinct_ids, ensure_all_found, Store, StoreError};
use crate::filter::{AttributeFilter, RecipeFilter};

const USER_COLUMNS: &str = "id, email, name, password_hash, is_active, created_at, updated_at";
const RECIPE_COLUMNS: &str = "id, user_id, title, time_minutes, price, link, image";

/// PostgreSQL backend over a shared connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct RecipeRow {
    id: i64,
    user_id: i64,
    title: String,
    time_minutes: i32,
    price: Decimal,
    link: String,
    image: Option<String>,
}

impl RecipeRow {
    fn into_recipe(self, tags: Vec<i64>, ingredients: Vec<i64>) -> Recipe {
        Recipe {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            time_minutes: self.time_minutes,
            price: self.price,
            link: self.link,
            image: self.image,
            tags,
            ingredients,
        }
    }
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Association ids per recipe, ascending
    async fn load_links(
        conn: &mut PgConnection,
        kind: AttributeKind,
        recipe_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<i64>>, StoreError> {
        if recipe_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!(
            "SELECT recipe_id, {col} FROM {link} WHERE recipe_id = ANY($1) ORDER BY {col}",
            col = kind.link_column(),
            link = kind.link_table(),
        );
        let pairs = sqlx::query_as::<_, (i64, i64)>(&sql)
            .bind(recipe_ids)
            .fetch_all(&mut *conn)
            .await?;

        let mut links: HashMap<i64, Vec<i64>> = HashMap::new();
        for (recipe_id, attribute_id) in pairs {
            links.entry(recipe_id).or_default().push(attribute_id);
        }
        Ok(links)
    }

    async fn hydrate(conn: &mut PgConnection, rows: Vec<RecipeRow>) -> Result<Vec<Recipe>, StoreError> {
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut tags = Self::load_links(conn, AttributeKind::Tag, &ids).await?;
        let mut ingredients = Self::load_links(conn, AttributeKind::Ingredient, &ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let id = row.id;
                row.into_recipe(
                    tags.remove(&id).unwrap_or_default(),
                    ingredients.remove(&id).unwrap_or_default(),
                )
            })
            .collect())
    }

    async fn hydrate_one(conn: &mut PgConnection, row: RecipeRow) -> Result<Recipe, StoreError> {
        Self::hydrate(conn, vec![row])
            .await?
            .pop()
            .ok_or(StoreError::NotFound("Recipe"))
    }

    /// Distinct requested ids, all of which must belong to `owner`
    async fn resolve_links(
        conn: &mut PgConnection,
        kind: AttributeKind,
        owner: i64,
        requested: &[i64],
    ) -> Result<Vec<i64>, StoreError> {
        let requested = distinct_ids(requested);
        if requested.is_empty() {
            return Ok(requested);
        }

        let sql = format!(
            "SELECT id FROM {} WHERE user_id = $1 AND id = ANY($2)",
            kind.table()
        );
        let found: Vec<i64> = sqlx::query_scalar(&sql)
            .bind(owner)
            .bind(&requested)
            .fetch_all(&mut *conn)
            .await?;

        ensure_all_found(kind, &requested, &found)?;
        Ok(requested)
    }

    async fn replace_links(
        conn: &mut PgConnection,
        kind: AttributeKind,
        recipe_id: i64,
        ids: &[i64],
    ) -> Result<(), StoreError> {
        let delete = format!("DELETE FROM {} WHERE recipe_id = $1", kind.link_table());
        sqlx::query(&delete).bind(recipe_id).execute(&mut *conn).await?;
        Self::insert_links(conn, kind, recipe_id, ids).await
    }

    async fn insert_links(
        conn: &mut PgConnection,
        kind: AttributeKind,
        recipe_id: i64,
        ids: &[i64],
    ) -> Result<(), StoreError> {
        if ids.is_empty() {
            return Ok(());
        }

        let sql = format!(
            "INSERT INTO {link} (recipe_id, {col}) SELECT $1, UNNEST($2::BIGINT[]) ON CONFLICT DO NOTHING",
            link = kind.link_table(),
            col = kind.link_column(),
        );
        sqlx::query(&sql)
            .bind(recipe_id)
            .bind(ids)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

fn duplicate_email(err: sqlx::Error, email: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::DuplicateEmail(email.to_string())
        }
        _ => StoreError::Sqlx(err),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users (email, name, password_hash) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| duplicate_email(e, &user.email))
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<User, StoreError> {
        let sql = format!(
            r#"
            UPDATE users SET
                email = COALESCE($2, email),
                name = COALESCE($3, name),
                password_hash = COALESCE($4, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let email = changes.email.clone().unwrap_or_default();
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(changes.email)
            .bind(changes.name)
            .bind(changes.password_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| duplicate_email(e, &email))?
            .ok_or(StoreError::NotFound("User"))
    }

    async fn list_attributes(
        &self,
        kind: AttributeKind,
        owner: i64,
        filter: AttributeFilter,
    ) -> Result<Vec<Attribute>, StoreError> {
        let sql = format!(
            r#"
            SELECT a.id, a.name, a.user_id
            FROM {table} a
            WHERE a.user_id = $1
            AND (NOT $2 OR EXISTS (
                SELECT 1 FROM {link} l
                JOIN recipes r ON r.id = l.recipe_id
                WHERE l.{col} = a.id AND r.user_id = $1
            ))
            ORDER BY a.name COLLATE "C" DESC, a.id DESC
            "#,
            table = kind.table(),
            link = kind.link_table(),
            col = kind.link_column(),
        );
        Ok(sqlx::query_as::<_, Attribute>(&sql)
            .bind(owner)
            .bind(filter.assigned_only)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn create_attribute(
        &self,
        kind: AttributeKind,
        owner: i64,
        name: &str,
    ) -> Result<Attribute, StoreError> {
        let sql = format!(
            "INSERT INTO {} (name, user_id) VALUES ($1, $2) RETURNING id, name, user_id",
            kind.table()
        );
        Ok(sqlx::query_as::<_, Attribute>(&sql)
            .bind(name)
            .bind(owner)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_attributes(
        &self,
        kind: AttributeKind,
        owner: i64,
        ids: &[i64],
    ) -> Result<Vec<Attribute>, StoreError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let sql = format!(
            "SELECT id, name, user_id FROM {} WHERE user_id = $1 AND id = ANY($2) ORDER BY id",
            kind.table()
        );
        Ok(sqlx::query_as::<_, Attribute>(&sql)
            .bind(owner)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_recipes(&self, owner: i64, filter: &RecipeFilter) -> Result<Vec<Recipe>, StoreError> {
        let sql = format!(
            r#"
            SELECT {cols} FROM recipes r
            WHERE r.user_id = $1
            AND ($2::BIGINT[] IS NULL OR EXISTS (
                SELECT 1 FROM recipe_tags rt WHERE rt.recipe_id = r.id AND rt.tag_id = ANY($2)
            ))
            AND ($3::BIGINT[] IS NULL OR EXISTS (
                SELECT 1 FROM recipe_ingredients ri WHERE ri.recipe_id = r.id AND ri.ingredient_id = ANY($3)
            ))
            ORDER BY r.id DESC
            "#,
            cols = RECIPE_COLUMNS
        );

        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, RecipeRow>(&sql)
            .bind(owner)
            .bind(filter.tags.clone())
            .bind(filter.ingredients.clone())
            .fetch_all(&mut *conn)
            .await?;

        Self::hydrate(&mut conn, rows).await
    }

    async fn find_recipe(&self, owner: i64, id: i64) -> Result<Option<Recipe>, StoreError> {
        let sql = format!(
            "SELECT {} FROM recipes WHERE id = $1 AND user_id = $2",
            RECIPE_COLUMNS
        );

        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, RecipeRow>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&mut *conn)
            .await?;

        match row {
            Some(row) => Ok(Some(Self::hydrate_one(&mut conn, row).await?)),
            None => Ok(None),
        }
    }

    async fn create_recipe(&self, owner: i64, recipe: NewRecipe) -> Result<Recipe, StoreError> {
        let mut tx = self.pool.begin().await?;

        let tags = Self::resolve_links(&mut tx, AttributeKind::Tag, owner, &recipe.tags).await?;
        let ingredients =
            Self::resolve_links(&mut tx, AttributeKind::Ingredient, owner, &recipe.ingredients).await?;

        let sql = format!(
            r#"
            INSERT INTO recipes (user_id, title, time_minutes, price, link)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            RECIPE_COLUMNS
        );
        let row = sqlx::query_as::<_, RecipeRow>(&sql)
            .bind(owner)
            .bind(&recipe.title)
            .bind(recipe.time_minutes)
            .bind(recipe.price)
            .bind(&recipe.link)
            .fetch_one(&mut *tx)
            .await?;

        Self::insert_links(&mut tx, AttributeKind::Tag, row.id, &tags).await?;
        Self::insert_links(&mut tx, AttributeKind::Ingredient, row.id, &ingredients).await?;

        let created = Self::hydrate_one(&mut tx, row).await?;
        tx.commit().await?;
        Ok(created)
    }

    async fn update_recipe(
        &self,
        owner: i64,
        id: i64,
        changes: RecipeChanges,
    ) -> Result<Recipe, StoreError> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<i64> =
            sqlx::query_scalar("SELECT id FROM recipes WHERE id = $1 AND user_id = $2 FOR UPDATE")
                .bind(id)
                .bind(owner)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(StoreError::NotFound("Recipe"));
        }

        let mut replacements = Vec::new();
        for kind in [AttributeKind::Tag, AttributeKind::Ingredient] {
            if let Some(ids) = changes.attribute_ids(kind) {
                let ids = Self::resolve_links(&mut tx, kind, owner, ids).await?;
                replacements.push((kind, ids));
            }
        }

        let sql = format!(
            r#"
            UPDATE recipes SET
                title = COALESCE($3, title),
                time_minutes = COALESCE($4, time_minutes),
                price = COALESCE($5, price),
                link = COALESCE($6, link)
            WHERE id = $1 AND user_id = $2
            RETURNING {}
            "#,
            RECIPE_COLUMNS
        );
        let row = sqlx::query_as::<_, RecipeRow>(&sql)
            .bind(id)
            .bind(owner)
            .bind(changes.title)
            .bind(changes.time_minutes)
            .bind(changes.price)
            .bind(changes.link)
            .fetch_one(&mut *tx)
            .await?;

        for (kind, ids) in replacements {
            Self::replace_links(&mut tx, kind, id, &ids).await?;
        }

        let updated = Self::hydrate_one(&mut tx, row).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_recipe(&self, owner: i64, id: i64) -> Result<Recipe, StoreError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "SELECT {} FROM recipes WHERE id = $1 AND user_id = $2 FOR UPDATE",
            RECIPE_COLUMNS
        );
        let row = sqlx::query_as::<_, RecipeRow>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound("Recipe"))?;
        let recipe = Self::hydrate_one(&mut tx, row).await?;

        // Association rows go with the recipe via ON DELETE CASCADE
        sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(recipe)
    }

    async fn set_recipe_image(
        &self,
        owner: i64,
        id: i64,
        image: Option<String>,
    ) -> Result<(Recipe, Option<String>), StoreError> {
        let mut tx = self.pool.begin().await?;

        let previous: Option<String> = sqlx::query_scalar::<_, Option<String>>(
            "SELECT image FROM recipes WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound("Recipe"))?;

        let sql = format!(
            "UPDATE recipes SET image = $3 WHERE id = $1 AND user_id = $2 RETURNING {}",
            RECIPE_COLUMNS
        );
        let row = sqlx::query_as::<_, RecipeRow>(&sql)
            .bind(id)
            .bind(owner)
            .bind(image)
            .fetch_one(&mut *tx)
            .await?;

        let updated = Self::hydrate_one(&mut tx, row).await?;
        tx.commit().await?;
        Ok((updated, previous))
    }
}
