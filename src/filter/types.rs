use serde::Deserialize;

/// Raw query string of `GET /recipe/recipes`
#[derive(Debug, Default, Deserialize)]
pub struct RecipeQuery {
    /// Comma-separated tag ids, e.g. `tags=1,4`
    pub tags: Option<String>,
    /// Comma-separated ingredient ids
    pub ingredients: Option<String>,
}

/// Raw query string of the tag and ingredient list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct AttributeQuery {
    /// `1` restricts the list to entries attached to at least one recipe
    pub assigned_only: Option<String>,
}
