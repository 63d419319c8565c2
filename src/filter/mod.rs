pub mod error;
pub mod types;

pub use error::FilterError;
pub use types::{AttributeQuery, RecipeQuery};

use crate::database::models::Recipe;

/// Association filter for the recipe list.
///
/// Within one list a recipe matches if it carries any of the ids. When both
/// lists are present the recipe must match both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub tags: Option<Vec<i64>>,
    pub ingredients: Option<Vec<i64>>,
}

impl RecipeFilter {
    pub fn from_query(query: &RecipeQuery) -> Result<Self, FilterError> {
        Ok(Self {
            tags: optional_ids("tags", query.tags.as_deref())?,
            ingredients: optional_ids("ingredients", query.ingredients.as_deref())?,
        })
    }

    pub fn matches(&self, recipe: &Recipe) -> bool {
        fn any_of(wanted: &Option<Vec<i64>>, present: &[i64]) -> bool {
            match wanted {
                Some(ids) => ids.iter().any(|id| present.contains(id)),
                None => true,
            }
        }

        any_of(&self.tags, &recipe.tags) && any_of(&self.ingredients, &recipe.ingredients)
    }
}

/// Filter for the tag/ingredient list endpoints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttributeFilter {
    pub assigned_only: bool,
}

impl AttributeFilter {
    pub fn from_query(query: &AttributeQuery) -> Self {
        let assigned_only = matches!(
            query.assigned_only.as_deref().map(str::trim),
            Some("1") | Some("true") | Some("True")
        );
        Self { assigned_only }
    }
}

/// A blank parameter means "no filter", not "match nothing".
fn optional_ids(param: &'static str, raw: Option<&str>) -> Result<Option<Vec<i64>>, FilterError> {
    match raw {
        Some(raw) => {
            let ids = parse_id_list(param, raw)?;
            Ok(Some(ids).filter(|ids| !ids.is_empty()))
        }
        None => Ok(None),
    }
}

/// Parse `"1,2, 3"` into ids. Empty segments are skipped.
pub fn parse_id_list(param: &'static str, raw: &str) -> Result<Vec<i64>, FilterError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>().map_err(|_| FilterError::InvalidId {
                param,
                value: s.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn recipe(tags: Vec<i64>, ingredients: Vec<i64>) -> Recipe {
        Recipe {
            id: 1,
            user_id: 1,
            title: "Chilli con Carne".to_string(),
            time_minutes: 10,
            price: Decimal::new(500, 2),
            link: String::new(),
            image: None,
            tags,
            ingredients,
        }
    }

    #[test]
    fn parses_comma_separated_ids() {
        assert_eq!(parse_id_list("tags", "1,2, 3").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_id_list("tags", "4,,").unwrap(), vec![4]);
        assert_eq!(
            parse_id_list("ingredients", "1,x"),
            Err(FilterError::InvalidId {
                param: "ingredients",
                value: "x".to_string()
            })
        );
    }

    #[test]
    fn builds_filter_from_query() {
        let filter = RecipeFilter::from_query(&RecipeQuery {
            tags: Some("3,5".to_string()),
            ingredients: None,
        })
        .unwrap();
        assert_eq!(filter.tags, Some(vec![3, 5]));
        assert!(filter.ingredients.is_none());
        let none = RecipeFilter::from_query(&RecipeQuery::default()).unwrap();
        assert!(none.tags.is_none() && none.ingredients.is_none());

        let blank = RecipeFilter::from_query(&RecipeQuery {
            tags: Some(String::new()),
            ingredients: Some(" ".to_string()),
        })
        .unwrap();
        assert!(blank.tags.is_none() && blank.ingredients.is_none());
    }

    #[test]
    fn matches_any_within_list_and_all_across_lists() {
        let filter = RecipeFilter {
            tags: Some(vec![1, 2]),
            ingredients: None,
        };
        assert!(filter.matches(&recipe(vec![2], vec![])));
        assert!(!filter.matches(&recipe(vec![3], vec![])));

        let both = RecipeFilter {
            tags: Some(vec![1]),
            ingredients: Some(vec![9]),
        };
        assert!(both.matches(&recipe(vec![1], vec![9])));
        assert!(!both.matches(&recipe(vec![1], vec![8])));
        assert!(RecipeFilter::default().matches(&recipe(vec![], vec![])));
    }

    #[test]
    fn assigned_only_flag() {
        let on = AttributeFilter::from_query(&AttributeQuery {
            assigned_only: Some("1".to_string()),
        });
        assert!(on.assigned_only);
        let off = AttributeFilter::from_query(&AttributeQuery {
            assigned_only: Some("0".to_string()),
        });
        assert!(!off.assigned_only);
        assert!(!AttributeFilter::default().assigned_only);
    }
}
