//! Drink domain models and DTOs.
//!
//! A drink is a title plus a recipe: an ordered list of ingredients, each with a
//! display color and a number of parts. The public ("short") representation hides
//! ingredient names; the detailed ("long") one includes them.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    pub parts: u32,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, color: impl Into<String>, parts: u32) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            parts,
        }
    }
}

/// Ingredient without its name, as shown publicly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IngredientShort {
    pub color: String,
    pub parts: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drink {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DrinkShort {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<IngredientShort>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DrinkLong {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl Drink {
    pub fn short(&self) -> DrinkShort {
        DrinkShort {
            id: self.id,
            title: self.title.clone(),
            recipe: self
                .recipe
                .iter()
                .map(|ingredient| IngredientShort {
                    color: ingredient.color.clone(),
                    parts: ingredient.parts,
                })
                .collect(),
        }
    }

    pub fn long(&self) -> DrinkLong {
        DrinkLong {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.clone(),
        }
    }
}

/// Row of the `drinks` table; the recipe is stored as JSON text.
#[derive(Debug, Clone, FromRow)]
pub struct DrinkRow {
    pub id: i32,
    pub title: String,
    pub recipe: String,
}

impl TryFrom<DrinkRow> for Drink {
    type Error = serde_json::Error;

    fn try_from(row: DrinkRow) -> Result<Self, Self::Error> {
        Ok(Drink {
            id: row.id,
            title: row.title,
            recipe: serde_json::from_str(&row.recipe)?,
        })
    }
}

/// A recipe as clients send it: a single ingredient or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum RecipeInput {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

impl RecipeInput {
    pub fn into_ingredients(self) -> Vec<Ingredient> {
        match self {
            RecipeInput::Many(ingredients) => ingredients,
            RecipeInput::One(ingredient) => vec![ingredient],
        }
    }
}

/// Body of `POST /drinks`. Both fields are required; they are optional here so a
/// missing field is reported as a missing field rather than a parse failure.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDrinkDto {
    #[validate(length(max = 80, message = "title must be at most 80 characters"))]
    pub title: Option<String>,
    pub recipe: Option<RecipeInput>,
}

/// Body of `PATCH /drinks/{id}`; absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateDrinkDto {
    #[validate(length(
        min = 1,
        max = 80,
        message = "title must be between 1 and 80 characters"
    ))]
    pub title: Option<String>,
    pub recipe: Option<RecipeInput>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DrinksShortResponse {
    pub success: bool,
    pub drinks: Vec<DrinkShort>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DrinksLongResponse {
    pub success: bool,
    pub drinks: Vec<DrinkLong>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteDrinkResponse {
    pub success: bool,
    /// Id of the deleted drink
    pub delete: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mocha() -> Drink {
        Drink {
            id: 7,
            title: "mocha".to_string(),
            recipe: vec![
                Ingredient::new("espresso", "brown", 1),
                Ingredient::new("chocolate", "#3b1f0f", 2),
            ],
        }
    }

    #[test]
    fn test_short_hides_ingredient_names() {
        let value = serde_json::to_value(mocha().short()).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 7,
                "title": "mocha",
                "recipe": [
                    {"color": "brown", "parts": 1},
                    {"color": "#3b1f0f", "parts": 2}
                ]
            })
        );
    }

    #[test]
    fn test_long_includes_ingredient_names() {
        let value = serde_json::to_value(mocha().long()).unwrap();
        assert_eq!(value["recipe"][0]["name"], "espresso");
        assert_eq!(value["recipe"][1]["name"], "chocolate");
        assert_eq!(value["recipe"][1]["parts"], 2);
    }

    #[test]
    fn test_row_conversion() {
        let row = DrinkRow {
            id: 1,
            title: "water".to_string(),
            recipe: r#"[{"name":"water","color":"blue","parts":1}]"#.to_string(),
        };
        let drink = Drink::try_from(row).unwrap();
        assert_eq!(drink.recipe, vec![Ingredient::new("water", "blue", 1)]);
    }

    #[test]
    fn test_row_conversion_rejects_corrupt_recipe() {
        let row = DrinkRow {
            id: 1,
            title: "water".to_string(),
            recipe: "not json".to_string(),
        };
        assert!(Drink::try_from(row).is_err());
    }

    #[test]
    fn test_recipe_input_accepts_single_ingredient() {
        let input: RecipeInput =
            serde_json::from_value(json!({"name": "milk", "color": "white", "parts": 3}))
                .unwrap();
        assert_eq!(
            input.into_ingredients(),
            vec![Ingredient::new("milk", "white", 3)]
        );
    }

    #[test]
    fn test_recipe_input_accepts_list() {
        let input: RecipeInput = serde_json::from_value(json!([
            {"name": "espresso", "color": "brown", "parts": 1},
            {"name": "milk", "color": "white", "parts": 3}
        ]))
        .unwrap();
        assert_eq!(input.into_ingredients().len(), 2);
    }

    #[test]
    fn test_create_dto_validation() {
        let valid: CreateDrinkDto = serde_json::from_value(json!({
            "title": "latte",
            "recipe": [{"name": "milk", "color": "white", "parts": 3}]
        }))
        .unwrap();
        assert!(valid.validate().is_ok());

        let long_title = CreateDrinkDto {
            title: Some("x".repeat(81)),
            recipe: None,
        };
        assert!(long_title.validate().is_err());
    }

    #[test]
    fn test_update_dto_validation() {
        let empty_update: UpdateDrinkDto = serde_json::from_value(json!({})).unwrap();
        assert!(empty_update.validate().is_ok());

        let empty_title = UpdateDrinkDto {
            title: Some(String::new()),
            recipe: None,
        };
        assert!(empty_title.validate().is_err());
    }
}
