//! # Coffee Shop Models
//!
//! Domain models and DTOs for the Coffee Shop API.
//!
//! - [`drinks`]: the drink entity, its short and long representations, and request bodies
//!
//! # Example
//!
//! ```ignore
//! use coffeeshop_models::drinks::{Drink, Ingredient};
//!
//! let drink = Drink {
//!     id: 1,
//!     title: "water".to_string(),
//!     recipe: vec![Ingredient::new("water", "blue", 1)],
//! };
//! let public_view = drink.short();
//! ```

pub mod drinks;

pub use drinks::{
    CreateDrinkDto, DeleteDrinkResponse, Drink, DrinkLong, DrinkRow, DrinkShort,
    DrinksLongResponse, DrinksShortResponse, Ingredient, IngredientShort, RecipeInput,
    UpdateDrinkDto,
};
