use anyhow::anyhow;
use tracing::{info, instrument};

use coffeeshop_core::AppError;
use coffeeshop_models::drinks::{
    CreateDrinkDto, Drink, DrinkLong, DrinkShort, Ingredient, RecipeInput, UpdateDrinkDto,
};

use crate::metrics::track_drink_write;

use super::repository::DrinkRepository;

const MISSING_FIELDS: &str = "missing required fields";
const NOT_FOUND: &str = "resource not found";

pub struct DrinkService;

impl DrinkService {
    #[instrument(skip(repo))]
    pub async fn list_short(repo: &dyn DrinkRepository) -> Result<Vec<DrinkShort>, AppError> {
        let drinks = repo.all().await?;
        Ok(drinks.iter().map(Drink::short).collect())
    }

    #[instrument(skip(repo))]
    pub async fn list_long(repo: &dyn DrinkRepository) -> Result<Vec<DrinkLong>, AppError> {
        let drinks = repo.all().await?;
        Ok(drinks.iter().map(Drink::long).collect())
    }

    /// Title and a non-empty recipe are both required.
    #[instrument(skip(repo))]
    pub async fn create_drink(
        repo: &dyn DrinkRepository,
        dto: CreateDrinkDto,
    ) -> Result<DrinkLong, AppError> {
        let title = dto
            .title
            .filter(|title| !title.trim().is_empty())
            .ok_or_else(|| AppError::bad_request(anyhow!(MISSING_FIELDS)))?;
        let recipe = dto
            .recipe
            .map(RecipeInput::into_ingredients)
            .filter(|recipe| !recipe.is_empty())
            .ok_or_else(|| AppError::bad_request(anyhow!(MISSING_FIELDS)))?;

        let drink = repo.insert(&title, &recipe).await?;
        track_drink_write("create");
        info!(id = drink.id, title = %drink.title, "Drink created");

        Ok(drink.long())
    }

    /// Applies whichever of title and recipe are present; absent fields keep their value.
    #[instrument(skip(repo))]
    pub async fn update_drink(
        repo: &dyn DrinkRepository,
        id: i32,
        dto: UpdateDrinkDto,
    ) -> Result<DrinkLong, AppError> {
        let mut drink = repo
            .find(id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!(NOT_FOUND)))?;

        if let Some(title) = dto.title {
            if title.trim().is_empty() {
                return Err(AppError::bad_request(anyhow!(MISSING_FIELDS)));
            }
            drink.title = title;
        }
        if let Some(recipe) = dto.recipe {
            drink.recipe = non_empty_recipe(recipe)?;
        }

        if !repo.update(&drink).await? {
            return Err(AppError::not_found(anyhow!(NOT_FOUND)));
        }
        track_drink_write("update");
        info!(id, "Drink updated");

        Ok(drink.long())
    }

    #[instrument(skip(repo))]
    pub async fn delete_drink(repo: &dyn DrinkRepository, id: i32) -> Result<i32, AppError> {
        if !repo.delete(id).await? {
            return Err(AppError::not_found(anyhow!(NOT_FOUND)));
        }
        track_drink_write("delete");
        info!(id, "Drink deleted");

        Ok(id)
    }
}

fn non_empty_recipe(recipe: RecipeInput) -> Result<Vec<Ingredient>, AppError> {
    let recipe = recipe.into_ingredients();
    if recipe.is_empty() {
        return Err(AppError::bad_request(anyhow!(
            "recipe must contain at least one ingredient"
        )));
    }
    Ok(recipe)
}
