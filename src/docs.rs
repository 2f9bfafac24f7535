use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use coffeeshop_core::ErrorResponse;
use coffeeshop_models::drinks::{
    CreateDrinkDto, DeleteDrinkResponse, DrinkLong, DrinkShort, DrinksLongResponse,
    DrinksShortResponse, Ingredient, IngredientShort, RecipeInput, UpdateDrinkDto,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::drinks::controller::get_drinks,
        crate::modules::drinks::controller::get_drinks_detail,
        crate::modules::drinks::controller::create_drink,
        crate::modules::drinks::controller::update_drink,
        crate::modules::drinks::controller::delete_drink,
    ),
    components(
        schemas(
            Ingredient,
            IngredientShort,
            DrinkShort,
            DrinkLong,
            RecipeInput,
            CreateDrinkDto,
            UpdateDrinkDto,
            DrinksShortResponse,
            DrinksLongResponse,
            DeleteDrinkResponse,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Drinks", description = "Drink menu endpoints")
    ),
    info(
        title = "Coffee Shop API",
        version = "0.1.0",
        description = "Drink menu API. Reading the menu is public; detailed recipes and changes require a bearer token carrying the matching permission.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
