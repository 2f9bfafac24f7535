use anyhow::anyhow;
use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
};
use tracing::instrument;

use coffeeshop_core::AppError;
use coffeeshop_models::drinks::{
    CreateDrinkDto, DeleteDrinkResponse, DrinksLongResponse, DrinksShortResponse, UpdateDrinkDto,
};

use crate::middleware::auth::{
    RequireDrinksCreate, RequireDrinksDelete, RequireDrinksDetail, RequireDrinksUpdate,
};
use crate::modules::drinks::service::DrinkService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Non-numeric ids can never match a drink.
fn drink_id(path: Result<Path<i32>, PathRejection>) -> Result<i32, AppError> {
    path.map(|Path(id)| id)
        .map_err(|_| AppError::not_found(anyhow!("resource not found")))
}

#[utoipa::path(
    get,
    path = "/drinks",
    responses(
        (status = 200, description = "All drinks, without ingredient names", body = DrinksShortResponse),
        (status = 500, description = "Internal server error", body = coffeeshop_core::ErrorResponse)
    ),
    tag = "Drinks"
)]
#[instrument(skip(state))]
pub async fn get_drinks(
    State(state): State<AppState>,
) -> Result<Json<DrinksShortResponse>, AppError> {
    let drinks = DrinkService::list_short(state.drinks.as_ref()).await?;

    Ok(Json(DrinksShortResponse {
        success: true,
        drinks,
    }))
}

#[utoipa::path(
    get,
    path = "/drinks-detail",
    responses(
        (status = 200, description = "All drinks with full recipes", body = DrinksLongResponse),
        (status = 401, description = "Missing, malformed, expired or unverifiable token", body = coffeeshop_core::ErrorResponse),
        (status = 403, description = "Forbidden - requires get:drinks-detail permission", body = coffeeshop_core::ErrorResponse)
    ),
    tag = "Drinks",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _claims))]
pub async fn get_drinks_detail(
    State(state): State<AppState>,
    RequireDrinksDetail(_claims): RequireDrinksDetail,
) -> Result<Json<DrinksLongResponse>, AppError> {
    let drinks = DrinkService::list_long(state.drinks.as_ref()).await?;

    Ok(Json(DrinksLongResponse {
        success: true,
        drinks,
    }))
}

#[utoipa::path(
    post,
    path = "/drinks",
    request_body = CreateDrinkDto,
    responses(
        (status = 200, description = "Drink created", body = DrinksLongResponse),
        (status = 400, description = "Missing title or recipe", body = coffeeshop_core::ErrorResponse),
        (status = 401, description = "Missing, malformed, expired or unverifiable token", body = coffeeshop_core::ErrorResponse),
        (status = 403, description = "Forbidden - requires post:drinks permission", body = coffeeshop_core::ErrorResponse),
        (status = 422, description = "Title already taken or too long", body = coffeeshop_core::ErrorResponse)
    ),
    tag = "Drinks",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, claims), fields(sub = %claims.sub))]
pub async fn create_drink(
    State(state): State<AppState>,
    RequireDrinksCreate(claims): RequireDrinksCreate,
    ValidatedJson(dto): ValidatedJson<CreateDrinkDto>,
) -> Result<Json<DrinksLongResponse>, AppError> {
    let drink = DrinkService::create_drink(state.drinks.as_ref(), dto).await?;

    Ok(Json(DrinksLongResponse {
        success: true,
        drinks: vec![drink],
    }))
}

#[utoipa::path(
    patch,
    path = "/drinks/{id}",
    params(
        ("id" = i32, Path, description = "Drink ID")
    ),
    request_body = UpdateDrinkDto,
    responses(
        (status = 200, description = "Drink updated", body = DrinksLongResponse),
        (status = 401, description = "Missing, malformed, expired or unverifiable token", body = coffeeshop_core::ErrorResponse),
        (status = 403, description = "Forbidden - requires patch:drinks permission", body = coffeeshop_core::ErrorResponse),
        (status = 404, description = "Drink not found", body = coffeeshop_core::ErrorResponse),
        (status = 422, description = "Title already taken or too long", body = coffeeshop_core::ErrorResponse)
    ),
    tag = "Drinks",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, claims, path), fields(sub = %claims.sub))]
pub async fn update_drink(
    State(state): State<AppState>,
    RequireDrinksUpdate(claims): RequireDrinksUpdate,
    path: Result<Path<i32>, PathRejection>,
    ValidatedJson(dto): ValidatedJson<UpdateDrinkDto>,
) -> Result<Json<DrinksLongResponse>, AppError> {
    let id = drink_id(path)?;
    let drink = DrinkService::update_drink(state.drinks.as_ref(), id, dto).await?;

    Ok(Json(DrinksLongResponse {
        success: true,
        drinks: vec![drink],
    }))
}

#[utoipa::path(
    delete,
    path = "/drinks/{id}",
    params(
        ("id" = i32, Path, description = "Drink ID")
    ),
    responses(
        (status = 200, description = "Drink deleted", body = DeleteDrinkResponse),
        (status = 401, description = "Missing, malformed, expired or unverifiable token", body = coffeeshop_core::ErrorResponse),
        (status = 403, description = "Forbidden - requires delete:drinks permission", body = coffeeshop_core::ErrorResponse),
        (status = 404, description = "Drink not found", body = coffeeshop_core::ErrorResponse)
    ),
    tag = "Drinks",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, claims, path), fields(sub = %claims.sub))]
pub async fn delete_drink(
    State(state): State<AppState>,
    RequireDrinksDelete(claims): RequireDrinksDelete,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<DeleteDrinkResponse>, AppError> {
    let id = drink_id(path)?;
    let deleted = DrinkService::delete_drink(state.drinks.as_ref(), id).await?;

    Ok(Json(DeleteDrinkResponse {
        success: true,
        delete: deleted,
    }))
}
