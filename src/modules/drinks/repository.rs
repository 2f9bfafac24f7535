//! Drink persistence.
//!
//! [`PgDrinkRepository`] stores drinks in PostgreSQL with the recipe serialized as
//! JSON text. [`InMemoryDrinkRepository`] keeps them in process memory and backs the
//! server when no database is configured, and the integration tests.

use std::collections::BTreeMap;

use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::instrument;

use coffeeshop_core::AppError;
use coffeeshop_db::seed_drink;
use coffeeshop_models::drinks::{Drink, DrinkRow, Ingredient};

const DUPLICATE_TITLE: &str = "unprocessable: a drink with this title already exists";

#[async_trait]
pub trait DrinkRepository: Send + Sync {
    /// All drinks, ordered by id.
    async fn all(&self) -> Result<Vec<Drink>, AppError>;

    async fn find(&self, id: i32) -> Result<Option<Drink>, AppError>;

    /// Fails with 422 when the title is already taken.
    async fn insert(&self, title: &str, recipe: &[Ingredient]) -> Result<Drink, AppError>;

    /// Overwrites the stored drink with the same id. Returns `false` if there is none.
    async fn update(&self, drink: &Drink) -> Result<bool, AppError>;

    /// Returns `false` if there was no drink with this id.
    async fn delete(&self, id: i32) -> Result<bool, AppError>;
}

fn map_write_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.is_unique_violation()
    {
        return AppError::unprocessable(anyhow!(DUPLICATE_TITLE));
    }
    AppError::from(err)
}

#[derive(Debug, Clone)]
pub struct PgDrinkRepository {
    db: PgPool,
}

impl PgDrinkRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DrinkRepository for PgDrinkRepository {
    #[instrument(skip(self))]
    async fn all(&self) -> Result<Vec<Drink>, AppError> {
        let rows = sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drinks ORDER BY id")
            .fetch_all(&self.db)
            .await?;

        let drinks = rows
            .into_iter()
            .map(Drink::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(drinks)
    }

    #[instrument(skip(self))]
    async fn find(&self, id: i32) -> Result<Option<Drink>, AppError> {
        let row =
            sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drinks WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db)
                .await?;

        Ok(row.map(Drink::try_from).transpose()?)
    }

    #[instrument(skip(self, recipe))]
    async fn insert(&self, title: &str, recipe: &[Ingredient]) -> Result<Drink, AppError> {
        let row = sqlx::query_as::<_, DrinkRow>(
            r#"INSERT INTO drinks (title, recipe)
               VALUES ($1, $2)
               RETURNING id, title, recipe"#,
        )
        .bind(title)
        .bind(serde_json::to_string(recipe)?)
        .fetch_one(&self.db)
        .await
        .map_err(map_write_error)?;

        Ok(Drink::try_from(row)?)
    }

    #[instrument(skip(self, drink), fields(id = drink.id))]
    async fn update(&self, drink: &Drink) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE drinks SET title = $1, recipe = $2 WHERE id = $3")
            .bind(&drink.title)
            .bind(serde_json::to_string(&drink.recipe)?)
            .bind(drink.id)
            .execute(&self.db)
            .await
            .map_err(map_write_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM drinks WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, Default)]
struct MemoryTable {
    last_id: i32,
    rows: BTreeMap<i32, Drink>,
}

impl MemoryTable {
    fn title_taken(&self, title: &str, except: Option<i32>) -> bool {
        self.rows
            .values()
            .any(|drink| drink.title == title && Some(drink.id) != except)
    }
}

/// Process-local store with the same uniqueness rule as the database table.
#[derive(Debug, Default)]
pub struct InMemoryDrinkRepository {
    table: RwLock<MemoryTable>,
}

impl InMemoryDrinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding only the default drink, as a freshly reset database does.
    pub fn with_seed() -> Self {
        let (title, recipe) = seed_drink();
        let mut table = MemoryTable {
            last_id: 1,
            rows: BTreeMap::new(),
        };
        table.rows.insert(
            1,
            Drink {
                id: 1,
                title,
                recipe,
            },
        );

        Self {
            table: RwLock::new(table),
        }
    }
}

#[async_trait]
impl DrinkRepository for InMemoryDrinkRepository {
    async fn all(&self) -> Result<Vec<Drink>, AppError> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn find(&self, id: i32) -> Result<Option<Drink>, AppError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn insert(&self, title: &str, recipe: &[Ingredient]) -> Result<Drink, AppError> {
        let mut table = self.table.write().await;
        if table.title_taken(title, None) {
            return Err(AppError::unprocessable(anyhow!(DUPLICATE_TITLE)));
        }

        table.last_id += 1;
        let drink = Drink {
            id: table.last_id,
            title: title.to_string(),
            recipe: recipe.to_vec(),
        };
        table.rows.insert(drink.id, drink.clone());

        Ok(drink)
    }

    async fn update(&self, drink: &Drink) -> Result<bool, AppError> {
        let mut table = self.table.write().await;
        if !table.rows.contains_key(&drink.id) {
            return Ok(false);
        }
        if table.title_taken(&drink.title, Some(drink.id)) {
            return Err(AppError::unprocessable(anyhow!(DUPLICATE_TITLE)));
        }

        table.rows.insert(drink.id, drink.clone());
        Ok(true)
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }
}
