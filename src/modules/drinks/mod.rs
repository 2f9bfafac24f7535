pub mod controller;
pub mod repository;
pub mod router;
pub mod service;

pub use repository::{DrinkRepository, InMemoryDrinkRepository, PgDrinkRepository};
pub use router::init_drinks_router;
