use axum::{
    Router,
    routing::{get, patch},
};

use crate::state::AppState;

use super::controller::{create_drink, delete_drink, get_drinks, get_drinks_detail, update_drink};

pub fn init_drinks_router() -> Router<AppState> {
    Router::new()
        .route("/drinks", get(get_drinks).post(create_drink))
        .route("/drinks-detail", get(get_drinks_detail))
        .route("/drinks/{id}", patch(update_drink).delete(delete_drink))
}
