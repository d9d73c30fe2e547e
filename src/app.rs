use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post, put},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/entries", get(handlers::list_entries))
        .route("/add-entry", post(handlers::add_entry))
        .route("/update-entry/:id", put(handlers::update_entry))
        .route("/delete-entry/:id", delete(handlers::delete_entry))
        .with_state(state)
}
