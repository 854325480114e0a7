use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(handlers::create_resume).get(handlers::list_resumes),
        )
        .route(
            "/:id",
            get(handlers::get_resume)
                .put(handlers::update_resume)
                .delete(handlers::delete_resume),
        )
        .route("/resume/:id/improve", post(handlers::improve_resume))
}
