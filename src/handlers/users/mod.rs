//! User management handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{middleware::auth::auth_middleware, state::AppState};

/// User routes
///
/// The auth layer is attached with `route_layer`, so unknown paths still fall
/// through to the 404 handler instead of answering 401.
pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/signup", post(handler::signup))
        .route("/login", post(handler::login))
        .route("/resetPassword", post(handler::reset_password))
        .route("/updatePassword", put(handler::update_password))
        .route("/verifyEmail", put(handler::verify_email));

    let protected = Router::new()
        .route("/changePassword", post(handler::change_password))
        .route("/view/all", get(handler::get_all_users))
        .route("/{user_id}/edit", put(handler::edit_user))
        .route("/{user_id}/delete", post(handler::delete_user))
        .route("/{user_id}/details", get(handler::get_single_user))
        .route("/{user_id}/logout", post(handler::logout))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    public.merge(protected)
}
