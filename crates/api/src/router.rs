use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

use crate::{auth_handlers, middleware::require, user_handlers, AppState};
use auth::{Account, Requirement, Role};

pub fn router(state: Arc<AppState>) -> Router {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/", get(|| async { "AdKit API running" }))
        .route("/auth/registration", post(auth_handlers::registration))
        .route("/auth/login", post(auth_handlers::login))
        .route("/auth/logout", post(auth_handlers::logout))
        .route("/auth/refresh", post(auth_handlers::refresh))
        .route("/auth/activate/{token}", patch(auth_handlers::activate))
        .route("/auth/password/forgot", post(auth_handlers::forgot_password))
        .route(
            "/auth/password/forgot/{token}",
            patch(auth_handlers::set_new_password),
        );

    // Any signed-in user
    let me_routes = Router::new()
        .route("/users/me", get(user_handlers::me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require(Requirement::authenticated()),
        ));

    let staff_routes = Router::new()
        .route("/users/{id}", get(user_handlers::get_user))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require(Requirement::roles([Role::Seller, Role::Manager, Role::Admin])),
        ));

    let management_routes = Router::new()
        .route("/users/role/{id}", patch(user_handlers::assign_role))
        .route("/users/account/{id}", patch(user_handlers::assign_account))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require(Requirement::roles([Role::Manager, Role::Admin])),
        ));

    // Role and tier must both match
    let premium_routes = Router::new()
        .route("/premium/ping", get(user_handlers::premium_ping))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require(Requirement::roles([Role::Seller]).with_accounts([Account::Premium])),
        ));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .merge(me_routes)
        .merge(staff_routes)
        .merge(management_routes)
        .merge(premium_routes)
        .with_state(state)
}
