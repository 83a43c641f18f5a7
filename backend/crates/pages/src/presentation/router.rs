//! Pages Router

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::PagesConfig;
use crate::domain::PagesStore;
use crate::domain::events::Observers;
use crate::infra::postgres::PgPageStore;
use crate::presentation::handlers::{self, PagesAppState};
use crate::presentation::middleware::require_editor;
use crate::presentation::views::PageViews;

/// Create the Pages router with the PostgreSQL store
pub fn pages_router(repo: PgPageStore, config: PagesConfig, observers: Observers) -> Router {
    pages_router_generic(repo, config, observers)
}

/// Create a Pages router for any store implementation
///
/// Routes are relative; nest the router at `config.base_path`.
pub fn pages_router_generic<R>(repo: R, config: PagesConfig, observers: Observers) -> Router
where
    R: PagesStore,
{
    let state = PagesAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
        views: Arc::new(PageViews::new()),
        observers: Arc::new(observers),
    };

    Router::new()
        .route("/", get(handlers::index::<R>))
        .route("/children/{parent_id}/{level}", get(handlers::children::<R>))
        .route(
            "/add",
            get(handlers::add_form::<R>).post(handlers::add_store::<R>),
        )
        .route(
            "/add/{parent_id}",
            get(handlers::add_child_form::<R>).post(handlers::add_child_store::<R>),
        )
        .route("/add-part", post(handlers::add_part::<R>))
        .route(
            "/edit/{id}",
            get(handlers::edit_form::<R>).post(handlers::edit_store::<R>),
        )
        .route(
            "/delete/{id}",
            get(handlers::delete::<R>).post(handlers::delete::<R>),
        )
        .route("/reorder/{parent_id}", post(handlers::reorder::<R>))
        .route("/copy/{parent_id}", post(handlers::copy::<R>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_editor::<R>,
        ))
        .with_state(state)
}
