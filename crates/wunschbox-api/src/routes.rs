use axum::{
    Json, Router, middleware,
    routing::{delete, get, post, put},
};
use serde_json::{Value, json};

use crate::auth::{self, AppState};
use crate::middleware::require_auth;
use crate::{children, contacts, gifts, invitations, notifications, suggestions, users};

/// Full HTTP surface. The server binary adds CORS and tracing layers.
pub fn app(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/invitations/{token}", get(invitations::lookup_invitation));

    let protected_routes = Router::new()
        .route(
            "/users/me",
            get(users::get_me).put(users::update_me).delete(users::delete_me),
        )
        .route(
            "/children",
            get(children::list_children).post(children::create_child),
        )
        .route("/children/names", get(children::list_child_names))
        .route(
            "/children/{child_id}",
            put(children::update_child).delete(children::delete_child),
        )
        .route("/gifts", get(gifts::list_gifts).post(gifts::create_gift))
        .route(
            "/gifts/{gift_id}",
            get(gifts::get_gift)
                .put(gifts::update_gift)
                .delete(gifts::delete_gift),
        )
        .route("/gifts/{gift_id}/reserve", put(gifts::reserve_gift))
        .route("/gifts/{gift_id}/release", put(gifts::release_gift))
        .route("/gifts/{gift_id}/proxy", put(gifts::mark_by_proxy))
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/read", put(notifications::mark_all_read))
        .route(
            "/invitations",
            get(invitations::list_invitations).post(invitations::create_invitation),
        )
        .route(
            "/contacts",
            get(contacts::list_contacts).post(contacts::create_contact),
        )
        .route("/contacts/{contact_id}", delete(contacts::delete_contact))
        .route("/suggestions", post(suggestions::suggest_gifts))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let api = Router::new().merge(public_routes).merge(protected_routes);

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
