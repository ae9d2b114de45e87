use std::sync::Arc;

use axum::Router;
use axum::extract::FromRef;
use axum::routing::{get, post};
use axum_extra::extract::cookie::Key;

use crate::config::Config;
use crate::db::Db;
use crate::handlers::{health, pages};
use crate::middleware::flash::signing_key;

#[derive(Clone)]
pub struct RolodexState {
    pub db: Arc<Db>,
    key: Key,
}

impl RolodexState {
    pub fn new(db: Arc<Db>, cfg: &Config) -> Self {
        Self {
            db,
            key: signing_key(&cfg.secret_key),
        }
    }
}

// Lets the private cookie jar extract its key from router state.
impl FromRef<RolodexState> for Key {
    fn from_ref(state: &RolodexState) -> Key {
        state.key.clone()
    }
}

/// Build the application router. `/delete-contact/{id}` is POST-only; other
/// methods get 405 from the method router.
pub fn rolodex_router(state: RolodexState) -> Router {
    Router::new()
        .route("/", get(pages::homepage))
        .route(
            "/create-contact",
            get(pages::create_contact_form).post(pages::create_contact_submit),
        )
        .route("/delete-contact/{id}", post(pages::delete_contact))
        .route("/health", get(health::health_check))
        .with_state(state)
}
